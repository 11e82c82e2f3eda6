// YouTube Data API v3 client for channel lookup and video collection
// Docs: https://developers.google.com/youtube/v3

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::YouTubeConfig;
use crate::error::YouTubeError;

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// The four upstream operations the resolver and collector depend on.
///
/// Kept behind a trait so both components can run against a scripted fake.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// search.list restricted to channel hits; returns channel IDs only.
    async fn search_channel_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YouTubeError>;

    /// channels.list with snippet and statistics for the given IDs.
    async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, YouTubeError>;

    /// One playlistItems.list page of video IDs plus the continuation token.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage, YouTubeError>;

    /// videos.list with snippet, statistics, contentDetails and status.
    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, YouTubeError>;
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
        }
    }

    /// Map a non-success upstream response to the error taxonomy.
    /// 403 is surfaced distinctly so callers can show a quota message.
    async fn check(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, YouTubeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("{} failed ({}): {}", context, status, error_text);

        if status == StatusCode::FORBIDDEN {
            return Err(YouTubeError::QuotaExceeded);
        }

        Err(YouTubeError::Upstream {
            status: status.as_u16(),
            message: error_text,
        })
    }

    /// channels.list with an explicit part selection; returns the first
    /// matching resource, or None when the ID is unknown upstream.
    pub async fn channel_with_parts(
        &self,
        channel_id: &str,
        parts: &[&str],
    ) -> Result<Option<ChannelResource>, YouTubeError> {
        let url = format!("{}/channels", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("id", channel_id.to_string()),
                ("part", parts.join(",")),
            ])
            .send()
            .await?;

        let response = Self::check(response, "channels.list").await?;
        let channels: ChannelListResponse = response.json().await?;

        Ok(channels.items.into_iter().next())
    }

    /// search.list for a channel's most recent videos, newest first.
    pub async fn recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YouTubeError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("channelId", channel_id.to_string()),
                ("part", "snippet".to_string()),
                ("order", "date".to_string()),
                ("type", "video".to_string()),
                ("maxResults", max_results.to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "search.list (recent videos)").await?;
        let search_response: SearchListResponse = response.json().await?;

        Ok(search_response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// playlists.list for a channel's public playlists.
    pub async fn list_channel_playlists(
        &self,
        channel_id: &str,
    ) -> Result<Vec<PlaylistResource>, YouTubeError> {
        let url = format!("{}/playlists", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("channelId", channel_id.to_string()),
                ("part", "snippet,contentDetails".to_string()),
                ("maxResults", "50".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "playlists.list").await?;
        let playlists: PlaylistListResponse = response.json().await?;

        Ok(playlists.items)
    }

    /// channelSections.list for a channel's home-page shelves.
    pub async fn list_channel_sections(
        &self,
        channel_id: &str,
    ) -> Result<Vec<ChannelSectionResource>, YouTubeError> {
        let url = format!("{}/channelSections", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("channelId", channel_id.to_string()),
                ("part", "snippet,contentDetails".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "channelSections.list").await?;
        let sections: ChannelSectionListResponse = response.json().await?;

        Ok(sections.items)
    }
}

#[async_trait]
impl YouTubeApi for YouTubeClient {
    async fn search_channel_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YouTubeError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("q", query.to_string()),
                ("type", "channel".to_string()),
                ("part", "snippet".to_string()),
                ("maxResults", max_results.to_string()),
                ("order", "relevance".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "search.list (channels)").await?;
        let search_response: SearchListResponse = response.json().await?;

        Ok(search_response
            .items
            .into_iter()
            .filter_map(|item| item.snippet.and_then(|s| s.channel_id))
            .collect())
    }

    async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, YouTubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/channels", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("id", ids.join(",")),
                ("part", "snippet,statistics".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "channels.list").await?;
        let channels: ChannelListResponse = response.json().await?;

        Ok(channels.items)
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage, YouTubeError> {
        let url = format!("{}/playlistItems", self.base_url);

        let mut query_params = vec![
            ("key", self.api_key.clone()),
            ("playlistId", playlist_id.to_string()),
            ("part", "contentDetails".to_string()),
            ("maxResults", page_size.to_string()),
        ];

        if let Some(token) = page_token {
            query_params.push(("pageToken", token.to_string()));
        }

        let response = self.client.get(&url).query(&query_params).send().await?;

        let response = Self::check(response, "playlistItems.list").await?;
        let page: PlaylistItemsResponse = response.json().await?;

        Ok(PlaylistPage {
            video_ids: page
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: page.next_page_token,
        })
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, YouTubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/videos", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("id", ids.join(",")),
                ("part", "snippet,statistics,contentDetails,status".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, "videos.list").await?;
        let videos: VideoListResponse = response.json().await?;

        Ok(videos.items)
    }
}

// ============================================================================
// Channel Resource Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelResource {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub statistics: Option<ChannelStatistics>,
    #[serde(rename = "brandingSettings")]
    pub branding_settings: Option<BrandingSettings>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelContentDetails>,
    #[serde(rename = "topicDetails")]
    pub topic_details: Option<TopicDetails>,
    pub localizations: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "customUrl")]
    pub custom_url: Option<String>,
    pub thumbnails: Option<serde_json::Value>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "defaultLanguage")]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    pub video_count: Option<String>,
    #[serde(rename = "hiddenSubscriberCount")]
    pub hidden_subscriber_count: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingSettings {
    pub image: Option<BrandingImage>,
    pub channel: Option<BrandingChannel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingImage {
    #[serde(rename = "bannerExternalUrl")]
    pub banner_external_url: Option<String>,
    #[serde(rename = "bannerMobileExtraHdImageUrl")]
    pub banner_mobile_extra_hd_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingChannel {
    pub keywords: Option<String>,
    #[serde(rename = "unsubscribedTrailer")]
    pub unsubscribed_trailer: Option<String>,
    #[serde(rename = "defaultTab")]
    pub default_tab: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
    pub likes: Option<String>,
    pub favorites: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicDetails {
    #[serde(rename = "topicIds")]
    pub topic_ids: Option<Vec<String>>,
    #[serde(rename = "topicCategories")]
    pub topic_categories: Option<Vec<String>>,
}

// ============================================================================
// Search Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResultItem {
    pub id: SearchResultId,
    pub snippet: Option<SearchResultSnippet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResultId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResultSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
}

// ============================================================================
// Playlist Structures
// ============================================================================

/// One page of uploads-playlist membership, already reduced to video IDs.
#[derive(Debug, Clone)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
    pub snippet: Option<PlaylistSnippet>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub thumbnails: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistContentDetails {
    #[serde(rename = "itemCount")]
    pub item_count: Option<i64>,
}

// ============================================================================
// Channel Section Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChannelSectionListResponse {
    #[serde(default)]
    pub items: Vec<ChannelSectionResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSectionResource {
    pub id: String,
    pub snippet: Option<ChannelSectionSnippet>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelSectionContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelSectionSnippet {
    #[serde(rename = "type")]
    pub section_type: Option<String>,
    pub style: Option<String>,
    pub title: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSectionContentDetails {
    pub playlists: Option<Vec<String>>,
    pub channels: Option<Vec<String>>,
}

// ============================================================================
// Video Resource Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    pub statistics: Option<VideoStatistics>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<VideoContentDetails>,
    pub status: Option<VideoStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub thumbnails: Option<serde_json::Value>,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    #[serde(rename = "defaultLanguage")]
    pub default_language: Option<String>,
    #[serde(rename = "defaultAudioLanguage")]
    pub default_audio_language: Option<String>,
    #[serde(rename = "liveBroadcastContent")]
    pub live_broadcast_content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "dislikeCount")]
    pub dislike_count: Option<String>,
    #[serde(rename = "favoriteCount")]
    pub favorite_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
    pub definition: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "licensedContent")]
    pub licensed_content: Option<bool>,
    pub projection: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoStatus {
    #[serde(rename = "uploadStatus")]
    pub upload_status: Option<String>,
    #[serde(rename = "privacyStatus")]
    pub privacy_status: Option<String>,
    pub license: Option<String>,
    pub embeddable: Option<bool>,
    #[serde(rename = "publicStatsViewable")]
    pub public_stats_viewable: Option<bool>,
    #[serde(rename = "madeForKids")]
    pub made_for_kids: Option<bool>,
    #[serde(rename = "selfDeclaredMadeForKids")]
    pub self_declared_made_for_kids: Option<bool>,
}
