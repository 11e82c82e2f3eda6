use serde::Serialize;

use crate::models::video::VideoRecord;
use crate::models::PartialFault;
use crate::youtube_client::ChannelResource;

/// One search hit prior to final selection. Built per request and discarded
/// with the response; the relevance score is never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "customUrl", skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<serde_json::Value>,
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: String,
    #[serde(rename = "videoCount")]
    pub video_count: String,
    #[serde(rename = "viewCount")]
    pub view_count: String,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: u32,
    #[serde(rename = "matchType")]
    pub match_type: MatchType,
}

impl ChannelCandidate {
    /// Counters default to "0" when the upstream hides or omits them.
    pub fn from_resource(resource: ChannelResource) -> Self {
        let snippet = resource.snippet.unwrap_or_default();
        let statistics = resource.statistics.unwrap_or_default();

        Self {
            id: resource.id,
            title: snippet.title,
            description: snippet.description,
            custom_url: snippet.custom_url,
            thumbnails: snippet.thumbnails,
            subscriber_count: statistics.subscriber_count.unwrap_or_else(|| "0".to_string()),
            video_count: statistics.video_count.unwrap_or_else(|| "0".to_string()),
            view_count: statistics.view_count.unwrap_or_else(|| "0".to_string()),
            published_at: snippet.published_at,
            relevance_score: 0,
            match_type: MatchType::Possible,
        }
    }
}

/// Score-band classification shown alongside each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    #[serde(rename = "Direct URL/ID")]
    Direct,
    #[serde(rename = "Best Match")]
    Best,
    #[serde(rename = "Good Match")]
    Good,
    #[serde(rename = "Possible Match")]
    Possible,
}

impl MatchType {
    pub fn classify(score: u32) -> Self {
        if score >= 80 {
            MatchType::Best
        } else if score >= 40 {
            MatchType::Good
        } else {
            MatchType::Possible
        }
    }
}

/// Result of a channel resolution request.
#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub channels: Vec<ChannelCandidate>,
    #[serde(rename = "searchTips")]
    pub tips: SearchTips,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<PartialFault>,
}

#[derive(Debug, Serialize)]
pub struct SearchTips {
    #[serde(rename = "isDirectMatch")]
    pub is_direct_match: bool,
    #[serde(rename = "originalQuery")]
    pub original_query: String,
    #[serde(rename = "totalFound")]
    pub total_found: usize,
    pub strategies: Vec<String>,
    pub suggestions: Vec<String>,
}

// ============================================================================
// Channel Report Structures
// ============================================================================

/// Assembled response for the channel-detail endpoint; sections appear only
/// when their option was requested.
#[derive(Debug, Default, Serialize)]
pub struct ChannelReport {
    #[serde(rename = "basicInfo", skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfoSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<BrandingSection>,
    #[serde(rename = "contentDetails", skip_serializing_if = "Option::is_none")]
    pub content_details: Option<ContentDetailsSection>,
    #[serde(rename = "topicDetails", skip_serializing_if = "Option::is_none")]
    pub topic_details: Option<TopicDetailsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localizations: Option<serde_json::Value>,
    #[serde(rename = "recentVideos", skip_serializing_if = "Option::is_none")]
    pub recent_videos: Option<Vec<VideoRecord>>,
    #[serde(rename = "allVideos", skip_serializing_if = "Option::is_none")]
    pub all_videos: Option<Vec<VideoRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlists: Option<Vec<PlaylistSummary>>,
    #[serde(rename = "channelSections", skip_serializing_if = "Option::is_none")]
    pub channel_sections: Option<Vec<ChannelSectionSummary>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<PartialFault>,
}

#[derive(Debug, Serialize)]
pub struct BasicInfoSection {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "customUrl", skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "defaultLanguage", skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsSection {
    #[serde(rename = "viewCount", skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
    #[serde(rename = "subscriberCount", skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "videoCount", skip_serializing_if = "Option::is_none")]
    pub video_count: Option<String>,
    #[serde(rename = "hiddenSubscriberCount", skip_serializing_if = "Option::is_none")]
    pub hidden_subscriber_count: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BrandingSection {
    #[serde(rename = "bannerImageUrl", skip_serializing_if = "Option::is_none")]
    pub banner_image_url: Option<String>,
    #[serde(rename = "bannerMobileImageUrl", skip_serializing_if = "Option::is_none")]
    pub banner_mobile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(rename = "unsubscribedTrailer", skip_serializing_if = "Option::is_none")]
    pub unsubscribed_trailer: Option<String>,
    #[serde(rename = "defaultTab", skip_serializing_if = "Option::is_none")]
    pub default_tab: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentDetailsSection {
    #[serde(rename = "uploadsPlaylistId", skip_serializing_if = "Option::is_none")]
    pub uploads_playlist_id: Option<String>,
    #[serde(rename = "likesPlaylistId", skip_serializing_if = "Option::is_none")]
    pub likes_playlist_id: Option<String>,
    #[serde(rename = "favoritesPlaylistId", skip_serializing_if = "Option::is_none")]
    pub favorites_playlist_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopicDetailsSection {
    #[serde(rename = "topicIds", skip_serializing_if = "Option::is_none")]
    pub topic_ids: Option<Vec<String>>,
    #[serde(rename = "topicCategories", skip_serializing_if = "Option::is_none")]
    pub topic_categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<serde_json::Value>,
    #[serde(rename = "videoCount", skip_serializing_if = "Option::is_none")]
    pub video_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChannelSectionSummary {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub section_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(rename = "playlistIds", skip_serializing_if = "Option::is_none")]
    pub playlist_ids: Option<Vec<String>>,
    #[serde(rename = "channelIds", skip_serializing_if = "Option::is_none")]
    pub channel_ids: Option<Vec<String>>,
}
