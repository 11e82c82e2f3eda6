// Channel search and channel report handlers
// Thin transport layer over the resolver / collector pair

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::collector::{normalize_video, VideoCollector};
use crate::error::YouTubeError;
use crate::models::channel::{
    BasicInfoSection, BrandingSection, ChannelReport, ChannelSectionSummary,
    ContentDetailsSection, PlaylistSummary, StatisticsSection, TopicDetailsSection,
};
use crate::models::video::VideoRecord;
use crate::models::PartialFault;
use crate::resolver::{is_channel_id, ChannelResolver, SearchStrategy};
use crate::youtube_client::{ChannelResource, PlaylistResource, YouTubeClient};
use crate::AppState;

const RECENT_VIDEO_LIMIT: u32 = 10;

pub fn channel_routes() -> Router {
    Router::new()
        .route("/", get(service_banner))
        .route("/api/health", get(health_check))
        .route("/api/channels/search", get(search_channels))
        .route("/api/channel", post(channel_report))
}

#[derive(Debug, Deserialize)]
pub struct ChannelSearchQuery {
    pub q: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelReportRequest {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

fn error_response(error: &YouTubeError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match error {
        YouTubeError::QuotaExceeded => StatusCode::FORBIDDEN,
        YouTubeError::ChannelNotFound => StatusCode::NOT_FOUND,
        YouTubeError::NotConfigured
        | YouTubeError::Http(_)
        | YouTubeError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() })))
}

// ============================================================================
// Service Routes
// ============================================================================

pub async fn service_banner() -> Json<serde_json::Value> {
    Json(json!({
        "message": "YouTube Channel Fetcher API",
        "endpoints": {
            "health": "/api/health",
            "search": "/api/channels/search",
            "channel": "/api/channel"
        }
    }))
}

pub async fn health_check(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "YouTube Channel Fetcher API is running",
        "apiKeyConfigured": state.youtube.is_some()
    }))
}

// ============================================================================
// Channel Search
// ============================================================================

/// GET /api/channels/search?q=<query>&strategy=<exact|handle|general|smart>
pub async fn search_channels(
    Query(params): Query<ChannelSearchQuery>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let youtube = state
        .youtube
        .as_ref()
        .ok_or_else(|| error_response(&YouTubeError::NotConfigured))?;

    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Search query is required" })),
            ))
        }
    };

    let strategy = SearchStrategy::from_param(params.strategy.as_deref());
    tracing::info!(
        "Searching for channels with query: \"{}\", strategy: {}",
        query,
        strategy.name()
    );

    let resolver = ChannelResolver::with_limits(youtube.clone(), state.resolver_limits.clone());
    let outcome = resolver
        .resolve(&query, strategy)
        .await
        .map_err(|e| error_response(&e))?;

    if let Some(top) = outcome.channels.first() {
        tracing::info!(
            "Found {} unique channels, top match: \"{}\" (score: {})",
            outcome.channels.len(),
            top.title,
            top.relevance_score
        );
    }

    Ok(Json(json!(outcome)))
}

// ============================================================================
// Channel Report
// ============================================================================

/// POST /api/channel with {channelId, options: [...]}
///
/// Assembles the requested report sections. Core metadata failures are
/// fatal for the request; the video/playlist/section extras are
/// best-effort and degrade to empty lists with a recorded fault.
pub async fn channel_report(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<ChannelReportRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let youtube = state
        .youtube
        .as_ref()
        .ok_or_else(|| error_response(&YouTubeError::NotConfigured))?;

    let channel_id = match request.channel_id.as_deref() {
        Some(id) if !request.options.is_empty() => id.to_string(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Channel ID and options are required" })),
            ))
        }
    };

    if !is_channel_id(&channel_id) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid channel ID format" })),
        ));
    }

    let has = |name: &str| request.options.iter().any(|o| o == name);
    let mut report = ChannelReport::default();

    let parts = requested_parts(&request.options);
    if !parts.is_empty() {
        let channel = youtube
            .channel_with_parts(&channel_id, &parts)
            .await
            .map_err(|e| error_response(&e))?
            .ok_or_else(|| error_response(&YouTubeError::ChannelNotFound))?;

        fill_metadata_sections(&mut report, &channel, &request.options);
    }

    if has("recentVideos") {
        match fetch_recent_videos(youtube, &channel_id).await {
            Ok(videos) => report.recent_videos = Some(videos),
            Err(e) => {
                tracing::error!("Error fetching recent videos: {}", e);
                report
                    .faults
                    .push(PartialFault::new("recent videos", e.to_string()));
                report.recent_videos = Some(Vec::new());
            }
        }
    }

    if has("allVideos") {
        collect_all_videos(youtube, &state, &channel_id, &mut report).await;
    }

    if has("playlists") {
        match youtube.list_channel_playlists(&channel_id).await {
            Ok(playlists) => {
                report.playlists = Some(playlists.into_iter().map(playlist_summary).collect())
            }
            Err(e) => {
                tracing::error!("Error fetching playlists: {}", e);
                report
                    .faults
                    .push(PartialFault::new("playlists", e.to_string()));
                report.playlists = Some(Vec::new());
            }
        }
    }

    if has("channelSections") {
        match youtube.list_channel_sections(&channel_id).await {
            Ok(sections) => {
                report.channel_sections = Some(
                    sections
                        .into_iter()
                        .map(|section| {
                            let snippet = section.snippet.unwrap_or_default();
                            ChannelSectionSummary {
                                id: section.id,
                                section_type: snippet.section_type,
                                style: snippet.style,
                                title: snippet.title,
                                position: snippet.position,
                                playlist_ids: section
                                    .content_details
                                    .as_ref()
                                    .and_then(|cd| cd.playlists.clone()),
                                channel_ids: section
                                    .content_details
                                    .and_then(|cd| cd.channels),
                            }
                        })
                        .collect(),
                )
            }
            Err(e) => {
                tracing::error!("Error fetching channel sections: {}", e);
                report
                    .faults
                    .push(PartialFault::new("channel sections", e.to_string()));
                report.channel_sections = Some(Vec::new());
            }
        }
    }

    Ok(Json(json!(report)))
}

/// Map the option names onto channels.list parts; one upstream call covers
/// every metadata section.
fn requested_parts(options: &[String]) -> Vec<&'static str> {
    let has = |name: &str| options.iter().any(|o| o == name);
    let mut parts = Vec::new();

    if has("basicInfo") || has("thumbnails") {
        parts.push("snippet");
    }
    if has("statistics") {
        parts.push("statistics");
    }
    if has("branding") {
        parts.push("brandingSettings");
    }
    if has("contentDetails") {
        parts.push("contentDetails");
    }
    if has("topicDetails") {
        parts.push("topicDetails");
    }
    if has("localizations") {
        parts.push("localizations");
    }

    parts
}

fn fill_metadata_sections(report: &mut ChannelReport, channel: &ChannelResource, options: &[String]) {
    let has = |name: &str| options.iter().any(|o| o == name);

    if has("basicInfo") {
        let snippet = channel.snippet.clone().unwrap_or_default();
        report.basic_info = Some(BasicInfoSection {
            id: channel.id.clone(),
            title: snippet.title,
            description: snippet.description,
            custom_url: snippet.custom_url,
            published_at: snippet.published_at,
            country: snippet.country,
            default_language: snippet.default_language,
        });
    }

    if has("thumbnails") {
        report.thumbnails = channel.snippet.as_ref().and_then(|s| s.thumbnails.clone());
    }

    if has("statistics") {
        let statistics = channel.statistics.clone().unwrap_or_default();
        report.statistics = Some(StatisticsSection {
            view_count: statistics.view_count,
            subscriber_count: statistics.subscriber_count,
            video_count: statistics.video_count,
            hidden_subscriber_count: statistics.hidden_subscriber_count,
        });
    }

    if has("branding") {
        let branding = channel.branding_settings.as_ref();
        report.branding = Some(BrandingSection {
            banner_image_url: branding
                .and_then(|b| b.image.as_ref())
                .and_then(|i| i.banner_external_url.clone()),
            banner_mobile_image_url: branding
                .and_then(|b| b.image.as_ref())
                .and_then(|i| i.banner_mobile_extra_hd_image_url.clone()),
            keywords: branding
                .and_then(|b| b.channel.as_ref())
                .and_then(|c| c.keywords.clone()),
            unsubscribed_trailer: branding
                .and_then(|b| b.channel.as_ref())
                .and_then(|c| c.unsubscribed_trailer.clone()),
            default_tab: branding
                .and_then(|b| b.channel.as_ref())
                .and_then(|c| c.default_tab.clone()),
        });
    }

    if has("contentDetails") {
        let related = channel
            .content_details
            .as_ref()
            .and_then(|cd| cd.related_playlists.as_ref());
        report.content_details = Some(ContentDetailsSection {
            uploads_playlist_id: related.and_then(|r| r.uploads.clone()),
            likes_playlist_id: related.and_then(|r| r.likes.clone()),
            favorites_playlist_id: related.and_then(|r| r.favorites.clone()),
        });
    }

    if has("topicDetails") {
        let topics = channel.topic_details.as_ref();
        report.topic_details = Some(TopicDetailsSection {
            topic_ids: topics.and_then(|t| t.topic_ids.clone()),
            topic_categories: topics.and_then(|t| t.topic_categories.clone()),
        });
    }

    if has("localizations") {
        report.localizations = channel.localizations.clone();
    }
}

async fn fetch_recent_videos(
    youtube: &YouTubeClient,
    channel_id: &str,
) -> Result<Vec<VideoRecord>, YouTubeError> {
    use crate::youtube_client::YouTubeApi;

    let ids = youtube
        .recent_video_ids(channel_id, RECENT_VIDEO_LIMIT)
        .await?;
    tracing::info!("Found {} recent video IDs", ids.len());
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let items = youtube.list_videos(&ids).await?;
    Ok(items.into_iter().map(normalize_video).collect())
}

/// Run the collector against the channel's uploads playlist. A missing
/// uploads playlist degrades to an empty list rather than an error.
async fn collect_all_videos(
    youtube: &YouTubeClient,
    state: &AppState,
    channel_id: &str,
    report: &mut ChannelReport,
) {
    let mut uploads_playlist_id = report
        .content_details
        .as_ref()
        .and_then(|cd| cd.uploads_playlist_id.clone());

    if uploads_playlist_id.is_none() {
        tracing::info!("Fetching uploads playlist ID from channel details...");
        match youtube.channel_with_parts(channel_id, &["contentDetails"]).await {
            Ok(channel) => {
                uploads_playlist_id = channel
                    .and_then(|c| c.content_details)
                    .and_then(|cd| cd.related_playlists)
                    .and_then(|r| r.uploads);
            }
            Err(e) => {
                tracing::error!("Error fetching uploads playlist ID: {}", e);
                report
                    .faults
                    .push(PartialFault::new("uploads playlist lookup", e.to_string()));
            }
        }
    }

    match uploads_playlist_id {
        Some(playlist_id) => {
            let collector =
                VideoCollector::with_limits(youtube.clone(), state.collector_limits.clone());
            let mut collection = collector.collect(&playlist_id).await;
            report.faults.append(&mut collection.faults);
            report.all_videos = Some(collection.videos);
        }
        None => {
            tracing::error!("Could not find uploads playlist ID");
            report.all_videos = Some(Vec::new());
        }
    }
}

fn playlist_summary(playlist: PlaylistResource) -> PlaylistSummary {
    let snippet = playlist.snippet.unwrap_or_default();
    PlaylistSummary {
        id: playlist.id,
        title: snippet.title,
        description: snippet.description,
        published_at: snippet.published_at,
        thumbnails: snippet.thumbnails,
        video_count: playlist.content_details.and_then(|cd| cd.item_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_option_to_part_mapping() {
        assert_eq!(
            requested_parts(&options(&["basicInfo", "statistics"])),
            vec!["snippet", "statistics"]
        );
        // thumbnails alone still needs the snippet part, but only once
        assert_eq!(
            requested_parts(&options(&["basicInfo", "thumbnails"])),
            vec!["snippet"]
        );
        assert_eq!(
            requested_parts(&options(&[
                "branding",
                "contentDetails",
                "topicDetails",
                "localizations"
            ])),
            vec![
                "brandingSettings",
                "contentDetails",
                "topicDetails",
                "localizations"
            ]
        );
    }

    #[test]
    fn test_video_only_options_need_no_parts() {
        assert!(requested_parts(&options(&["allVideos"])).is_empty());
        assert!(requested_parts(&options(&["recentVideos"])).is_empty());
    }
}
