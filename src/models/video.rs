use serde::Serialize;

use crate::models::PartialFault;

/// Normalized per-video metadata. Every counter defaults to "0" and tags to
/// an empty list when the upstream omits them; `duration` is the
/// human-readable form of `raw_duration` or "Unknown".
#[derive(Debug, Clone, Serialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<serde_json::Value>,
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    pub tags: Vec<String>,
    #[serde(rename = "categoryId", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(rename = "defaultLanguage", skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(rename = "defaultAudioLanguage", skip_serializing_if = "Option::is_none")]
    pub default_audio_language: Option<String>,
    #[serde(rename = "liveBroadcastContent", skip_serializing_if = "Option::is_none")]
    pub live_broadcast_content: Option<String>,
    // Statistics
    #[serde(rename = "viewCount")]
    pub view_count: String,
    #[serde(rename = "likeCount")]
    pub like_count: String,
    #[serde(rename = "dislikeCount")]
    pub dislike_count: String,
    #[serde(rename = "favoriteCount")]
    pub favorite_count: String,
    #[serde(rename = "commentCount")]
    pub comment_count: String,
    // Content details
    pub duration: String,
    #[serde(rename = "rawDuration", skip_serializing_if = "Option::is_none")]
    pub raw_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(rename = "licensedContent", skip_serializing_if = "Option::is_none")]
    pub licensed_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    // Status
    #[serde(rename = "uploadStatus", skip_serializing_if = "Option::is_none")]
    pub upload_status: Option<String>,
    #[serde(rename = "privacyStatus", skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddable: Option<bool>,
    #[serde(rename = "publicStatsViewable", skip_serializing_if = "Option::is_none")]
    pub public_stats_viewable: Option<bool>,
    #[serde(rename = "madeForKids", skip_serializing_if = "Option::is_none")]
    pub made_for_kids: Option<bool>,
    #[serde(rename = "selfDeclaredMadeForKids", skip_serializing_if = "Option::is_none")]
    pub self_declared_made_for_kids: Option<bool>,
}

/// Result of a bulk collection run: the records that could be fetched plus
/// the faults for anything that could not.
#[derive(Debug, Serialize)]
pub struct VideoCollection {
    pub videos: Vec<VideoRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<PartialFault>,
}
