// Runtime configuration, read once at startup and injected into the
// components that need it. No module-level globals.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub youtube: Option<YouTubeConfig>,
}

/// Upstream credentials. Absent when YOUTUBE_API_KEY is not set; requests
/// that need the upstream are rejected with a typed error in that case.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let youtube = match std::env::var("YOUTUBE_API_KEY") {
            Ok(key) if !key.is_empty() => Some(YouTubeConfig {
                api_key: key,
                base_url: std::env::var("YOUTUBE_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            }),
            _ => None,
        };

        AppConfig { port, youtube }
    }
}

/// Tunables for the channel search pipeline.
#[derive(Debug, Clone)]
pub struct ResolverLimits {
    /// maxResults passed to each search.list call.
    pub search_page_size: u32,
    /// Ranked candidate list truncation.
    pub max_candidates: usize,
}

impl Default for ResolverLimits {
    fn default() -> Self {
        Self {
            search_page_size: 25,
            max_candidates: 10,
        }
    }
}

/// Tunables for the bulk video collection pipeline.
#[derive(Debug, Clone)]
pub struct CollectorLimits {
    /// maxResults per playlistItems.list page (upstream maximum is 50).
    pub page_size: u32,
    /// Hard cap on pagination depth.
    pub max_pages: u32,
    /// Hard cap on accumulated video identifiers.
    pub max_video_ids: usize,
    /// Identifiers per videos.list call (upstream maximum is 50).
    pub batch_size: usize,
    /// Pause between consecutive upstream calls within a phase.
    pub request_delay: Duration,
}

impl Default for CollectorLimits {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_pages: 10,
            max_video_ids: 500,
            batch_size: 50,
            request_delay: Duration::from_millis(100),
        }
    }
}
