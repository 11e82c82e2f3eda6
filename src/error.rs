// Error taxonomy for upstream YouTube Data API access

use thiserror::Error;

/// Failures surfaced by the YouTube client and the components built on it.
///
/// Transient per-page and per-batch failures never reach this type; they are
/// recorded as `PartialFault`s on the partial result instead.
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("YouTube API key not configured. Please set YOUTUBE_API_KEY in your environment variables.")]
    NotConfigured,

    #[error("YouTube API quota exceeded or invalid API key")]
    QuotaExceeded,

    #[error("Channel not found")]
    ChannelNotFound,

    #[error("YouTube API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API error ({status}): {message}")]
    Upstream { status: u16, message: String },
}
