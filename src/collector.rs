// Bulk video collection: paginated uploads-playlist harvesting followed by
// batched detail fetches, normalized and sorted newest-first.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Reverse;

use crate::config::CollectorLimits;
use crate::models::video::{VideoCollection, VideoRecord};
use crate::models::PartialFault;
use crate::youtube_client::{VideoResource, YouTubeApi};

lazy_static! {
    static ref DURATION_RE: Regex =
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap();
}

/// Render an ISO 8601 duration (PT#H#M#S) as H:MM:SS or M:SS.
///
/// Inputs that do not match the expected shape come back unchanged; a
/// missing or empty input yields "Unknown".
pub fn parse_duration(duration: Option<&str>) -> String {
    let raw = match duration {
        Some(value) if !value.is_empty() => value,
        _ => return "Unknown".to_string(),
    };

    let captures = match DURATION_RE.captures(raw) {
        Some(captures) => captures,
        None => return raw.to_string(),
    };

    let component = |index: usize| -> u64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let hours = component(1);
    let minutes = component(2);
    let seconds = component(3);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Flatten one videos.list item into a `VideoRecord`, defaulting every
/// counter to "0" and tags to empty rather than propagating absence.
pub fn normalize_video(video: VideoResource) -> VideoRecord {
    let snippet = video.snippet.unwrap_or_default();
    let statistics = video.statistics.unwrap_or_default();
    let content = video.content_details.unwrap_or_default();
    let status = video.status.unwrap_or_default();

    VideoRecord {
        id: video.id,
        title: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        published_at: snippet.published_at.unwrap_or_default(),
        thumbnails: snippet.thumbnails,
        channel_title: snippet.channel_title.unwrap_or_default(),
        tags: snippet.tags.unwrap_or_default(),
        category_id: snippet.category_id,
        default_language: snippet.default_language,
        default_audio_language: snippet.default_audio_language,
        live_broadcast_content: snippet.live_broadcast_content,
        view_count: statistics.view_count.unwrap_or_else(|| "0".to_string()),
        like_count: statistics.like_count.unwrap_or_else(|| "0".to_string()),
        dislike_count: statistics.dislike_count.unwrap_or_else(|| "0".to_string()),
        favorite_count: statistics.favorite_count.unwrap_or_else(|| "0".to_string()),
        comment_count: statistics.comment_count.unwrap_or_else(|| "0".to_string()),
        duration: parse_duration(content.duration.as_deref()),
        raw_duration: content.duration,
        definition: content.definition,
        caption: content.caption,
        licensed_content: content.licensed_content,
        projection: content.projection,
        upload_status: status.upload_status,
        privacy_status: status.privacy_status,
        license: status.license,
        embeddable: status.embeddable,
        public_stats_viewable: status.public_stats_viewable,
        made_for_kids: status.made_for_kids,
        self_declared_made_for_kids: status.self_declared_made_for_kids,
    }
}

fn published_timestamp(record: &VideoRecord) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(&record.published_at)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Stable sort, newest first. Records whose publish date fails to parse
/// sort as oldest (None orders after every Some under Reverse).
pub fn sort_newest_first(videos: &mut [VideoRecord]) {
    videos.sort_by_key(|video| Reverse(published_timestamp(video)));
}

pub struct VideoCollector<A> {
    api: A,
    limits: CollectorLimits,
}

impl<A: YouTubeApi> VideoCollector<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            limits: CollectorLimits::default(),
        }
    }

    pub fn with_limits(api: A, limits: CollectorLimits) -> Self {
        Self { api, limits }
    }

    /// Collect every member video of an uploads playlist, bounded by the
    /// configured caps. Transient upstream failures shrink the result and
    /// are reported as faults; they never fail the call.
    pub async fn collect(&self, uploads_playlist_id: &str) -> VideoCollection {
        let mut faults = Vec::new();

        let video_ids = self.harvest_video_ids(uploads_playlist_id, &mut faults).await;
        tracing::info!("Finished collecting video IDs. Total: {} videos", video_ids.len());

        let mut videos = self.fetch_details(&video_ids, &mut faults).await;
        sort_newest_first(&mut videos);

        tracing::info!("Fetched detailed data for {} videos", videos.len());
        VideoCollection { videos, faults }
    }

    /// Phase 1: walk playlist pages accumulating video IDs in page order.
    /// Stops on a missing continuation token, the page cap, or the
    /// identifier cap, whichever triggers first; a page failure aborts
    /// further pagination but keeps what was already collected.
    async fn harvest_video_ids(
        &self,
        playlist_id: &str,
        faults: &mut Vec<PartialFault>,
    ) -> Vec<String> {
        let mut video_ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count: u32 = 0;

        loop {
            let page = match self
                .api
                .playlist_page(playlist_id, page_token.as_deref(), self.limits.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Error fetching page {}: {}", page_count + 1, e);
                    faults.push(PartialFault::new(
                        format!("playlist page {}", page_count + 1),
                        e.to_string(),
                    ));
                    break;
                }
            };

            page_count += 1;
            tracing::info!("Page {}: found {} videos", page_count, page.video_ids.len());
            video_ids.extend(page.video_ids);
            page_token = page.next_page_token;

            if page_token.is_none() {
                break;
            }
            if page_count >= self.limits.max_pages {
                tracing::info!("Stopping at page cap ({} pages)", page_count);
                break;
            }
            if video_ids.len() >= self.limits.max_video_ids {
                tracing::info!(
                    "Limiting to first {} videos out of potentially more",
                    video_ids.len()
                );
                break;
            }

            tokio::time::sleep(self.limits.request_delay).await;
        }

        video_ids
    }

    /// Phase 2: fetch full detail in fixed-size batches. A failed batch is
    /// recorded and skipped; the remaining batches still run.
    async fn fetch_details(
        &self,
        video_ids: &[String],
        faults: &mut Vec<PartialFault>,
    ) -> Vec<VideoRecord> {
        let mut videos = Vec::new();
        let batch_size = self.limits.batch_size;
        let total_batches = (video_ids.len() + batch_size - 1) / batch_size;

        for (index, batch) in video_ids.chunks(batch_size).enumerate() {
            tracing::info!(
                "Processing batch {}/{} ({} videos)",
                index + 1,
                total_batches,
                batch.len()
            );

            match self.api.list_videos(batch).await {
                Ok(items) => videos.extend(items.into_iter().map(normalize_video)),
                Err(e) => {
                    tracing::error!("Error fetching video batch {}: {}", index + 1, e);
                    faults.push(PartialFault::new(
                        format!("video batch {}", index + 1),
                        e.to_string(),
                    ));
                }
            }

            if index + 1 < total_batches {
                tokio::time::sleep(self.limits.request_delay).await;
            }
        }

        videos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YouTubeError;
    use crate::youtube_client::{ChannelResource, PlaylistPage, VideoSnippet};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    fn test_limits() -> CollectorLimits {
        CollectorLimits {
            request_delay: Duration::ZERO,
            ..CollectorLimits::default()
        }
    }

    fn video(id: &str, published_at: &str) -> VideoResource {
        VideoResource {
            id: id.to_string(),
            snippet: Some(VideoSnippet {
                title: Some(format!("video {}", id)),
                published_at: Some(published_at.to_string()),
                ..Default::default()
            }),
            statistics: None,
            content_details: None,
            status: None,
        }
    }

    /// Scripted upstream: a fixed set of pages keyed by continuation token
    /// and a video detail store, with optional per-batch failures.
    struct FakeApi {
        pages: Vec<PlaylistPage>,
        endless: bool,
        page_calls: Mutex<u32>,
        batch_sizes: Mutex<Vec<usize>>,
        failing_batches: Vec<usize>,
    }

    impl FakeApi {
        fn with_pages(pages: Vec<PlaylistPage>) -> Self {
            Self {
                pages,
                endless: false,
                page_calls: Mutex::new(0),
                batch_sizes: Mutex::new(Vec::new()),
                failing_batches: Vec::new(),
            }
        }

        fn endless(page_size: usize) -> Self {
            let ids = (0..page_size).map(|i| format!("v{}", i)).collect();
            Self {
                pages: vec![PlaylistPage {
                    video_ids: ids,
                    next_page_token: Some("more".to_string()),
                }],
                endless: true,
                page_calls: Mutex::new(0),
                batch_sizes: Mutex::new(Vec::new()),
                failing_batches: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl YouTubeApi for FakeApi {
        async fn search_channel_ids(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> Result<Vec<String>, YouTubeError> {
            unreachable!("collector tests never search")
        }

        async fn list_channels(
            &self,
            _ids: &[String],
        ) -> Result<Vec<ChannelResource>, YouTubeError> {
            unreachable!("collector tests never list channels")
        }

        async fn playlist_page(
            &self,
            _playlist_id: &str,
            _page_token: Option<&str>,
            _page_size: u32,
        ) -> Result<PlaylistPage, YouTubeError> {
            let mut calls = self.page_calls.lock().unwrap();
            let index = *calls as usize;
            *calls += 1;

            if self.endless {
                return Ok(self.pages[0].clone());
            }

            match self.pages.get(index) {
                Some(page) => Ok(page.clone()),
                None => Err(YouTubeError::Upstream {
                    status: 500,
                    message: "no more scripted pages".to_string(),
                }),
            }
        }

        async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, YouTubeError> {
            let batch_index = {
                let mut sizes = self.batch_sizes.lock().unwrap();
                sizes.push(ids.len());
                sizes.len() - 1
            };
            if self.failing_batches.contains(&batch_index) {
                return Err(YouTubeError::Upstream {
                    status: 500,
                    message: "batch failed".to_string(),
                });
            }
            Ok(ids
                .iter()
                .map(|id| video(id, "2024-01-01T00:00:00Z"))
                .collect())
        }
    }

    fn pages_of(counts: &[usize]) -> Vec<PlaylistPage> {
        let total = counts.len();
        counts
            .iter()
            .enumerate()
            .map(|(page, count)| PlaylistPage {
                video_ids: (0..*count).map(|i| format!("p{}v{}", page, i)).collect(),
                next_page_token: if page + 1 < total {
                    Some(format!("t{}", page + 1))
                } else {
                    None
                },
            })
            .collect()
    }

    #[test]
    fn test_parse_duration_formats() {
        assert_eq!(parse_duration(Some("PT3M3S")), "3:03");
        assert_eq!(parse_duration(Some("PT1H2M3S")), "1:02:03");
        assert_eq!(parse_duration(Some("PT45S")), "0:45");
        assert_eq!(parse_duration(Some("PT5M")), "5:00");
        assert_eq!(parse_duration(Some("PT2H")), "2:00:00");
    }

    #[test]
    fn test_parse_duration_missing_or_malformed() {
        assert_eq!(parse_duration(None), "Unknown");
        assert_eq!(parse_duration(Some("")), "Unknown");
        // A shape the pattern does not recognize comes back unchanged
        assert_eq!(parse_duration(Some("P0D")), "P0D");
    }

    #[test]
    fn test_normalize_defaults_counters_and_tags() {
        let record = normalize_video(VideoResource {
            id: "v1".to_string(),
            snippet: None,
            statistics: None,
            content_details: None,
            status: None,
        });
        assert_eq!(record.view_count, "0");
        assert_eq!(record.like_count, "0");
        assert_eq!(record.dislike_count, "0");
        assert_eq!(record.favorite_count, "0");
        assert_eq!(record.comment_count, "0");
        assert!(record.tags.is_empty());
        assert_eq!(record.duration, "Unknown");
    }

    #[tokio::test]
    async fn test_pagination_collects_all_pages_in_order() {
        let api = FakeApi::with_pages(pages_of(&[50, 50, 50]));
        let collector = VideoCollector::with_limits(api, test_limits());

        let collection = collector.collect("UU123").await;

        assert_eq!(collection.videos.len(), 150);
        assert!(collection.faults.is_empty());
        assert_eq!(*collector.api.page_calls.lock().unwrap(), 3);
        // Page order is preserved through batching
        assert_eq!(collection.videos[0].id, "p0v0");
    }

    #[tokio::test]
    async fn test_pagination_respects_page_cap_on_endless_upstream() {
        let api = FakeApi::endless(50);
        let limits = CollectorLimits {
            max_pages: 3,
            ..test_limits()
        };
        let collector = VideoCollector::with_limits(api, limits);

        let collection = collector.collect("UU123").await;

        assert_eq!(*collector.api.page_calls.lock().unwrap(), 3);
        assert_eq!(collection.videos.len(), 150);
    }

    #[tokio::test]
    async fn test_pagination_respects_identifier_cap() {
        let api = FakeApi::endless(50);
        let limits = CollectorLimits {
            max_video_ids: 120,
            ..test_limits()
        };
        let collector = VideoCollector::with_limits(api, limits);

        let collection = collector.collect("UU123").await;

        // The cap fires after the third full page is appended; the partial
        // overshoot is retained, not discarded
        assert_eq!(*collector.api.page_calls.lock().unwrap(), 3);
        assert_eq!(collection.videos.len(), 150);
    }

    #[tokio::test]
    async fn test_page_failure_keeps_prior_pages() {
        // Second page yields a token but the scripted third fetch errors
        let mut pages = pages_of(&[50, 50]);
        pages[1].next_page_token = Some("t2".to_string());
        let api = FakeApi::with_pages(pages);
        let collector = VideoCollector::with_limits(api, test_limits());

        let collection = collector.collect("UU123").await;

        assert_eq!(collection.videos.len(), 100);
        assert_eq!(collection.faults.len(), 1);
        assert!(collection.faults[0].stage.contains("playlist page 3"));
    }

    #[tokio::test]
    async fn test_batching_splits_at_batch_size() {
        let api = FakeApi::with_pages(pages_of(&[50, 50, 20]));
        let collector = VideoCollector::with_limits(api, test_limits());

        let collection = collector.collect("UU123").await;

        assert_eq!(collection.videos.len(), 120);
        assert_eq!(*collector.api.batch_sizes.lock().unwrap(), vec![50, 50, 20]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_omitted_without_raising() {
        let mut api = FakeApi::with_pages(pages_of(&[50, 50, 20]));
        api.failing_batches = vec![1];
        let collector = VideoCollector::with_limits(api, test_limits());

        let collection = collector.collect("UU123").await;

        // Only the failed batch's 50 records are missing
        assert_eq!(collection.videos.len(), 70);
        assert_eq!(collection.faults.len(), 1);
        assert!(collection.faults[0].stage.contains("video batch 2"));
    }

    #[tokio::test]
    async fn test_empty_playlist_collects_nothing() {
        let api = FakeApi::with_pages(pages_of(&[0]));
        let collector = VideoCollector::with_limits(api, test_limits());

        let collection = collector.collect("UU123").await;

        assert!(collection.videos.is_empty());
        assert!(collection.faults.is_empty());
        assert!(collector.api.batch_sizes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut videos = vec![
            normalize_video(video("old", "2020-05-01T10:00:00Z")),
            normalize_video(video("new", "2024-03-01T10:00:00Z")),
            normalize_video(video("mid", "2022-01-15T10:00:00Z")),
        ];
        sort_newest_first(&mut videos);
        let order: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_unparseable_dates_sort_as_oldest() {
        let mut videos = vec![
            normalize_video(video("bad", "not a date")),
            normalize_video(video("new", "2024-03-01T10:00:00Z")),
            normalize_video(video("old", "2020-05-01T10:00:00Z")),
        ];
        sort_newest_first(&mut videos);
        let order: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "bad"]);
    }
}
