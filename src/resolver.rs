// Channel resolution: direct-identifier extraction, layered search
// strategies, and relevance ranking over the raw hits.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ResolverLimits;
use crate::error::YouTubeError;
use crate::models::channel::{ChannelCandidate, MatchType, SearchOutcome, SearchTips};
use crate::models::PartialFault;
use crate::youtube_client::{ChannelResource, YouTubeApi};

lazy_static! {
    static ref CHANNEL_ID_RE: Regex = Regex::new(r"^UC[a-zA-Z0-9_-]{22}$").unwrap();
    // Ordered: the canonical /channel/ form must be tried before the vanity
    // forms so a pasted channel URL never parses as a handle.
    static ref URL_PATTERNS: [Regex; 4] = [
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/channel/([a-zA-Z0-9_-]+)").unwrap(),
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/c/([a-zA-Z0-9_-]+)").unwrap(),
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/user/([a-zA-Z0-9_-]+)").unwrap(),
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/@([a-zA-Z0-9_-]+)").unwrap(),
    ];
}

static ZERO_RESULT_SUGGESTIONS: [&str; 4] = [
    "Try using the exact channel name",
    "Use @ symbol for handles (e.g., @channelname)",
    "Try a partial match or broader terms",
    "Check if the channel URL/ID is correct",
];

/// True when the input already has the canonical channel ID shape.
pub fn is_channel_id(input: &str) -> bool {
    CHANNEL_ID_RE.is_match(input)
}

/// Reduce free-form input to a channel identifier where possible.
///
/// A canonical ID passes through unchanged; otherwise the known URL shapes
/// are tried in order and the captured segment wins. Anything else is
/// returned as-is and treated as a search query downstream. Pure string
/// matching, no network.
pub fn extract_channel_identifier(input: &str) -> String {
    if CHANNEL_ID_RE.is_match(input) {
        return input.to_string();
    }

    for pattern in URL_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(input) {
            if let Some(segment) = captures.get(1) {
                return segment.as_str().to_string();
            }
        }
    }

    input.to_string()
}

/// Closed set of search strategies. Each non-smart strategy is a pure
/// mapping from the user query to one or more derived upstream queries;
/// Smart is the ordered composition of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Exact,
    Handle,
    General,
    Smart,
}

impl SearchStrategy {
    /// Parse the transport-level strategy parameter. Unknown names fall
    /// back to General; an absent parameter means Smart.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => SearchStrategy::Smart,
            Some("exact") => SearchStrategy::Exact,
            Some("handle") => SearchStrategy::Handle,
            Some("smart") => SearchStrategy::Smart,
            Some(_) => SearchStrategy::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Exact => "exact",
            SearchStrategy::Handle => "handle",
            SearchStrategy::General => "general",
            SearchStrategy::Smart => "smart",
        }
    }

    /// Precision-first order for the Smart composition.
    pub fn smart_order() -> [SearchStrategy; 3] {
        [
            SearchStrategy::Exact,
            SearchStrategy::Handle,
            SearchStrategy::General,
        ]
    }

    /// Upstream queries derived from the user query.
    pub fn derived_queries(&self, query: &str) -> Vec<String> {
        match self {
            SearchStrategy::Exact => {
                let mut queries = vec![format!("\"{}\"", query)];
                if let Some(stripped) = query.strip_prefix('@') {
                    queries.push(format!("\"{}\"", stripped));
                }
                queries
            }
            SearchStrategy::Handle => match query.strip_prefix('@') {
                Some(stripped) => vec![stripped.to_string()],
                None => vec![format!("@{}", query)],
            },
            SearchStrategy::General => vec![query.to_string()],
            // Concatenation without the short-circuit; resolve() drives the
            // short-circuiting composition itself.
            SearchStrategy::Smart => Self::smart_order()
                .iter()
                .flat_map(|strategy| strategy.derived_queries(query))
                .collect(),
        }
    }
}

/// Additive relevance score for one candidate against the original query.
/// Title, custom URL, handle, description and popularity bonuses all stack.
pub fn score_channel(channel: &ChannelCandidate, query: &str) -> u32 {
    let title = channel.title.to_lowercase();
    let custom_url = channel
        .custom_url
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let description = channel.description.to_lowercase();
    let query_lower = query.to_lowercase();
    let stripped = query_lower.strip_prefix('@').unwrap_or(&query_lower);

    let mut score = 0;

    // Exact title match outranks a substring hit
    if title == query_lower {
        score += 100;
    } else if title.contains(&query_lower) {
        score += 50;
    }

    // Custom URL match, with and without the handle marker
    if custom_url == query_lower || custom_url == stripped {
        score += 90;
    } else if custom_url.contains(stripped) {
        score += 40;
    }

    // Handle/username variations
    if let Some(handle) = query_lower.strip_prefix('@') {
        if custom_url == handle {
            score += 95;
        }
        if title == handle {
            score += 85;
        }
    }

    if description.contains(&query_lower) {
        score += 10;
    }

    // Popularity bonus, non-overlapping tiers
    let subscribers: u64 = channel.subscriber_count.parse().unwrap_or(0);
    if subscribers > 1_000_000 {
        score += 20;
    } else if subscribers > 100_000 {
        score += 10;
    } else if subscribers > 10_000 {
        score += 5;
    }

    score
}

/// Deduplicate by channel ID (first occurrence wins), score, stable-sort
/// descending and truncate to the candidate cap.
pub fn rank_channels(
    raw: Vec<ChannelResource>,
    query: &str,
    max_candidates: usize,
) -> Vec<ChannelCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();

    for channel in raw {
        if !seen.insert(channel.id.clone()) {
            continue;
        }
        let mut candidate = ChannelCandidate::from_resource(channel);
        candidate.relevance_score = score_channel(&candidate, query);
        candidate.match_type = MatchType::classify(candidate.relevance_score);
        unique.push(candidate);
    }

    // Vec::sort_by is stable; ties keep their first-seen order
    unique.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    unique.truncate(max_candidates);
    unique
}

pub struct ChannelResolver<A> {
    api: A,
    limits: ResolverLimits,
}

impl<A: YouTubeApi> ChannelResolver<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            limits: ResolverLimits::default(),
        }
    }

    pub fn with_limits(api: A, limits: ResolverLimits) -> Self {
        Self { api, limits }
    }

    /// Resolve free-form input into a ranked candidate list.
    ///
    /// A syntactically valid channel ID short-circuits into a single direct
    /// fetch; an unknown ID falls through to the search pipeline instead of
    /// failing. Failed sub-queries degrade the result rather than abort it.
    pub async fn resolve(
        &self,
        query: &str,
        strategy: SearchStrategy,
    ) -> Result<SearchOutcome, YouTubeError> {
        let identifier = extract_channel_identifier(query);

        if is_channel_id(&identifier) {
            tracing::info!("Direct channel ID detected: {}", identifier);
            let channels = self.api.list_channels(&[identifier.clone()]).await?;
            if let Some(channel) = channels.into_iter().next() {
                let mut candidate = ChannelCandidate::from_resource(channel);
                candidate.relevance_score = 100;
                candidate.match_type = MatchType::Direct;
                return Ok(SearchOutcome {
                    channels: vec![candidate],
                    tips: SearchTips {
                        is_direct_match: true,
                        original_query: query.to_string(),
                        total_found: 1,
                        strategies: Vec::new(),
                        suggestions: Vec::new(),
                    },
                    faults: Vec::new(),
                });
            }
            tracing::warn!("Channel ID {} not found upstream, falling back to search", identifier);
        }

        let strategies: Vec<SearchStrategy> = match strategy {
            SearchStrategy::Smart => SearchStrategy::smart_order().to_vec(),
            other => vec![other],
        };

        let mut faults = Vec::new();
        let mut raw = Vec::new();

        for current in &strategies {
            let mut found = self.gather(query, *current, &mut faults).await;
            let got_results = !found.is_empty();
            raw.append(&mut found);
            // Precision-first: stop at the first strategy that produced hits
            if got_results {
                break;
            }
        }

        let channels = rank_channels(raw, query, self.limits.max_candidates);
        let total_found = channels.len();
        let suggestions = if channels.is_empty() {
            ZERO_RESULT_SUGGESTIONS
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        };

        Ok(SearchOutcome {
            channels,
            tips: SearchTips {
                is_direct_match: false,
                original_query: query.to_string(),
                total_found,
                strategies: strategies.iter().map(|s| s.name().to_string()).collect(),
                suggestions,
            },
            faults,
        })
    }

    /// Run one strategy's derived queries. Each sub-query needs two calls
    /// (search.list returns no statistics), and a failed sub-query is
    /// logged and recorded without stopping the rest.
    async fn gather(
        &self,
        query: &str,
        strategy: SearchStrategy,
        faults: &mut Vec<PartialFault>,
    ) -> Vec<ChannelResource> {
        let mut channels = Vec::new();

        for derived in strategy.derived_queries(query) {
            match self.search_once(&derived).await {
                Ok(mut found) => channels.append(&mut found),
                Err(e) => {
                    tracing::warn!(
                        "Search strategy {} with query \"{}\" failed: {}",
                        strategy.name(),
                        derived,
                        e
                    );
                    faults.push(PartialFault::new(
                        format!("search ({})", strategy.name()),
                        e.to_string(),
                    ));
                }
            }
        }

        channels
    }

    async fn search_once(&self, derived: &str) -> Result<Vec<ChannelResource>, YouTubeError> {
        let ids = self
            .api
            .search_channel_ids(derived, self.limits.search_page_size)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.api.list_channels(&ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube_client::{ChannelSnippet, ChannelStatistics, PlaylistPage, VideoResource};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    const KNOWN_ID: &str = "UCabcdefghijklmnopqrstuv";

    fn resource(id: &str, title: &str, custom_url: Option<&str>, subscribers: &str) -> ChannelResource {
        ChannelResource {
            id: id.to_string(),
            snippet: Some(ChannelSnippet {
                title: title.to_string(),
                description: format!("{} channel", title),
                custom_url: custom_url.map(|u| u.to_string()),
                ..Default::default()
            }),
            statistics: Some(ChannelStatistics {
                subscriber_count: Some(subscribers.to_string()),
                ..Default::default()
            }),
            branding_settings: None,
            content_details: None,
            topic_details: None,
            localizations: None,
        }
    }

    fn candidate(title: &str, custom_url: Option<&str>, description: &str, subscribers: &str) -> ChannelCandidate {
        ChannelCandidate {
            id: "UC0".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            custom_url: custom_url.map(|u| u.to_string()),
            thumbnails: None,
            subscriber_count: subscribers.to_string(),
            video_count: "0".to_string(),
            view_count: "0".to_string(),
            published_at: None,
            relevance_score: 0,
            match_type: MatchType::Possible,
        }
    }

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        results: HashMap<String, Vec<String>>,
        channels: Vec<ChannelResource>,
        failing_queries: HashSet<String>,
    }

    impl FakeApi {
        fn call_log(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn search_calls(&self) -> Vec<String> {
            self.call_log()
                .into_iter()
                .filter(|c| c.starts_with("search:"))
                .collect()
        }
    }

    #[async_trait]
    impl YouTubeApi for FakeApi {
        async fn search_channel_ids(
            &self,
            query: &str,
            _max_results: u32,
        ) -> Result<Vec<String>, YouTubeError> {
            self.calls.lock().unwrap().push(format!("search:{}", query));
            if self.failing_queries.contains(query) {
                return Err(YouTubeError::Upstream {
                    status: 500,
                    message: "backend error".to_string(),
                });
            }
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, YouTubeError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("channels:{}", ids.join(",")));
            Ok(self
                .channels
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect())
        }

        async fn playlist_page(
            &self,
            _playlist_id: &str,
            _page_token: Option<&str>,
            _page_size: u32,
        ) -> Result<PlaylistPage, YouTubeError> {
            unreachable!("resolver tests never paginate")
        }

        async fn list_videos(&self, _ids: &[String]) -> Result<Vec<VideoResource>, YouTubeError> {
            unreachable!("resolver tests never fetch videos")
        }
    }

    #[test]
    fn test_channel_id_passes_through_unchanged() {
        assert_eq!(extract_channel_identifier(KNOWN_ID), KNOWN_ID);
    }

    #[test]
    fn test_extracts_from_all_url_shapes() {
        assert_eq!(
            extract_channel_identifier("https://www.youtube.com/channel/UCabcdefghijklmnopqrstuv"),
            KNOWN_ID
        );
        assert_eq!(
            extract_channel_identifier("https://youtube.com/c/SomeVanityName"),
            "SomeVanityName"
        );
        assert_eq!(
            extract_channel_identifier("youtube.com/user/legacyuser"),
            "legacyuser"
        );
        assert_eq!(
            extract_channel_identifier("https://www.youtube.com/@somehandle"),
            "somehandle"
        );
    }

    #[test]
    fn test_unmatched_input_returned_verbatim() {
        assert_eq!(extract_channel_identifier("cooking with dog"), "cooking with dog");
        assert_eq!(extract_channel_identifier("@somehandle"), "@somehandle");
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(SearchStrategy::from_param(Some("exact")), SearchStrategy::Exact);
        assert_eq!(SearchStrategy::from_param(Some("handle")), SearchStrategy::Handle);
        assert_eq!(SearchStrategy::from_param(Some("general")), SearchStrategy::General);
        assert_eq!(SearchStrategy::from_param(Some("smart")), SearchStrategy::Smart);
        // Unknown names take the switch default; absence means smart
        assert_eq!(SearchStrategy::from_param(Some("fuzzy")), SearchStrategy::General);
        assert_eq!(SearchStrategy::from_param(None), SearchStrategy::Smart);
    }

    #[test]
    fn test_derived_queries() {
        assert_eq!(
            SearchStrategy::Exact.derived_queries("mkbhd"),
            vec!["\"mkbhd\""]
        );
        assert_eq!(
            SearchStrategy::Exact.derived_queries("@mkbhd"),
            vec!["\"@mkbhd\"", "\"mkbhd\""]
        );
        assert_eq!(
            SearchStrategy::Handle.derived_queries("@mkbhd"),
            vec!["mkbhd"]
        );
        assert_eq!(
            SearchStrategy::Handle.derived_queries("mkbhd"),
            vec!["@mkbhd"]
        );
        assert_eq!(
            SearchStrategy::General.derived_queries("mkbhd"),
            vec!["mkbhd"]
        );
    }

    #[test]
    fn test_exact_title_match_scores_at_least_100() {
        let channel = candidate("Veritasium", None, "", "0");
        assert!(score_channel(&channel, "veritasium") >= 100);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let channel = candidate("Veritasium", None, "", "0");
        assert_eq!(score_channel(&channel, "unrelated query"), 0);
    }

    #[test]
    fn test_popularity_tiers() {
        let scores: Vec<u32> = ["0", "10001", "100001", "1000001"]
            .iter()
            .map(|subs| score_channel(&candidate("X", None, "", subs), "zzz"))
            .collect();
        assert_eq!(scores, vec![0, 5, 10, 20]);
    }

    #[test]
    fn test_handle_query_bonuses() {
        let channel = candidate("mkbhd", Some("mkbhd"), "", "0");
        // exact customUrl (+90), stripped-handle customUrl (+95), stripped-
        // handle title (+85) and substring custom URL are all additive
        let score = score_channel(&channel, "@mkbhd");
        assert!(score >= 90 + 95 + 85);
    }

    #[test]
    fn test_rank_deduplicates_by_first_occurrence() {
        let raw = vec![
            resource("UC1", "First Copy", None, "0"),
            resource("UC1", "Second Copy", None, "0"),
            resource("UC2", "Other", None, "0"),
        ];
        let ranked = rank_channels(raw, "zzz", 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "First Copy");
    }

    #[test]
    fn test_rank_sorts_descending_and_stable() {
        let raw = vec![
            resource("UC1", "nothing relevant", None, "0"),
            resource("UC2", "science show", None, "0"),
            resource("UC3", "also nothing", None, "0"),
        ];
        let ranked = rank_channels(raw, "science show", 10);
        assert_eq!(ranked[0].id, "UC2");
        assert!(ranked[0].relevance_score >= 80);
        assert_eq!(ranked[0].match_type, MatchType::Best);
        // Tied zero-score candidates keep their input order
        assert_eq!(ranked[1].id, "UC1");
        assert_eq!(ranked[2].id, "UC3");
    }

    #[test]
    fn test_rank_truncates_to_cap() {
        let raw: Vec<ChannelResource> = (0..15)
            .map(|i| resource(&format!("UC{}", i), "x", None, "0"))
            .collect();
        assert_eq!(rank_channels(raw, "zzz", 10).len(), 10);
    }

    #[test]
    fn test_match_type_thresholds() {
        assert_eq!(MatchType::classify(100), MatchType::Best);
        assert_eq!(MatchType::classify(80), MatchType::Best);
        assert_eq!(MatchType::classify(79), MatchType::Good);
        assert_eq!(MatchType::classify(40), MatchType::Good);
        assert_eq!(MatchType::classify(39), MatchType::Possible);
        assert_eq!(MatchType::classify(0), MatchType::Possible);
    }

    #[tokio::test]
    async fn test_smart_short_circuits_after_first_hit() {
        let mut fake = FakeApi::default();
        fake.results
            .insert("\"mkbhd\"".to_string(), vec!["UC1".to_string()]);
        fake.channels = vec![resource("UC1", "mkbhd", Some("mkbhd"), "1000001")];

        let resolver = ChannelResolver::new(fake);
        let outcome = resolver.resolve("mkbhd", SearchStrategy::Smart).await.unwrap();

        assert_eq!(outcome.channels.len(), 1);
        // Only the exact strategy's single derived query was issued
        assert_eq!(resolver.api.search_calls(), vec!["search:\"mkbhd\""]);
    }

    #[tokio::test]
    async fn test_smart_falls_through_empty_strategies() {
        let mut fake = FakeApi::default();
        fake.results
            .insert("mkbhd".to_string(), vec!["UC1".to_string()]);
        fake.channels = vec![resource("UC1", "mkbhd", None, "0")];

        let resolver = ChannelResolver::new(fake);
        let outcome = resolver.resolve("mkbhd", SearchStrategy::Smart).await.unwrap();

        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(
            resolver.api.search_calls(),
            vec!["search:\"mkbhd\"", "search:@mkbhd", "search:mkbhd"]
        );
    }

    #[tokio::test]
    async fn test_failed_subquery_degrades_not_aborts() {
        let mut fake = FakeApi::default();
        fake.failing_queries.insert("\"mkbhd\"".to_string());
        fake.results
            .insert("@mkbhd".to_string(), vec!["UC1".to_string()]);
        fake.channels = vec![resource("UC1", "mkbhd", None, "0")];

        let resolver = ChannelResolver::new(fake);
        let outcome = resolver.resolve("mkbhd", SearchStrategy::Smart).await.unwrap();

        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(outcome.faults.len(), 1);
        assert!(outcome.faults[0].stage.contains("exact"));
    }

    #[tokio::test]
    async fn test_direct_id_short_circuits_search() {
        let mut fake = FakeApi::default();
        fake.channels = vec![resource(KNOWN_ID, "Some Channel", None, "0")];

        let resolver = ChannelResolver::new(fake);
        let outcome = resolver.resolve(KNOWN_ID, SearchStrategy::Smart).await.unwrap();

        assert!(outcome.tips.is_direct_match);
        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(outcome.channels[0].relevance_score, 100);
        assert_eq!(outcome.channels[0].match_type, MatchType::Direct);
        assert!(resolver.api.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_direct_id_falls_back_to_search() {
        let fake = FakeApi::default();

        let resolver = ChannelResolver::new(fake);
        let outcome = resolver.resolve(KNOWN_ID, SearchStrategy::Smart).await.unwrap();

        assert!(!outcome.tips.is_direct_match);
        assert!(outcome.channels.is_empty());
        // The search pipeline ran after the direct lookup came back empty
        assert!(!resolver.api.search_calls().is_empty());
        assert!(!outcome.tips.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_zero_results_carry_static_suggestions() {
        let resolver = ChannelResolver::new(FakeApi::default());
        let outcome = resolver
            .resolve("does not exist", SearchStrategy::General)
            .await
            .unwrap();

        assert!(outcome.channels.is_empty());
        assert_eq!(outcome.tips.total_found, 0);
        assert_eq!(outcome.tips.suggestions.len(), 4);
    }
}
