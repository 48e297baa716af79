//! End-to-end feed scenarios over an in-memory feed source.
//!
//! Run with:
//!   cargo test -p nws-cap --test feed_tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use nws_cap::{async_trait, CapError, Endpoint, Feed, FeedSource, Urgency, UGC};

const MI_FEED: &str = include_str!("fixtures/mi.xml");
const OH_FEED: &str = include_str!("fixtures/oh.xml");
const EMPTY_FEED: &str = include_str!("fixtures/empty.xml");

const BASE: &str = "http://feeds.test/cap/";
const SUFFIX: &str = ".php?x=0";

/// Serves canned bodies by URL and records every request.
#[derive(Default)]
struct RecordingSource {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl RecordingSource {
    fn with(mut self, url: impl Into<String>, body: &str) -> Self {
        self.bodies.insert(url.into(), body.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for RecordingSource {
    async fn fetch(&self, url: &str) -> Result<String, CapError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| CapError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn state_endpoint() -> Endpoint {
    Endpoint::new(BASE, SUFFIX)
}

fn state_url(state: &str) -> String {
    format!("{}{}{}", BASE, state, SUFFIX)
}

fn id_set(feed: &Feed) -> HashSet<String> {
    feed.ids().map(str::to_string).collect()
}

// ============================================================================
// Fetching
// ============================================================================

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_from_url_then_filter_urgency() {
        let source = RecordingSource::default().with("http://feeds.test/mi", MI_FEED);
        let feed = Feed::from_url(&source, "http://feeds.test/mi").await.unwrap();
        assert_eq!(feed.count_alerts(), 3);

        let immediate: HashSet<&str> = feed
            .filter("urgency", &["Immediate"])
            .unwrap()
            .into_iter()
            .filter_map(|a| a.id())
            .collect();
        assert_eq!(
            immediate,
            HashSet::from(["urn:nws:alert:MI-A", "urn:nws:alert:MI-B"])
        );
    }

    #[tokio::test]
    async fn test_placeholder_only_feed_is_empty() {
        let source = RecordingSource::default().with(state_url("wy"), EMPTY_FEED);
        let feed = Feed::whole_state(&source, "WY", &state_endpoint()).await.unwrap();
        assert_eq!(feed.count_alerts(), 0);
        assert!(feed.categorize("event").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whole_state_lowercases_code() {
        let source = RecordingSource::default().with(state_url("mi"), MI_FEED);
        Feed::whole_state(&source, "MI", &state_endpoint()).await.unwrap();
        assert_eq!(source.requests(), vec![state_url("mi")]);
    }

    #[tokio::test]
    async fn test_county_and_zone_share_url_shape() {
        let endpoint = Endpoint::new("http://feeds.test/wwaatmget.php?x=", "&y=0");
        let url = "http://feeds.test/wwaatmget.php?x=MIC081&y=0";
        let source = RecordingSource::default().with(url, MI_FEED);

        let county = Feed::county(&source, "mic081", &endpoint).await.unwrap();
        let zone = Feed::zone(&source, "MIC081", &endpoint).await.unwrap();

        assert_eq!(county, zone);
        assert_eq!(source.requests(), vec![url.to_string(), url.to_string()]);
    }

    #[tokio::test]
    async fn test_national() {
        let source = RecordingSource::default().with("http://feeds.test/us", OH_FEED);
        let feed = Feed::national(&source, "http://feeds.test/us").await.unwrap();
        assert_eq!(feed.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let source = RecordingSource::default();
        let result = Feed::from_url(&source, "http://feeds.test/missing").await;
        assert!(matches!(result, Err(CapError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let source = RecordingSource::default().with("http://feeds.test/bad", "<feed><entry>");
        let result = Feed::from_url(&source, "http://feeds.test/bad").await;
        assert!(matches!(result, Err(CapError::Xml(_))));
    }
}

// ============================================================================
// Multi-zone fetches
// ============================================================================

mod zone_tests {
    use super::*;

    fn two_state_source() -> RecordingSource {
        RecordingSource::default()
            .with(state_url("mi"), MI_FEED)
            .with(state_url("oh"), OH_FEED)
    }

    #[tokio::test]
    async fn test_zones_fetch_each_state_once() {
        let source = two_state_source();
        let feed = Feed::zones(&source, &["MIZ001", "OHZ002"], &state_endpoint())
            .await
            .unwrap();

        assert_eq!(source.requests(), vec![state_url("mi"), state_url("oh")]);
        assert_eq!(
            id_set(&feed),
            HashSet::from([
                "urn:nws:alert:MI-A".to_string(),
                "urn:nws:alert:MI-B".to_string(),
                "urn:nws:alert:OH-D".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_zones_same_state_grouped_case_insensitively() {
        let source = two_state_source();
        let feed = Feed::zones(&source, &["MIZ002", "miz003"], &state_endpoint())
            .await
            .unwrap();

        assert_eq!(source.requests(), vec![state_url("mi")]);
        // MIZ002 matches A and C; "miz003" is not a published code spelling.
        assert_eq!(
            id_set(&feed),
            HashSet::from([
                "urn:nws:alert:MI-A".to_string(),
                "urn:nws:alert:MI-C".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_zones_with_no_matches_still_fetch() {
        let source = two_state_source();
        let feed = Feed::zones(&source, &["OHZ999"], &state_endpoint()).await.unwrap();
        assert!(feed.is_empty());
        assert_eq!(source.requests(), vec![state_url("oh")]);
    }

    #[tokio::test]
    async fn test_zones_abort_on_failed_state() {
        let source = RecordingSource::default().with(state_url("mi"), MI_FEED);
        let result = Feed::zones(&source, &["MIZ001", "INZ001"], &state_endpoint()).await;
        assert!(matches!(result, Err(CapError::Status { .. })));
    }

    #[tokio::test]
    async fn test_zones_rejects_short_code() {
        let source = two_state_source();
        let result = Feed::zones(&source, &["M"], &state_endpoint()).await;
        assert!(matches!(result, Err(CapError::InvalidCode(_))));
        assert!(source.requests().is_empty());
    }
}

// ============================================================================
// Working with fetched feeds
// ============================================================================

mod feed_ops_tests {
    use super::*;

    async fn fetch(body: &str) -> Feed {
        let source = RecordingSource::default().with("http://feeds.test/feed", body);
        Feed::from_url(&source, "http://feeds.test/feed").await.unwrap()
    }

    #[tokio::test]
    async fn test_combine_state_feeds() {
        let mi = fetch(MI_FEED).await;
        let oh = fetch(OH_FEED).await;

        let combined = &mi + &oh;
        assert_eq!(combined.len(), 5);

        let mut merged = mi.clone();
        merged += oh;
        assert_eq!(id_set(&merged), id_set(&combined));
    }

    #[tokio::test]
    async fn test_categorize_by_event() {
        let feed = fetch(MI_FEED).await + fetch(OH_FEED).await;
        let groups = feed.categorize("cap:severity").unwrap();
        assert_eq!(groups["Severe"].len(), 2);
        assert_eq!(groups["Moderate"].len(), 2);
        assert_eq!(groups["Minor"].len(), 1);
    }

    #[tokio::test]
    async fn test_filter_by_fips_and_store() {
        let mut feed = fetch(MI_FEED).await;
        let kept = feed.retain_location(&["026139"], nws_cap::FIPS6).len();
        assert_eq!(kept, 2);
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|a| a.get_geocode(UGC).contains("MIZ002")));
    }

    #[tokio::test]
    async fn test_typed_urgency_matches_field_filter() {
        let feed = fetch(MI_FEED).await;
        let by_field = feed.filter("urgency", &["Expected"]).unwrap().len();
        let by_type = feed.iter().filter(|a| a.urgency() == Urgency::Expected).count();
        assert_eq!(by_field, by_type);
    }

    #[tokio::test]
    async fn test_round_trip_through_alert_list() {
        let feed = fetch(MI_FEED).await;
        let rebuilt = Feed::new(feed.alerts().into_iter().cloned());
        assert_eq!(rebuilt.count_alerts(), feed.count_alerts());
        assert_eq!(id_set(&rebuilt), id_set(&feed));
    }
}
