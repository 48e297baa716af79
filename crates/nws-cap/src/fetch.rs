//! Building feeds from the NWS CAP endpoints.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::Endpoint;
use crate::error::CapError;
use crate::feed::Feed;
use crate::parse::parse_feed;
use crate::source::FeedSource;

impl Feed {
    /// Fetch and parse the feed at `url`.
    ///
    /// The "no active alerts" placeholder entry is skipped, so a quiet
    /// feed yields an empty `Feed`.
    pub async fn from_url<S>(source: &S, url: &str) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
    {
        let body = source.fetch(url).await?;
        let feed = Feed::new(parse_feed(&body)?);
        info!(url, alerts = feed.len(), "Fetched CAP feed");
        Ok(feed)
    }

    /// Fetch the whole-country feed.
    pub async fn national<S>(source: &S, url: &str) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
    {
        Self::from_url(source, url).await
    }

    /// Fetch every alert for a state, given its two-letter code.
    pub async fn whole_state<S>(source: &S, state: &str, endpoint: &Endpoint) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
    {
        let url = endpoint.url_for(&state.to_lowercase());
        Self::from_url(source, &url).await
    }

    /// Fetch alerts for a list of UGC zone codes.
    ///
    /// Zones are grouped by state prefix and each state's feed is fetched
    /// once, in the order states first appear. The result holds the alerts
    /// covering any requested zone. A failed fetch aborts the whole call.
    pub async fn zones<S, Z>(source: &S, zone_codes: &[Z], endpoint: &Endpoint) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
        Z: AsRef<str>,
    {
        let mut by_state: IndexMap<String, Vec<&str>> = IndexMap::new();
        for zone in zone_codes {
            let zone = zone.as_ref();
            let state = state_prefix(zone)?;
            by_state.entry(state).or_default().push(zone);
        }

        let mut feed = Feed::default();
        for (state, zones) in &by_state {
            debug!(state = %state, zones = zones.len(), "Fetching state feed for zones");
            let state_feed = Self::whole_state(source, state, endpoint).await?;
            for zone in zones {
                feed.extend(state_feed.filter_by_zone(&[*zone]).into_iter().cloned());
            }
        }

        Ok(feed)
    }

    /// Fetch alerts for a single county code.
    pub async fn county<S>(source: &S, county_code: &str, endpoint: &Endpoint) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
    {
        let url = endpoint.url_for(&county_code.to_uppercase());
        Self::from_url(source, &url).await
    }

    /// Fetch alerts for a single zone code.
    ///
    /// Zone and county feeds share one URL shape, so this is [`Feed::county`].
    pub async fn zone<S>(source: &S, zone_code: &str, endpoint: &Endpoint) -> Result<Feed, CapError>
    where
        S: FeedSource + ?Sized,
    {
        Self::county(source, zone_code, endpoint).await
    }
}

/// Lower-cased two-character state prefix of a zone or county code.
fn state_prefix(code: &str) -> Result<String, CapError> {
    let prefix: String = code.chars().take(2).collect();
    if prefix.chars().count() < 2 {
        return Err(CapError::InvalidCode(code.to_string()));
    }
    Ok(prefix.to_lowercase())
}
