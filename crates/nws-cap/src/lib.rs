//! National Weather Service public alerts over CAP.
//!
//! This crate fetches the NWS Atom feeds of Common Alerting Protocol
//! alerts, parses each entry into an [`Alert`], and collects them into a
//! [`Feed`] de-duplicated by alert id. A feed can then be filtered by any
//! field (urgency, severity, event, ...) or by location code.
//!
//! # Example
//!
//! ```no_run
//! use nws_cap::{CapConfig, Feed, HttpFeedSource};
//!
//! # async fn example() -> Result<(), nws_cap::CapError> {
//! let config = CapConfig::default();
//! let source = HttpFeedSource::new(&config)?;
//!
//! // Everything currently active in the country
//! let feed = Feed::national(&source, &config.national_url).await?;
//!
//! for alert in feed.filter("urgency", &["Immediate"])? {
//!     println!("{:?} {:?}", alert.event(), alert.ugc_codes());
//! }
//!
//! // Only the alerts covering two specific zones
//! let local = Feed::zones(&source, &["MIZ001", "OHZ002"], &config.state).await?;
//! println!("{} alerts", local.len());
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod config;
pub mod error;
pub mod feed;
mod fetch;
pub mod parse;
pub mod source;
pub mod types;

pub use alert::{Alert, FIPS6, UGC};
pub use config::{CapConfig, CapConfigBuilder, Endpoint};
pub use error::CapError;
pub use feed::Feed;
pub use parse::{parse_feed, NO_ACTIVE_ALERTS};
pub use source::{FeedSource, HttpFeedSource};
pub use types::{Certainty, Severity, Urgency};

// Re-export async_trait for FeedSource implementors
pub use async_trait::async_trait;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
