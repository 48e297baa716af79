//! Endpoint and client configuration.

use std::env;
use std::time::Duration;

use crate::error::CapError;

/// Whole-country feed.
pub const DEFAULT_NATIONAL_URL: &str = "http://alerts.weather.gov/cap/us.php?x=0";

/// Prefix and suffix around a lower-cased state code.
pub const DEFAULT_STATE_BASE_URL: &str = "http://alerts.weather.gov/cap/";
pub const DEFAULT_STATE_SUFFIX: &str = ".php?x=0";

/// Prefix and suffix around an upper-cased county or zone code.
pub const DEFAULT_COUNTY_BASE_URL: &str = "http://alerts.weather.gov/cap/wwaatmget.php?x=";
pub const DEFAULT_COUNTY_SUFFIX: &str = "&y=0";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A feed URL template: `base + code + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Everything before the code.
    pub base_url: String,
    /// Everything after the code.
    pub suffix: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            suffix: suffix.into(),
        }
    }

    /// Default whole-state endpoint.
    pub fn state() -> Self {
        Self::new(DEFAULT_STATE_BASE_URL, DEFAULT_STATE_SUFFIX)
    }

    /// Default county/zone endpoint.
    pub fn county() -> Self {
        Self::new(DEFAULT_COUNTY_BASE_URL, DEFAULT_COUNTY_SUFFIX)
    }

    /// Build the URL for `code`. The code is inserted as given.
    pub fn url_for(&self, code: &str) -> String {
        format!("{}{}{}", self.base_url, code, self.suffix)
    }
}

/// Configuration for fetching CAP feeds.
#[derive(Debug, Clone)]
pub struct CapConfig {
    /// Whole-country feed URL.
    pub national_url: String,

    /// Whole-state feed endpoint.
    pub state: Endpoint,

    /// Single county/zone feed endpoint.
    pub county: Endpoint,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            national_url: DEFAULT_NATIONAL_URL.to_string(),
            state: Endpoint::state(),
            county: Endpoint::county(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("nws-cap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CapConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `NWS_CAP_NATIONAL_URL` - Whole-country feed URL
    /// - `NWS_CAP_STATE_BASE_URL` / `NWS_CAP_STATE_SUFFIX` - Whole-state endpoint
    /// - `NWS_CAP_COUNTY_BASE_URL` / `NWS_CAP_COUNTY_SUFFIX` - County/zone endpoint
    /// - `NWS_CAP_TIMEOUT_SECS` - HTTP timeout (default: 30)
    /// - `NWS_CAP_USER_AGENT` - User agent string
    pub fn from_env() -> Result<Self, CapError> {
        let defaults = Self::default();

        let national_url = env::var("NWS_CAP_NATIONAL_URL").unwrap_or(defaults.national_url);

        let state = Endpoint::new(
            env::var("NWS_CAP_STATE_BASE_URL").unwrap_or(defaults.state.base_url),
            env::var("NWS_CAP_STATE_SUFFIX").unwrap_or(defaults.state.suffix),
        );

        let county = Endpoint::new(
            env::var("NWS_CAP_COUNTY_BASE_URL").unwrap_or(defaults.county.base_url),
            env::var("NWS_CAP_COUNTY_SUFFIX").unwrap_or(defaults.county.suffix),
        );

        let timeout = match env::var("NWS_CAP_TIMEOUT_SECS") {
            Ok(v) => {
                let secs: u64 = v.trim().parse().map_err(|_| {
                    CapError::Config(format!("NWS_CAP_TIMEOUT_SECS is not a number: {}", v))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.timeout,
        };

        let user_agent = env::var("NWS_CAP_USER_AGENT").unwrap_or(defaults.user_agent);

        Ok(Self {
            national_url,
            state,
            county,
            timeout,
            user_agent,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> CapConfigBuilder {
        CapConfigBuilder::default()
    }
}

/// Builder for CapConfig.
#[derive(Debug, Default)]
pub struct CapConfigBuilder {
    config: CapConfig,
}

impl CapConfigBuilder {
    /// Set the whole-country feed URL.
    pub fn national_url(mut self, url: impl Into<String>) -> Self {
        self.config.national_url = url.into();
        self
    }

    /// Set the whole-state endpoint.
    pub fn state(mut self, endpoint: Endpoint) -> Self {
        self.config.state = endpoint;
        self
    }

    /// Set the county/zone endpoint.
    pub fn county(mut self, endpoint: Endpoint) -> Self {
        self.config.county = endpoint;
        self
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the config.
    pub fn build(self) -> CapConfig {
        self.config
    }
}
