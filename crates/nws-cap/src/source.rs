//! Where feed documents come from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::CapConfig;
use crate::error::CapError;

/// Retrieves the raw body of a feed by URL.
///
/// [`HttpFeedSource`] is the production implementation. Tests substitute an
/// in-memory source to observe which URLs get requested.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// GET `url` and return the response body.
    ///
    /// Implementations must not retry; a failed request is reported as is.
    async fn fetch(&self, url: &str) -> Result<String, CapError>;
}

/// Feed source backed by a reqwest HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    http: Client,
}

impl HttpFeedSource {
    /// Create a source with the timeout and user agent from `config`.
    pub fn new(config: &CapConfig) -> Result<Self, CapError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CapError::Http)?;
        Ok(Self { http })
    }

    /// Create a source around an existing client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Create a source with a specific request timeout and default settings otherwise.
    pub fn with_timeout(timeout: Duration) -> Result<Self, CapError> {
        let config = CapConfig {
            timeout,
            ..CapConfig::default()
        };
        Self::new(&config)
    }

    /// Get the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, CapError> {
        debug!("Fetching CAP feed: {}", url);

        let response = self.http.get(url).send().await.map_err(CapError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(CapError::Http)
    }
}
