//! Error types for nws-cap.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or querying alerts.
#[derive(Debug, Error)]
pub enum CapError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A field was requested that the alert does not carry.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A zone, county or state code is malformed.
    #[error("invalid code: {0:?}")]
    InvalidCode(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

