//! Error taxonomy for request handling.

use thiserror::Error;

/// Failures that can occur while handling a proxied request.
///
/// Every variant maps to exactly one HTTP response at the handler boundary;
/// nothing here escapes the request/response cycle.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Neither `action=list` nor `url` was supplied.
    #[error("missing required parameter: url or action=list")]
    MissingParameter,

    /// The `url` parameter is not an absolute http(s) URL.
    #[error("invalid url parameter")]
    InvalidUrl,

    /// Request path is not the proxy endpoint.
    #[error("unknown path")]
    NotFound,

    /// Connection establishment or transfer failure talking to the upstream.
    #[error("upstream transport error: {0}")]
    UpstreamTransport(String),

    /// The upstream did not complete within the configured timeout.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// The upstream answered a listing request with something other than 207.
    #[error("upstream returned unexpected status {0}")]
    UpstreamStatus(u16),

    /// Anything unexpected. Surfaced with a generic body so internals
    /// (credential material included) never reach the client.
    #[error("internal error")]
    Internal,
}

impl ProxyError {
    /// HTTP status code this error surfaces as.
    pub fn status(&self) -> u16 {
        match self {
            ProxyError::MissingParameter | ProxyError::InvalidUrl => 400,
            ProxyError::NotFound => 404,
            ProxyError::UpstreamTransport(_) => 502,
            ProxyError::UpstreamTimeout => 504,
            ProxyError::UpstreamStatus(status) => *status,
            ProxyError::Internal => 500,
        }
    }

    /// Plain-text response body for this error.
    pub fn body(&self) -> String {
        match self {
            ProxyError::MissingParameter => {
                "Missing required parameter: url or action=list".to_string()
            }
            ProxyError::InvalidUrl => "Invalid URL".to_string(),
            ProxyError::NotFound => "Not Found".to_string(),
            ProxyError::UpstreamTransport(message) => format!("Proxy error: {message}"),
            ProxyError::UpstreamTimeout => "Request timeout".to_string(),
            ProxyError::UpstreamStatus(status) => format!("Failed to list files: {status}"),
            ProxyError::Internal => "Server error".to_string(),
        }
    }
}
