//! Boundary to the course platform's HTTP API.
//!
//! Everything above this module talks to the platform through
//! [`PlatformTransport`], a JSON-in/JSON-out seam. Retry, backoff, and
//! session handling belong to the implementation behind the trait; the
//! extraction core only sees a parsed document or a [`TransportError`].
//!
//! - [`Endpoints`] - URL builders for every API the core calls
//! - [`HttpTransport`] - `reqwest` implementation with the session cookie

mod endpoints;
mod http;

pub use endpoints::{DEFAULT_API_BASE, DEFAULT_NOTEBOOK_BASE, Endpoints};
pub use http::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpTransport};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {message}\n  Suggestion: Check network connectivity and retry")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        message: String,
    },

    /// The platform answered with a non-success status.
    #[error("{url} returned HTTP {status}\n  Suggestion: {suggestion}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// How to fix the issue.
        suggestion: String,
    },

    /// The body was not the JSON document the caller expected.
    #[error("response from {url} was not valid JSON: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error.
        message: String,
    },
}

impl TransportError {
    /// Creates a `Status` error with a suggestion matched to the status class.
    #[must_use]
    pub fn status(url: &str, status: u16) -> Self {
        let suggestion = match status {
            401 | 403 => "Refresh the CAUTH session cookie and make sure you are enrolled",
            404 => "The endpoint does not exist for this course",
            429 => "The platform is rate limiting; wait and retry",
            _ => "Retry later; the platform may be unavailable",
        };
        Self::Status {
            url: url.to_string(),
            status,
            suggestion: suggestion.to_string(),
        }
    }

    /// Returns the HTTP status when the platform answered.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request { .. } | Self::Decode { .. } => None,
        }
    }
}

/// JSON request seam to the course platform.
///
/// # Object Safety
///
/// Uses `async_trait` so the orchestrator and extractor can share an
/// `Arc<dyn PlatformTransport>`.
#[async_trait]
pub trait PlatformTransport: Send + Sync {
    /// Fetches `url` and parses the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    /// Posts `body` as JSON to `url` and parses the response as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_suggests_cookie_refresh_on_auth_failure() {
        let err = TransportError::status("https://api.example/x", 401);
        assert_eq!(err.http_status(), Some(401));
        assert!(err.to_string().contains("CAUTH"));
    }

    #[test]
    fn test_request_error_has_no_status() {
        let err = TransportError::Request {
            url: "https://api.example/x".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.http_status(), None);
        assert!(err.to_string().contains("connection refused"));
    }
}
