//! Error types for the REST layer.

use thiserror::Error;

/// Errors that can occur during API operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server responded with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body text, for diagnostics and CSRF detection.
        body: String,
    },

    /// Request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// CSRF token could not be obtained, or was rejected after a refresh.
    #[error("CSRF error: {0}")]
    Csrf(String),

    /// Request rejected client-side before any network call.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Status code of the response, if this error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 responses — terminal for polling loops.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// True if the request may be retried under the backoff policy.
    ///
    /// Covers network-level failures and 5xx/408/429 responses. Decode
    /// failures and client-side errors are never retriable.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(e) => !(e.is_decode() || e.is_builder()),
            Self::Status { status, .. } => retriable_status(*status),
            Self::Url(_) | Self::Csrf(_) | Self::Validation(_) => false,
        }
    }
}

/// True for statuses the retry policy treats as transient.
#[must_use]
pub const fn retriable_status(status: u16) -> bool {
    matches!(status, 408 | 429) || status >= 500
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
