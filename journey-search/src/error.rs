//! Error types for journey search.
//!
//! Every failure the fetch-and-normalize pipeline can produce is a
//! [`SearchError`]. Callers that only need a coarse classification for
//! diagnostics use [`SearchError::kind`].

use std::fmt;

/// Errors from fetching or normalizing journey search results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Caller passed a malformed argument (checked before any I/O).
    #[error("{0}")]
    InvalidArgument(String),

    /// The site's anti-automation defence answered the search with 403.
    #[error("search response from {url} was blocked by the site (403 Forbidden)")]
    SecurityBlocked { url: String },

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Headless browser command failed
    #[error("browser error: {0}")]
    Browser(String),

    /// A bounded wait in the browser choreography expired
    #[error("timed out after {secs}s waiting for {waiting_for}")]
    Timeout { waiting_for: String, secs: u64 },

    /// Reading a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used for user-facing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    SecurityBlocked,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => f.write_str("ArgumentError"),
            ErrorKind::SecurityBlocked => f.write_str("SecurityBlockedError"),
            ErrorKind::Unknown => f.write_str("Unknown Error"),
        }
    }
}

impl SearchError {
    /// Returns the diagnostic class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SearchError::SecurityBlocked { .. } => ErrorKind::SecurityBlocked,
            _ => ErrorKind::Unknown,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SearchError::InvalidArgument(message.into())
    }

    /// Build a `Json` error, keeping the start of the offending body.
    pub(crate) fn json(err: &serde_json::Error, body: &str) -> Self {
        SearchError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for SearchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SearchError::Browser(err.to_string())
    }
}
