//! HTTP transport error types

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP transport errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// No response was received (DNS, connect, timeout, body decode)
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Multipart part could not be built (bad MIME string)
    #[error("Invalid multipart part: {0}")]
    InvalidPart(String),

    /// Server answered with a non-success status; `body` is the raw response text
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl HttpError {
    /// True when the server never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::RequestFailed(e) if !e.is_decode())
    }
}
