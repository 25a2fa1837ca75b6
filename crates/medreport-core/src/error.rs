//! Error taxonomy for validation, remote calls, routing and session control

use medreport_config::ConfigError;
use medreport_http::{HttpError, Retryable};
use thiserror::Error;

/// Result type for startup and wiring operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// A selected file was refused before any network activity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported file type '{mime_type}': please upload only JPG, PNG, or PDF files")]
    UnsupportedType { mime_type: String },

    #[error("File size must be less than {} (got {size} bytes)", size_label(.limit))]
    TooLarge { size: u64, limit: u64 },
}

fn size_label(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Failure of a call to the remote service.
///
/// Status `0` means no response arrived at all (DNS, connect, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub const NO_RESPONSE: u16 = 0;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The server could not be reached
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Self::NO_RESPONSE, message)
    }

    pub fn is_transport(&self) -> bool {
        self.status == Self::NO_RESPONSE
    }
}

// Liveness probes retry on any failure, rejected or unreachable.
impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// A validated file matched no remote operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unsupported file type")]
    UnsupportedType { mime_type: String },
}

impl DispatchError {
    pub const STATUS: u16 = 400;
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::new(DispatchError::STATUS, err.to_string())
    }
}

/// A session refused a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Upload is disabled while the backend is disconnected")]
    UploadDisabled,
}

/// Startup and wiring failures
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("The application must be started inside a Tokio runtime")]
    NoRuntime,
}
