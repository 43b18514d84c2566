//! Error types for Scratch API operations.

use thiserror::Error;

/// Errors that can occur during Scratch API operations.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// Configuration is missing or incomplete.
    #[error("Scratch configuration required: {0}")]
    ConfigMissing(String),

    /// Caller input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A mutating operation was attempted without a session.
    #[error("This operation requires a logged-in session")]
    Unauthenticated,

    /// The session user does not own the resource.
    #[error("You must be the project owner to {action}")]
    Unauthorized { action: &'static str },

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The platform reported the resource as absent or unshared.
    #[error("Resource not accessible ({code}): {message}")]
    NotAccessible { code: String, message: String },

    /// A required field was absent from a response payload.
    #[error("Response is missing required field '{0}'")]
    MissingField(&'static str),

    /// Project payload could not be fetched.
    #[error("Fetch failed: {0}")]
    FetchError(String),

    /// A toggle never acknowledged the requested state.
    #[error("{action} was not acknowledged after {attempts} attempts")]
    RetryExhausted { action: &'static str, attempts: u32 },

    /// API request failed.
    #[error("Scratch API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl ScratchError {
    /// Returns true for `RateLimited`.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true when the remote signalled the resource is absent or unshared.
    pub fn is_not_accessible(&self) -> bool {
        matches!(self, Self::NotAccessible { .. })
    }

    /// Returns true for local authorization failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized { .. })
    }
}

/// Result type alias for Scratch operations.
pub type Result<T> = core::result::Result<T, ScratchError>;
