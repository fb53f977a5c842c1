//! Client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error codes shared with the remote service.
pub mod code {
    /// Success marker in the response envelope
    pub const SUCCESS: i32 = 0;
    /// Invalid local input, detected before any network call
    pub const PARAMS_ERROR: i32 = -1;
    /// Transport failed to obtain a well-formed response
    pub const NETWORK_ERROR: i32 = -2;
    /// A stale, incompletely uploaded file occupies the destination path
    pub const FILE_NOT_FINISH_UPLOAD: i32 = -4019;
}

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API error: a well-formed envelope with a nonzero code
    #[error("API error ({code}): {message}")]
    Api {
        code: i32,
        message: String,
        request_id: Option<String>,
    },

    /// Invalid local input, rejected before any request was sent
    #[error("parameter error: {0}")]
    Params(String),

    /// Response body was not a valid envelope; original body preserved
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Credential error
    #[error("auth error: {0}")]
    Auth(#[from] cos_auth::AuthError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Numeric code in the service taxonomy. Local failure classes map onto
    /// the reserved negative codes; remote errors pass through verbatim.
    pub fn code(&self) -> i32 {
        match self {
            Self::Api { code, .. } => *code,
            Self::Params(_) | Self::Auth(_) => code::PARAMS_ERROR,
            Self::Http(_) | Self::InvalidResponse(_) | Self::Io(_) => code::NETWORK_ERROR,
        }
    }

    /// Request id reported by the service, when one was received.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Check if this is the stale-incomplete-upload error that warrants a
    /// destination delete before retrying init.
    pub fn is_stale_session(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == code::FILE_NOT_FINISH_UPLOAD)
    }

    /// Check if this failure class is worth another attempt: transport
    /// failures and remote errors, but never local parameter errors.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Params(_) | Self::Auth(_))
    }
}
