//! Error types for the cos-auth crate

use thiserror::Error;

/// Result type alias using `AuthError`
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while building credentials or signatures
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required credential field was empty
    #[error("missing credential field: {0}")]
    MissingField(&'static str),
}
