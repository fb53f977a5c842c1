//! Account credentials

use crate::{AuthError, Result};

/// The account material a client instance is built from.
///
/// Immutable for the life of a client; cloning is cheap enough that the
/// client and signer each hold their own copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Service region, e.g. `"sh"`, `"gz"`, `"tj"`
    pub region: String,
    /// Numeric account (app) id as issued by the console
    pub app_id: String,
    /// Public half of the API key pair
    pub secret_id: String,
    /// Private half of the API key pair
    pub secret_key: String,
}

impl Credentials {
    /// Create credentials, rejecting empty fields before any request is made.
    pub fn new(
        region: impl Into<String>,
        app_id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            region: region.into(),
            app_id: app_id.into(),
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        };

        if credentials.region.is_empty() {
            return Err(AuthError::MissingField("region"));
        }
        if credentials.app_id.is_empty() {
            return Err(AuthError::MissingField("app_id"));
        }
        if credentials.secret_id.is_empty() {
            return Err(AuthError::MissingField("secret_id"));
        }
        if credentials.secret_key.is_empty() {
            return Err(AuthError::MissingField("secret_key"));
        }

        Ok(credentials)
    }
}
