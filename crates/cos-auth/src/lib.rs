//! # COS Auth
//!
//! Credentials and authorization signatures for the COS object-storage API.
//!
//! This crate provides:
//! - **Credentials**: the immutable account material a client is built from
//! - **Signatures**: HMAC-SHA1 authorization tokens, either reusable within
//!   an expiry window or valid for a single request against one resource
//!
//! ## Example
//!
//! ```rust,ignore
//! use cos_auth::{Credentials, Signer};
//!
//! let credentials = Credentials::new("sh", "20001234", "secret-id", "secret-key")?;
//! let signer = Signer::new(credentials);
//!
//! // One token for a whole multi-step flow (init + slices + finish).
//! let token = signer.reusable("mybucket", expires_epoch);
//!
//! // A fresh token for exactly one delete/copy/move request.
//! let token = signer.single_use("mybucket", "/photos/cat.jpg");
//! ```

pub mod credentials;
pub mod error;
pub mod signature;

pub use credentials::Credentials;
pub use error::{AuthError, Result};
pub use signature::{sign, Signer};

/// Validity window granted per request when deriving session expiries (seconds)
pub const SIGN_TTL_SECONDS: i64 = 180;

/// Hard cap on any signature lifetime (10 days, in seconds)
pub const MAX_SIGN_LIFETIME_SECONDS: i64 = 10 * 24 * 60 * 60;

/// Expiry window for a multi-slice session: one TTL per slice, capped at
/// [`MAX_SIGN_LIFETIME_SECONDS`]. Returned as an offset from session start.
pub fn session_lifetime(slice_count: u64) -> i64 {
    let count = slice_count.min(i64::MAX as u64) as i64;
    SIGN_TTL_SECONDS
        .saturating_mul(count)
        .min(MAX_SIGN_LIFETIME_SECONDS)
}
