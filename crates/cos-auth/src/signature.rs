//! Authorization signature derivation
//!
//! A signature is the base64 encoding of `HMAC-SHA1(plaintext, secret_key)`
//! concatenated with the plaintext itself, where the plaintext is
//!
//! ```text
//! a=<app_id>&b=<bucket>&k=<secret_id>&e=<expires>&t=<issued_at>&r=<nonce>&f=<fileid>
//! ```
//!
//! The service re-derives the MAC from the embedded plaintext, so the token
//! carries everything needed for independent verification: account id,
//! expiry, and resource scope.
//!
//! Two kinds are issued:
//! - **reusable**: `fileid` empty, `expires` set; valid for any request
//!   against the bucket until the expiry. Used for multi-step flows where
//!   one token must cover init, every slice, and finish.
//! - **single-use**: `expires` zero, `fileid` set to the absolute resource
//!   path; valid for exactly one request against that path. Used for
//!   delete/copy/move/update so a captured token cannot be replayed.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::Credentials;

type HmacSha1 = Hmac<Sha1>;

/// Compute a signature token. Pure: deterministic given its inputs, no I/O.
///
/// `expires` and `issued_at` are epoch seconds; `nonce` is caller-supplied
/// so that token derivation stays reproducible under test.
pub fn sign(
    credentials: &Credentials,
    bucket: &str,
    fileid: &str,
    expires: i64,
    issued_at: i64,
    nonce: u32,
) -> String {
    let plaintext = format!(
        "a={}&b={}&k={}&e={}&t={}&r={}&f={}",
        credentials.app_id, bucket, credentials.secret_id, expires, issued_at, nonce, fileid,
    );

    let mut mac = HmacSha1::new_from_slice(credentials.secret_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(plaintext.as_bytes());

    let mut token = mac.finalize().into_bytes().to_vec();
    token.extend_from_slice(plaintext.as_bytes());
    BASE64.encode(token)
}

/// Issues signatures for one set of credentials, sampling the clock and a
/// random nonce per token.
#[derive(Clone, Debug)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// A token valid for any request against `bucket` until `expires`
    /// (epoch seconds).
    pub fn reusable(&self, bucket: &str, expires: i64) -> String {
        sign(
            &self.credentials,
            bucket,
            "",
            expires,
            Utc::now().timestamp(),
            rand::random(),
        )
    }

    /// A token valid for exactly one request against `path` within `bucket`.
    /// `path` must already be normalized (leading slash).
    pub fn single_use(&self, bucket: &str, path: &str) -> String {
        let fileid = format!("/{}/{}{}", self.credentials.app_id, bucket, path);
        sign(
            &self.credentials,
            bucket,
            &fileid,
            0,
            Utc::now().timestamp(),
            rand::random(),
        )
    }
}
