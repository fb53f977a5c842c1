//! # COS Client SDK
//!
//! A client SDK for the COS object-storage REST API.
//!
//! ## Features
//!
//! - **Object CRUD**: upload, stat, delete, copy, move, update
//! - **Directory operations**: create, stat, remove, update, list, prefix search
//! - **Sliced upload**: large files go up as a multipart session with bounded
//!   per-slice retries; small files in one signed request
//! - **Signed requests**: HMAC-SHA1 authorization tokens with correct expiry
//!   windows, reusable across a session or scoped to a single request
//!
//! ## Example
//!
//! ```rust,ignore
//! use cos_auth::Credentials;
//! use cos_client::{Config, CosClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::new("sh", "20001234", "secret-id", "secret-key")?;
//!     let client = CosClient::new(credentials, Config::default())?;
//!
//!     // Upload a file; large files are sliced automatically.
//!     let uploaded = client
//!         .upload_object("mybucket", "./hello.txt", "hello.txt", "", false)
//!         .await?;
//!     println!("available at {}", uploaded.access_url);
//!
//!     // Inspect and clean up.
//!     let stat = client.stat_object("mybucket", "hello.txt").await?;
//!     println!("size: {:?}", stat.filesize);
//!     client.delete_object("mybucket", "hello.txt").await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod path;
mod request;
mod slice;
mod transport;
mod types;

pub use client::CosClient;
pub use config::{Config, DEFAULT_MAX_RETRIES, DEFAULT_SLICE_SIZE, DEFAULT_UPLOAD_THRESHOLD};
pub use error::{code, ClientError, Result};
pub use request::{ApiRequest, RequestBody};
pub use slice::{
    slice_count, slice_range, LastError, ProgressCallback, SliceUploader, UploadProgress,
    UploadState,
};
pub use transport::Transport;
pub use types::*;

// Re-export the credential types so most users need only this crate.
pub use cos_auth::{Credentials, Signer};
