//! Wire types and boundary enums for the client SDK

use std::collections::HashMap;

use serde::Deserialize;

use crate::{ClientError, Result};

/// The JSON envelope every response arrives in. `code == 0` is success;
/// any other value is an error from the service taxonomy.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiEnvelope {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Payload returned by whole-file upload and by session finish
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadData {
    /// Public download URL of the completed object
    #[serde(default)]
    pub access_url: String,
    /// Absolute resource path (`/<app_id>/<bucket><path>`)
    #[serde(default)]
    pub resource_path: String,
    /// CDN-independent source URL
    #[serde(default)]
    pub source_url: String,
}

/// Payload returned by a slice-session init
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SliceInitData {
    /// Server-assigned session identifier binding the slices together
    #[serde(default)]
    pub session: String,
    /// Resume offset for a session the server already knows about
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Payload returned by stat on an object or directory
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub biz_attr: Option<String>,
    /// Creation time (epoch seconds, as reported by the service)
    #[serde(default)]
    pub ctime: Option<i64>,
    /// Modification time (epoch seconds)
    #[serde(default)]
    pub mtime: Option<i64>,
    /// Declared total size; present for files only
    #[serde(default)]
    pub filesize: Option<u64>,
    /// Bytes uploaded so far; equals `filesize` once upload completed
    #[serde(default)]
    pub filelen: Option<u64>,
    /// Content hash; present for files only
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub access_url: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
}

/// One entry in a listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListEntry {
    pub name: String,
    #[serde(default)]
    pub biz_attr: Option<String>,
    #[serde(default)]
    pub ctime: Option<i64>,
    #[serde(default)]
    pub mtime: Option<i64>,
    /// Present for file entries only
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filelen: Option<u64>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub access_url: Option<String>,
}

impl ListEntry {
    /// Directories carry no size; files always do.
    pub fn is_directory(&self) -> bool {
        self.filesize.is_none()
    }
}

/// Payload returned by directory/prefix listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListData {
    /// Opaque pagination token; pass back to continue the listing
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub dircount: u64,
    #[serde(default)]
    pub filecount: u64,
    #[serde(default)]
    pub infos: Vec<ListEntry>,
}

/// Payload returned by directory creation
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateDirData {
    #[serde(default)]
    pub ctime: Option<i64>,
    #[serde(default)]
    pub resource_path: String,
}

/// What a listing should return
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListPattern {
    /// Directories and files
    #[default]
    Both,
    /// Directories only
    DirOnly,
    /// Files only
    FileOnly,
}

impl ListPattern {
    /// Wire name of the pattern
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "eListBoth",
            Self::DirOnly => "eListDirOnly",
            Self::FileOnly => "eListFileOnly",
        }
    }
}

impl TryFrom<&str> for ListPattern {
    type Error = ClientError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "eListBoth" => Ok(Self::Both),
            "eListDirOnly" => Ok(Self::DirOnly),
            "eListFileOnly" => Ok(Self::FileOnly),
            other => Err(ClientError::Params(format!("parameter pattern invalid: {other}"))),
        }
    }
}

/// Listing order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Forward (creation order)
    #[default]
    Asc,
    /// Reverse
    Desc,
}

impl SortOrder {
    /// Wire value of the order flag
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Asc => 0,
            Self::Desc => 1,
        }
    }
}

impl TryFrom<i32> for SortOrder {
    type Error = ClientError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Asc),
            1 => Ok(Self::Desc),
            other => Err(ClientError::Params(format!("parameter order invalid: {other}"))),
        }
    }
}

/// Access authority attached to an object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authority {
    /// Inherit the bucket's access rules
    Invalid,
    /// Private read, private write
    ReadWritePrivate,
    /// Public read, private write
    PrivateWritePublicRead,
}

impl Authority {
    /// Wire name of the authority
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "eInvalid",
            Self::ReadWritePrivate => "eWRPrivate",
            Self::PrivateWritePublicRead => "eWPrivateRPublic",
        }
    }
}

impl TryFrom<&str> for Authority {
    type Error = ClientError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "eInvalid" => Ok(Self::Invalid),
            "eWRPrivate" => Ok(Self::ReadWritePrivate),
            "eWPrivateRPublic" => Ok(Self::PrivateWritePublicRead),
            other => Err(ClientError::Params(format!("parameter authority invalid: {other}"))),
        }
    }
}

/// Listing parameters; `num` must stay below 200
#[derive(Clone, Debug)]
pub struct ListOptions {
    /// Maximum entries to return, in `[0, 199]`
    pub num: u32,
    pub pattern: ListPattern,
    pub order: SortOrder,
    /// Pagination token from a previous `ListData::context`
    pub context: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            num: 20,
            pattern: ListPattern::default(),
            order: SortOrder::default(),
            context: None,
        }
    }
}

impl ListOptions {
    pub fn validate(&self) -> Result<()> {
        if self.num > 199 {
            return Err(ClientError::Params(
                "parameter num invalid, num need less than 200".to_string(),
            ));
        }
        Ok(())
    }
}

/// Headers the service accepts on an object update. Anything outside the
/// allow-list is dropped at insert time.
#[derive(Clone, Debug, Default)]
pub struct CustomHeaders {
    headers: HashMap<String, String>,
}

/// User-metadata header prefix
pub const META_PREFIX: &str = "x-cos-meta-";

const ALLOWED_HEADERS: &[&str] = &[
    "Cache-Control",
    "Content-Type",
    "Content-Disposition",
    "Content-Language",
    "Content-Encoding",
];

impl CustomHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the service accepts this header key
    pub fn is_allowed(key: &str) -> bool {
        ALLOWED_HEADERS.contains(&key) || key.starts_with(META_PREFIX)
    }

    /// Insert a header; silently dropped unless allow-listed. Returns `self`
    /// for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if Self::is_allowed(&key) {
            self.headers.insert(key, value.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (k, v)| acc.with(k, v))
    }
}
