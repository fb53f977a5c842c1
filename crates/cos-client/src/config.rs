//! Client configuration

use std::time::Duration;

/// Default slice size for multipart uploading (1 MiB)
pub const DEFAULT_SLICE_SIZE: u64 = 1024 * 1024;

/// Objects at or above this size are uploaded slice by slice (20 MiB)
pub const DEFAULT_UPLOAD_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Max attempts for the init phase and for each slice
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Endpoint template; `{region}` is substituted from the credentials
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Log full request/response detail through `tracing`
    pub verbose: bool,
    /// User agent string
    pub user_agent: String,
    /// Maximum retry attempts for init and per-slice sends
    pub max_retries: u32,
    /// Slice size (bytes); fixed for a session once init succeeds
    pub slice_size: u64,
    /// Whole-file vs. sliced upload threshold (bytes)
    pub upload_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://{region}.file.myqcloud.com/files/v2/".to_string(),
            timeout: Duration::from_secs(60),
            verbose: false,
            user_agent: format!("cos-client/{}", env!("CARGO_PKG_VERSION")),
            max_retries: DEFAULT_MAX_RETRIES,
            slice_size: DEFAULT_SLICE_SIZE,
            upload_threshold: DEFAULT_UPLOAD_THRESHOLD,
        }
    }
}

impl Config {
    /// Create a config with a non-default endpoint (testing, private
    /// deployments). The template may omit `{region}`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable verbose transport logging
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Set the slice size used by new sessions
    pub fn with_slice_size(mut self, slice_size: u64) -> Self {
        self.slice_size = slice_size;
        self
    }

    /// Set the whole-file vs. sliced threshold
    pub fn with_upload_threshold(mut self, threshold: u64) -> Self {
        self.upload_threshold = threshold;
        self
    }

    /// Set the retry cap for init and per-slice sends
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Endpoint with the region substituted in
    pub fn endpoint_for_region(&self, region: &str) -> String {
        self.endpoint.replace("{region}", region)
    }
}
