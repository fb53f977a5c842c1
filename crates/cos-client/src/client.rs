//! Main client implementation

use std::path::Path;

use chrono::Utc;
use sha1::{Digest, Sha1};
use tracing::{debug, instrument};

use cos_auth::{session_lifetime, Credentials, Signer, SIGN_TTL_SECONDS};

use crate::request::ApiRequest;
use crate::slice::{ProgressCallback, SliceUploader, UploadProgress};
use crate::transport::{into_data, Transport};
use crate::types::*;
use crate::{path, ClientError, Config, Result};

/// COS object-storage client
pub struct CosClient {
    config: Config,
    signer: Signer,
    transport: Transport,
}

impl CosClient {
    /// Create a new client with the given credentials and configuration
    pub fn new(credentials: Credentials, config: Config) -> Result<Self> {
        let transport = Transport::new(&config)?;
        Ok(Self {
            config,
            signer: Signer::new(credentials),
            transport,
        })
    }

    /// Create with default configuration
    pub fn with_credentials(credentials: Credentials) -> Result<Self> {
        Self::new(credentials, Config::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Object Operations ====================

    /// Upload a local file to `dst_path` within `bucket`.
    ///
    /// Files below the configured threshold go up in one signed request
    /// carrying a SHA-1 content hash; larger files are sliced into a
    /// multipart session. With `overwrite` false the upload fails if the
    /// destination is already occupied.
    #[instrument(skip(self, src_path))]
    pub async fn upload_object(
        &self,
        bucket: &str,
        src_path: impl AsRef<Path>,
        dst_path: &str,
        biz_attr: &str,
        overwrite: bool,
    ) -> Result<UploadData> {
        self.upload_object_with_progress(bucket, src_path, dst_path, biz_attr, overwrite, None)
            .await
    }

    /// Like [`upload_object`](Self::upload_object) with a progress callback,
    /// invoked per acknowledged slice (once, at completion, for whole-file
    /// uploads).
    #[instrument(skip(self, src_path, progress))]
    pub async fn upload_object_with_progress(
        &self,
        bucket: &str,
        src_path: impl AsRef<Path>,
        dst_path: &str,
        biz_attr: &str,
        overwrite: bool,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadData> {
        let src_path = src_path.as_ref();
        let metadata = tokio::fs::metadata(src_path).await.map_err(|_| {
            ClientError::Params(format!("src file {} not exists", src_path.display()))
        })?;
        if !metadata.is_file() {
            return Err(ClientError::Params(format!(
                "src file {} is not a regular file",
                src_path.display()
            )));
        }

        let dst_path = path::normalize(dst_path, false);
        let total_size = metadata.len();

        if total_size < self.config.upload_threshold {
            let data = self
                .upload_whole(bucket, src_path, &dst_path, biz_attr, overwrite)
                .await?;
            if let Some(callback) = progress {
                callback(UploadProgress {
                    bytes_sent: total_size,
                    total_bytes: total_size,
                    current_slice: 0,
                    total_slices: 1,
                });
            }
            Ok(data)
        } else {
            self.upload_sliced(bucket, src_path, &dst_path, total_size, biz_attr, overwrite, progress)
                .await
        }
    }

    /// Stat an object
    #[instrument(skip(self))]
    pub async fn stat_object(&self, bucket: &str, object: &str) -> Result<StatData> {
        let object = path::normalize(object, false);
        self.stat_base(bucket, &object).await
    }

    /// Delete an object
    #[instrument(skip(self))]
    pub async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        if bucket.is_empty() || object.is_empty() {
            return Err(ClientError::Params("bucket or object is empty".into()));
        }
        let object = path::normalize(object, false);
        self.delete_base(bucket, &object).await
    }

    /// Copy an object within the bucket
    #[instrument(skip(self))]
    pub async fn copy_object(
        &self,
        bucket: &str,
        src_object: &str,
        dst_object: &str,
        overwrite: bool,
    ) -> Result<()> {
        let src_object = path::normalize(src_object, false);
        let dst_object = path::normalize(dst_object, false);
        let url = self.resource_url(bucket, &path::url_encode(&src_object));
        let signature = self.signer.single_use(bucket, &src_object);

        let request = ApiRequest::Copy {
            dest_fileid: dst_object,
            overwrite,
        };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data::<serde_json::Value>(envelope).map(|_| ())
    }

    /// Move an object within the bucket
    #[instrument(skip(self))]
    pub async fn move_object(
        &self,
        bucket: &str,
        src_object: &str,
        dst_object: &str,
        overwrite: bool,
    ) -> Result<()> {
        let src_object = path::normalize(src_object, false);
        let dst_object = path::normalize(dst_object, false);
        let url = self.resource_url(bucket, &path::url_encode(&src_object));
        let signature = self.signer.single_use(bucket, &src_object);

        let request = ApiRequest::Move {
            dest_fileid: dst_object,
            overwrite,
        };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data::<serde_json::Value>(envelope).map(|_| ())
    }

    /// Update attributes of an object: business attribute, authority, and
    /// allow-listed custom headers.
    #[instrument(skip(self, custom_headers))]
    pub async fn update_object(
        &self,
        bucket: &str,
        object: &str,
        biz_attr: Option<&str>,
        authority: Option<Authority>,
        custom_headers: CustomHeaders,
    ) -> Result<()> {
        let object = path::normalize(object, false);
        self.update_base(bucket, &object, biz_attr, authority, custom_headers)
            .await
    }

    // ==================== Directory Operations ====================

    /// Create a directory
    #[instrument(skip(self))]
    pub async fn create_directory(
        &self,
        bucket: &str,
        directory: &str,
        biz_attr: &str,
    ) -> Result<CreateDirData> {
        if !path::is_valid(directory) {
            return Err(ClientError::Params(format!(
                "directory {directory} is not a valid directory name"
            )));
        }

        let directory = path::normalize(directory, true);
        let url = self.resource_url(bucket, &path::url_encode(&directory));
        let signature = self.reusable_signature(bucket);

        let request = ApiRequest::Create {
            biz_attr: biz_attr.to_string(),
        };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data(envelope)
    }

    /// Stat a directory
    #[instrument(skip(self))]
    pub async fn stat_directory(&self, bucket: &str, directory: &str) -> Result<StatData> {
        let directory = path::normalize(directory, true);
        self.stat_base(bucket, &directory).await
    }

    /// Remove a directory
    #[instrument(skip(self))]
    pub async fn remove_directory(&self, bucket: &str, directory: &str) -> Result<()> {
        if bucket.is_empty() || directory.is_empty() {
            return Err(ClientError::Params("bucket or path is empty".into()));
        }
        let directory = path::normalize(directory, true);
        self.delete_base(bucket, &directory).await
    }

    /// Update a directory's business attribute
    #[instrument(skip(self))]
    pub async fn update_directory(
        &self,
        bucket: &str,
        directory: &str,
        biz_attr: &str,
    ) -> Result<()> {
        let directory = path::normalize(directory, true);
        self.update_base(bucket, &directory, Some(biz_attr), None, CustomHeaders::new())
            .await
    }

    /// List a directory
    #[instrument(skip(self))]
    pub async fn list_directory(
        &self,
        bucket: &str,
        directory: &str,
        options: ListOptions,
    ) -> Result<ListData> {
        let directory = path::normalize(directory, true);
        self.list_base(bucket, &directory, options).await
    }

    /// List everything under a path prefix
    #[instrument(skip(self))]
    pub async fn prefix_search(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<ListData> {
        let prefix = path::normalize(prefix, false);
        self.list_base(bucket, &prefix, options).await
    }

    // ==================== Upload Strategies ====================

    async fn upload_whole(
        &self,
        bucket: &str,
        src_path: &Path,
        dst_path: &str,
        biz_attr: &str,
        overwrite: bool,
    ) -> Result<UploadData> {
        let content = tokio::fs::read(src_path).await?;
        let sha = hex::encode(Sha1::digest(&content));

        let url = self.resource_url(bucket, &path::url_encode(dst_path));
        let signature = self.reusable_signature(bucket);

        debug!(size = content.len(), "uploading whole file");
        let request = ApiRequest::Upload {
            sha,
            biz_attr: biz_attr.to_string(),
            content: content.into(),
            insert_only: !overwrite,
        };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data(envelope)
    }

    #[allow(clippy::too_many_arguments)]
    async fn upload_sliced(
        &self,
        bucket: &str,
        src_path: &Path,
        dst_path: &str,
        total_size: u64,
        biz_attr: &str,
        overwrite: bool,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadData> {
        let slice_size = self.config.slice_size;
        let count = crate::slice::slice_count(total_size, slice_size);
        let url = self.resource_url(bucket, &path::url_encode(dst_path));

        // One reusable signature covers init, every slice, and finish; its
        // window is sized to the whole session.
        let mut expires = Utc::now().timestamp() + session_lifetime(count);
        let mut signature = self.signer.reusable(bucket, expires);
        debug!(total_size, slice_size, count, "starting sliced upload");

        let mut uploader = SliceUploader::new(self.transport.clone(), self.config.max_retries);
        if let Some(callback) = progress {
            uploader = uploader.with_progress(callback);
        }

        let max_attempts = self.config.max_retries.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            // Re-derive the signature when the previous window is within one
            // TTL of lapsing, so retries never start with a stale token.
            if expires - Utc::now().timestamp() < SIGN_TTL_SECONDS {
                expires = Utc::now().timestamp() + session_lifetime(count);
                signature = self.signer.reusable(bucket, expires);
            }

            match uploader
                .init_uploading(
                    &signature, src_path, &url, total_size, slice_size, biz_attr, overwrite,
                )
                .await
            {
                Ok(()) => break,
                Err(err) if err.is_stale_session() && attempt < max_attempts => {
                    // A stale, incompletely uploaded file occupies the
                    // destination; clear it and negotiate a fresh session.
                    debug!(bucket, dst_path, "stale session at destination, deleting");
                    let _ = self.delete_object(bucket, dst_path).await;
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    debug!(attempt, error = %err, "init failed, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        uploader.perform_uploading().await?;
        uploader.finish_uploading().await?;

        uploader.into_completed().ok_or_else(|| {
            ClientError::InvalidResponse("finish reported success without a payload".into())
        })
    }

    // ==================== Helper Methods ====================

    async fn stat_base(&self, bucket: &str, remote_path: &str) -> Result<StatData> {
        let url = self.resource_url(bucket, &path::url_encode(remote_path));
        let signature = self.reusable_signature(bucket);

        let envelope = self.transport.send(&url, &signature, ApiRequest::Stat).await?;
        into_data(envelope)
    }

    async fn delete_base(&self, bucket: &str, remote_path: &str) -> Result<()> {
        if remote_path == "/" {
            return Err(ClientError::Params(
                "can not delete the bucket root via the api; operate the bucket in the console"
                    .into(),
            ));
        }

        let url = self.resource_url(bucket, &path::url_encode(remote_path));
        let signature = self.signer.single_use(bucket, remote_path);

        let envelope = self
            .transport
            .send(&url, &signature, ApiRequest::Delete)
            .await?;
        into_data::<serde_json::Value>(envelope).map(|_| ())
    }

    async fn update_base(
        &self,
        bucket: &str,
        remote_path: &str,
        biz_attr: Option<&str>,
        authority: Option<Authority>,
        custom_headers: CustomHeaders,
    ) -> Result<()> {
        let url = self.resource_url(bucket, &path::url_encode(remote_path));
        let signature = self.signer.single_use(bucket, remote_path);

        let request = ApiRequest::Update {
            biz_attr: biz_attr.map(str::to_string),
            authority,
            custom_headers,
        };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data::<serde_json::Value>(envelope).map(|_| ())
    }

    async fn list_base(
        &self,
        bucket: &str,
        remote_path: &str,
        options: ListOptions,
    ) -> Result<ListData> {
        options.validate()?;

        let url = self.resource_url(bucket, &path::url_encode(remote_path));
        let signature = self.reusable_signature(bucket);

        let request = ApiRequest::List { options };
        let envelope = self.transport.send(&url, &signature, request).await?;
        into_data(envelope)
    }

    /// Resource URL: `<endpoint>/<app_id>/<bucket><encoded-path>`
    fn resource_url(&self, bucket: &str, encoded_path: &str) -> String {
        let credentials = self.signer.credentials();
        let endpoint = self.config.endpoint_for_region(&credentials.region);
        format!(
            "{}/{}/{}{}",
            endpoint.trim_end_matches('/'),
            credentials.app_id,
            bucket,
            encoded_path
        )
    }

    /// A reusable signature with the standard single-request window
    fn reusable_signature(&self, bucket: &str) -> String {
        let expires = Utc::now().timestamp() + SIGN_TTL_SECONDS;
        self.signer.reusable(bucket, expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CosClient {
        let credentials = Credentials::new("sh", "20001234", "id", "key").unwrap();
        CosClient::new(credentials, Config::default()).unwrap()
    }

    #[test]
    fn resource_url_shape() {
        let client = client();
        assert_eq!(
            client.resource_url("bucket", "/a/b.txt"),
            "https://sh.file.myqcloud.com/files/v2/20001234/bucket/a/b.txt"
        );
    }

    #[tokio::test]
    async fn upload_rejects_missing_source() {
        let client = client();
        let err = client
            .upload_object("bucket", "/no/such/file", "dst.txt", "", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));
        assert_eq!(err.code(), crate::error::code::PARAMS_ERROR);
    }

    #[tokio::test]
    async fn delete_rejects_empty_object() {
        let client = client();
        let err = client.delete_object("bucket", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));
    }

    #[tokio::test]
    async fn delete_refuses_bucket_root() {
        let client = client();
        let err = client.delete_object("bucket", "/").await.unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));

        let err = client.remove_directory("bucket", "/").await.unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));
    }

    #[tokio::test]
    async fn create_directory_validates_name() {
        let client = client();
        let err = client
            .create_directory("bucket", "bad|name", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_num() {
        let client = client();
        let options = ListOptions {
            num: 200,
            ..Default::default()
        };
        let err = client
            .list_directory("bucket", "dir", options)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Params(_)));
    }
}
