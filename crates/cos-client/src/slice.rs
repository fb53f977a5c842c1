//! Sliced multipart upload
//!
//! [`SliceUploader`] drives the full session protocol: `init` negotiates a
//! server-side session, `upload` sends each slice in strictly increasing
//! offset order under one reusable signature, `finish` assembles the final
//! object. Retry policy: each slice is retried independently up to the
//! configured cap; init retries belong to the caller (which may need to
//! delete a stale destination first); finish is never retried.

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};

use crate::error::code;
use crate::request::ApiRequest;
use crate::transport::Transport;
use crate::types::{ApiEnvelope, SliceInitData, UploadData};
use crate::{ClientError, Result};

/// Pause between attempts for one slice, scaled by attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(UploadProgress) + Send + Sync>;

/// Upload progress information
#[derive(Clone, Debug)]
pub struct UploadProgress {
    /// Bytes acknowledged so far
    pub bytes_sent: u64,
    /// Total bytes to upload
    pub total_bytes: u64,
    /// Slice just acknowledged (zero-based)
    pub current_slice: u32,
    /// Total number of slices
    pub total_slices: u32,
}

impl UploadProgress {
    /// Get percentage complete
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Where an upload attempt currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Initiating,
    Uploading,
    Finishing,
    Completed,
    /// Terminal failure carrying the taxonomy code of the last error
    Failed(i32),
}

/// The last failure recorded by the orchestrator
#[derive(Clone, Debug)]
pub struct LastError {
    pub code: i32,
    /// Remote message verbatim, or the transport error description
    pub message: String,
    pub request_id: Option<String>,
}

/// Per-attempt session state: fixed once init succeeds, discarded with the
/// uploader.
#[derive(Debug)]
struct SliceSession {
    resource_url: String,
    total_size: u64,
    slice_size: u64,
    slice_count: u64,
    /// Assigned by the service on init
    session_id: String,
    bytes_sent: u64,
}

/// Number of slices needed to cover `total_size`
pub fn slice_count(total_size: u64, slice_size: u64) -> u64 {
    total_size.div_ceil(slice_size)
}

/// Byte range of slice `index`: `[index * slice_size, end)`
pub fn slice_range(index: u64, slice_size: u64, total_size: u64) -> (u64, u64) {
    let start = index * slice_size;
    (start, total_size.min(start + slice_size))
}

/// Drives one sliced upload attempt.
///
/// Owns the open source file for the life of the attempt; the handle is
/// dropped (and closed) on every exit path, success or failure. Each
/// uploader instance owns its session; nothing is shared across attempts.
pub struct SliceUploader {
    transport: Transport,
    max_retries: u32,
    state: UploadState,
    signature: String,
    session: Option<SliceSession>,
    file: Option<File>,
    last_error: Option<LastError>,
    last_request_id: Option<String>,
    completed: Option<UploadData>,
    progress: Option<ProgressCallback>,
}

impl SliceUploader {
    pub fn new(transport: Transport, max_retries: u32) -> Self {
        Self {
            transport,
            max_retries: max_retries.max(1),
            state: UploadState::Idle,
            signature: String::new(),
            session: None,
            file: None,
            last_error: None,
            last_request_id: None,
            completed: None,
            progress: None,
        }
    }

    /// Attach a progress callback, invoked after each acknowledged slice.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Negotiate a session with the service.
    ///
    /// Opens `source_path` read-only, computes the slice count, and sends
    /// `op=init` carrying total size, slice size, business attributes, and
    /// the insert-only flag. On success the server-assigned session id is
    /// stored and the uploader moves to `Uploading`. The signature must be
    /// reusable and cover the whole session window; it is kept for every
    /// subsequent slice and the finish call.
    #[allow(clippy::too_many_arguments)]
    pub async fn init_uploading(
        &mut self,
        signature: &str,
        source_path: &Path,
        resource_url: &str,
        total_size: u64,
        slice_size: u64,
        biz_attr: &str,
        overwrite: bool,
    ) -> Result<()> {
        self.state = UploadState::Initiating;
        self.signature = signature.to_string();

        let file = File::open(source_path).await.map_err(|e| {
            let err = ClientError::Io(e);
            self.record_failure(&err);
            err
        })?;
        self.file = Some(file);

        let count = slice_count(total_size, slice_size);
        debug!(total_size, slice_size, count, "initiating slice session");

        let request = ApiRequest::SliceInit {
            file_size: total_size,
            slice_size,
            biz_attr: biz_attr.to_string(),
            insert_only: !overwrite,
        };

        let envelope = self.dispatch(resource_url, request).await?;
        let init: SliceInitData = self.unwrap_envelope(envelope)?;
        if init.session.is_empty() {
            let err = ClientError::InvalidResponse("init response carried no session".into());
            self.record_failure(&err);
            return Err(err);
        }

        self.session = Some(SliceSession {
            resource_url: resource_url.to_string(),
            total_size,
            slice_size,
            slice_count: count,
            session_id: init.session,
            bytes_sent: 0,
        });
        self.state = UploadState::Uploading;
        Ok(())
    }

    /// Send every slice, in strictly increasing offset order.
    ///
    /// Each slice is retried independently up to the attempt cap; a slice
    /// that exhausts its retries aborts the whole session with that error.
    pub async fn perform_uploading(&mut self) -> Result<()> {
        if self.state != UploadState::Uploading || self.session.is_none() {
            return Err(ClientError::Params(
                "perform_uploading called before a session was initiated".into(),
            ));
        }

        let count = self.session.as_ref().map(|s| s.slice_count).unwrap_or(0);
        for index in 0..count {
            let payload = self.read_slice(index).await?;
            self.send_slice(index, payload).await?;
        }

        Ok(())
    }

    /// Finalize the session into a completed object.
    ///
    /// Not retried here: on failure the caller restarts the whole session.
    pub async fn finish_uploading(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Err(ClientError::Params(
                "finish_uploading called before a session was initiated".into(),
            ));
        };
        self.state = UploadState::Finishing;

        let request = ApiRequest::SliceFinish {
            session: session.session_id.clone(),
            file_size: session.total_size,
        };
        let url = session.resource_url.clone();

        let envelope = self.dispatch(&url, request).await?;
        let data: UploadData = self.unwrap_envelope(envelope)?;

        // Close the source handle promptly now the session is done.
        self.file = None;
        self.completed = Some(data);
        self.state = UploadState::Completed;
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Last failure, populated in any `Failed` state
    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    /// Request id of the most recent response, success or failure
    pub fn request_id(&self) -> Option<&str> {
        self.last_request_id.as_deref()
    }

    /// Bytes acknowledged so far; diagnostics only
    pub fn bytes_sent(&self) -> u64 {
        self.session.as_ref().map(|s| s.bytes_sent).unwrap_or(0)
    }

    /// Access URL of the finished object; `Some` only once `Completed`
    pub fn access_url(&self) -> Option<&str> {
        self.completed.as_ref().map(|d| d.access_url.as_str())
    }

    /// Resource path of the finished object; `Some` only once `Completed`
    pub fn resource_path(&self) -> Option<&str> {
        self.completed.as_ref().map(|d| d.resource_path.as_str())
    }

    /// Source URL of the finished object; `Some` only once `Completed`
    pub fn source_url(&self) -> Option<&str> {
        self.completed.as_ref().map(|d| d.source_url.as_str())
    }

    /// Completed-object payload, consumed by the facade on success
    pub fn into_completed(self) -> Option<UploadData> {
        self.completed
    }

    // ==================== Internals ====================

    async fn read_slice(&mut self, index: u64) -> Result<Bytes> {
        let (start, end) = {
            let session = self.session.as_ref().expect("session checked by caller");
            slice_range(index, session.slice_size, session.total_size)
        };
        let file = self.file.as_mut().expect("file open for the session");

        let mut buffer = vec![0u8; (end - start) as usize];
        let read = async {
            file.seek(SeekFrom::Start(start)).await?;
            file.read_exact(&mut buffer).await?;
            Ok::<_, std::io::Error>(())
        }
        .await;

        if let Err(e) = read {
            let err = ClientError::Io(e);
            self.record_failure(&err);
            return Err(err);
        }
        Ok(Bytes::from(buffer))
    }

    /// One slice with its private retry loop. The payload buffer is kept
    /// across attempts so a retry resends identical bytes.
    async fn send_slice(&mut self, index: u64, payload: Bytes) -> Result<()> {
        let (session_id, url, offset, len) = {
            let session = self.session.as_ref().expect("session checked by caller");
            let (start, end) = slice_range(index, session.slice_size, session.total_size);
            (
                session.session_id.clone(),
                session.resource_url.clone(),
                start,
                end - start,
            )
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let request = ApiRequest::SliceData {
                session: session_id.clone(),
                offset,
                index: index as u32,
                content: payload.clone(),
            };

            match self.try_slice(&url, request).await {
                Ok(()) => break,
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    warn!(index, attempt, error = %err, "slice send failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => {
                    self.record_failure(&err);
                    return Err(err);
                }
            }
        }

        let session = self.session.as_mut().expect("session checked by caller");
        session.bytes_sent += len;
        if let Some(callback) = &self.progress {
            callback(UploadProgress {
                bytes_sent: session.bytes_sent,
                total_bytes: session.total_size,
                current_slice: index as u32,
                total_slices: session.slice_count as u32,
            });
        }
        Ok(())
    }

    async fn try_slice(&mut self, url: &str, request: ApiRequest) -> Result<()> {
        let envelope = self.transport.send(url, &self.signature, request).await?;
        self.last_request_id = envelope.request_id.clone();
        if envelope.code != code::SUCCESS {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message,
                request_id: envelope.request_id,
            });
        }
        Ok(())
    }

    /// Send through the transport, recording any failure before it
    /// propagates.
    async fn dispatch(&mut self, url: &str, request: ApiRequest) -> Result<ApiEnvelope> {
        match self.transport.send(url, &self.signature, request).await {
            Ok(envelope) => {
                self.last_request_id = envelope.request_id.clone();
                Ok(envelope)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn unwrap_envelope<T: serde::de::DeserializeOwned + Default>(
        &mut self,
        envelope: ApiEnvelope,
    ) -> Result<T> {
        match crate::transport::into_data(envelope) {
            Ok(data) => Ok(data),
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn record_failure(&mut self, err: &ClientError) {
        let message = match err {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        self.last_error = Some(LastError {
            code: err.code(),
            message,
            request_id: err.request_id().map(str::to_string),
        });
        self.state = UploadState::Failed(err.code());
    }
}
