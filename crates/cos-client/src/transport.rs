//! HTTP transport: one signed request in, one decoded envelope out

use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::code;
use crate::request::{ApiRequest, RequestBody};
use crate::types::ApiEnvelope;
use crate::{ClientError, Config, Result};

/// Executes API requests against the service.
///
/// Holds the connection pool; the per-request timeout and user agent come
/// from [`Config`] at construction. Transport-level failures and
/// unparseable bodies are classified as network errors; a well-formed
/// envelope is returned regardless of its `code` so callers own the
/// remote-error policy.
#[derive(Clone, Debug)]
pub struct Transport {
    http: reqwest::Client,
    verbose: bool,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| ClientError::Params("user agent is not a valid header".into()))?,
        );

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            http,
            verbose: config.verbose,
        })
    }

    /// Sign and send one request, decoding the response envelope.
    pub async fn send(
        &self,
        url: &str,
        signature: &str,
        request: ApiRequest,
    ) -> Result<ApiEnvelope> {
        let op = request.op();
        let mut req = self.http.request(request.method(), url);

        req = match request.into_body() {
            RequestBody::Query(query) => req.query(&query),
            RequestBody::Json(body) => req.json(&body),
            RequestBody::Form(form) => req.multipart(form),
        };
        req = req.header(header::AUTHORIZATION, signature);

        debug!(op, url, "sending request");
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if self.verbose {
            debug!(op, %status, body = %body, "received response");
        }

        // The service reports errors through the envelope code, not the
        // HTTP status; a body that is not an envelope is a transport-class
        // failure with the original body kept for diagnostics.
        let envelope: ApiEnvelope =
            serde_json::from_str(&body).map_err(|_| ClientError::InvalidResponse(body))?;

        debug!(op, code = envelope.code, "decoded response");
        Ok(envelope)
    }
}

/// Unwrap an envelope into its typed payload. Nonzero codes become
/// [`ClientError::Api`]; a missing payload decodes as the type's default.
pub fn into_data<T: DeserializeOwned + Default>(envelope: ApiEnvelope) -> Result<T> {
    if envelope.code != code::SUCCESS {
        return Err(ClientError::Api {
            code: envelope.code,
            message: envelope.message,
            request_id: envelope.request_id,
        });
    }

    match envelope.data {
        Some(data) => serde_json::from_value(data)
            .map_err(|e| ClientError::InvalidResponse(format!("malformed data payload: {e}"))),
        None => Ok(T::default()),
    }
}
