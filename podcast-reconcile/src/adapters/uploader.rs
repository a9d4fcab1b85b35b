//! Object storage upload over HTTP PUT

use super::{AdapterError, MediaUploader};
use crate::media::detect_mime_type;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("podcast-reconcile/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 1800;

/// Uploads files to `<endpoint>/<bucket>/<key>` with a bearer token
pub struct HttpUploader {
    http_client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: String,
}

impl HttpUploader {
    pub fn new(endpoint: String, bucket: String, token: String) -> Result<Self, AdapterError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
            token,
        })
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl MediaUploader for HttpUploader {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, AdapterError> {
        let bytes = tokio::fs::read(local_path).await?;
        let content_type = detect_mime_type(local_path).unwrap_or("application/octet-stream");
        let url = self.object_url(key);

        tracing::info!(
            file = %local_path.display(),
            key = %key,
            bytes = bytes.len(),
            content_type = content_type,
            "Uploading media"
        );

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api(status.as_u16(), error_text));
        }

        Ok(url)
    }
}
