/*!
 * Remote blob store over plain HTTP.
 *
 * Works with any bucket that exposes objects as `GET {base_url}/{key}` and
 * accepts uploads as `PUT {base_url}/{key}` (S3-compatible gateways, blob
 * services, a static file server with WebDAV enabled).
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use url::Url;

use super::BlobStore;
use crate::errors::StoreError;

/// Blob store client for a remote bucket
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    /// HTTP client for API requests
    client: Client,
    /// Bucket base URL, always ending in `/`
    base_url: Url,
    /// Bearer token sent with every request (optional)
    token: Option<String>,
}

impl HttpBlobStore {
    /// Create a new client for the bucket at `base_url`
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, StoreError> {
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| StoreError::Backend(format!("Invalid blob store endpoint '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Full URL of the object stored under `key`
    pub fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        self.base_url
            .join(key)
            .map_err(|_| StoreError::InvalidKey(key.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-success response onto the store error taxonomy
    async fn status_error(key: &str, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied {
                key: key.to_string(),
                message: format!("{}: {}", status, message),
            },
            _ => {
                error!("Blob store error ({}) for '{}': {}", status, key, message);
                StoreError::Backend(format!("{} for '{}': {}", status, key, message))
            }
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let url = self.object_url(key)?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::status_error(key, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        debug!("Fetched {} bytes for '{}'", body.len(), key);
        Ok(Some(body))
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let url = self.object_url(key)?;

        let response = self
            .authorize(self.client.put(url))
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(key, response).await);
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
