//! reqwest-backed client for the jupyter-fsspec REST API.

use super::{FilesystemInfo, FilesystemSource, ListingResponse, ListingService};
use crate::config::ServerConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// API namespace under the server base URL.
const API_NAMESPACE: &str = "jupyter_fsspec";

/// Envelope of `GET /jupyter_fsspec/config`.
#[derive(Debug, Deserialize)]
struct ConfigEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<Vec<FilesystemInfo>>,
}

/// Listing client for a Jupyter server running the jupyter-fsspec extension.
pub struct HttpListingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| ApiError::ConfigError(format!("Invalid server token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint under the API namespace.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            API_NAMESPACE,
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ListingService for HttpListingClient {
    async fn list(&self, key: &str, path: &str) -> Result<ListingResponse, ApiError> {
        let url = self.endpoint("files");
        debug!(url = %url, key, path, "Sending listing request");

        let response = self
            .client
            .get(&url)
            .query(&[("key", key), ("item_path", path)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Received listing response");

        // Failed listings still carry a JSON envelope with a description.
        match serde_json::from_str::<ListingResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) if status.is_success() => Err(ApiError::ListingFailed {
                path: path.to_string(),
                reason: format!("unparseable response: {}", e),
            }),
            Err(_) => {
                warn!(status = status.as_u16(), path, "Listing request failed");
                Err(ApiError::ListingFailed {
                    path: path.to_string(),
                    reason: format!("server returned HTTP {}", status),
                })
            }
        }
    }
}

#[async_trait]
impl FilesystemSource for HttpListingClient {
    async fn filesystems(&self) -> Result<Vec<FilesystemInfo>, ApiError> {
        let url = self.endpoint("config");
        debug!(url = %url, "Fetching configured filesystems");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let envelope: ConfigEnvelope = response.json().await.map_err(|e| {
            ApiError::ConfigError(format!(
                "Unreadable filesystem configuration (HTTP {}): {}",
                status, e
            ))
        })?;

        if envelope.status != super::STATUS_SUCCESS {
            return Err(ApiError::ConfigError(envelope.description.unwrap_or_else(
                || format!("Server could not load filesystems (HTTP {})", status),
            )));
        }
        Ok(envelope.content.unwrap_or_default())
    }
}
