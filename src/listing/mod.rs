//! Listing service boundary
//!
//! The tree core consumes directory listings through [`ListingService`]. Transport,
//! retries and auth belong to the implementation; [`http::HttpListingClient`] talks
//! to the jupyter-fsspec REST API.

pub mod entry;
pub mod http;

pub use entry::{EntryKind, EntryMetadata};
pub use http::HttpListingClient;

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string the service reports for a usable response.
pub const STATUS_SUCCESS: &str = "success";

/// Response envelope returned by a listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl ListingResponse {
    pub fn success(entries: Vec<Value>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            description: None,
            content: Some(Value::Array(entries)),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            description: Some(description.into()),
            content: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Extract the listing records, rejecting failed or malformed responses.
    pub fn into_entries(self, path: &str) -> Result<Vec<Value>, ApiError> {
        if !self.is_success() {
            return Err(ApiError::ListingFailed {
                path: path.to_string(),
                reason: self
                    .description
                    .unwrap_or_else(|| format!("service reported status '{}'", self.status)),
            });
        }
        match self.content {
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(ApiError::ListingFailed {
                path: path.to_string(),
                reason: format!("content is not a listing: {}", other),
            }),
            None => Err(ApiError::ListingFailed {
                path: path.to_string(),
                reason: "response has no content field".to_string(),
            }),
        }
    }
}

/// A configured filesystem as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemInfo {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    /// Root path of the filesystem, without protocol.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub canonical_path: String,
}

/// Source of directory listings.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// List the directory at `path` on the filesystem identified by `key`.
    async fn list(&self, key: &str, path: &str) -> Result<ListingResponse, ApiError>;
}

/// Source of the configured filesystems.
#[async_trait]
pub trait FilesystemSource: Send + Sync {
    async fn filesystems(&self) -> Result<Vec<FilesystemInfo>, ApiError>;
}
