//! Error types for tree synchronization and the listing boundary.

use thiserror::Error;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the tree core, the listing service and configuration.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path was requested that is not present in the current tree.
    ///
    /// Indicates the caller and the tree disagree about what is rendered.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The listing service failed or returned an unusable response. Retryable.
    #[error("Listing failed for {path}: {reason}")]
    ListingFailed { path: String, reason: String },

    /// A single listing record could not be interpreted.
    #[error("Malformed entry: {0}")]
    MalformedEntry(String),

    /// A listing completed after the tree it was requested for was reset.
    #[error("Stale response discarded for {path}")]
    StaleResponse { path: String },

    /// No configured filesystem carries the requested key.
    #[error("Filesystem not found: {0}")]
    FilesystemNotFound(String),

    /// An operation needed an active filesystem but none was selected.
    #[error("No active filesystem selected")]
    NoActiveFilesystem,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ListingFailed { .. } | ApiError::Http(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
