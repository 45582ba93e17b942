//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::FsspecTreeConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<FsspecTreeConfig, ApiError> {
        MergeService::load(None)
    }

    /// Load configuration with an explicit file layered over the global one.
    pub fn load_from_file(path: &Path) -> Result<FsspecTreeConfig, ApiError> {
        MergeService::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> FsspecTreeConfig {
        FsspecTreeConfig::default()
    }
}
