//! Registry of configured filesystems and the active selection.

use crate::error::ApiError;
use crate::listing::FilesystemInfo;
use std::collections::BTreeMap;

/// Filesystems reported by the server, keyed by filesystem key.
#[derive(Debug, Default, Clone)]
pub struct FilesystemRegistry {
    filesystems: BTreeMap<String, FilesystemInfo>,
    active: Option<String>,
}

impl FilesystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known filesystems.
    ///
    /// The active selection survives only if its key is still configured.
    pub fn replace(&mut self, filesystems: Vec<FilesystemInfo>) {
        self.filesystems = filesystems
            .into_iter()
            .map(|fs| (fs.key.clone(), fs))
            .collect();
        if let Some(active) = &self.active {
            if !self.filesystems.contains_key(active) {
                tracing::warn!(key = %active, "Active filesystem is no longer configured");
                self.active = None;
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<&FilesystemInfo, ApiError> {
        self.filesystems
            .get(key)
            .ok_or_else(|| ApiError::FilesystemNotFound(key.to_string()))
    }

    /// Make `key` the active filesystem.
    pub fn select(&mut self, key: &str) -> Result<&FilesystemInfo, ApiError> {
        if !self.filesystems.contains_key(key) {
            return Err(ApiError::FilesystemNotFound(key.to_string()));
        }
        self.active = Some(key.to_string());
        self.get(key)
    }

    pub fn active(&self) -> Result<&FilesystemInfo, ApiError> {
        let key = self.active.as_deref().ok_or(ApiError::NoActiveFilesystem)?;
        self.get(key)
    }

    /// Filesystems in key order.
    pub fn list(&self) -> Vec<&FilesystemInfo> {
        self.filesystems.values().collect()
    }

    pub fn len(&self) -> usize {
        self.filesystems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filesystems.is_empty()
    }
}
