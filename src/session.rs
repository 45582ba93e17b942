//! Browser session: the filesystem-selection collaborator.
//!
//! Owns the filesystem registry and drives the expansion controller: selecting a
//! filesystem (or refreshing the active one) resets the tree and lists its root.

use crate::error::ApiError;
use crate::expansion::{ExpandOutcome, LazyExpansionController};
use crate::filesystems::FilesystemRegistry;
use crate::listing::{FilesystemInfo, FilesystemSource};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

pub struct BrowserSession {
    source: Arc<dyn FilesystemSource>,
    controller: Arc<LazyExpansionController>,
    registry: RwLock<FilesystemRegistry>,
}

impl BrowserSession {
    pub fn new(source: Arc<dyn FilesystemSource>, controller: Arc<LazyExpansionController>) -> Self {
        Self {
            source,
            controller,
            registry: RwLock::new(FilesystemRegistry::new()),
        }
    }

    pub fn controller(&self) -> &Arc<LazyExpansionController> {
        &self.controller
    }

    /// Fetch the configured filesystems from the server.
    pub async fn load_filesystems(&self) -> Result<Vec<FilesystemInfo>, ApiError> {
        let filesystems = self.source.filesystems().await?;
        info!(count = filesystems.len(), "Loaded configured filesystems");
        self.registry.write().replace(filesystems.clone());
        Ok(filesystems)
    }

    pub fn filesystems(&self) -> Vec<FilesystemInfo> {
        self.registry.read().list().into_iter().cloned().collect()
    }

    pub fn active(&self) -> Option<FilesystemInfo> {
        self.registry.read().active().ok().cloned()
    }

    /// Make `key` active, rebuild the tree for it and list its root.
    pub async fn select(&self, key: &str) -> Result<ExpandOutcome, ApiError> {
        let info = self.registry.write().select(key)?.clone();
        info!(key = %info.key, root = %info.path, "Selected filesystem");
        self.rebuild(&info).await
    }

    /// Rebuild the active filesystem's tree from scratch.
    pub async fn refresh(&self) -> Result<ExpandOutcome, ApiError> {
        let info = self.registry.read().active()?.clone();
        self.rebuild(&info).await
    }

    async fn rebuild(&self, info: &FilesystemInfo) -> Result<ExpandOutcome, ApiError> {
        self.controller.reset(&info.key, &info.path);
        self.controller.populate_root().await
    }
}
