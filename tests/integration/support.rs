//! Scripted listing service and filesystem source.

use async_trait::async_trait;
use fsspec_tree::error::ApiError;
use fsspec_tree::listing::{FilesystemInfo, FilesystemSource, ListingResponse, ListingService};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

/// Listing service answering from a per-path script.
///
/// A path can be held: its next call waits until the returned `Notify` fires.
#[derive(Default)]
pub struct ScriptedListing {
    responses: Mutex<HashMap<String, ListingResponse>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedListing {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, response: ListingResponse) {
        self.responses.lock().insert(path.to_string(), response);
    }

    pub fn respond_entries(&self, path: &str, entries: Vec<Value>) {
        self.respond(path, ListingResponse::success(entries));
    }

    /// Hold the next call for `path` until the returned gate is notified.
    pub fn hold(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|(_, p)| p == path).count()
    }
}

#[async_trait]
impl ListingService for ScriptedListing {
    async fn list(&self, key: &str, path: &str) -> Result<ListingResponse, ApiError> {
        self.calls.lock().push((key.to_string(), path.to_string()));
        let gate = self.gates.lock().remove(path);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let response = self.responses.lock().get(path).cloned();
        Ok(response.unwrap_or_else(|| ListingResponse::failure(format!("no script for {}", path))))
    }
}

/// Fixed set of configured filesystems.
pub struct StaticSource(pub Vec<FilesystemInfo>);

#[async_trait]
impl FilesystemSource for StaticSource {
    async fn filesystems(&self) -> Result<Vec<FilesystemInfo>, ApiError> {
        Ok(self.0.clone())
    }
}

pub fn filesystem(key: &str, path: &str) -> FilesystemInfo {
    FilesystemInfo {
        key: key.to_string(),
        name: key.to_string(),
        protocol: "file".to_string(),
        path: path.to_string(),
        canonical_path: format!("file://{}", path),
    }
}

pub fn dir(name: &str) -> Value {
    json!({"name": name, "type": "directory", "size": 0})
}

pub fn file(name: &str, size: u64) -> Value {
    json!({"name": name, "type": "file", "size": size})
}
