//! Path node representation

use crate::listing::EntryMetadata;
use crate::types::{NodeId, ViewHandle};
use std::collections::BTreeMap;

/// One path segment's position in a lazily-discovered hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub id: NodeId,
    /// Segment key under the parent; empty for the root.
    pub relative_path: String,
    pub absolute_path: String,
    /// Children keyed by segment name, sorted.
    pub children: BTreeMap<String, NodeId>,
    /// Listing record for exactly this path; `None` until one is merged.
    pub metadata: Option<EntryMetadata>,
    /// A listing of this node's children has completed successfully.
    pub fetched: bool,
    pub view_handle: Option<ViewHandle>,
}

impl PathNode {
    pub(crate) fn new(id: NodeId, relative_path: String, absolute_path: String) -> Self {
        Self {
            id,
            relative_path,
            absolute_path,
            children: BTreeMap::new(),
            metadata: None,
            fetched: false,
            view_handle: None,
        }
    }

    /// Display classification: has known children, or was listed as a directory.
    pub fn is_directory(&self) -> bool {
        !self.children.is_empty() || self.metadata.as_ref().is_some_and(|m| m.is_directory())
    }

    pub fn child(&self, segment: &str) -> Option<NodeId> {
        self.children.get(segment).copied()
    }

    pub fn size(&self) -> Option<u64> {
        self.metadata.as_ref().and_then(|m| m.size())
    }
}
