//! Path tree
//!
//! In-memory cache of a filesystem hierarchy discovered one listing at a time.
//! Nodes live in a flat index keyed by [`NodeId`] so view events resolve in O(1);
//! the hierarchy is expressed through each node's segment-keyed `children` map.

pub mod merge;
pub mod node;
pub mod path;

pub use merge::{MergeReport, TreeSynchronizer};
pub use node::PathNode;

use crate::listing::EntryMetadata;
use crate::types::{Generation, NodeId, ViewHandle};
use std::collections::HashMap;

/// Root of a lazily-populated path hierarchy plus its flat node index.
#[derive(Debug, Clone)]
pub struct PathTree {
    key: String,
    root_path: String,
    root: NodeId,
    generation: Generation,
    next_id: NodeId,
    nodes: HashMap<NodeId, PathNode>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl PathTree {
    /// Create a tree for the filesystem `key` rooted at `root_path`.
    pub fn new(key: &str, root_path: &str) -> Self {
        let mut tree = PathTree {
            key: String::new(),
            root_path: String::new(),
            root: 0,
            generation: 0,
            next_id: 0,
            nodes: HashMap::new(),
        };
        tree.install_root(key, root_path);
        tree
    }

    /// Discard every node and start over with a fresh, fetched root.
    ///
    /// Node ids keep increasing across resets, so a stale id never aliases a
    /// node of the new tree.
    pub fn reset(&mut self, key: &str, root_path: &str) {
        self.nodes.clear();
        self.generation += 1;
        self.install_root(key, root_path);
    }

    fn install_root(&mut self, key: &str, root_path: &str) {
        let root_path = path::normalize_root(root_path);
        let id = self.allocate_id();
        let mut root = PathNode::new(id, String::new(), root_path.clone());
        root.metadata = Some(EntryMetadata::directory(&root_path));
        root.fetched = true;
        self.nodes.insert(id, root);
        self.root = id;
        self.key = key.to_string();
        self.root_path = root_path;
    }

    pub(crate) fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Node for an absolute path.
    ///
    /// Returns `None` as soon as a segment is missing, when the path is not under
    /// the root, or when the reached node's absolute path differs from the input.
    pub fn resolve(&self, absolute_path: &str) -> Option<NodeId> {
        let segments = path::relative_segments(&self.root_path, absolute_path)?;
        let mut current = self.root;
        for segment in segments {
            current = self.nodes.get(&current)?.child(segment)?;
        }
        let node = self.nodes.get(&current)?;
        (node.absolute_path == absolute_path).then_some(current)
    }

    /// Resolve and borrow in one step.
    pub fn node_for_path(&self, absolute_path: &str) -> Option<&PathNode> {
        self.resolve(absolute_path).and_then(|id| self.nodes.get(&id))
    }

    pub fn get(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PathNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, node: PathNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn root(&self) -> &PathNode {
        &self.nodes[&self.root]
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Children of a node in segment order.
    pub fn children_of(&self, id: NodeId) -> Vec<&PathNode> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.children
                    .values()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record the view layer's handle for a node. Returns false for unknown ids.
    pub fn attach_view(&mut self, id: NodeId, handle: ViewHandle) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.view_handle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Rebuild a node's absolute path from the root through its ancestors.
    pub fn reconstruct_path(&self, id: NodeId) -> Option<String> {
        let target = self.nodes.get(&id)?;
        let segments = path::relative_segments(&self.root_path, &target.absolute_path)?;
        let mut current = self.root;
        let mut rebuilt = self.root_path.clone();
        for segment in segments {
            current = self.nodes.get(&current)?.child(segment)?;
            rebuilt = path::join(&rebuilt, segment);
        }
        (current == id).then_some(rebuilt)
    }
}
