//! Merging listing results into a subtree.

use super::node::PathNode;
use super::path;
use super::PathTree;
use crate::error::ApiError;
use crate::listing::EntryMetadata;
use crate::types::NodeId;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of one merge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Nodes that did not exist before the merge.
    pub created: usize,
    /// Existing nodes whose metadata changed.
    pub updated: usize,
    /// Records that were malformed or named a path outside the merge root.
    pub skipped: usize,
}

impl MergeReport {
    /// True when the merge left the tree shape and metadata unchanged.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

/// Additive merge of flat listing records into a [`PathTree`].
pub struct TreeSynchronizer;

impl TreeSynchronizer {
    /// Merge `entries` under `node`, interpreting entry names relative to `root_path`.
    ///
    /// Entries may sit several segments deep; missing intermediate nodes are
    /// created with empty metadata. The node named by an entry receives that
    /// entry's metadata. Nothing is ever removed, so repeating a merge is a no-op.
    pub fn merge(
        tree: &mut PathTree,
        node: NodeId,
        entries: &[Value],
        root_path: &str,
    ) -> Result<MergeReport, ApiError> {
        if tree.get(node).is_none() {
            return Err(ApiError::NodeNotFound(format!("node id {}", node)));
        }
        let root_path = path::normalize_root(root_path);
        let mut report = MergeReport::default();

        for value in entries {
            let metadata = match EntryMetadata::from_json(value) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed listing entry");
                    report.skipped += 1;
                    continue;
                }
            };
            let Some(segments) = path::relative_segments(&root_path, &metadata.name) else {
                warn!(
                    name = %metadata.name,
                    root = %root_path,
                    "Skipping listing entry outside the merge root"
                );
                report.skipped += 1;
                continue;
            };
            if segments.is_empty() {
                // Some backends list a directory as its own first entry.
                continue;
            }

            let segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
            let (leaf, created) = Self::walk_or_create(tree, node, &segments, &mut report);
            if let Some(leaf_node) = tree.get_mut(leaf) {
                if leaf_node.metadata.as_ref() != Some(&metadata) {
                    leaf_node.metadata = Some(metadata);
                    if !created {
                        report.updated += 1;
                    }
                }
            }
        }

        debug!(
            node,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            "Merged listing into tree"
        );
        Ok(report)
    }

    /// Walk `segments` from `start`, creating missing nodes.
    ///
    /// Returns the last node and whether this walk created it.
    fn walk_or_create(
        tree: &mut PathTree,
        start: NodeId,
        segments: &[String],
        report: &mut MergeReport,
    ) -> (NodeId, bool) {
        let mut current = start;
        let mut created = false;
        for segment in segments {
            let (existing, parent_path) = match tree.get(current) {
                Some(node) => (node.child(segment), node.absolute_path.clone()),
                None => return (current, created),
            };
            created = existing.is_none();
            current = match existing {
                Some(child) => child,
                None => {
                    let id = tree.allocate_id();
                    let child =
                        PathNode::new(id, segment.clone(), path::join(&parent_path, segment));
                    tree.insert(child);
                    if let Some(parent) = tree.get_mut(current) {
                        parent.children.insert(segment.clone(), id);
                    }
                    report.created += 1;
                    id
                }
            };
        }
        (current, created)
    }
}
