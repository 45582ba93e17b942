//! Plain-text tree view.

use crate::tree::{PathNode, PathTree};
use crate::types::NodeId;
use owo_colors::OwoColorize;

/// Human-readable byte count with binary prefixes.
///
/// A unit is used once the value reaches 90% of it, so every output for values
/// below 2^60 fits in ten characters.
pub fn format_bytes(n: u64) -> String {
    const UNITS: [(&str, u64); 5] = [
        ("Pi", 1 << 50),
        ("Ti", 1 << 40),
        ("Gi", 1 << 30),
        ("Mi", 1 << 20),
        ("ki", 1 << 10),
    ];
    for (prefix, k) in UNITS {
        if n as f64 >= k as f64 * 0.9 {
            return format!("{:.2} {}B", n as f64 / k as f64, prefix);
        }
    }
    format!("{} B", n)
}

/// Single-line label for a node: name, directory marker and size.
pub fn node_label(node: &PathNode, color: bool) -> String {
    let name = if node.relative_path.is_empty() {
        node.absolute_path.as_str()
    } else {
        node.relative_path.as_str()
    };
    let is_root = node.relative_path.is_empty();
    if is_root || node.is_directory() {
        let separator = if name.ends_with('/') { "" } else { "/" };
        let marker = if node.fetched {
            separator.to_string()
        } else {
            format!("{} …", separator)
        };
        if color {
            format!("{}{}", name.blue().bold(), marker)
        } else {
            format!("{}{}", name, marker)
        }
    } else {
        match node.size() {
            Some(size) => format!("{} ({})", name, format_bytes(size)),
            None => name.to_string(),
        }
    }
}

/// Render the known subtree under `id` with box-drawing connectors.
pub fn render_subtree(tree: &PathTree, id: NodeId, color: bool) -> String {
    let mut out = String::new();
    if let Some(node) = tree.get(id) {
        out.push_str(&node_label(node, color));
        out.push('\n');
        render_children(tree, id, "", color, &mut out);
    }
    out
}

fn render_children(tree: &PathTree, id: NodeId, prefix: &str, color: bool, out: &mut String) {
    let children = tree.children_of(id);
    let last = children.len().saturating_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        let (connector, extension) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&node_label(child, color));
        out.push('\n');
        render_children(tree, child.id, &format!("{}{}", prefix, extension), color, out);
    }
}
