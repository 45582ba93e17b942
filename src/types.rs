//! Core identifier types shared by the tree, the controller and the view boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NodeId: index of a node in a tree's flat lookup table
pub type NodeId = u64;

/// Generation: identifies one tree lifetime between resets
pub type Generation = u64;

/// Opaque reference from a node to its on-screen representation.
///
/// Owned by the view layer; the tree only stores it for lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewHandle(pub u64);

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}
