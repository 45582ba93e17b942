//! fsspec-tree: Lazily Populated Filesystem Trees
//!
//! Client-side tree model for browsing filesystems served by the jupyter-fsspec
//! extension. Directories are listed on first expansion and merged into an
//! in-memory [`tree::PathTree`]; a [`expansion::LazyExpansionController`] keeps
//! that cache consistent while listings are in flight.

pub mod config;
pub mod error;
pub mod expansion;
pub mod filesystems;
pub mod listing;
pub mod logging;
pub mod session;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod views;

pub use error::{ApiError, Result};
pub use expansion::{ExpandOutcome, FetchState, LazyExpansionController};
pub use tree::{MergeReport, PathNode, PathTree, TreeSynchronizer};
