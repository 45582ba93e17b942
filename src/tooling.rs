//! Tooling
//!
//! Command-line front end and the plain-text view it renders trees with.

pub mod cli;
pub mod render;

pub use cli::{Cli, CliContext, Commands};
