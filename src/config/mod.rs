//! Configuration
//!
//! Layered configuration loaded through the `config` crate. Precedence, lowest
//! to highest: built-in defaults, the global file
//! `$XDG_CONFIG_HOME/fsspec-tree/config.toml`, an explicit file, then
//! `FSSPEC_TREE__SECTION__KEY` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Environment prefix for configuration overrides.
pub const ENV_PREFIX: &str = "FSSPEC_TREE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsspecTreeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub expansion: ExpansionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the jupyter-fsspec server lives and how to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Jupyter server base URL, including any hub user prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Jupyter server token; sent as `Authorization: token <token>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Lazy expansion behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Ask the view to expand a node as soon as its children arrive.
    #[serde(default = "default_true")]
    pub auto_expand: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            auto_expand: default_true(),
        }
    }
}

impl FsspecTreeConfig {
    /// Reject values that would only fail later at request time.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Invalid server base_url: {}", self.server.base_url));
        }
        if self.server.timeout_secs == 0 {
            return Err("server.timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}
