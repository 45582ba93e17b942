//! CLI Tooling
//!
//! Command-line front end over a [`BrowserSession`]. Each invocation loads the
//! configured filesystems, selects one, expands what the command needs and
//! prints the result.

use crate::config::{ConfigLoader, FsspecTreeConfig};
use crate::error::ApiError;
use crate::expansion::LazyExpansionController;
use crate::listing::http::HttpListingClient;
use crate::listing::FilesystemInfo;
use crate::logging::LoggingConfig;
use crate::session::BrowserSession;
use crate::tooling::render;
use crate::tree::{path, PathNode};
use crate::views::ViewEvent;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// fsspec-tree - Browse jupyter-fsspec filesystems as a lazily loaded tree
#[derive(Parser)]
#[command(name = "fsspec-tree")]
#[command(about = "Browse jupyter-fsspec filesystems as a lazily loaded tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Jupyter server base URL (overrides server.base_url)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the logging flags over the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if self.log_file.is_some() {
            config.file = self.log_file.clone();
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the filesystems configured on the server
    Filesystems {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the children of a directory
    Ls {
        /// Filesystem key
        key: String,
        /// Directory path, absolute or relative to the filesystem root
        path: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the known tree of a filesystem
    Tree {
        /// Filesystem key
        key: String,
        /// Expand this path (and its ancestors) before printing; repeatable
        #[arg(long = "expand")]
        expand: Vec<String>,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

/// One child row of `ls` output.
#[derive(Debug, Serialize)]
struct ListingRow {
    name: String,
    path: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

impl From<&PathNode> for ListingRow {
    fn from(node: &PathNode) -> Self {
        Self {
            name: node.relative_path.clone(),
            path: node.absolute_path.clone(),
            kind: if node.is_directory() {
                "directory"
            } else {
                "file"
            },
            size: node.size(),
        }
    }
}

/// CLI context holding the session and the runtime that drives it
pub struct CliContext {
    config: FsspecTreeConfig,
    session: BrowserSession,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(config_path: Option<PathBuf>, base_url: Option<String>) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if let Some(url) = base_url {
            config.server.base_url = url;
        }
        config.validate().map_err(ApiError::ConfigError)?;

        let client = Arc::new(HttpListingClient::new(&config.server)?);
        let controller = Arc::new(LazyExpansionController::new(
            client.clone(),
            config.expansion.clone(),
        ));
        controller.subscribe(Arc::new(|event: &ViewEvent| match event {
            ViewEvent::SubtreeChanged { node, path } => {
                debug!(node, path = %path, "Subtree changed")
            }
            ViewEvent::NodeExpansionRequested { path } => {
                debug!(path = %path, "Node expansion requested")
            }
        }));
        let session = BrowserSession::new(client, controller);

        let runtime = tokio::runtime::Runtime::new()?;

        Ok(Self {
            config,
            session,
            runtime,
        })
    }

    pub fn config(&self) -> &FsspecTreeConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        self.runtime.block_on(self.execute_inner(command))
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Filesystems { format } => {
                let filesystems = self.session.load_filesystems().await?;
                format_filesystems(&filesystems, format)
            }
            Commands::Ls { key, path, format } => {
                let target = self.open(key, path.as_deref()).await?;
                let controller = self.session.controller();
                controller.reveal(&target).await?;

                let tree = controller.tree();
                let id = tree
                    .resolve(&target)
                    .ok_or_else(|| ApiError::NodeNotFound(target.clone()))?;
                let rows: Vec<ListingRow> = tree
                    .children_of(id)
                    .into_iter()
                    .map(ListingRow::from)
                    .collect();
                format_listing(&rows, format)
            }
            Commands::Tree {
                key,
                expand,
                no_color,
            } => {
                self.open(key, None).await?;
                let controller = self.session.controller();
                for requested in expand {
                    let root = controller.tree().root_path().to_string();
                    let target = within_root(&root, requested)?;
                    controller.reveal(&target).await?;
                }

                let tree = controller.tree();
                let rendered = render::render_subtree(&tree, tree.root_id(), !no_color);
                Ok(rendered.trim_end().to_string())
            }
        }
    }

    /// Select filesystem `key` and return the absolute form of `requested`.
    async fn open(&self, key: &str, requested: Option<&str>) -> Result<String, ApiError> {
        self.session.load_filesystems().await?;
        self.session.select(key).await?;
        let root = self.session.controller().tree().root_path().to_string();
        Ok(match requested {
            Some(requested) => within_root(&root, requested)?,
            None => root,
        })
    }
}

/// Interpret `requested` as absolute when it lies under `root`, else as relative to it.
///
/// A `/`-prefixed path outside the root is rejected rather than reinterpreted.
fn within_root(root: &str, requested: &str) -> Result<String, ApiError> {
    if path::relative_segments(root, requested).is_some() {
        return Ok(requested.to_string());
    }
    if requested.starts_with('/') {
        return Err(ApiError::NodeNotFound(format!(
            "{} is outside the filesystem root {}",
            requested, root
        )));
    }
    Ok(requested
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_string(), |acc, segment| path::join(&acc, segment)))
}

fn format_filesystems(filesystems: &[FilesystemInfo], format: &str) -> Result<String, ApiError> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(filesystems)?),
        "text" => {
            if filesystems.is_empty() {
                return Ok("No filesystems configured.".to_string());
            }
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Key", "Name", "Protocol", "Path"]);
            for fs in filesystems {
                table.add_row(vec![&fs.key, &fs.name, &fs.protocol, &fs.path]);
            }
            Ok(table.to_string())
        }
        other => Err(invalid_format(other)),
    }
}

fn format_listing(rows: &[ListingRow], format: &str) -> Result<String, ApiError> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(rows)?),
        "text" => {
            if rows.is_empty() {
                return Ok("(empty)".to_string());
            }
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Name", "Type", "Size"]);
            for row in rows {
                let size = row
                    .size
                    .map(render::format_bytes)
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![row.name.as_str(), row.kind, size.as_str()]);
            }
            Ok(table.to_string())
        }
        other => Err(invalid_format(other)),
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
}
