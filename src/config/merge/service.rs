//! MergeService: orchestrates sources, applies merge policy, deserializes to FsspecTreeConfig.

use crate::config::sources::{environment, global_file};
use crate::config::FsspecTreeConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<FsspecTreeConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ApiError::ConfigError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!(path = %path.display(), "Loading explicit config file");
                builder.add_source(File::from(path).required(true))
            }
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config: FsspecTreeConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }
}
