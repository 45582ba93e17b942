//! Global config file source: `$XDG_CONFIG_HOME/fsspec-tree/config.toml`

use crate::config::paths::xdg_root;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

/// Add the global config file if one exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg_root::config_file_path() {
        Ok(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading global config file");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        _ => Ok(builder),
    }
}
