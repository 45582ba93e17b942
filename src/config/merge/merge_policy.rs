//! Built-in defaults registered before any file or environment source.

use crate::config::FsspecTreeConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Start a builder seeded with the serialized default configuration.
pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = FsspecTreeConfig::default();
    config::Config::builder()
        .set_default("server.base_url", defaults.server.base_url)?
        .set_default("server.timeout_secs", defaults.server.timeout_secs)?
        .set_default("expansion.auto_expand", defaults.expansion.auto_expand)?
        .set_default("logging.enabled", defaults.logging.enabled)?
        .set_default("logging.level", defaults.logging.level)?
        .set_default("logging.format", defaults.logging.format)?
        .set_default("logging.output", defaults.logging.output)?
        .set_default("logging.color", defaults.logging.color)
}
