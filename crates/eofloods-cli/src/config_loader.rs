//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use eofloods_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory
const DEFAULT_CONFIG_FILE: &str = "eofloods.toml";

/// The explicit config file, or ./eofloods.toml when it exists
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

/// Load layered configuration with CLI overrides
pub fn load_config(explicit: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = config_path(explicit) {
        tracing::debug!("Loading configuration from {}", path.display());
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
