//! Subcommand implementations.

pub mod config;
pub mod extract;
pub mod predict;
pub mod template;

use std::path::{Path, PathBuf};

use tracing::debug;
use vitalscan_core::VitalConfig;

/// Where `config init` writes and other commands look by default.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vitalscan")
        .join("config.json")
}

/// Load the `--config` file if given, else the default file if present,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VitalConfig> {
    if let Some(path) = config_path {
        return Ok(VitalConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config at {}", path.display());
        Ok(VitalConfig::from_file(&path)?)
    } else {
        Ok(VitalConfig::default())
    }
}
