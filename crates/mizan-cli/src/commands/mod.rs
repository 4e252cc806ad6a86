//! CLI subcommands.

pub mod backends;
pub mod batch;
pub mod compare;
pub mod config;
pub mod extract;

use std::path::Path;

use mizan_core::MizanConfig;

/// Load configuration from an explicit path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MizanConfig> {
    match config_path {
        Some(path) => Ok(MizanConfig::from_file(Path::new(path))?),
        None => Ok(MizanConfig::default()),
    }
}
