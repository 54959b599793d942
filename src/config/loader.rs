// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{RawConfigFile, Settings};
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; validation happens when the
/// result is turned into [`Settings`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(config = ?path, "loaded config file");

    Ok(config)
}

/// Resolve the effective settings: the optional `--config` file, overridden
/// by CLI flags, then validated.
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let mut raw = match args.config {
        Some(ref path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };
    raw.apply_cli(args);
    Settings::try_from(raw)
}
