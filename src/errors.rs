// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::merge::MergeError;
use crate::watch::WatchError;

#[derive(Error, Debug)]
pub enum MergewatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Manifest error in {path:?}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MergewatchError>;
