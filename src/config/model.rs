// src/config/model.rs

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cli::CliArgs;
use crate::watch::{DEFAULT_EVENT_BUFFER, DEFAULT_POLL_INTERVAL, WatchOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [merge]
/// list = "list.json"
/// out = "merged.css"
///
/// [watch]
/// enabled = true
/// poll_interval_ms = 50
///
/// [serve]
/// port = 8080
/// ```
///
/// All sections are optional; CLI flags fill in or override values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub merge: MergeSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub serve: ServeSection,
}

/// `[merge]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSection {
    /// JSON manifest listing the sources.
    #[serde(default)]
    pub list: Option<PathBuf>,

    /// Output file.
    #[serde(default)]
    pub out: Option<PathBuf>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Capacity of the poller → coordinator channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_ms: default_poll_interval_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// `[serve]` section. The server is enabled when `port` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeSection {
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: None,
            bind: default_bind(),
        }
    }
}

impl RawConfigFile {
    /// Layer CLI flags over the file values. `--watch` can only enable
    /// watching; it cannot turn off `[watch].enabled`.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(ref list) = args.list {
            self.merge.list = Some(list.clone());
        }
        if let Some(ref out) = args.out {
            self.merge.out = Some(out.clone());
        }
        if args.watch {
            self.watch.enabled = true;
        }
        if let Some(ms) = args.poll_interval_ms {
            self.watch.poll_interval_ms = ms;
        }
        if let Some(port) = args.serve {
            self.serve.port = Some(port);
        }
        if let Some(ref bind) = args.bind {
            self.serve.bind = bind.clone();
        }
    }
}

/// Validated, fully resolved configuration. Static for the process lifetime.
#[derive(Debug, Clone)]
pub struct Settings {
    pub list: PathBuf,
    pub out: PathBuf,
    /// `Some` when the watch session is enabled.
    pub watch: Option<WatchOptions>,
    /// `Some` when the content server is enabled.
    pub serve: Option<SocketAddr>,
}

impl Settings {
    pub(crate) fn new_unchecked(
        list: PathBuf,
        out: PathBuf,
        watch: Option<WatchOptions>,
        serve: Option<SocketAddr>,
    ) -> Self {
        Self {
            list,
            out,
            watch,
            serve,
        }
    }
}
