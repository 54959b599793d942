// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `mergewatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "mergewatch",
    version,
    about = "Concatenate the files listed in a manifest, optionally rebuilding on change and serving the result.",
    long_about = None
)]
pub struct CliArgs {
    /// JSON manifest listing the source files, in merge order.
    #[arg(long, value_name = "PATH")]
    pub list: Option<PathBuf>,

    /// Output file; overwritten on every build.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Keep watching the sources and rebuild the output on change.
    #[arg(long)]
    pub watch: bool,

    /// Serve the output over HTTP on this port.
    #[arg(long, value_name = "PORT")]
    pub serve: Option<u16>,

    /// Address the HTTP server binds to.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Interval between two metadata samples of a watched file.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Optional TOML config file. CLI flags take precedence over it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MERGEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve the config and manifest, print the plan, write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
