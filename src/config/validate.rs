// src/config/validate.rs

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{RawConfigFile, ServeSection, Settings, WatchSection};
use crate::errors::{MergewatchError, Result};
use crate::watch::WatchOptions;

impl TryFrom<RawConfigFile> for Settings {
    type Error = MergewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let list = required_path(raw.merge.list, "list")?;
        let out = required_path(raw.merge.out, "out")?;
        let watch = validate_watch(&raw.watch)?;
        let serve = validate_serve(&raw.serve)?;
        Ok(Settings::new_unchecked(list, out, watch, serve))
    }
}

fn required_path(value: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Err(MergewatchError::ConfigError(format!(
            "`{name}` is required (pass --{name} or set [merge].{name})"
        ))),
    }
}

fn validate_watch(section: &WatchSection) -> Result<Option<WatchOptions>> {
    if section.poll_interval_ms == 0 {
        return Err(MergewatchError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if section.event_buffer == 0 {
        return Err(MergewatchError::ConfigError(
            "[watch].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }

    if !section.enabled {
        return Ok(None);
    }
    Ok(Some(WatchOptions {
        poll_interval: Duration::from_millis(section.poll_interval_ms),
        event_buffer: section.event_buffer,
    }))
}

fn validate_serve(section: &ServeSection) -> Result<Option<SocketAddr>> {
    let Some(port) = section.port else {
        return Ok(None);
    };

    let ip: IpAddr = section.bind.trim().parse().map_err(|_| {
        MergewatchError::ConfigError(format!(
            "[serve].bind must be an IP address (got {:?})",
            section.bind
        ))
    })?;
    Ok(Some(SocketAddr::new(ip, port)))
}
