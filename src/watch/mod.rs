// src/watch/mod.rs

//! Polling-based change detection.
//!
//! This module is responsible for:
//! - One [`FilePoller`] per watched path, sampling size + modification time.
//! - The [`WatchSession`] that owns the watch set, the shared event channel
//!   and the [`ShutdownSignal`] every poller observes.
//!
//! It does not know how merges are performed; it turns metadata changes into
//! [`crate::engine::SessionEvent`]s and lets the coordinator decide.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::merge::MergeError;

pub mod poller;
pub mod session;

pub use poller::{FilePoller, PollerExit};
pub use session::WatchSession;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_EVENT_BUFFER: usize = 16;

/// Fatal conditions that end a watch session.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot observe watched file {path:?}: {source}")]
    Poll {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rebuild failed: {0}")]
    Merge(#[from] MergeError),

    #[error("watch task failed: {0}")]
    Join(String),
}

impl WatchError {
    /// The path that caused the failure, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchError::Poll { path, .. } => Some(path),
            WatchError::Merge(err) => Some(err.path()),
            WatchError::Join(_) => None,
        }
    }
}

/// Tunables for a watch session.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Sleep between two metadata samples of the same file.
    pub poll_interval: Duration,
    /// Capacity of the channel pollers fan their events into. `0` is
    /// treated as `1`.
    pub event_buffer: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Broadcast "the session is ending" signal.
///
/// Triggering is idempotent and wakes every waiter, wherever it is parked.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`Self::trigger`] has been called on this signal or on
    /// any signal it was derived from.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }

    /// A signal that fires when `self` fires, but can also be triggered on
    /// its own without affecting `self`.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}
