// src/watch/poller.rs

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::engine::SessionEvent;
use crate::fs::FileSystem;
use crate::watch::{ShutdownSignal, WatchError};

/// How a poller ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerExit {
    /// Observed the shutdown signal.
    Stopped,
    /// Could not stat its file and reported the error.
    Failed,
}

/// Watches exactly one file by sampling its size and modification time.
///
/// States:
/// - init: take the first snapshot, failing if the file cannot be stat'ed
/// - polling: sleep, re-stat, emit `Changed` when the snapshot differs
/// - failed: emit one `Failed` event and exit
/// - stopped: shutdown observed while sleeping or emitting
///
/// The snapshot is only replaced after the change event was handed off, so
/// a change is never forgotten while the coordinator is busy.
#[derive(Debug)]
pub struct FilePoller {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    interval: Duration,
    events: mpsc::Sender<SessionEvent>,
    shutdown: ShutdownSignal,
}

impl FilePoller {
    pub fn new(
        path: PathBuf,
        fs: Arc<dyn FileSystem>,
        interval: Duration,
        events: mpsc::Sender<SessionEvent>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            path,
            fs,
            interval,
            events,
            shutdown,
        }
    }

    pub async fn run(self) -> PollerExit {
        debug!(path = ?self.path, interval = ?self.interval, "poller started");
        let exit = self.poll().await;
        debug!(path = ?self.path, ?exit, "poller finished");
        exit
    }

    async fn poll(&self) -> PollerExit {
        // A snapshot is one metadata call; it runs inline on the worker
        // rather than on the blocking pool.
        let mut snapshot = match self.fs.snapshot(&self.path) {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail(e).await,
        };

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.triggered() => return PollerExit::Stopped,
                _ = tokio::time::sleep(self.interval) => {}
            }

            let current = match self.fs.snapshot(&self.path) {
                Ok(current) => current,
                Err(e) => return self.fail(e).await,
            };

            if current == snapshot {
                continue;
            }

            debug!(path = ?self.path, old = %snapshot, new = %current, "change detected");

            let event = SessionEvent::Changed {
                path: self.path.clone(),
            };
            if !self.emit(event).await {
                return PollerExit::Stopped;
            }
            snapshot = current;
        }
    }

    async fn fail(&self, source: io::Error) -> PollerExit {
        error!(path = ?self.path, error = %source, "cannot stat watched file");

        let event = SessionEvent::Failed(WatchError::Poll {
            path: self.path.clone(),
            source,
        });
        if self.emit(event).await {
            PollerExit::Failed
        } else {
            PollerExit::Stopped
        }
    }

    /// Hand `event` to the coordinator. Returns false if shutdown won the race
    /// or the coordinator is gone.
    async fn emit(&self, event: SessionEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.triggered() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }
}
