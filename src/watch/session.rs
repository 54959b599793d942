// src/watch/session.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::{Coordinator, CoordinatorCore, SessionEvent};
use crate::fs::{FileSystem, RealFileSystem};
use crate::merge::Merger;
use crate::watch::{FilePoller, PollerExit, ShutdownSignal, WatchError, WatchOptions};

/// One run of the watch subsystem, from start to first fatal termination.
///
/// The session owns the watch set, the output path and the shutdown signal.
/// Pollers receive clones of the event sender and the signal; nothing is
/// shared through globals.
pub struct WatchSession {
    sources: Arc<[PathBuf]>,
    output: PathBuf,
    options: WatchOptions,
    shutdown: ShutdownSignal,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSession")
            .field("sources", &self.sources)
            .field("output", &self.output)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    pub fn new(sources: Vec<PathBuf>, output: impl Into<PathBuf>, options: WatchOptions) -> Self {
        Self {
            sources: sources.into(),
            output: output.into(),
            options,
            shutdown: ShutdownSignal::new(),
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Poll through `fs` instead of the real filesystem.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Use `shutdown` as the session signal, e.g. a child of a process-wide
    /// Ctrl-C signal.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that can end the session from outside.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Run the session until the first fatal error or external shutdown.
    ///
    /// Every poller has exited by the time this returns.
    pub async fn run<M: Merger + 'static>(self, merger: Arc<M>) -> Result<(), WatchError> {
        // A zero-capacity channel panics; treat 0 as the smallest buffer.
        let capacity = self.options.event_buffer.max(1);
        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(capacity);

        let mut pollers = JoinSet::new();
        for path in self.sources.iter() {
            let poller = FilePoller::new(
                path.clone(),
                Arc::clone(&self.fs),
                self.options.poll_interval,
                event_tx.clone(),
                self.shutdown.clone(),
            );
            pollers.spawn(poller.run());
        }
        // The coordinator sees a closed channel only once every poller is gone.
        drop(event_tx);

        info!(
            files = self.sources.len(),
            interval = ?self.options.poll_interval,
            "watch session started"
        );

        let coordinator = Coordinator::new(
            CoordinatorCore::new(),
            event_rx,
            merger,
            Arc::clone(&self.sources),
            self.output.clone(),
            self.shutdown.clone(),
        );
        let result = coordinator.run().await;

        self.shutdown.trigger();
        join_pollers(&mut pollers).await;

        info!(ok = result.is_ok(), "watch session ended");
        result
    }
}

async fn join_pollers(pollers: &mut JoinSet<PollerExit>) {
    let mut failed = 0usize;
    while let Some(joined) = pollers.join_next().await {
        match joined {
            Ok(PollerExit::Failed) => failed += 1,
            Ok(PollerExit::Stopped) => {}
            Err(e) => warn!(error = %e, "poller task did not finish cleanly"),
        }
    }
    debug!(failed, "all pollers joined");
}
