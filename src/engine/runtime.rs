// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::merge::Merger;
use crate::types::MergeStats;
use crate::watch::{ShutdownSignal, WatchError};

use super::core::CoordinatorCore;
use super::{CoreCommand, SessionEvent};

/// Drives the coordinator core in response to [`SessionEvent`]s and delegates
/// the actual merge to a [`Merger`].
///
/// This is the IO shell around [`CoordinatorCore`]: it reads events from the
/// shared channel, runs rebuilds on the blocking pool one at a time, and
/// broadcasts the session's shutdown signal on the first fatal condition.
pub struct Coordinator<M: Merger + 'static> {
    core: CoordinatorCore,
    event_rx: mpsc::Receiver<SessionEvent>,
    merger: Arc<M>,
    sources: Arc<[PathBuf]>,
    output: PathBuf,
    shutdown: ShutdownSignal,
}

impl<M: Merger + 'static> fmt::Debug for Coordinator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl<M: Merger + 'static> Coordinator<M> {
    pub fn new(
        core: CoordinatorCore,
        event_rx: mpsc::Receiver<SessionEvent>,
        merger: Arc<M>,
        sources: Arc<[PathBuf]>,
        output: PathBuf,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            core,
            event_rx,
            merger,
            sources,
            output,
            shutdown,
        }
    }

    /// Main event loop.
    ///
    /// Returns the first fatal error (poll or merge), or `Ok(())` if the
    /// shutdown signal was triggered from outside the session.
    pub async fn run(mut self) -> Result<(), WatchError> {
        info!(sources = self.sources.len(), output = ?self.output, "coordinator started");

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => {
                    info!("shutdown requested; coordinator exiting");
                    return Ok(());
                }
                event = self.event_rx.recv() => event,
            };

            let Some(event) = event else {
                // Only reachable with an empty watch set: every poller that
                // exits on its own reports an error first.
                info!("no active pollers; waiting for shutdown");
                self.shutdown.triggered().await;
                return Ok(());
            };

            debug!(?event, "coordinator received event");

            let mut command = self.core.step(event);
            if let CoreCommand::Rebuild = command {
                // Shutdown may have fired after `recv` won the select.
                if self.shutdown.is_triggered() {
                    info!("shutdown requested; skipping rebuild");
                    return Ok(());
                }
                let outcome = self.rebuild().await;
                command = self.core.rebuild_finished(outcome);
            }

            if let CoreCommand::Terminate(err) = command {
                error!(error = %err, "watch session failed; shutting down pollers");
                self.shutdown.trigger();
                return Err(err);
            }
        }
    }

    async fn rebuild(&self) -> Result<MergeStats, WatchError> {
        let merger = Arc::clone(&self.merger);
        let sources = Arc::clone(&self.sources);
        let output = self.output.clone();

        let stats = tokio::task::spawn_blocking(move || merger.merge(&sources, &output))
            .await
            .map_err(|e| WatchError::Join(e.to_string()))??;

        info!(
            rebuild = self.core.rebuilds_requested(),
            sources = stats.sources,
            bytes = stats.bytes_written,
            "rebuilt {:?}",
            self.output
        );
        Ok(stats)
    }
}
