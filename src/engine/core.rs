// src/engine/core.rs

//! Pure coordinator state machine.
//!
//! Consumes [`SessionEvent`]s and merge outcomes and returns the
//! [`CoreCommand`] the async shell should execute. It has no channels, no
//! Tokio types and performs no IO, so it can be tested directly.

use tracing::debug;

use crate::engine::SessionEvent;
use crate::types::MergeStats;
use crate::watch::WatchError;

/// Command produced by the core, executed by [`super::Coordinator`].
#[derive(Debug)]
pub enum CoreCommand {
    /// Run one full merge now.
    Rebuild,
    /// Broadcast shutdown and end the session with this error.
    Terminate(WatchError),
    /// Nothing to do; wait for the next event.
    Continue,
}

#[derive(Debug, Default)]
pub struct CoordinatorCore {
    terminated: bool,
    rebuilds_requested: u64,
    rebuilds_completed: u64,
}

impl CoordinatorCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once true, the core never requests another rebuild.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn rebuilds_requested(&self) -> u64 {
        self.rebuilds_requested
    }

    pub fn rebuilds_completed(&self) -> u64 {
        self.rebuilds_completed
    }

    /// Handle one event from a poller.
    pub fn step(&mut self, event: SessionEvent) -> CoreCommand {
        if self.terminated {
            debug!(?event, "session already terminated; dropping event");
            return CoreCommand::Continue;
        }

        match event {
            SessionEvent::Changed { path } => {
                self.rebuilds_requested += 1;
                debug!(path = ?path, rebuild = self.rebuilds_requested, "rebuild requested");
                CoreCommand::Rebuild
            }
            SessionEvent::Failed(err) => self.terminate(err),
        }
    }

    /// Record the outcome of a rebuild requested by [`Self::step`].
    pub fn rebuild_finished(
        &mut self,
        outcome: std::result::Result<MergeStats, WatchError>,
    ) -> CoreCommand {
        match outcome {
            Ok(_) => {
                self.rebuilds_completed += 1;
                CoreCommand::Continue
            }
            Err(err) if !self.terminated => self.terminate(err),
            Err(_) => CoreCommand::Continue,
        }
    }

    fn terminate(&mut self, err: WatchError) -> CoreCommand {
        self.terminated = true;
        CoreCommand::Terminate(err)
    }
}
