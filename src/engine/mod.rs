// src/engine/mod.rs

//! Rebuild coordination for a watch session.
//!
//! This module ties together:
//! - the events pollers fan into the coordinator
//! - the pure decision core ([`core`]) that maps events to commands
//! - the async shell ([`runtime`]) that receives events, runs merges and
//!   broadcasts shutdown
//!
//! Merges are serialized: the shell awaits each rebuild before it receives
//! the next event.

use std::path::PathBuf;

use crate::watch::WatchError;

/// Events flowing from pollers into the coordinator.
#[derive(Debug)]
pub enum SessionEvent {
    /// At least one watched file changed since the last rebuild. `path` is
    /// informational only; any change triggers the same full rebuild.
    Changed { path: PathBuf },
    /// A poller could not observe its file. The first one ends the session.
    Failed(WatchError),
}

pub mod core;
pub mod runtime;

pub use core::{CoordinatorCore, CoreCommand};
pub use runtime::Coordinator;
