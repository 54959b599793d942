use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use mergewatch::fs::FileSystem;
use mergewatch::merge::{FileMerger, MergeError, Merger};
use mergewatch::types::MergeStats;

/// A merger that:
/// - delegates to a real [`FileMerger`]
/// - counts invocations
/// - records the highest number of merges that were running at once
///
/// An optional delay widens the window in which overlapping merges would be
/// visible.
pub struct RecordingMerger<F: FileSystem> {
    inner: FileMerger<F>,
    delay: Duration,
    runs: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl<F: FileSystem> RecordingMerger<F> {
    pub fn new(fs: F) -> Self {
        Self {
            inner: FileMerger::new(fs),
            delay: Duration::ZERO,
            runs: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl<F: FileSystem> Merger for RecordingMerger<F> {
    fn merge(&self, sources: &[PathBuf], output: &Path) -> Result<MergeStats, MergeError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let result = self.inner.merge(sources, output);

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
