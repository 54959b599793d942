use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The (size, modification-time) pair last observed for a watched path.
///
/// Comparison is metadata-only: a rewrite that keeps both the size and the
/// timestamp (at the filesystem's granularity) is not a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSnapshot {
    pub len: u64,
    /// `None` on platforms that do not report modification times.
    pub modified: Option<SystemTime>,
}

impl FileSnapshot {
    pub fn new(len: u64, modified: Option<SystemTime>) -> Self {
        Self { len, modified }
    }

    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        }
    }

    /// Nanoseconds since the unix epoch, or 0 when unknown.
    pub fn modified_nanos(&self) -> u128 {
        self.modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    }

    /// Strong entity tag derived from size and modification time.
    pub fn etag(&self) -> String {
        format!("\"{:x}-{:x}\"", self.modified_nanos(), self.len)
    }
}

impl fmt::Display for FileSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes @ {}ns", self.len, self.modified_nanos())
    }
}

/// Counters returned by a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub sources: usize,
    pub bytes_written: u64,
}
