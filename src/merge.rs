// src/merge.rs

//! Merge engine: byte-for-byte concatenation of the sources into one output.
//!
//! The output is opened with truncating semantics and written in place.
//! A failure part-way through leaves a partially written output behind; the
//! output is only defined after a successful run. There is no temp-file plus
//! rename step, so concurrent readers may observe a file mid-rewrite.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::types::MergeStats;

const COPY_BUF_SIZE: usize = 8192;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to read input {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MergeError {
    /// The path (input or output) that failed.
    pub fn path(&self) -> &Path {
        match self {
            MergeError::Input { path, .. } | MergeError::Output { path, .. } => path,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        match self {
            MergeError::Input { source, .. } | MergeError::Output { source, .. } => source.kind(),
        }
    }

    fn input(path: &Path, source: io::Error) -> Self {
        MergeError::Input {
            path: path.to_path_buf(),
            source,
        }
    }

    fn output(path: &Path, source: io::Error) -> Self {
        MergeError::Output {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Trait abstracting how a merge is performed.
///
/// Production code uses [`FileMerger`]; tests can wrap or replace it, e.g. to
/// record how many merges overlap in time.
pub trait Merger: Send + Sync {
    fn merge(&self, sources: &[PathBuf], output: &Path) -> Result<MergeStats, MergeError>;
}

/// Merger that concatenates files through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct FileMerger<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> FileMerger<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> Merger for FileMerger<F> {
    fn merge(&self, sources: &[PathBuf], output: &Path) -> Result<MergeStats, MergeError> {
        let mut out = self
            .fs
            .create(output)
            .map_err(|e| MergeError::output(output, e))?;

        let mut stats = MergeStats::default();
        let mut buf = [0u8; COPY_BUF_SIZE];

        for source in sources {
            // Each reader is dropped at the end of its iteration, on error
            // paths included.
            let mut reader = self
                .fs
                .open_read(source)
                .map_err(|e| MergeError::input(source, e))?;

            let copied = copy_stream(&mut reader, &mut out, &mut buf, source, output)?;
            trace!(source = ?source, bytes = copied, "copied source");

            stats.sources += 1;
            stats.bytes_written += copied;
        }

        out.flush().map_err(|e| MergeError::output(output, e))?;

        debug!(
            output = ?output,
            sources = stats.sources,
            bytes = stats.bytes_written,
            "merge finished"
        );
        Ok(stats)
    }
}

/// Copy `reader` to `writer`, attributing read failures to `source` and write
/// failures to `output`.
fn copy_stream(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    buf: &mut [u8],
    source: &Path,
    output: &Path,
) -> Result<u64, MergeError> {
    let mut total = 0u64;
    loop {
        let n = match reader.read(buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(MergeError::input(source, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| MergeError::output(output, e))?;
        total += n as u64;
    }
    Ok(total)
}

/// Merge `sources` into `output` on the real filesystem.
pub fn merge(sources: &[PathBuf], output: &Path) -> Result<MergeStats, MergeError> {
    FileMerger::new(crate::fs::RealFileSystem).merge(sources, output)
}
