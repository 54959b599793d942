// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::types::FileSnapshot;

pub mod mock;

/// Abstract filesystem interface.
///
/// Everything returns `io::Result` so that callers can tell not-found from
/// permission problems from other I/O failures.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Open `path` for writing, creating it or truncating existing content.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Size and modification time of `path`.
    fn snapshot(&self, path: &Path) -> io::Result<FileSnapshot>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let file = fs::File::create(path)?;
        Ok(Box::new(file))
    }

    fn snapshot(&self, path: &Path) -> io::Result<FileSnapshot> {
        let meta = fs::metadata(path)?;
        Ok(FileSnapshot::from_metadata(&meta))
    }
}
