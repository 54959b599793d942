// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::FileSnapshot;

#[derive(Debug, Clone)]
struct MockEntry {
    content: Vec<u8>,
    modified: SystemTime,
    denied: bool,
}

/// In-memory filesystem with a logical modification clock.
///
/// Every mutation advances the clock by one millisecond, so two successive
/// writes always produce distinct modification times.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    clock: Arc<AtomicU64>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> SystemTime {
        let ms = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        UNIX_EPOCH + Duration::from_millis(ms)
    }

    /// Create or replace a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let modified = self.tick();
        self.lock().insert(
            path.as_ref().to_path_buf(),
            MockEntry {
                content: content.into(),
                modified,
                denied: false,
            },
        );
    }

    /// Append bytes to an existing file (or create it).
    pub fn append(&self, path: impl AsRef<Path>, content: &[u8]) {
        let modified = self.tick();
        let mut files = self.lock();
        let entry = files
            .entry(path.as_ref().to_path_buf())
            .or_insert_with(|| MockEntry {
                content: Vec::new(),
                modified,
                denied: false,
            });
        entry.content.extend_from_slice(content);
        entry.modified = modified;
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.lock().remove(path.as_ref());
    }

    /// Make every subsequent access to `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        if let Some(entry) = self.lock().get_mut(path.as_ref()) {
            entry.denied = true;
        }
    }

    /// Current bytes of `path`, bypassing permission checks.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().get(path.as_ref()).map(|e| e.content.clone())
    }

    fn entry(&self, path: &Path) -> io::Result<MockEntry> {
        match self.lock().get(path) {
            Some(entry) if entry.denied => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            )),
            Some(entry) => Ok(entry.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }
}

/// Writer handed out by [`MockFileSystem::create`]; bytes land in the shared
/// map as soon as they are written, so partial output stays observable.
struct MockWriter {
    fs: MockFileSystem,
    path: PathBuf,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.fs.entry(&self.path)?;
        self.fs.append(&self.path, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let entry = self.entry(path)?;
        String::from_utf8(entry.content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let entry = self.entry(path)?;
        Ok(Box::new(Cursor::new(entry.content)))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        if let Err(e) = self.entry(path) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e);
            }
        }
        self.add_file(path, Vec::new());
        Ok(Box::new(MockWriter {
            fs: self.clone(),
            path: path.to_path_buf(),
        }))
    }

    fn snapshot(&self, path: &Path) -> io::Result<FileSnapshot> {
        let entry = self.entry(path)?;
        Ok(FileSnapshot::new(entry.content.len() as u64, Some(entry.modified)))
    }
}
