#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory holding source files, a manifest and an output path.
///
/// Files are written in the order they are added, which is also the order
/// they appear in the manifest.
pub struct SourceTree {
    dir: TempDir,
    sources: Vec<PathBuf>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create source dir");
        }
        fs::write(&path, content).expect("failed to write source");
        self.sources.push(path);
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn sources(&self) -> Vec<PathBuf> {
        self.sources.clone()
    }

    pub fn source(&self, index: usize) -> &Path {
        &self.sources[index]
    }

    /// Default output location inside the tree (not created).
    pub fn output(&self) -> PathBuf {
        self.dir.path().join("merged.out")
    }

    /// Write a JSON manifest listing the sources and return its path.
    pub fn write_manifest(&self) -> PathBuf {
        let path = self.dir.path().join("list.json");
        let entries: Vec<String> = self
            .sources
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let json = serde_json::to_string_pretty(&entries).expect("failed to encode manifest");
        fs::write(&path, json).expect("failed to write manifest");
        path
    }

    /// Concatenation of the current source contents, in order.
    pub fn expected_output(&self) -> Vec<u8> {
        let mut expected = Vec::new();
        for source in &self.sources {
            expected.extend(fs::read(source).expect("failed to read source"));
        }
        expected
    }

    pub fn append(&self, index: usize, content: impl AsRef<[u8]>) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.sources[index])
            .expect("failed to open source for append");
        file.write_all(content.as_ref()).expect("failed to append to source");
    }

    pub fn remove(&self, index: usize) {
        fs::remove_file(&self.sources[index]).expect("failed to remove source");
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}
