// src/manifest.rs

//! Source enumeration from a JSON manifest.
//!
//! The manifest is a JSON array of path strings, e.g.
//!
//! ```json
//! ["styles/reset.css", "styles/layout.css", "styles/theme.css"]
//! ```
//!
//! Order is preserved and becomes the concatenation order.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::{MergewatchError, Result};
use crate::fs::FileSystem;

/// Read the ordered list of source paths from `path`.
pub fn load_manifest(fs: &dyn FileSystem, path: &Path) -> Result<Vec<PathBuf>> {
    let contents = fs
        .read_to_string(path)
        .map_err(|e| manifest_error(path, format!("cannot read manifest: {e}")))?;

    let sources = parse_manifest(&contents)
        .map_err(|e| manifest_error(path, format!("malformed manifest: {e}")))?;

    debug!(manifest = ?path, count = sources.len(), "loaded manifest");
    Ok(sources)
}

/// Parse manifest contents into source paths.
pub fn parse_manifest(contents: &str) -> serde_json::Result<Vec<PathBuf>> {
    let raw: Vec<String> = serde_json::from_str(contents)?;
    Ok(raw.into_iter().map(PathBuf::from).collect())
}

/// Reject manifests that list the output itself; every rebuild would
/// otherwise retrigger a change on the output.
///
/// Both sides are made absolute and lexically cleaned first, so `out.css`,
/// `./out.css` and `/cwd/out.css` all name the same file. Symlinks are not
/// resolved.
pub fn ensure_output_not_listed(sources: &[PathBuf], output: &Path) -> Result<()> {
    let target = normalize(output);
    if sources.iter().any(|s| normalize(s) == target) {
        return Err(MergewatchError::ConfigError(format!(
            "output {:?} is also listed as a source",
            output
        )));
    }
    Ok(())
}

/// Absolute form of `path` with `.` dropped and `..` folded into its parent.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut clean = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    clean
}

fn manifest_error(path: &Path, reason: String) -> MergewatchError {
    MergewatchError::Manifest {
        path: path.to_path_buf(),
        reason,
    }
}
