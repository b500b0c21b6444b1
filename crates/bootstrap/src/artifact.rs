//! Raw artifact I/O inside node directories.
//!
//! Pure mechanics, no policy: every write compares against existing
//! content first so that re-running distribution with unchanged inputs
//! touches nothing. All failures carry the offending path.

use crate::error::{BootstrapError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File read/write helpers for the bootstrapper.
pub struct ArtifactStore;

impl ArtifactStore {
    /// Read a file fully into memory.
    pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| BootstrapError::io(path, e))
    }

    /// Write `bytes` to `path` unconditionally.
    pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|e| BootstrapError::io(path, e))
    }

    /// Write `bytes` to `path` only when the current content differs.
    ///
    /// Returns whether a write happened.
    pub fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<bool> {
        if path.exists() && Self::read_bytes(path)? == bytes {
            return Ok(false);
        }
        Self::write_bytes(path, bytes)?;
        Ok(true)
    }

    /// Copy `src` to `dst` only when the target content differs.
    pub fn copy_if_changed(src: &Path, dst: &Path) -> Result<bool> {
        let bytes = Self::read_bytes(src)?;
        Self::write_if_changed(dst, &bytes)
    }

    /// Create a directory (and parents) if it does not exist.
    pub fn ensure_dir(path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| BootstrapError::io(path, e))
    }

    /// Move a file, replacing any existing target.
    pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst).map_err(|e| BootstrapError::io(src, e))
    }

    /// Immediate children of a directory, sorted by file name.
    pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| BootstrapError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BootstrapError::io(dir, e))?;
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }
}
