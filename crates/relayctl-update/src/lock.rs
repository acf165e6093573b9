//! Advisory update lock
//!
//! One update run at a time per host. The lock file sits next to the
//! version manifest and is held from drain through restart.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock released on drop
#[derive(Debug)]
pub struct UpdateLock {
    _file: File,
    path: PathBuf,
}

impl UpdateLock {
    /// Lock file path for a manifest (`versions.json` -> `versions.lock`)
    pub fn path_for(manifest: &Path) -> PathBuf {
        manifest.with_extension("lock")
    }

    /// Block until the lock for `manifest` is held
    pub fn acquire(manifest: &Path) -> Result<Self> {
        let path = Self::path_for(manifest);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open update lock {}", path.display()))?;

        // Released when `file` is dropped
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire update lock {}", path.display()))?;

        debug!("Holding update lock {}", path.display());
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
