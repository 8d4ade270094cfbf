//! Atomic file replacement.
//!
//! ## `atomic_write` protocol
//!
//! 1. Ensure the parent directory exists.
//! 2. Write the bytes to `<path>.fetchini.tmp` and flush them to disk.
//! 3. Give the `.tmp` the permissions of the file it replaces, if any.
//! 4. Rename over the final path (atomic on POSIX).
//! 5. On any failure remove the `.tmp` and leave the original intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Temporary sibling used while writing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.fetchini.tmp", path.display()))
}

/// Replace the contents of `path` with `content` in one rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content, &tmp_path(path))
}

pub(crate) fn atomic_write_with_tmp(
    path: &Path,
    content: &[u8],
    tmp: &Path,
) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }

    if let Err(e) = write_synced(tmp, content, path) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(tmp, e));
    }

    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

fn write_synced(tmp: &Path, content: &[u8], replaced: &Path) -> std::io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(content)?;
    file.sync_all()?;
    if let Ok(existing) = fs::metadata(replaced) {
        fs::set_permissions(tmp, existing.permissions())?;
    }
    Ok(())
}
