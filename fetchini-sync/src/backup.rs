//! Preserve the previous local file before it is replaced.
//!
//! | mode        | artifact                                   |
//! |-------------|--------------------------------------------|
//! | `none`      | nothing                                    |
//! | `single`    | `<file>.bkp`, replacing any earlier backup |
//! | `versioned` | `bkp/<file>.<YYYYmmdd-HHMMSS>[-n]`         |
//!
//! Backups are copies, never renames: the primary file stays in place until
//! the atomic writer replaces it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use fetchini_core::BackupMode;

use crate::error::{io_err, SyncError};
use crate::writer;

/// Extension appended for [`BackupMode::Single`].
pub const SINGLE_EXTENSION: &str = "bkp";

/// Directory (sibling of the file) holding [`BackupMode::Versioned`] copies.
pub const VERSIONED_DIR: &str = "bkp";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Back up `path` according to `mode`, stamping versioned copies with now.
///
/// Returns the backup location, or `None` if nothing was kept.
pub fn backup(path: &Path, mode: BackupMode) -> Result<Option<PathBuf>, SyncError> {
    backup_at(path, mode, Utc::now())
}

/// [`backup`] with an explicit timestamp.
pub fn backup_at(
    path: &Path,
    mode: BackupMode,
    now: DateTime<Utc>,
) -> Result<Option<PathBuf>, SyncError> {
    if !path.is_file() {
        return Ok(None);
    }
    let dst = match mode {
        BackupMode::None => return Ok(None),
        BackupMode::Single => single_path(path),
        BackupMode::Versioned => next_versioned_path(path, now),
    };

    let content = std::fs::read(path).map_err(|e| io_err(path, e))?;
    writer::atomic_write(&dst, &content)?;
    tracing::info!("backed up {} -> {}", path.display(), dst.display());
    Ok(Some(dst))
}

/// `<file>.bkp`
pub fn single_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.{SINGLE_EXTENSION}", path.display()))
}

/// `<dir>/bkp/`
pub fn versioned_dir(path: &Path) -> PathBuf {
    path.parent()
        .unwrap_or_else(|| Path::new("."))
        .join(VERSIONED_DIR)
}

fn next_versioned_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let dir = versioned_dir(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = format!("{name}.{}", now.format(TIMESTAMP_FORMAT));

    let candidate = dir.join(&stem);
    if !candidate.exists() {
        return candidate;
    }
    // Several backups within the same second.
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    fn seed(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("esg.cmip6.ini");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn none_mode_keeps_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = seed(&tmp, "v1");
        assert_eq!(backup_at(&path, BackupMode::None, fixed_now()).unwrap(), None);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_not_backed_up() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("esg.absent.ini");
        assert_eq!(
            backup_at(&path, BackupMode::Versioned, fixed_now()).unwrap(),
            None
        );
        assert!(!versioned_dir(&path).exists());
    }

    #[test]
    fn single_mode_keeps_exactly_one_previous_version() {
        let tmp = TempDir::new().unwrap();
        let path = seed(&tmp, "v1");
        let first = backup_at(&path, BackupMode::Single, fixed_now())
            .unwrap()
            .unwrap();
        assert_eq!(first, tmp.path().join("esg.cmip6.ini.bkp"));

        fs::write(&path, "v2").unwrap();
        let second = backup_at(&path, BackupMode::Single, fixed_now())
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "v2");
        // Original untouched by the copy.
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn versioned_mode_stamps_copies() {
        let tmp = TempDir::new().unwrap();
        let path = seed(&tmp, "v1");
        let dst = backup_at(&path, BackupMode::Versioned, fixed_now())
            .unwrap()
            .unwrap();
        assert_eq!(
            dst,
            tmp.path().join("bkp").join("esg.cmip6.ini.20240301-123005")
        );
        assert_eq!(fs::read_to_string(&dst).unwrap(), "v1");
    }

    #[test]
    fn versioned_mode_never_overwrites_within_same_second() {
        let tmp = TempDir::new().unwrap();
        let path = seed(&tmp, "v1");
        let a = backup_at(&path, BackupMode::Versioned, fixed_now())
            .unwrap()
            .unwrap();
        fs::write(&path, "v2").unwrap();
        let b = backup_at(&path, BackupMode::Versioned, fixed_now())
            .unwrap()
            .unwrap();
        fs::write(&path, "v3").unwrap();
        let c = backup_at(&path, BackupMode::Versioned, fixed_now())
            .unwrap()
            .unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(b.to_string_lossy().ends_with("-1"));
        assert!(c.to_string_lossy().ends_with("-2"));
        assert_eq!(fs::read_to_string(&a).unwrap(), "v1");
        assert_eq!(fs::read_to_string(&b).unwrap(), "v2");
        assert_eq!(fs::read_to_string(&c).unwrap(), "v3");
    }

    #[test]
    fn versioned_dir_blocked_by_file_fails() {
        let tmp = TempDir::new().unwrap();
        let path = seed(&tmp, "v1");
        fs::write(tmp.path().join(VERSIONED_DIR), "not a dir").unwrap();
        assert!(backup_at(&path, BackupMode::Versioned, fixed_now()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "v1");
    }
}
