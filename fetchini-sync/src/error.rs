//! Error types for fetchini-sync.

use std::path::PathBuf;

use thiserror::Error;

use fetchini_core::{ContentIdentity, RemoteError};

/// Local filesystem failures (hashing, backup, write).
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single target failed. Recorded, never propagated past the loop.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("metadata request failed: {0}")]
    Metadata(#[source] RemoteError),

    #[error("content download failed: {0}")]
    Content(#[source] RemoteError),

    #[error("could not read local file: {0}")]
    Local(#[source] SyncError),

    /// The previous file could not be preserved; the file was left untouched.
    #[error("backup of {path} failed, file left untouched: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: SyncError,
    },

    /// Downloaded bytes do not hash to the identity the metadata announced.
    /// Nothing is written, so the next run retries.
    #[error("downloaded content hashes to {actual}, remote reported {expected}")]
    Mismatch {
        expected: ContentIdentity,
        actual: ContentIdentity,
    },

    #[error("write failed: {0}")]
    Write(#[source] SyncError),

    /// A panic caught at the per-target boundary.
    #[error("unexpected failure: {0}")]
    Panicked(String),
}

/// The user interrupted the run. Unwinds the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run cancelled by user")]
pub struct Cancelled;

/// Result of one step inside a target: either the target fails on its own,
/// or the whole run is cancelled.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Failed(#[from] TargetError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
