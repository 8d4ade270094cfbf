//! Content identity: the git blob SHA-1 the GitHub contents API reports as
//! `sha`, so a local file can be compared without downloading the remote one.

use std::path::Path;

use sha1::{Digest, Sha1};

use fetchini_core::ContentIdentity;

use crate::error::{io_err, SyncError};

/// Git blob hash of `bytes`: `sha1("blob <len>\0" ++ bytes)`.
pub fn git_blob_identity(bytes: &[u8]) -> ContentIdentity {
    let mut h = Sha1::new();
    h.update(format!("blob {}\0", bytes.len()).as_bytes());
    h.update(bytes);
    ContentIdentity(hex::encode(h.finalize()))
}

/// Identity of the file at `path`. Reads the whole file.
pub fn file_identity(path: &Path) -> Result<ContentIdentity, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(git_blob_identity(&bytes))
}
