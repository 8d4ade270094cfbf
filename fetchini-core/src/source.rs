//! Remote collaborator seam.
//!
//! The reconciliation loop only talks to the remote through [`RemoteSource`];
//! `fetchini-remote` provides the GitHub implementation and tests provide
//! in-memory fakes.

use crate::error::RemoteError;
use crate::types::{Credentials, RemoteDescriptor};

/// Read-only access to a remote file tree.
///
/// Credentials are passed on every call rather than held by the source.
pub trait RemoteSource: Send + Sync {
    /// Content identity and download location of the file at `url`.
    fn metadata(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<RemoteDescriptor, RemoteError>;

    /// Raw bytes behind a download location returned by [`metadata`](Self::metadata).
    fn content(&self, download_url: &str, auth: Option<&Credentials>)
        -> Result<Vec<u8>, RemoteError>;

    /// Names of the files in the remote directory at `url`.
    fn list(&self, url: &str, auth: Option<&Credentials>) -> Result<Vec<String>, RemoteError>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for &T {
    fn metadata(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<RemoteDescriptor, RemoteError> {
        (**self).metadata(url, auth)
    }

    fn content(
        &self,
        download_url: &str,
        auth: Option<&Credentials>,
    ) -> Result<Vec<u8>, RemoteError> {
        (**self).content(download_url, auth)
    }

    fn list(&self, url: &str, auth: Option<&Credentials>) -> Result<Vec<String>, RemoteError> {
        (**self).list(url, auth)
    }
}
