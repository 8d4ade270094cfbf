//! fetchini core library: domain types, settings file, remote seam, errors.
//!
//! - [`types`]: newtypes, file pattern, backup mode, credentials
//! - [`config`]: YAML settings load
//! - [`source`]: the [`RemoteSource`] trait
//! - [`error`]: [`ConfigError`], [`RemoteError`]

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::Settings;
pub use error::{ConfigError, RemoteError};
pub use source::RemoteSource;
pub use types::{
    BackupMode, ContentIdentity, Credentials, FetchPolicy, FilePattern, ProjectId,
    RemoteDescriptor,
};
