//! Error types for fetchini-core.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("file pattern '{pattern}' must contain exactly one '{{}}' placeholder")]
    InvalidPattern { pattern: String },

    #[error("unknown backup mode '{value}'; expected: none, single, versioned")]
    InvalidBackupMode { value: String },

    #[error("jobs must be at least 1")]
    InvalidJobs,

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,
}

/// Failures of the remote metadata/content/listing calls.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("remote file not found: {url}")]
    NotFound { url: String },

    #[error("authentication rejected by {url}")]
    Unauthorized { url: String },

    #[error("API rate limit exceeded{}", reset_suffix(.reset))]
    RateLimited { reset: Option<DateTime<Utc>> },

    #[error("unexpected HTTP {code} from {url}")]
    Status { code: u16, url: String },

    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The body exceeded the download cap; nothing is returned.
    #[error("response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("failed reading response body from {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

fn reset_suffix(reset: &Option<DateTime<Utc>>) -> String {
    reset
        .map(|at| format!(" (resets at {})", at.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_default()
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
