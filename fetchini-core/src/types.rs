//! Domain types for fetchini.
//!
//! Every filesystem location is a `PathBuf`; every identifier that crosses a
//! crate boundary gets a newtype.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A project identifier, e.g. `cmip6`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Content identity of a file: lowercase hex git blob SHA-1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIdentity(pub String);

impl ContentIdentity {
    /// Build an identity, normalising hex case.
    pub fn new(hex: impl AsRef<str>) -> Self {
        Self(hex.as_ref().trim().to_ascii_lowercase())
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-target metadata returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub identity: ContentIdentity,
    pub download_url: String,
}

// ---------------------------------------------------------------------------
// File pattern
// ---------------------------------------------------------------------------

/// Default INI filename template.
pub const DEFAULT_FILE_PATTERN: &str = "esg.{}.ini";

const PLACEHOLDER: &str = "{}";

/// Filename template with exactly one `{}` placeholder for the project id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePattern {
    prefix: String,
    suffix: String,
}

impl FilePattern {
    /// Parse a template such as `esg.{}.ini`.
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        if template.matches(PLACEHOLDER).count() != 1 {
            return Err(ConfigError::InvalidPattern {
                pattern: template.to_owned(),
            });
        }
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .ok_or_else(|| ConfigError::InvalidPattern {
                pattern: template.to_owned(),
            })?;
        Ok(Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        })
    }

    /// Filename for `project`.
    pub fn render(&self, project: &ProjectId) -> String {
        format!("{}{}{}", self.prefix, project.0, self.suffix)
    }

    /// Recover the project id from a filename produced by [`render`](Self::render).
    pub fn extract(&self, filename: &str) -> Option<ProjectId> {
        let rest = filename.strip_prefix(&self.prefix)?;
        let id = rest.strip_suffix(&self.suffix)?;
        if id.is_empty() {
            return None;
        }
        Some(ProjectId::from(id))
    }

    /// Full local path for `project` under `dir`.
    pub fn local_path(&self, dir: &Path, project: &ProjectId) -> PathBuf {
        dir.join(self.render(project))
    }
}

impl Default for FilePattern {
    fn default() -> Self {
        Self {
            prefix: "esg.".to_owned(),
            suffix: ".ini".to_owned(),
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PLACEHOLDER}{}", self.prefix, self.suffix)
    }
}

impl TryFrom<String> for FilePattern {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<FilePattern> for String {
    fn from(p: FilePattern) -> Self {
        p.to_string()
    }
}

// ---------------------------------------------------------------------------
// Policy enums
// ---------------------------------------------------------------------------

/// How the previous local file is preserved before it is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackupMode {
    /// Replace without keeping a copy.
    #[default]
    None,
    /// Keep exactly one previous version next to the file (`<file>.bkp`).
    Single,
    /// Keep every previous version, timestamped, under `bkp/`.
    Versioned,
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::None => write!(f, "none"),
            BackupMode::Single => write!(f, "single"),
            BackupMode::Versioned => write!(f, "versioned"),
        }
    }
}

impl FromStr for BackupMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "single" | "one_version" => Ok(Self::Single),
            "versioned" | "keep_versions" => Ok(Self::Versioned),
            other => Err(ConfigError::InvalidBackupMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Overrides applied on top of the identity comparison.
///
/// `overwrite` wins over `keep` when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchPolicy {
    pub keep: bool,
    pub overwrite: bool,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Credentials passed explicitly to every remote call.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { user: String, password: String },
    Token(String),
}

impl Credentials {
    /// Value for the HTTP `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Credentials::Basic { user, password } => {
                let raw = format!("{user}:{password}");
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(raw)
                )
            }
            Credentials::Token(token) => format!("token {token}"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"***")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}
