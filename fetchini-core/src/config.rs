//! YAML settings file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.fetchini/
//!   config.yaml
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Every key is optional; a missing file yields [`Settings::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{BackupMode, FilePattern, ProjectId};

/// GitHub contents-API directory holding the publisher INI files.
pub const DEFAULT_API_URL: &str =
    "https://api.github.com/repos/ESGF/config/contents/publisher-configs/ini";

/// Branch used unless `--devel` is given.
pub const DEFAULT_GIT_REF: &str = "master";

/// Branch selected by `--devel`.
pub const DEVEL_GIT_REF: &str = "devel";

/// Local directory the INI files are written to.
pub const DEFAULT_CONFIG_DIR: &str = "/esg/config/esgcet";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_url: String,
    pub git_ref: String,
    pub config_dir: PathBuf,
    pub file_pattern: FilePattern,
    pub backup: BackupMode,
    pub projects: Vec<ProjectId>,
    pub jobs: usize,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            git_ref: DEFAULT_GIT_REF.to_owned(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            file_pattern: FilePattern::default(),
            backup: BackupMode::default(),
            projects: Vec::new(),
            jobs: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Remote URL of the file for `project`, pinned to the configured ref.
    pub fn remote_file_url(&self, project: &ProjectId) -> String {
        format!(
            "{}/{}?ref={}",
            self.api_url.trim_end_matches('/'),
            self.file_pattern.render(project),
            self.git_ref
        )
    }

    /// Remote URL of the directory listing, pinned to the configured ref.
    pub fn remote_dir_url(&self) -> String {
        format!("{}?ref={}", self.api_url.trim_end_matches('/'), self.git_ref)
    }

    /// Local path of the file for `project`.
    pub fn local_path(&self, project: &ProjectId) -> PathBuf {
        self.file_pattern.local_path(&self.config_dir, project)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }
        Ok(())
    }
}

/// `<home>/.fetchini/config.yaml` (pure, no I/O).
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".fetchini").join("config.yaml")
}

/// Load settings from an explicit file.
///
/// Returns defaults if the file does not exist,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
    settings.validate()?;
    Ok(settings)
}

/// Load `<home>/.fetchini/config.yaml`.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    load_from(&settings_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
