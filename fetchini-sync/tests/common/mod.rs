#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use fetchini_core::{Credentials, ProjectId, RemoteDescriptor, RemoteError, RemoteSource, Settings};
use fetchini_sync::{
    identity::git_blob_identity, CancelToken, Fetched, Progress, Reporter, SkipReason,
    TargetError,
};

/// In-memory remote keyed by file name (`esg.<project>.ini`).
#[derive(Default)]
pub struct FakeSource {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    broken_metadata: Mutex<HashSet<String>>,
    broken_content: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    tampered: Mutex<HashSet<String>>,
    cancel_on: Mutex<Option<(String, CancelToken)>>,
    pub metadata_calls: AtomicUsize,
    pub content_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: &str, content: &str) -> Self {
        self.set_project(project, content);
        self
    }

    pub fn set_project(&self, project: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(file_name_for(project), content.as_bytes().to_vec());
    }

    pub fn fail_metadata(&self, project: &str) {
        self.broken_metadata
            .lock()
            .unwrap()
            .insert(file_name_for(project));
    }

    pub fn fail_content(&self, project: &str) {
        self.broken_content
            .lock()
            .unwrap()
            .insert(file_name_for(project));
    }

    /// Serve content that no longer matches the announced identity.
    pub fn tamper_content(&self, project: &str) {
        self.tampered.lock().unwrap().insert(file_name_for(project));
    }

    pub fn panic_on(&self, project: &str) {
        self.panicking.lock().unwrap().insert(file_name_for(project));
    }

    /// Trip `token` while serving metadata for `project`.
    pub fn cancel_during(&self, project: &str, token: CancelToken) {
        *self.cancel_on.lock().unwrap() = Some((file_name_for(project), token));
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }
}

fn file_name_for(project: &str) -> String {
    format!("esg.{project}.ini")
}

fn file_name_of(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_owned()
}

impl RemoteSource for FakeSource {
    fn metadata(
        &self,
        url: &str,
        _auth: Option<&Credentials>,
    ) -> Result<RemoteDescriptor, RemoteError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let name = file_name_of(url);
        if let Some((target, token)) = self.cancel_on.lock().unwrap().as_ref() {
            if *target == name {
                token.cancel();
            }
        }
        if self.panicking.lock().unwrap().contains(&name) {
            panic!("fake source exploded on {name}");
        }
        if self.broken_metadata.lock().unwrap().contains(&name) {
            return Err(RemoteError::Status {
                code: 500,
                url: url.to_owned(),
            });
        }
        let files = self.files.lock().unwrap();
        let Some(content) = files.get(&name) else {
            return Err(RemoteError::NotFound {
                url: url.to_owned(),
            });
        };
        Ok(RemoteDescriptor {
            identity: git_blob_identity(content),
            download_url: format!("mem://raw/{name}"),
        })
    }

    fn content(
        &self,
        download_url: &str,
        _auth: Option<&Credentials>,
    ) -> Result<Vec<u8>, RemoteError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        let name = file_name_of(download_url);
        if self.broken_content.lock().unwrap().contains(&name) {
            return Err(RemoteError::Transport {
                url: download_url.to_owned(),
                message: "connection reset".to_owned(),
            });
        }
        let mut content = self
            .files
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound {
                url: download_url.to_owned(),
            })?;
        if self.tampered.lock().unwrap().contains(&name) {
            content.extend_from_slice(b"; trailing garbage\n");
        }
        Ok(content)
    }

    fn list(&self, _url: &str, _auth: Option<&Credentials>) -> Result<Vec<String>, RemoteError> {
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Fetched {
        project: ProjectId,
        destination: PathBuf,
        backup: Option<PathBuf>,
    },
    Skipped {
        project: ProjectId,
        reason: SkipReason,
    },
    Failed {
        project: ProjectId,
        message: String,
    },
    Progress(Progress),
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<Progress> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn terminal(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Progress(_)))
            .collect()
    }

    pub fn failed(&self) -> Vec<ProjectId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Failed { project, .. } => Some(project),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn fetched(&self, event: &Fetched<'_>) {
        self.events.lock().unwrap().push(Event::Fetched {
            project: event.project.clone(),
            destination: event.destination.to_path_buf(),
            backup: event.backup.map(Path::to_path_buf),
        });
    }

    fn skipped(&self, project: &ProjectId, _source: &str, reason: SkipReason) {
        self.events.lock().unwrap().push(Event::Skipped {
            project: project.clone(),
            reason,
        });
    }

    fn failed(&self, project: &ProjectId, error: &TargetError) {
        self.events.lock().unwrap().push(Event::Failed {
            project: project.clone(),
            message: error.to_string(),
        });
    }

    fn progress(&self, progress: Progress) {
        self.events.lock().unwrap().push(Event::Progress(progress));
    }
}

pub fn settings_for(config_dir: &Path) -> Settings {
    Settings {
        api_url: "mem://ini".to_owned(),
        config_dir: config_dir.to_path_buf(),
        ..Settings::default()
    }
}

pub fn ids(names: &[&str]) -> Vec<ProjectId> {
    names.iter().map(|n| ProjectId::from(*n)).collect()
}

pub fn ini_path(config_dir: &Path, project: &str) -> PathBuf {
    config_dir.join(file_name_for(project))
}
