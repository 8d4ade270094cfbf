//! The decide-fetch-backup-write loop.
//!
//! Per target:
//! 1. Resolve remote URL and local path from the settings.
//! 2. Fetch remote metadata (identity + download URL).
//! 3. [`decide`], hashing the local file only when the policy leaves it open.
//! 4. Skip, or: back up the existing file, download, check the downloaded
//!    bytes against the remote identity, atomically write.
//! 5. Record the outcome and emit a progress tick.
//!
//! A failing target is reported and counted; the batch always continues.
//! Only [`Cancelled`] leaves the loop early.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fetchini_core::{Credentials, FetchPolicy, ProjectId, RemoteSource, Settings};

use crate::backup;
use crate::decision::{decide, FetchDecision, FetchReason, SkipReason};
use crate::error::{Cancelled, StepError, TargetError};
use crate::identity;
use crate::progress::{CancelToken, RunSummary};
use crate::reporter::{Fetched, Reporter};
use crate::writer;

/// What happened to a target that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Fetched {
        source: String,
        destination: PathBuf,
        backup: Option<PathBuf>,
        reason: FetchReason,
    },
    Skipped {
        source: String,
        reason: SkipReason,
    },
}

/// Reconciles local INI files against a [`RemoteSource`].
pub struct Reconciler<S, R> {
    source: S,
    reporter: R,
    settings: Settings,
    policy: FetchPolicy,
    auth: Option<Credentials>,
    cancel: CancelToken,
}

impl<S: RemoteSource, R: Reporter> Reconciler<S, R> {
    pub fn new(source: S, reporter: R, settings: Settings) -> Self {
        Self {
            source,
            reporter,
            settings,
            policy: FetchPolicy::default(),
            auth: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_credentials(mut self, auth: Option<Credentials>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Process every target exactly once.
    ///
    /// Runs inline when `settings.jobs == 1`, otherwise on a scoped worker
    /// pool pulling targets from a shared cursor.
    pub fn run(&self, targets: &[ProjectId]) -> Result<RunSummary, Cancelled> {
        let cursor = AtomicUsize::new(0);
        let state = Mutex::new(RunSummary::new(targets.len()));
        let workers = self.settings.jobs.clamp(1, targets.len().max(1));

        if workers == 1 {
            self.worker(targets, &cursor, &state)?;
        } else {
            tracing::debug!("reconciling {} targets on {workers} workers", targets.len());
            let (shared_cursor, shared_state) = (&cursor, &state);
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        scope.spawn(move || self.worker(targets, shared_cursor, shared_state))
                    })
                    .collect();
                let mut result = Ok(());
                for handle in handles {
                    match handle.join() {
                        Ok(Ok(())) => {}
                        Ok(Err(cancelled)) => result = Err(cancelled),
                        Err(payload) => panic::resume_unwind(payload),
                    }
                }
                result
            })?;
        }

        Ok(state.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn worker(
        &self,
        targets: &[ProjectId],
        cursor: &AtomicUsize,
        state: &Mutex<RunSummary>,
    ) -> Result<(), Cancelled> {
        loop {
            self.cancel.check()?;
            let index = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(project) = targets.get(index) else {
                return Ok(());
            };

            let result = match self.guarded(project) {
                Ok(outcome) => Ok(outcome),
                Err(StepError::Failed(err)) => Err(err),
                Err(StepError::Cancelled(cancelled)) => {
                    // Stop the other workers too.
                    self.cancel.cancel();
                    return Err(cancelled);
                }
            };

            let mut summary = lock(state);
            match &result {
                Ok(TargetOutcome::Fetched {
                    source,
                    destination,
                    backup,
                    reason,
                }) => {
                    summary.record_fetched();
                    self.reporter.fetched(&Fetched {
                        project,
                        source,
                        destination,
                        backup: backup.as_deref(),
                        reason: *reason,
                    });
                }
                Ok(TargetOutcome::Skipped { source, reason }) => {
                    summary.record_skipped();
                    self.reporter.skipped(project, source, *reason);
                }
                Err(err) => {
                    summary.record_failed(project);
                    tracing::debug!("{project}: {err:?}");
                    self.reporter.failed(project, err);
                }
            }
            self.reporter.progress(summary.progress());
        }
    }

    /// [`reconcile_target`](Self::reconcile_target) with panics turned into
    /// a per-target failure.
    fn guarded(&self, project: &ProjectId) -> Result<TargetOutcome, StepError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.reconcile_target(project))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic with non-string payload".to_owned());
                Err(TargetError::Panicked(message).into())
            },
        )
    }

    /// Decide, back up, fetch and write a single target.
    pub fn reconcile_target(&self, project: &ProjectId) -> Result<TargetOutcome, StepError> {
        let source = self.settings.remote_file_url(project);
        let destination = self.settings.local_path(project);
        let auth = self.auth.as_ref();

        let remote = self
            .source
            .metadata(&source, auth)
            .map_err(TargetError::Metadata)?;
        self.cancel.check()?;

        let local_exists = destination.is_file();
        let decision = decide(local_exists, &remote.identity, self.policy, || {
            identity::file_identity(&destination)
        })
        .map_err(TargetError::Local)?;
        tracing::debug!(
            "{project}: local {} remote={} -> {decision:?}",
            if local_exists { "present" } else { "absent" },
            remote.identity
        );

        let reason = match decision {
            FetchDecision::Skip(reason) => return Ok(TargetOutcome::Skipped { source, reason }),
            FetchDecision::Fetch(reason) => reason,
        };

        let backup = if local_exists {
            backup::backup(&destination, self.settings.backup).map_err(|e| {
                TargetError::Backup {
                    path: destination.clone(),
                    source: e,
                }
            })?
        } else {
            None
        };
        self.cancel.check()?;

        let content = self
            .source
            .content(&remote.download_url, auth)
            .map_err(TargetError::Content)?;
        self.cancel.check()?;

        let downloaded = identity::git_blob_identity(&content);
        if downloaded != remote.identity {
            return Err(TargetError::Mismatch {
                expected: remote.identity,
                actual: downloaded,
            }
            .into());
        }

        writer::atomic_write(&destination, &content).map_err(TargetError::Write)?;

        Ok(TargetOutcome::Fetched {
            source,
            destination,
            backup,
            reason,
        })
    }
}

fn lock(state: &Mutex<RunSummary>) -> MutexGuard<'_, RunSummary> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
