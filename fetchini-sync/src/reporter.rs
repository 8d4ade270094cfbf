//! Injected status sink for the reconciliation loop.

use std::path::Path;
use std::sync::Arc;

use fetchini_core::ProjectId;

use crate::decision::{FetchReason, SkipReason};
use crate::error::TargetError;
use crate::progress::Progress;

/// Receives one terminal event per target plus a progress tick after each.
///
/// Calls are serialised by the loop, so implementations need no locking of
/// their own to keep lines intact.
pub trait Reporter: Send + Sync {
    fn fetched(&self, event: &Fetched<'_>);

    fn skipped(&self, project: &ProjectId, source: &str, reason: SkipReason);

    fn failed(&self, project: &ProjectId, error: &TargetError);

    fn progress(&self, progress: Progress);
}

/// Details of a successful write.
#[derive(Debug, Clone, Copy)]
pub struct Fetched<'a> {
    pub project: &'a ProjectId,
    pub source: &'a str,
    pub destination: &'a Path,
    pub backup: Option<&'a Path>,
    pub reason: FetchReason,
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn fetched(&self, event: &Fetched<'_>) {
        (**self).fetched(event)
    }

    fn skipped(&self, project: &ProjectId, source: &str, reason: SkipReason) {
        (**self).skipped(project, source, reason)
    }

    fn failed(&self, project: &ProjectId, error: &TargetError) {
        (**self).failed(project, error)
    }

    fn progress(&self, progress: Progress) {
        (**self).progress(progress)
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn fetched(&self, event: &Fetched<'_>) {
        (**self).fetched(event)
    }

    fn skipped(&self, project: &ProjectId, source: &str, reason: SkipReason) {
        (**self).skipped(project, source, reason)
    }

    fn failed(&self, project: &ProjectId, error: &TargetError) {
        (**self).failed(project, error)
    }

    fn progress(&self, progress: Progress) {
        (**self).progress(progress)
    }
}

/// Reporter that only logs; used when no console output is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn fetched(&self, event: &Fetched<'_>) {
        tracing::info!(
            "fetched ({}): {} --> {}",
            event.reason,
            event.source,
            event.destination.display()
        );
    }

    fn skipped(&self, project: &ProjectId, source: &str, reason: SkipReason) {
        tracing::info!("skipped {project} ({reason}): {source}");
    }

    fn failed(&self, project: &ProjectId, error: &TargetError) {
        tracing::error!("{project}: {error}");
    }

    fn progress(&self, progress: Progress) {
        tracing::debug!(
            "{}% | {}/{}",
            progress.percentage(),
            progress.processed,
            progress.total
        );
    }
}
