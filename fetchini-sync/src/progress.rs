//! Run-level accounting: processed counter, aggregate error flag, cancel token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fetchini_core::ProjectId;

use crate::error::Cancelled;

/// Snapshot of how far the batch has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    /// `floor(processed * 100 / total)`; an empty batch is complete.
    pub fn percentage(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        self.processed * 100 / self.total
    }
}

/// Mutable state shared by every target of a run.
///
/// `errored` only ever goes from `false` to `true`.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub failed: Vec<ProjectId>,
    errored: bool,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// True if at least one target failed.
    pub fn errored(&self) -> bool {
        self.errored
    }

    pub fn progress(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
        }
    }

    pub(crate) fn record_fetched(&mut self) {
        self.fetched += 1;
        self.processed += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.skipped += 1;
        self.processed += 1;
    }

    pub(crate) fn record_failed(&mut self, project: &ProjectId) {
        self.failed.push(project.clone());
        self.errored = true;
        self.processed += 1;
    }
}

/// Shared interrupt flag, tripped from a signal handler and polled by workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_floors() {
        let p = |processed, total| Progress { processed, total }.percentage();
        assert_eq!(p(1, 3), 33);
        assert_eq!(p(2, 3), 66);
        assert_eq!(p(3, 3), 100);
        assert_eq!(p(0, 0), 100);
    }

    #[test]
    fn error_flag_is_sticky() {
        let mut summary = RunSummary::new(3);
        summary.record_failed(&ProjectId::from("a"));
        summary.record_fetched();
        summary.record_skipped();
        assert!(summary.errored());
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.failed, vec![ProjectId::from("a")]);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert_eq!(token.check(), Err(Cancelled));
    }
}
