//! # fetchini-sync
//!
//! Identity-gated atomic fetch of per-project INI files.
//!
//! Build a [`Reconciler`] from a [`fetchini_core::RemoteSource`], a
//! [`Reporter`] and the run [`fetchini_core::Settings`], then call
//! [`Reconciler::run`] with the targets from [`targets::resolve`].

pub mod backup;
pub mod decision;
pub mod error;
pub mod identity;
pub mod progress;
pub mod reconcile;
pub mod reporter;
pub mod targets;
pub mod writer;

pub use decision::{FetchDecision, FetchReason, SkipReason};
pub use error::{Cancelled, StepError, SyncError, TargetError};
pub use progress::{CancelToken, Progress, RunSummary};
pub use reconcile::{Reconciler, TargetOutcome};
pub use reporter::{Fetched, LogReporter, Reporter};
