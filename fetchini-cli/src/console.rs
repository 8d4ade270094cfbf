//! Console [`Reporter`]: one line per terminal event plus a `\r` progress line.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use fetchini_core::ProjectId;
use fetchini_sync::{Fetched, Progress, Reporter, SkipReason, TargetError};

/// Width the source URL is padded to so destinations line up.
const URL_WIDTH: usize = 70;

#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// A progress line without trailing newline is on screen.
    progress_open: AtomicBool,
    verbose_errors: bool,
}

impl ConsoleReporter {
    pub fn new(verbose_errors: bool) -> Self {
        Self {
            progress_open: AtomicBool::new(false),
            verbose_errors,
        }
    }

    /// Echo the invoking command line.
    pub fn command(&self, argv: &[String]) {
        println!("{} {}", "Command:".blue(), argv.join(" "));
    }

    /// Terminate a pending progress line.
    pub fn close_progress(&self) {
        if self.progress_open.swap(false, Ordering::SeqCst) {
            println!();
        }
    }
}

impl Reporter for ConsoleReporter {
    fn fetched(&self, event: &Fetched<'_>) {
        self.close_progress();
        println!(
            ":: {} :: {:<width$} --> {}",
            "FETCHED".green().bold(),
            event.source,
            event.destination.display(),
            width = URL_WIDTH
        );
        if let Some(backup) = event.backup {
            println!("   previous version kept at {}", backup.display());
        }
    }

    fn skipped(&self, _project: &ProjectId, source: &str, reason: SkipReason) {
        self.close_progress();
        println!(
            ":: {} :: {:<width$} ({reason})",
            "SKIPPED".yellow().bold(),
            source,
            width = URL_WIDTH
        );
    }

    fn failed(&self, project: &ProjectId, error: &TargetError) {
        self.close_progress();
        eprintln!(":: {} :: {}", "ERROR".red().bold(), project.0.magenta());
        eprintln!("{error}");
        if self.verbose_errors {
            eprintln!("{error:#?}");
        }
    }

    fn progress(&self, progress: Progress) {
        print!(
            "\r{} {}% | {}/{} files",
            "Fetching project(s) config:".blue(),
            progress.percentage(),
            progress.processed,
            progress.total
        );
        let _ = std::io::stdout().flush();
        if progress.processed >= progress.total {
            println!();
            self.progress_open.store(false, Ordering::SeqCst);
        } else {
            self.progress_open.store(true, Ordering::SeqCst);
        }
    }
}
