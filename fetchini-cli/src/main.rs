//! fetchini: fetch ESGF publisher INI files from GitHub.
//!
//! # Usage
//!
//! ```text
//! fetchini [PROJECT...] [-i DIR] [-k|--keep] [-o|--overwrite] [-b none|single|versioned]
//!          [--devel] [--url API_URL] [--gh-user USER --gh-password PASS | --gh-token TOKEN]
//!          [-j JOBS] [--config FILE] [--log [DIR]] [--debug] [-q]
//! ```
//!
//! Exit status: 0 all targets succeeded, 1 at least one target failed,
//! 2 usage or setup error, 130 interrupted.

mod console;
mod fetch;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use fetch::FetchArgs;

pub const EXIT_TARGET_FAILED: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_INTERRUPTED: u8 = 130;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fetchini",
    version,
    about = "Fetch per-project ESGF configuration INI files from GitHub",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    TargetsFailed,
    Interrupted,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::TargetsFailed => ExitCode::from(EXIT_TARGET_FAILED),
            RunStatus::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.fetch.run() {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(EXIT_USAGE)
        }
    }
}
