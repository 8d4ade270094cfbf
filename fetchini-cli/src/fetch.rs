//! `fetchini`: resolve settings and targets, then run the reconciliation loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fetchini_core::{
    config::{self, DEVEL_GIT_REF},
    BackupMode, Credentials, FetchPolicy, ProjectId, Settings,
};
use fetchini_remote::GithubClient;
use fetchini_sync::{targets, CancelToken, LogReporter, Reconciler, Reporter, RunSummary};

use crate::console::ConsoleReporter;
use crate::RunStatus;

/// Arguments for `fetchini`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Projects to fetch. Defaults to `projects` in the settings file, then
    /// to every INI file found remotely.
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// Directory the INI files are written to.
    #[arg(short = 'i', long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Never replace an existing local file.
    #[arg(short = 'k', long)]
    pub keep: bool,

    /// Always replace local files, even when identical. Wins over --keep.
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Backup of replaced files: none | single | versioned.
    #[arg(short = 'b', long, value_name = "MODE")]
    pub backup: Option<BackupMode>,

    /// Fetch from the development branch.
    #[arg(long)]
    pub devel: bool,

    /// GitHub contents-API directory holding the INI files.
    #[arg(long, value_name = "API_URL")]
    pub url: Option<String>,

    /// GitHub user for basic authentication.
    #[arg(long, env = "GH_USER")]
    pub gh_user: Option<String>,

    /// GitHub password for basic authentication.
    #[arg(long, env = "GH_PASSWORD", hide_env_values = true)]
    pub gh_password: Option<String>,

    /// GitHub token; takes precedence over user/password.
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Number of projects fetched concurrently.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Settings file (default: ~/.fetchini/config.yaml).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to a timestamped file in DIR (default: current directory).
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    pub log: Option<PathBuf>,

    /// Verbose logging and detailed error output.
    #[arg(long)]
    pub debug: bool,

    /// Log results instead of printing them.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl FetchArgs {
    pub fn run(self) -> Result<RunStatus> {
        let log_file = crate::logging::init(self.debug, self.log.as_deref())?;
        if let Some(path) = &log_file {
            tracing::info!("logging to {}", path.display());
        }

        let settings = self.settings()?;
        let auth = self.credentials()?;
        let policy = FetchPolicy {
            keep: self.keep,
            overwrite: self.overwrite,
        };
        let client = GithubClient::new(settings.timeout());

        let requested = self
            .projects
            .iter()
            .map(|p| ProjectId::from(p.as_str()))
            .collect();
        let targets = targets::resolve(requested, &client, &settings, auth.as_ref())
            .context("failed to list remote projects")?;
        if targets.is_empty() {
            bail!("no projects to fetch; name some or set `projects` in the settings file");
        }
        tracing::info!(
            "fetching {} project(s) into {}",
            targets.len(),
            settings.config_dir.display()
        );

        let cancel = CancelToken::new();
        if self.quiet {
            let reconciler = Reconciler::new(client, Arc::new(LogReporter), settings)
                .with_policy(policy)
                .with_credentials(auth)
                .with_cancel(cancel.clone());
            let summary = execute(reconciler, targets, cancel)?;
            return Ok(finish(summary));
        }

        let console = Arc::new(ConsoleReporter::new(self.debug));
        console.command(&std::env::args().collect::<Vec<_>>());
        let reconciler = Reconciler::new(client, Arc::clone(&console), settings)
            .with_policy(policy)
            .with_credentials(auth)
            .with_cancel(cancel.clone());
        let summary = execute(reconciler, targets, cancel)?;
        console.close_progress();
        Ok(finish(summary))
    }

    /// Settings file overlaid with command-line flags.
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("settings file {} does not exist", path.display());
                }
                config::load_from(path)
            }
            None => config::load(),
        }
        .context("failed to load settings")?;

        if let Some(url) = &self.url {
            settings.api_url = url.clone();
        }
        if self.devel {
            settings.git_ref = DEVEL_GIT_REF.to_owned();
        }
        if let Some(dir) = &self.config_dir {
            settings.config_dir = dir.clone();
        }
        if let Some(mode) = self.backup {
            settings.backup = mode;
        }
        if let Some(jobs) = self.jobs {
            settings.jobs = jobs;
        }
        settings.validate().context("invalid settings")?;
        Ok(settings)
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        if let Some(token) = &self.gh_token {
            return Ok(Some(Credentials::Token(token.clone())));
        }
        match (&self.gh_user, &self.gh_password) {
            (Some(user), Some(password)) => Ok(Some(Credentials::Basic {
                user: user.clone(),
                password: password.clone(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => bail!("--gh-user requires --gh-password (or GH_PASSWORD)"),
            (None, Some(_)) => bail!("--gh-password requires --gh-user (or GH_USER)"),
        }
    }
}

/// Run the loop on a blocking task, racing it against Ctrl-C.
///
/// Returns `None` when interrupted. In-flight requests are abandoned rather
/// than awaited.
fn execute<R: Reporter + 'static>(
    reconciler: Reconciler<GithubClient, R>,
    targets: Vec<ProjectId>,
    cancel: CancelToken,
) -> Result<Option<RunSummary>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let joined = runtime.block_on(async move {
        let mut task = tokio::task::spawn_blocking(move || reconciler.run(&targets));
        tokio::select! {
            joined = &mut task => Some(joined),
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    cancel.cancel();
                    None
                }
                Err(err) => {
                    tracing::warn!("cannot listen for Ctrl-C: {err}");
                    Some(task.await)
                }
            },
        }
    });
    runtime.shutdown_background();

    match joined {
        None => Ok(None),
        Some(Ok(Ok(summary))) => Ok(Some(summary)),
        Some(Ok(Err(_cancelled))) => Ok(None),
        Some(Err(err)) => Err(anyhow::anyhow!("reconciliation task failed: {err}")),
    }
}

fn finish(summary: Option<RunSummary>) -> RunStatus {
    let Some(summary) = summary else {
        eprintln!("\n{}", "Interrupted.".red().bold());
        return RunStatus::Interrupted;
    };
    tracing::info!(
        "done: {} fetched, {} skipped, {} failed",
        summary.fetched,
        summary.skipped,
        summary.failed.len()
    );
    if summary.errored() {
        let names: Vec<&str> = summary.failed.iter().map(|p| p.0.as_str()).collect();
        eprintln!(
            "{} {} project(s) failed: {}",
            "error:".red().bold(),
            names.len(),
            names.join(", ")
        );
        RunStatus::TargetsFailed
    } else {
        RunStatus::Success
    }
}
