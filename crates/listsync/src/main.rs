//! # listsync
//!
//! One-shot job that brings Groups.io subgroup membership in line with a
//! local YAML roster, then maintains the optional unified list.
//!
//! Exit status is zero on completion and on benign early exits (empty
//! roster, no managed subgroups). Per-list failures are logged and do not
//! change the exit status. Configuration errors, an unreadable roster,
//! login failure and subgroup discovery failure exit non-zero before any
//! membership change is made.

#![deny(unsafe_code)]

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use listsync_core::load_roster;
use listsync_directory::GroupsIoClient;
use listsync_engine::{RunReport, RunStatus, SyncMode, run_sync};
use listsync_settings::loader::env_vars;
use listsync_settings::{SyncSettings, load_settings_with};

use crate::logging::{LogFormat, init_subscriber};

/// Sync Groups.io subgroup membership from a roster file.
#[derive(Parser, Debug)]
#[command(name = "listsync", version, about = "Sync Groups.io subgroup membership from a roster file")]
struct Cli {
    /// Roster file (overrides `MEMBERSHIP_FILE`).
    #[arg(long)]
    membership_file: Option<PathBuf>,

    /// Fetch and plan only; send no adds or removals.
    #[arg(long)]
    dry_run: bool,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn mode(&self) -> SyncMode {
        if self.dry_run {
            SyncMode::DryRun
        } else {
            SyncMode::Apply
        }
    }

    /// Settings from the environment, with CLI overrides applied.
    fn settings(&self) -> Result<SyncSettings> {
        let override_file = self
            .membership_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        load_settings_with(|name| {
            if name == env_vars::MEMBERSHIP_FILE && override_file.is_some() {
                return override_file.clone();
            }
            std::env::var(name).ok()
        })
        .context("Invalid configuration")
    }
}

fn log_summary(report: &RunReport) {
    match report.status {
        RunStatus::EmptyRoster | RunStatus::NoManagedSubgroups => {
            info!(status = ?report.status, "nothing to sync");
        }
        RunStatus::Completed => {
            let failed = report.failed_lists();
            if failed > 0 {
                warn!(
                    lists = report.outcomes().count(),
                    added = report.total_added(),
                    removed = report.total_removed(),
                    failed_lists = failed,
                    "sync finished with failures"
                );
            } else {
                info!(
                    lists = report.outcomes().count(),
                    added = report.total_added(),
                    removed = report.total_removed(),
                    "sync finished"
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_subscriber(&args.log_level, args.log_format);

    let settings = args.settings()?;
    let roster = load_roster(&settings.membership_file).with_context(|| {
        format!("Failed to load roster {}", settings.membership_file.display())
    })?;
    if roster.is_empty() {
        info!(file = %settings.membership_file.display(), "roster file has no subgroups, nothing to do");
        return Ok(());
    }

    let client = GroupsIoClient::login(&settings.remote, &settings.credentials)
        .await
        .context("Failed to log in to Groups.io")?;

    let report = run_sync(&client, &settings, &roster, args.mode())
        .await
        .context("Sync aborted")?;
    log_summary(&report);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
