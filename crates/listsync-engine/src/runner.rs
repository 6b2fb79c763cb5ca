//! One complete sync run.

use tracing::{debug, info, warn};

use listsync_core::names::subgroup_address;
use listsync_core::{RosterFile, normalize_members};
use listsync_directory::{DirectoryApi, list_subgroups};
use listsync_settings::SyncSettings;

use crate::errors::EngineError;
use crate::reconcile::{Reconciler, SyncMode};
use crate::report::{ListOutcome, RunReport, RunStatus, SkipReason};
use crate::unified::UnionRoster;

/// Reconcile every roster key, then the unified list.
///
/// Settings are validated before the first remote call. Discovery failure
/// aborts the run; failures on individual lists are recorded in the report
/// and never stop the lists after them.
pub async fn run_sync(
    api: &dyn DirectoryApi,
    settings: &SyncSettings,
    roster: &RosterFile,
    mode: SyncMode,
) -> Result<RunReport, EngineError> {
    settings.validate()?;

    if roster.is_empty() {
        info!(file = %settings.membership_file.display(), "roster file has no subgroups, nothing to do");
        return Ok(RunReport::new(RunStatus::EmptyRoster));
    }

    let group = settings.group_name.as_str();
    let unified = settings.unified_list.as_deref();
    let catalog = list_subgroups(api, group, &settings.list_suffix, unified).await?;
    if catalog.managed.is_empty() {
        info!(group, suffix = %settings.list_suffix, "no subgroups match the managed suffix, nothing to do");
        return Ok(RunReport::new(RunStatus::NoManagedSubgroups));
    }
    info!(group, managed = catalog.managed.len(), roster_keys = roster.len(), ?mode, "starting sync");

    let reconciler = Reconciler::new(api, group, mode);
    let mut report = RunReport::new(RunStatus::Completed);
    let mut union = UnionRoster::new();

    for (key, records) in roster.iter() {
        let address = subgroup_address(group, key, &settings.list_suffix);

        if settings.is_protected(key) {
            warn!(key, "roster key names a protected list, skipping");
            report.lists.push(ListOutcome::skipped(key, address, SkipReason::Protected));
            continue;
        }
        if !catalog.is_managed(&address) {
            debug!(key, list = %address, "no managed subgroup for roster key, skipping");
            report.lists.push(ListOutcome::skipped(key, address, SkipReason::NotManaged));
            continue;
        }

        let desired = normalize_members(records);
        union.absorb(key, &desired);
        report.lists.push(reconciler.reconcile(key, &address, &desired).await);
    }

    if let Some(unified) = unified {
        report.unified = Some(union.reconcile(&reconciler, group, unified, &catalog).await);
    }

    Ok(report)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
