//! Per-list reconciliation.
//!
//! For a list that already passed the existence gate:
//! 1. fetch actual membership (all pages); on failure leave the list alone
//! 2. plan `to_add = desired − regular − privileged` and
//!    `to_remove = regular − desired`
//! 3. add members one request at a time; a failed add is logged, clears the
//!    modification permission, and the batch carries on
//! 4. remove in one bulk request, only while permission still holds and
//!    only if there is something to remove
//!
//! Nothing is retried or rolled back.

use tracing::{info, warn};

use listsync_core::{CanonicalRoster, MembershipPlan, format_member_entry};
use listsync_directory::{DirectoryApi, list_members};

use crate::report::{ListOutcome, ListStatus};

/// Whether mutations are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Send adds and removals.
    #[default]
    Apply,
    /// Fetch and plan only.
    DryRun,
}

/// Reconciles lists of one group through a directory backend.
pub struct Reconciler<'a> {
    api: &'a dyn DirectoryApi,
    group: &'a str,
    mode: SyncMode,
}

impl<'a> Reconciler<'a> {
    /// Reconciler for lists under `group`.
    pub fn new(api: &'a dyn DirectoryApi, group: &'a str, mode: SyncMode) -> Self {
        Self { api, group, mode }
    }

    /// Bring `address` in line with `desired`.
    pub async fn reconcile(&self, key: &str, address: &str, desired: &CanonicalRoster) -> ListOutcome {
        let mut outcome = ListOutcome::new(key, address);

        let actual = match list_members(self.api, address).await {
            Ok(actual) => actual,
            Err(e) => {
                warn!(list = address, kind = e.kind(), error = %e, "member listing failed, leaving list unchanged");
                outcome.permission_to_modify = false;
                outcome.status = ListStatus::FetchFailed(e.kind().to_string());
                return outcome;
            }
        };

        outcome.plan = MembershipPlan::compute(desired, &actual);

        if self.mode == SyncMode::DryRun {
            info!(
                list = address,
                desired = desired.len(),
                to_add = ?outcome.plan.to_add,
                to_remove = ?outcome.plan.to_remove,
                protected = actual.privileged.len(),
                "dry run, planned changes not sent"
            );
            return outcome;
        }

        self.apply_adds(desired, &mut outcome).await;
        self.apply_removals(&mut outcome).await;
        outcome.status = ListStatus::Applied;

        info!(
            list = address,
            desired = desired.len(),
            added = outcome.added,
            removed = outcome.removed,
            failed_adds = outcome.failed_adds.len(),
            protected = actual.privileged.len(),
            "list reconciled"
        );
        outcome
    }

    async fn apply_adds(&self, desired: &CanonicalRoster, outcome: &mut ListOutcome) {
        for email in &outcome.plan.to_add {
            let name = desired.name_of(email).unwrap_or_default();
            let entry = format_member_entry(email, name);
            match self.api.direct_add(self.group, &outcome.address, &entry).await {
                Ok(()) => outcome.added += 1,
                Err(e) => {
                    warn!(list = %outcome.address, email = %email, kind = e.kind(), error = %e, "add failed");
                    outcome.permission_to_modify = false;
                    outcome.failed_adds.push(email.clone());
                }
            }
        }
    }

    async fn apply_removals(&self, outcome: &mut ListOutcome) {
        if outcome.plan.to_remove.is_empty() {
            return;
        }
        if !outcome.permission_to_modify {
            warn!(
                list = %outcome.address,
                pending = outcome.plan.to_remove.len(),
                "removals withheld after a failed add"
            );
            outcome.removals_withheld = true;
            return;
        }

        let emails: Vec<String> = outcome.plan.to_remove.iter().cloned().collect();
        match self.api.bulk_remove(&outcome.address, &emails).await {
            Ok(()) => outcome.removed = emails.len(),
            Err(e) => {
                warn!(list = %outcome.address, count = emails.len(), kind = e.kind(), error = %e, "bulk removal failed");
                outcome.permission_to_modify = false;
                outcome.remove_error = Some(e.kind().to_string());
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use listsync_core::{MemberRecord, normalize_members};
    use listsync_directory::ScriptedDirectory;

    const LIST: &str = "grp+announce-list";

    fn desired(entries: &[(&str, Option<&str>)]) -> CanonicalRoster {
        let records: Vec<MemberRecord> = entries
            .iter()
            .map(|(email, name)| MemberRecord::new(*email, *name))
            .collect();
        normalize_members(&records)
    }

    #[tokio::test]
    async fn adds_with_and_without_names() {
        let api = ScriptedDirectory::new();
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);

        let outcome = reconciler
            .reconcile("announce", LIST, &desired(&[("a@x.com", Some("Alice")), ("b@x.com", None)]))
            .await;

        assert_eq!(outcome.status, ListStatus::Applied);
        assert_eq!(outcome.added, 2);
        assert_eq!(
            api.adds_to(LIST),
            vec!["Alice <a@x.com>".to_string(), "b@x.com".to_string()]
        );
        assert!(api.removes_from(LIST).is_empty());
    }

    #[tokio::test]
    async fn removes_in_one_bulk_call() {
        let api = ScriptedDirectory::new().with_members(
            LIST,
            &[("a@x.com", false), ("b@x.com", false), ("c@x.com", false), ("m@x.com", true)],
        );
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);

        let outcome = reconciler.reconcile("announce", LIST, &desired(&[("a@x.com", None)])).await;

        assert_eq!(outcome.removed, 2);
        assert_eq!(
            api.removes_from(LIST),
            vec![vec!["b@x.com".to_string(), "c@x.com".to_string()]]
        );
        assert!(api.adds_to(LIST).is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_blocks_all_mutation() {
        let api = ScriptedDirectory::new()
            .with_member_pages(LIST, vec![vec![], vec![], vec![]])
            .with_member_error(LIST, 1, "rate_limited");
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);

        let outcome = reconciler.reconcile("announce", LIST, &desired(&[("a@x.com", None)])).await;

        assert_eq!(outcome.status, ListStatus::FetchFailed("rate_limited".to_string()));
        assert!(!outcome.permission_to_modify);
        assert!(api.mutations().is_empty());
    }

    #[tokio::test]
    async fn failed_add_continues_batch_and_withholds_removal() {
        let api = ScriptedDirectory::new()
            .with_members(LIST, &[("old@x.com", false)])
            .failing_add("b@x.com");
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);

        let outcome = reconciler
            .reconcile("announce", LIST, &desired(&[("a@x.com", None), ("b@x.com", None), ("c@x.com", None)]))
            .await;

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.failed_adds, vec!["b@x.com".to_string()]);
        assert_eq!(api.adds_to(LIST).len(), 3);
        assert!(outcome.removals_withheld);
        assert!(api.removes_from(LIST).is_empty());
        assert!(!outcome.permission_to_modify);
        assert!(outcome.has_failures());
    }

    #[tokio::test]
    async fn failed_removal_clears_permission() {
        let api = ScriptedDirectory::new()
            .with_members(LIST, &[("old@x.com", false)])
            .failing_remove(LIST);
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);

        let outcome = reconciler.reconcile("announce", LIST, &desired(&[])).await;

        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.remove_error.as_deref(), Some("remove_failed"));
        assert!(!outcome.permission_to_modify);
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let api = ScriptedDirectory::new().with_members(LIST, &[("old@x.com", false)]);
        let reconciler = Reconciler::new(&api, "grp", SyncMode::DryRun);

        let outcome = reconciler.reconcile("announce", LIST, &desired(&[("a@x.com", None)])).await;

        assert_eq!(outcome.status, ListStatus::Planned);
        assert_eq!(outcome.plan.to_add.len(), 1);
        assert_eq!(outcome.plan.to_remove.len(), 1);
        assert!(api.mutations().is_empty());
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let api = ScriptedDirectory::new().with_members(LIST, &[("old@x.com", false), ("m@x.com", true)]);
        let reconciler = Reconciler::new(&api, "grp", SyncMode::Apply);
        let roster = desired(&[("a@x.com", Some("Alice")), ("m@x.com", None)]);

        let first = reconciler.reconcile("announce", LIST, &roster).await;
        assert!(!first.plan.is_empty());

        api.clear_calls();
        let second = reconciler.reconcile("announce", LIST, &roster).await;
        assert!(second.plan.is_empty());
        assert!(api.mutations().is_empty());
    }
}
