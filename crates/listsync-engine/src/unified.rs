//! The unified list: one list carrying every member of every gated roster.

use std::collections::BTreeSet;

use tracing::{info, warn};

use listsync_core::CanonicalRoster;
use listsync_core::names::unified_address;
use listsync_directory::SubgroupCatalog;

use crate::reconcile::Reconciler;
use crate::report::{ListOutcome, SkipReason};

/// Union of the rosters of every subgroup that passed the existence gate.
///
/// Rosters are absorbed in file order, so a name given for the same email
/// under a later key replaces the earlier one.
#[derive(Clone, Debug, Default)]
pub struct UnionRoster {
    members: CanonicalRoster,
    contributors: BTreeSet<String>,
}

impl UnionRoster {
    /// Empty union.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the roster of subgroup `key` into the union.
    pub fn absorb(&mut self, key: &str, roster: &CanonicalRoster) {
        self.members.merge(roster);
        let _ = self.contributors.insert(key.to_string());
    }

    /// Merged members.
    pub fn members(&self) -> &CanonicalRoster {
        &self.members
    }

    /// Roster keys that contributed.
    pub fn contributors(&self) -> &BTreeSet<String> {
        &self.contributors
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when no member was absorbed.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Reconcile the unified list `unified` against the union.
    ///
    /// Skipped when the list does not exist remotely. An empty union still
    /// reconciles, which empties the list of regular members.
    pub async fn reconcile(
        &self,
        reconciler: &Reconciler<'_>,
        group: &str,
        unified: &str,
        catalog: &SubgroupCatalog,
    ) -> ListOutcome {
        let address = unified_address(group, unified);
        if !catalog.unified_present {
            warn!(list = %address, "unified list not found, skipping");
            return ListOutcome::skipped(unified, address, SkipReason::UnifiedMissing);
        }
        if self.is_empty() {
            warn!(list = %address, "union of gated rosters is empty, every regular member will be removed");
        }

        info!(
            list = %address,
            members = self.len(),
            contributors = self.contributors.len(),
            "reconciling unified list"
        );
        reconciler.reconcile(unified, &address, &self.members).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
