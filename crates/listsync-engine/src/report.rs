//! Run and per-list outcomes.

use listsync_core::MembershipPlan;

/// Why a list was not reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The roster key names the main list or the unified list.
    Protected,
    /// No managed remote subgroup matches the roster key.
    NotManaged,
    /// The configured unified list does not exist remotely.
    UnifiedMissing,
}

/// What happened to one list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStatus {
    /// Not touched at all.
    Skipped(SkipReason),
    /// Member listing failed; no mutation was attempted.
    FetchFailed(String),
    /// Plan computed and logged, nothing sent.
    Planned,
    /// Plan applied (possibly with individual failures).
    Applied,
}

/// Outcome of reconciling one list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListOutcome {
    /// Roster key, or the unified list name.
    pub key: String,
    /// Fully qualified remote name.
    pub address: String,
    /// Final status.
    pub status: ListStatus,
    /// Computed plan (empty unless membership was fetched).
    pub plan: MembershipPlan,
    /// Members added successfully.
    pub added: usize,
    /// Emails whose add request failed.
    pub failed_adds: Vec<String>,
    /// Members removed.
    pub removed: usize,
    /// Error kind of a failed bulk removal.
    pub remove_error: Option<String>,
    /// Whether removals were withheld because an add failed first.
    pub removals_withheld: bool,
    /// Cleared once any fetch or mutation on this list fails.
    pub permission_to_modify: bool,
}

impl ListOutcome {
    /// Fresh outcome for a list about to be reconciled.
    pub fn new(key: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            address: address.into(),
            status: ListStatus::Planned,
            plan: MembershipPlan::default(),
            added: 0,
            failed_adds: Vec::new(),
            removed: 0,
            remove_error: None,
            removals_withheld: false,
            permission_to_modify: true,
        }
    }

    /// Outcome for a list that was never touched.
    pub fn skipped(key: impl Into<String>, address: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            status: ListStatus::Skipped(reason),
            ..Self::new(key, address)
        }
    }

    /// Whether any remote call for this list failed.
    pub fn has_failures(&self) -> bool {
        matches!(self.status, ListStatus::FetchFailed(_))
            || !self.failed_adds.is_empty()
            || self.remove_error.is_some()
    }
}

/// How the run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Every eligible list was processed.
    Completed,
    /// The roster file defines no subgroups.
    EmptyRoster,
    /// No remote subgroup carries the managed suffix.
    NoManagedSubgroups,
}

/// Summary of one sync run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended.
    pub status: RunStatus,
    /// One outcome per roster key, in file order.
    pub lists: Vec<ListOutcome>,
    /// Unified list outcome, when one is configured.
    pub unified: Option<ListOutcome>,
}

impl RunReport {
    /// Empty report with `status`.
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            lists: Vec::new(),
            unified: None,
        }
    }

    /// Subgroup outcomes followed by the unified outcome.
    pub fn outcomes(&self) -> impl Iterator<Item = &ListOutcome> {
        self.lists.iter().chain(self.unified.as_ref())
    }

    /// Outcome for roster key `key`.
    pub fn list(&self, key: &str) -> Option<&ListOutcome> {
        self.lists.iter().find(|o| o.key == key)
    }

    /// Total successful adds.
    pub fn total_added(&self) -> usize {
        self.outcomes().map(|o| o.added).sum()
    }

    /// Total removals.
    pub fn total_removed(&self) -> usize {
        self.outcomes().map(|o| o.removed).sum()
    }

    /// Number of lists with at least one failed remote call.
    pub fn failed_lists(&self) -> usize {
        self.outcomes().filter(|o| o.has_failures()).count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
