//! Remote member classification and add/remove planning.

use std::collections::BTreeSet;

use crate::normalize::CanonicalRoster;

/// Moderation status reported for regular (non-privileged) members.
pub const REGULAR_MOD_STATUS: &str = "sub_modstatus_none";

/// Whether a remote member may be touched by reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModStatus {
    /// Ordinary subscriber.
    Regular,
    /// Moderator, owner or admin. Never added or removed.
    Privileged,
}

impl ModStatus {
    /// Classify a raw `mod_status` value. Anything but the regular status,
    /// including a missing one, is privileged.
    pub fn from_remote(status: Option<&str>) -> Self {
        match status {
            Some(REGULAR_MOD_STATUS) => Self::Regular,
            _ => Self::Privileged,
        }
    }
}

/// Actual membership of one remote list, split by privilege.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberSets {
    /// Lowercase emails of regular members.
    pub regular: BTreeSet<String>,
    /// Lowercase emails of privileged members.
    pub privileged: BTreeSet<String>,
}

impl MemberSets {
    /// Record one remote member.
    pub fn classify(&mut self, email: &str, status: ModStatus) {
        let email = email.to_lowercase();
        let _ = match status {
            ModStatus::Regular => self.regular.insert(email),
            ModStatus::Privileged => self.privileged.insert(email),
        };
    }

    /// Total members across both classes.
    pub fn len(&self) -> usize {
        self.regular.len() + self.privileged.len()
    }

    /// True when the list has no members.
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.privileged.is_empty()
    }
}

/// Changes needed to bring one list in line with its desired roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipPlan {
    /// Desired members absent from the list (never privileged ones).
    pub to_add: BTreeSet<String>,
    /// Regular members not in the desired roster.
    pub to_remove: BTreeSet<String>,
}

impl MembershipPlan {
    /// `to_add = desired − regular − privileged`,
    /// `to_remove = regular − desired − privileged`.
    pub fn compute(desired: &CanonicalRoster, actual: &MemberSets) -> Self {
        let to_add = desired
            .emails()
            .filter(|e| !actual.regular.contains(*e) && !actual.privileged.contains(*e))
            .map(str::to_string)
            .collect();
        let to_remove = actual
            .regular
            .iter()
            .filter(|e| !desired.contains(e) && !actual.privileged.contains(*e))
            .cloned()
            .collect();
        Self { to_add, to_remove }
    }

    /// True when the list is already in sync.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Add payload for one member: `Name <email>` with a name, bare email otherwise.
pub fn format_member_entry(email: &str, name: &str) -> String {
    if name.is_empty() {
        email.to_string()
    } else {
        format!("{name} <{email}>")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(emails: &[&str]) -> CanonicalRoster {
        let mut roster = CanonicalRoster::new();
        for email in emails {
            roster.insert(email, "");
        }
        roster
    }

    fn sets(regular: &[&str], privileged: &[&str]) -> MemberSets {
        let mut sets = MemberSets::default();
        for email in regular {
            sets.classify(email, ModStatus::Regular);
        }
        for email in privileged {
            sets.classify(email, ModStatus::Privileged);
        }
        sets
    }

    fn set(emails: &[&str]) -> BTreeSet<String> {
        emails.iter().map(|e| (*e).to_string()).collect()
    }

    #[test]
    fn mod_status_classification() {
        assert_eq!(ModStatus::from_remote(Some("sub_modstatus_none")), ModStatus::Regular);
        assert_eq!(ModStatus::from_remote(Some("sub_modstatus_moderator")), ModStatus::Privileged);
        assert_eq!(ModStatus::from_remote(Some("sub_modstatus_owner")), ModStatus::Privileged);
        assert_eq!(ModStatus::from_remote(None), ModStatus::Privileged);
    }

    #[test]
    fn classify_lowercases() {
        let sets = sets(&["B@X.com"], &["C@x.COM"]);
        assert!(sets.regular.contains("b@x.com"));
        assert!(sets.privileged.contains("c@x.com"));
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn plan_adds_missing_and_removes_extra() {
        let plan = MembershipPlan::compute(&roster(&["a@x.com", "b@x.com"]), &sets(&["b@x.com", "z@x.com"], &[]));
        assert_eq!(plan.to_add, set(&["a@x.com"]));
        assert_eq!(plan.to_remove, set(&["z@x.com"]));
    }

    #[test]
    fn privileged_members_are_never_touched() {
        let plan = MembershipPlan::compute(&roster(&["mod@x.com"]), &sets(&["b@x.com"], &["mod@x.com", "owner@x.com"]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, set(&["b@x.com"]));
    }

    #[test]
    fn empty_roster_clears_regular_members_only() {
        let plan = MembershipPlan::compute(&roster(&[]), &sets(&["b@x.com"], &["c@x.com"]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, set(&["b@x.com"]));
    }

    #[test]
    fn member_in_both_classes_is_not_removed() {
        let plan = MembershipPlan::compute(&roster(&[]), &sets(&["c@x.com"], &["c@x.com"]));
        assert!(plan.is_empty());
    }

    #[test]
    fn in_sync_plan_is_empty() {
        let plan = MembershipPlan::compute(&roster(&["a@x.com"]), &sets(&["a@x.com"], &[]));
        assert!(plan.is_empty());
    }

    #[test]
    fn entry_formatting() {
        assert_eq!(format_member_entry("a@x.com", "Alice"), "Alice <a@x.com>");
        assert_eq!(format_member_entry("a@x.com", ""), "a@x.com");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn emails() -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec("[a-e]{1,2}@x\\.com", 0..12)
        }

        proptest! {
            #[test]
            fn plan_respects_set_algebra(
                desired in emails(),
                regular in emails(),
                privileged in emails(),
            ) {
                let mut wanted = CanonicalRoster::new();
                for email in &desired {
                    wanted.insert(email, "");
                }
                let mut actual = MemberSets::default();
                for email in &regular {
                    actual.classify(email, ModStatus::Regular);
                }
                for email in &privileged {
                    actual.classify(email, ModStatus::Privileged);
                }

                let plan = MembershipPlan::compute(&wanted, &actual);

                for email in &plan.to_add {
                    prop_assert!(wanted.contains(email));
                    prop_assert!(!actual.regular.contains(email));
                    prop_assert!(!actual.privileged.contains(email));
                }
                for email in &plan.to_remove {
                    prop_assert!(actual.regular.contains(email));
                    prop_assert!(!wanted.contains(email));
                    prop_assert!(!actual.privileged.contains(email));
                }
                for email in wanted.emails() {
                    let present = actual.regular.contains(email) || actual.privileged.contains(email);
                    prop_assert_eq!(plan.to_add.contains(email), !present);
                }
            }

            #[test]
            fn second_pass_is_idempotent(
                desired in emails(),
                regular in emails(),
                privileged in emails(),
            ) {
                let mut wanted = CanonicalRoster::new();
                for email in &desired {
                    wanted.insert(email, "");
                }
                let mut actual = MemberSets::default();
                for email in &regular {
                    actual.classify(email, ModStatus::Regular);
                }
                for email in &privileged {
                    actual.classify(email, ModStatus::Privileged);
                }

                let plan = MembershipPlan::compute(&wanted, &actual);
                for email in &plan.to_add {
                    actual.classify(email, ModStatus::Regular);
                }
                for email in &plan.to_remove {
                    let _ = actual.regular.remove(email);
                }

                prop_assert!(MembershipPlan::compute(&wanted, &actual).is_empty());
            }
        }
    }
}
