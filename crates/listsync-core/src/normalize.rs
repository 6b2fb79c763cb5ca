//! Member record validation and normalization.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::roster::MemberRecord;

/// Permissive address pattern. The first match inside the email field wins.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("valid email pattern")
});

/// Validated membership of one list: lowercase email -> display name.
///
/// Names may be empty. Inserting an email that is already present replaces
/// its name (last write wins).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalRoster {
    members: BTreeMap<String, String>,
}

impl CanonicalRoster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a member. The email is lowercased.
    pub fn insert(&mut self, email: &str, name: impl Into<String>) {
        let _ = self.members.insert(email.to_lowercase(), name.into());
    }

    /// Merge `other` into `self`; entries from `other` overwrite.
    pub fn merge(&mut self, other: &CanonicalRoster) {
        for (email, name) in &other.members {
            let _ = self.members.insert(email.clone(), name.clone());
        }
    }

    /// Whether `email` (already lowercase) is a member.
    pub fn contains(&self, email: &str) -> bool {
        self.members.contains_key(email)
    }

    /// Display name for `email`, if it is a member.
    pub fn name_of(&self, email: &str) -> Option<&str> {
        self.members.get(email).map(String::as_str)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the roster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member emails in sorted order.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// `(email, name)` pairs in sorted order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.members.iter()
    }
}

impl<'a> IntoIterator for &'a CanonicalRoster {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// First address found in `field`, lowercased.
pub fn extract_email(field: &str) -> Option<String> {
    EMAIL_PATTERN
        .find(field)
        .map(|m| m.as_str().to_lowercase())
}

/// Build a [`CanonicalRoster`] from raw records, dropping invalid entries.
pub fn normalize_members(records: &[MemberRecord]) -> CanonicalRoster {
    let mut roster = CanonicalRoster::new();

    for record in records {
        let Some(field) = record.email.as_deref().filter(|e| !e.is_empty()) else {
            trace!(?record, "dropping record without email");
            continue;
        };
        let Some(email) = extract_email(field) else {
            trace!(field, "dropping record without a valid address");
            continue;
        };
        let name = record.name.as_deref().map(str::trim).unwrap_or_default();
        roster.insert(&email, name);
    }

    roster
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
