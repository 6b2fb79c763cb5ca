//! Cursor-driven listings on top of [`DirectoryApi`].
//!
//! Every listing fetches its first page unconditionally (cursor `None`) and
//! stops after the page whose returned cursor is `None`.

use std::collections::BTreeSet;

use tracing::debug;

use listsync_core::names::{is_managed_name, unified_address};
use listsync_core::{MemberSets, ModStatus};

use crate::api::DirectoryApi;
use crate::errors::DirectoryError;

/// Subgroups discovered under a group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubgroupCatalog {
    /// Names inside the managed namespace.
    pub managed: BTreeSet<String>,
    /// Whether the unified list exists (always false when none is configured).
    pub unified_present: bool,
}

impl SubgroupCatalog {
    /// Whether `name` may be reconciled as an ordinary subgroup.
    pub fn is_managed(&self, name: &str) -> bool {
        self.managed.contains(name)
    }
}

/// Walk every subgroup of `group`, keeping the managed ones.
///
/// An error on any page aborts the listing.
pub async fn list_subgroups(
    api: &dyn DirectoryApi,
    group: &str,
    suffix: &str,
    unified: Option<&str>,
) -> Result<SubgroupCatalog, DirectoryError> {
    let unified_name = unified.map(|u| unified_address(group, u));
    let mut catalog = SubgroupCatalog::default();
    let mut cursor: Option<String> = None;
    let mut pages = 0_usize;

    loop {
        let page = api.subgroups_page(group, cursor.as_deref()).await?;
        pages += 1;

        for name in page.data.into_iter().filter_map(|entry| entry.name) {
            if unified_name.as_deref() == Some(name.as_str()) {
                catalog.unified_present = true;
            }
            if is_managed_name(&name, suffix, unified) {
                let _ = catalog.managed.insert(name);
            }
        }

        cursor = advance(cursor, page.next_page_token)?;
        if cursor.is_none() {
            break;
        }
    }

    debug!(group, pages, managed = catalog.managed.len(), "subgroups listed");
    Ok(catalog)
}

/// Walk every member of `list`, split into regular and privileged.
///
/// Paging stops at the first failed page and the error is returned; a
/// partial listing is never reported as a result.
pub async fn list_members(api: &dyn DirectoryApi, list: &str) -> Result<MemberSets, DirectoryError> {
    let mut members = MemberSets::default();
    let mut cursor: Option<String> = None;
    let mut pages = 0_usize;

    loop {
        let page = api.members_page(list, cursor.as_deref()).await?;
        pages += 1;

        for entry in page.data {
            let Some(email) = entry.email.filter(|e| !e.is_empty()) else {
                continue;
            };
            members.classify(&email, ModStatus::from_remote(entry.mod_status.as_deref()));
        }

        cursor = advance(cursor, page.next_page_token)?;
        if cursor.is_none() {
            break;
        }
    }

    debug!(
        list,
        pages,
        regular = members.regular.len(),
        privileged = members.privileged.len(),
        "members listed"
    );
    Ok(members)
}

/// Next cursor, refusing a token that repeats the one just used.
fn advance(current: Option<String>, next: Option<String>) -> Result<Option<String>, DirectoryError> {
    match (current, next) {
        (Some(cur), Some(next)) if cur == next => Err(DirectoryError::Decode(format!(
            "page token {next} did not advance"
        ))),
        (_, next) => Ok(next),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
