//! In-memory directory for deterministic tests without network access.
//!
//! Listings are scripted as pages; page `i` is served for cursor `None`
//! (`i == 0`) or `Some(i.to_string())`, and every page but the last returns
//! the next index as its cursor. Successful adds and removes update the
//! scripted membership, so a second reconciliation observes the first one's
//! effects. Every call is recorded.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use listsync_core::extract_email;
use listsync_core::membership::REGULAR_MOD_STATUS;

use crate::api::DirectoryApi;
use crate::errors::DirectoryError;
use crate::types::{MemberEntry, Page, SubgroupEntry};

/// A recorded directory call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `subgroups_page`.
    Subgroups {
        /// Group queried.
        group: String,
        /// Cursor sent.
        cursor: Option<String>,
    },
    /// `members_page`.
    Members {
        /// List queried.
        list: String,
        /// Cursor sent.
        cursor: Option<String>,
    },
    /// `direct_add`.
    Add {
        /// Parent group.
        group: String,
        /// Target list.
        list: String,
        /// Entry payload.
        entry: String,
    },
    /// `bulk_remove`.
    Remove {
        /// Target list.
        list: String,
        /// Emails removed.
        emails: Vec<String>,
    },
}

impl Call {
    /// Whether this call mutates membership.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Add { .. } | Self::Remove { .. })
    }
}

#[derive(Default)]
struct ListScript {
    pages: Vec<Vec<MemberEntry>>,
    error_at: Option<(usize, String)>,
}

#[derive(Default)]
struct State {
    subgroup_pages: Vec<Vec<SubgroupEntry>>,
    subgroup_error: Option<(usize, String)>,
    lists: HashMap<String, ListScript>,
    failing_adds: HashSet<String>,
    failing_removes: HashSet<String>,
    calls: Vec<Call>,
}

/// Scripted [`DirectoryApi`] backend.
#[derive(Default)]
pub struct ScriptedDirectory {
    state: Mutex<State>,
}

impl ScriptedDirectory {
    /// Directory with no subgroups and empty lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `names` as a single subgroup page.
    #[must_use]
    pub fn with_subgroups(self, names: &[&str]) -> Self {
        let page = names.iter().map(|n| SubgroupEntry::named(*n)).collect();
        self.with_subgroup_pages(vec![page])
    }

    /// Serve subgroups across several pages.
    #[must_use]
    pub fn with_subgroup_pages(mut self, pages: Vec<Vec<SubgroupEntry>>) -> Self {
        self.state.get_mut().subgroup_pages = pages;
        self
    }

    /// Fail the subgroup listing at page `index` with error `kind`.
    #[must_use]
    pub fn with_subgroup_error(mut self, index: usize, kind: &str) -> Self {
        self.state.get_mut().subgroup_error = Some((index, kind.to_string()));
        self
    }

    /// Serve `members` of `list` as a single page. Each member is
    /// `(email, privileged)`.
    #[must_use]
    pub fn with_members(self, list: &str, members: &[(&str, bool)]) -> Self {
        let page = members
            .iter()
            .map(|(email, privileged)| {
                let status = if *privileged {
                    "sub_modstatus_moderator"
                } else {
                    REGULAR_MOD_STATUS
                };
                MemberEntry::new(*email, status)
            })
            .collect();
        self.with_member_pages(list, vec![page])
    }

    /// Serve the members of `list` across several pages.
    #[must_use]
    pub fn with_member_pages(mut self, list: &str, pages: Vec<Vec<MemberEntry>>) -> Self {
        self.state
            .get_mut()
            .lists
            .entry(list.to_string())
            .or_default()
            .pages = pages;
        self
    }

    /// Fail the member listing of `list` at page `index` with error `kind`.
    #[must_use]
    pub fn with_member_error(mut self, list: &str, index: usize, kind: &str) -> Self {
        self.state
            .get_mut()
            .lists
            .entry(list.to_string())
            .or_default()
            .error_at = Some((index, kind.to_string()));
        self
    }

    /// Reject any `direct_add` of `email`.
    #[must_use]
    pub fn failing_add(mut self, email: &str) -> Self {
        let _ = self.state.get_mut().failing_adds.insert(email.to_lowercase());
        self
    }

    /// Reject any `bulk_remove` on `list`.
    #[must_use]
    pub fn failing_remove(mut self, list: &str) -> Self {
        let _ = self.state.get_mut().failing_removes.insert(list.to_string());
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Membership-changing calls made so far, in order.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Add payloads sent to `list`.
    pub fn adds_to(&self, list: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Add { list: l, entry, .. } if l == list => Some(entry),
                _ => None,
            })
            .collect()
    }

    /// Bulk removals sent to `list`.
    pub fn removes_from(&self, list: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Remove { list: l, emails } if l == list => Some(emails),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls, keeping the scripted membership.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

fn page_index(cursor: Option<&str>) -> Result<usize, DirectoryError> {
    cursor.map_or(Ok(0), |c| {
        c.parse()
            .map_err(|_| DirectoryError::Decode(format!("unknown page token {c}")))
    })
}

fn serve<T: Clone>(
    pages: &[Vec<T>],
    error_at: Option<&(usize, String)>,
    index: usize,
) -> Result<Page<T>, DirectoryError> {
    if let Some((at, kind)) = error_at {
        if *at == index {
            return Err(DirectoryError::Api { kind: kind.clone() });
        }
    }
    if pages.is_empty() && index == 0 {
        return Ok(Page::last(Vec::new()));
    }
    let data = pages
        .get(index)
        .cloned()
        .ok_or_else(|| DirectoryError::Decode(format!("no page {index}")))?;
    if index + 1 < pages.len() {
        Ok(Page::more(data, (index + 1).to_string()))
    } else {
        Ok(Page::last(data))
    }
}

#[async_trait]
impl DirectoryApi for ScriptedDirectory {
    async fn subgroups_page(
        &self,
        group: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SubgroupEntry>, DirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Subgroups {
            group: group.to_string(),
            cursor: cursor.map(str::to_string),
        });
        let index = page_index(cursor)?;
        serve(&state.subgroup_pages, state.subgroup_error.as_ref(), index)
    }

    async fn members_page(
        &self,
        list: &str,
        cursor: Option<&str>,
    ) -> Result<Page<MemberEntry>, DirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Members {
            list: list.to_string(),
            cursor: cursor.map(str::to_string),
        });
        let index = page_index(cursor)?;
        match state.lists.get(list) {
            Some(script) => serve(&script.pages, script.error_at.as_ref(), index),
            None => serve::<MemberEntry>(&[], None, index),
        }
    }

    async fn direct_add(&self, group: &str, list: &str, entry: &str) -> Result<(), DirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Add {
            group: group.to_string(),
            list: list.to_string(),
            entry: entry.to_string(),
        });
        let email = extract_email(entry)
            .ok_or_else(|| DirectoryError::Api { kind: "invalid_email".to_string() })?;
        if state.failing_adds.contains(&email) {
            return Err(DirectoryError::Api { kind: "add_failed".to_string() });
        }
        let script = state.lists.entry(list.to_string()).or_default();
        if script.pages.is_empty() {
            script.pages.push(Vec::new());
        }
        if let Some(last) = script.pages.last_mut() {
            last.push(MemberEntry::new(email, REGULAR_MOD_STATUS));
        }
        Ok(())
    }

    async fn bulk_remove(&self, list: &str, emails: &[String]) -> Result<(), DirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Remove {
            list: list.to_string(),
            emails: emails.to_vec(),
        });
        if state.failing_removes.contains(list) {
            return Err(DirectoryError::Api { kind: "remove_failed".to_string() });
        }
        if let Some(script) = state.lists.get_mut(list) {
            for page in &mut script.pages {
                page.retain(|m| {
                    m.email
                        .as_deref()
                        .is_none_or(|e| !emails.iter().any(|r| r.eq_ignore_ascii_case(e)))
                });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
