//! Remote subgroup addressing.
//!
//! Groups.io addresses a subgroup as `parent+child`. Managed subgroups carry
//! a configured suffix after the local key: `parent+key<suffix>`.

/// Address of the managed subgroup for local roster key `key`.
pub fn subgroup_address(group: &str, key: &str, suffix: &str) -> String {
    format!("{group}+{key}{suffix}")
}

/// Address of the unified list.
pub fn unified_address(group: &str, unified: &str) -> String {
    format!("{group}+{unified}")
}

/// Whether a remote subgroup name falls in the managed namespace.
///
/// It must end with `suffix` and must not also end with the unified-list
/// name, so one list can never play both roles.
pub fn is_managed_name(name: &str, suffix: &str, unified: Option<&str>) -> bool {
    if !name.ends_with(suffix) {
        return false;
    }
    !unified.is_some_and(|u| !u.is_empty() && name.ends_with(u))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
