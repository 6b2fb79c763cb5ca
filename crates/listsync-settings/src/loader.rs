//! Settings loading from environment variables.
//!
//! Required values produce [`SettingsError::Missing`] when unset or empty.
//! Optional numeric values are parsed strictly; an invalid value is logged
//! and ignored, falling back to the compiled default.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{Credentials, DEFAULT_MAIN_LIST, MAX_PAGE_SIZE, RemoteSettings, SyncSettings};

/// Environment variable names.
pub mod env_vars {
    /// Account email.
    pub const USERNAME: &str = "GROUPSIO_USERNAME";
    /// Account password.
    pub const PASSWORD: &str = "GROUPSIO_PASSWORD";
    /// Root group.
    pub const GROUP_NAME: &str = "GROUP_NAME";
    /// Managed-subgroup suffix.
    pub const LIST_SUFFIX: &str = "LIST_SUFFIX";
    /// Unified list name; empty disables it.
    pub const UNIFIED_LIST: &str = "UNIFIED_LIST";
    /// Roster file path.
    pub const MEMBERSHIP_FILE: &str = "MEMBERSHIP_FILE";
    /// Protected root list name.
    pub const MAIN_LIST: &str = "MAIN_LIST";
    /// API base URL override.
    pub const API_URL: &str = "GROUPSIO_API_URL";
    /// Page size override.
    pub const PAGE_SIZE: &str = "GROUPSIO_PAGE_SIZE";
    /// Request timeout override, in seconds.
    pub const TIMEOUT_SECS: &str = "GROUPSIO_TIMEOUT_SECS";
}

/// Load and validate settings from the process environment.
pub fn load_settings() -> Result<SyncSettings> {
    load_settings_with(|name| std::env::var(name).ok())
}

/// Load and validate settings using `lookup` to resolve variable names.
pub fn load_settings_with<F>(lookup: F) -> Result<SyncSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let require = |name: &'static str| read(name).ok_or(SettingsError::Missing(name));

    let mut remote = RemoteSettings::default();
    if let Some(url) = read(env_vars::API_URL) {
        remote.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(v) = read(env_vars::PAGE_SIZE) {
        match parse_u32_range(&v, 1, MAX_PAGE_SIZE) {
            Some(size) => remote.page_size = size,
            None => warn!(key = env_vars::PAGE_SIZE, value = %v, "invalid page size, ignoring"),
        }
    }
    if let Some(v) = read(env_vars::TIMEOUT_SECS) {
        match parse_u64_range(&v, 1, 3600) {
            Some(secs) => remote.timeout_secs = secs,
            None => warn!(key = env_vars::TIMEOUT_SECS, value = %v, "invalid timeout, ignoring"),
        }
    }

    let settings = SyncSettings {
        credentials: Credentials {
            username: require(env_vars::USERNAME)?,
            password: SecretString::from(require(env_vars::PASSWORD)?),
        },
        group_name: require(env_vars::GROUP_NAME)?,
        list_suffix: require(env_vars::LIST_SUFFIX)?,
        unified_list: read(env_vars::UNIFIED_LIST),
        main_list: read(env_vars::MAIN_LIST).unwrap_or_else(|| DEFAULT_MAIN_LIST.to_string()),
        membership_file: PathBuf::from(require(env_vars::MEMBERSHIP_FILE)?),
        remote,
    };

    settings.validate()?;
    debug!(
        group = %settings.group_name,
        suffix = %settings.list_suffix,
        unified = ?settings.unified_list,
        "settings loaded"
    );
    Ok(settings)
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
