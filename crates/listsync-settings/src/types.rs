//! Settings types.

use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::errors::{Result, SettingsError};

/// Default Groups.io API base.
pub const DEFAULT_API_URL: &str = "https://groups.io/api/v1";
/// Default name of the protected root list.
pub const DEFAULT_MAIN_LIST: &str = "main";
/// Largest page the API will return.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Login credentials for the remote service.
#[derive(Clone)]
pub struct Credentials {
    /// Account email.
    pub username: String,
    /// Account password.
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// HTTP-level settings for the directory client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSettings {
    /// API base URL, without trailing slash.
    pub api_url: String,
    /// `limit` sent with every paginated request.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Everything one sync run needs.
#[derive(Clone, Debug)]
pub struct SyncSettings {
    /// Remote credentials.
    pub credentials: Credentials,
    /// Root group identifier.
    pub group_name: String,
    /// Suffix a subgroup must carry to be managed.
    pub list_suffix: String,
    /// Unified list name (relative to the group), when enabled.
    pub unified_list: Option<String>,
    /// Protected root list name.
    pub main_list: String,
    /// Path to the roster file.
    pub membership_file: PathBuf,
    /// HTTP settings.
    pub remote: RemoteSettings,
}

impl SyncSettings {
    /// Check invariants that must hold before any remote call is made.
    pub fn validate(&self) -> Result<()> {
        if self.group_name.is_empty() {
            return Err(SettingsError::Missing("GROUP_NAME"));
        }
        if self.list_suffix.is_empty() {
            return Err(SettingsError::Missing("LIST_SUFFIX"));
        }
        if self.membership_file.as_os_str().is_empty() {
            return Err(SettingsError::Missing("MEMBERSHIP_FILE"));
        }
        if let Some(unified) = &self.unified_list {
            if *unified == self.main_list {
                return Err(SettingsError::UnifiedIsMain(unified.clone()));
            }
        }
        if self.remote.page_size == 0 || self.remote.page_size > MAX_PAGE_SIZE {
            return Err(SettingsError::InvalidValue(format!(
                "page size {} outside 1..={MAX_PAGE_SIZE}",
                self.remote.page_size
            )));
        }
        Ok(())
    }

    /// Whether a local roster key names a list that must never be reconciled
    /// as an ordinary subgroup.
    pub fn is_protected(&self, key: &str) -> bool {
        key == self.main_list || self.unified_list.as_deref() == Some(key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
