//! # listsync-settings
//!
//! Run configuration for listsync.
//!
//! Settings come from two layers (in priority order):
//! 1. **Compiled defaults** for the optional values (API URL, page size,
//!    timeout, main list name)
//! 2. **Environment variables** (`GROUPSIO_*`, `GROUP_NAME`, `LIST_SUFFIX`,
//!    `UNIFIED_LIST`, `MEMBERSHIP_FILE`, `MAIN_LIST`)
//!
//! [`SyncSettings::validate`] rejects configurations that would let the run
//! touch lists it must never mutate.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_with};
pub use types::{Credentials, RemoteSettings, SyncSettings};
