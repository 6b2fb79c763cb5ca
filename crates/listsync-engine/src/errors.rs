//! Engine error types.
//!
//! Only conditions that abort the whole run are errors. Per-list failures
//! are recorded in the [`RunReport`](crate::report::RunReport) instead.

use listsync_directory::DirectoryError;
use listsync_settings::SettingsError;

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The settings would let the run mutate a protected list.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Subgroup discovery failed, so no list can be authorized.
    #[error("subgroup discovery failed: {0}")]
    Discovery(#[from] DirectoryError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_error_display() {
        let err = EngineError::from(DirectoryError::Api {
            kind: "unauthorized".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "subgroup discovery failed: remote error: unauthorized"
        );
    }

    #[test]
    fn settings_error_conversion() {
        let err: EngineError = SettingsError::UnifiedIsMain("main".to_string()).into();
        assert!(matches!(err, EngineError::Settings(_)));
    }
}
