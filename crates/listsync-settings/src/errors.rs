//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required environment variable is unset or empty.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// The unified list would alias the protected main list.
    #[error("unified list '{0}' must differ from the main list")]
    UnifiedIsMain(String),

    /// A settings value was invalid (e.g., out of range).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
