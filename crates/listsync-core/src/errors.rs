//! Roster error types.

use std::path::PathBuf;

/// Errors that can occur when loading the local roster file.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The roster file does not exist.
    #[error("roster file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The roster file could not be read.
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    /// The roster file is not valid YAML, or has the wrong shape.
    #[error("invalid roster YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The top-level document is not a mapping of subgroup keys.
    #[error("roster must be a mapping of subgroup names, found {0}")]
    NotAMapping(&'static str),

    /// A subgroup key is not a scalar.
    #[error("unsupported subgroup key: {0}")]
    InvalidKey(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
