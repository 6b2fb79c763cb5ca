//! Directory error types.

/// Errors returned by directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The service answered with its error envelope.
    #[error("remote error: {kind}")]
    Api {
        /// The envelope's `type` field.
        kind: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a recognizable error envelope.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Session establishment failed.
    #[error("login failed: {0}")]
    Login(String),
}

impl DirectoryError {
    /// Short classification string for logging.
    pub fn kind(&self) -> &str {
        match self {
            Self::Api { kind } => kind,
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::Login(_) => "login",
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
