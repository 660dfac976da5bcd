// crates/warden-core/src/error.rs

use thiserror::Error;

/// Error kinds surfaced by every Warden operation.
///
/// None of these are retried locally; retry policy belongs to whoever
/// issued the audit update.
#[derive(Debug, Error)]
pub enum WardenError {
    /// No reputation record exists for the node.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A reputation record already exists for the node.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Persistence layer failure (open, read, write, commit, lock timeout).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record or audit-history blob could not be parsed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization error while encoding a record or history blob.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration rejected during validation.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Invalid state transition (e.g. recording into a window that already passed).
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for WardenError {
    fn from(e: serde_json::Error) -> Self {
        WardenError::Serialization(e.to_string())
    }
}

impl WardenError {
    /// Returns true for the `NotFound` kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WardenError::NotFound(_))
    }
}
