// crates/warden-core/src/audit.rs
//
// Audit outcomes reported by the auditing subsystem.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a single audit probe against a storage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The node proved it still holds the data.
    Success,
    /// The node answered, but the proof was wrong.
    Failure,
    /// Indeterminate result (e.g. a malformed response).
    Unknown,
    /// No response within the timeout.
    Offline,
}

impl AuditOutcome {
    /// Whether the node was reachable during this audit.
    pub fn is_up(&self) -> bool {
        *self != AuditOutcome::Offline
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
            AuditOutcome::Unknown => write!(f, "unknown"),
            AuditOutcome::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for AuditOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(AuditOutcome::Success),
            "failure" | "fail" => Ok(AuditOutcome::Failure),
            "unknown" => Ok(AuditOutcome::Unknown),
            "offline" => Ok(AuditOutcome::Offline),
            other => Err(format!("unknown audit outcome: {}", other)),
        }
    }
}
