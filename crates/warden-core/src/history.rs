// crates/warden-core/src/history.rs
//
// Audit-history data types and the blob codec.
//
// The reputation engine treats the history as an opaque byte blob and hands it
// whole to the `AuditHistoryTracker`. Only the tracker and `Get` (which exposes
// a structured view to callers) look inside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// Up/down counts for one fixed-size time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditWindow {
    /// Start of the window (audit time truncated to the window size).
    pub window_start: DateTime<Utc>,
    /// Audits in this window where the node was reachable.
    pub online_count: u32,
    /// All audits in this window.
    pub total_count: u32,
}

impl AuditWindow {
    pub fn new(window_start: DateTime<Utc>) -> Self {
        Self {
            window_start,
            online_count: 0,
            total_count: 0,
        }
    }

    /// Fraction of audits in this window where the node was online.
    pub fn online_ratio(&self) -> f64 {
        if self.total_count == 0 {
            return 1.0;
        }
        self.online_count as f64 / self.total_count as f64
    }
}

/// Windowed reachability history for one node, oldest window first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistory {
    pub windows: Vec<AuditWindow>,
    /// Smoothed online score in [0, 1], cached from the last recomputation.
    pub score: f64,
}

impl Default for AuditHistory {
    fn default() -> Self {
        Self {
            windows: Vec::new(),
            score: 1.0,
        }
    }
}

impl AuditHistory {
    /// Encode to the blob form persisted on the reputation record.
    pub fn encode(&self) -> Result<Vec<u8>, WardenError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a persisted blob. An empty blob is an empty history.
    pub fn decode(bytes: &[u8]) -> Result<Self, WardenError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
            .map_err(|e| WardenError::Decode(format!("corrupt audit history: {}", e)))
    }

    /// Blob for a brand-new record.
    pub fn empty_blob() -> Result<Vec<u8>, WardenError> {
        Self::default().encode()
    }
}
