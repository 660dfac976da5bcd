// crates/warden-core/src/record.rs
//
// The persisted per-node reputation record and its read-only projections.
//
// `ReputationStatus` is the narrow view handed to callers outside the
// reputation core (node selection, routing): just enough to answer "is this
// node usable right now". `ReputationInfo` is the full view returned by `Get`,
// with the audit-history blob decoded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WardenError;
use crate::history::AuditHistory;
use crate::identity::NodeId;

/// Durable reputation state for one storage node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub id: NodeId,

    /// Beta-distribution parameters for the success/failure track.
    pub audit_alpha: f64,
    pub audit_beta: f64,
    /// Beta-distribution parameters for the unknown-outcome track.
    pub unknown_audit_alpha: f64,
    pub unknown_audit_beta: f64,

    /// Incremented once per evaluated audit, offline included.
    pub total_audit_count: u64,
    /// Incremented only on successful audits.
    pub audit_success_count: u64,

    /// Set once, the first time `total_audit_count` reaches the vetting threshold.
    pub vetted_at: Option<DateTime<Utc>>,
    /// Terminal. Once set the node is permanently excluded.
    pub disqualified: Option<DateTime<Utc>>,
    /// Present while suspended for low unknown-audit reputation.
    pub unknown_audit_suspended: Option<DateTime<Utc>>,
    /// Present while penalized for low online score inside a review window.
    pub offline_suspended: Option<DateTime<Utc>>,
    /// Start of the current offline review window.
    pub under_review: Option<DateTime<Utc>>,

    /// Smoothed reachability in [0, 1].
    pub online_score: f64,
    /// Opaque blob owned by the `AuditHistoryTracker`.
    pub audit_history: Vec<u8>,

    /// Diagnostic hold; cleared by every evaluated audit.
    pub contained: bool,

    pub last_contact_success: Option<DateTime<Utc>>,
    pub last_contact_failure: Option<DateTime<Utc>>,
}

impl ReputationRecord {
    /// A fresh record with the given starting Beta parameters on both tracks.
    pub fn new(id: NodeId, initial_alpha: f64, initial_beta: f64, audit_history: Vec<u8>) -> Self {
        Self {
            id,
            audit_alpha: initial_alpha,
            audit_beta: initial_beta,
            unknown_audit_alpha: initial_alpha,
            unknown_audit_beta: initial_beta,
            total_audit_count: 0,
            audit_success_count: 0,
            vetted_at: None,
            disqualified: None,
            unknown_audit_suspended: None,
            offline_suspended: None,
            under_review: None,
            online_score: 1.0,
            audit_history,
            contained: false,
            last_contact_success: None,
            last_contact_failure: None,
        }
    }

    /// Project the status subset.
    pub fn status(&self) -> ReputationStatus {
        ReputationStatus {
            contained: self.contained,
            disqualified: self.disqualified,
            unknown_audit_suspended: self.unknown_audit_suspended,
            offline_suspended: self.offline_suspended,
            vetted_at: self.vetted_at,
        }
    }

    /// Score of the success/failure track: alpha / (alpha + beta).
    pub fn audit_score(&self) -> f64 {
        self.audit_alpha / (self.audit_alpha + self.audit_beta)
    }

    /// Score of the unknown-outcome track.
    pub fn unknown_audit_score(&self) -> f64 {
        self.unknown_audit_alpha / (self.unknown_audit_alpha + self.unknown_audit_beta)
    }
}

/// Status fields consumed by node selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationStatus {
    pub contained: bool,
    pub disqualified: Option<DateTime<Utc>>,
    pub unknown_audit_suspended: Option<DateTime<Utc>>,
    pub offline_suspended: Option<DateTime<Utc>>,
    pub vetted_at: Option<DateTime<Utc>>,
}

impl ReputationStatus {
    pub fn is_disqualified(&self) -> bool {
        self.disqualified.is_some()
    }

    /// Suspended for either reason (unknown audits or offline review).
    pub fn is_suspended(&self) -> bool {
        self.unknown_audit_suspended.is_some() || self.offline_suspended.is_some()
    }

    pub fn is_vetted(&self) -> bool {
        self.vetted_at.is_some()
    }

    /// Eligible for new piece assignments: neither disqualified nor suspended.
    pub fn is_active(&self) -> bool {
        !self.is_disqualified() && !self.is_suspended()
    }
}

/// Full reputation view returned by `Get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationInfo {
    pub audit_success_count: u64,
    pub total_audit_count: u64,
    pub vetted_at: Option<DateTime<Utc>>,
    pub contained: bool,
    pub disqualified: Option<DateTime<Utc>>,
    pub unknown_audit_suspended: Option<DateTime<Utc>>,
    pub offline_suspended: Option<DateTime<Utc>>,
    pub under_review: Option<DateTime<Utc>>,
    pub online_score: f64,
    pub audit_history: AuditHistory,
    pub audit_reputation_alpha: f64,
    pub audit_reputation_beta: f64,
    pub unknown_audit_reputation_alpha: f64,
    pub unknown_audit_reputation_beta: f64,
    pub last_contact_success: Option<DateTime<Utc>>,
    pub last_contact_failure: Option<DateTime<Utc>>,
}

impl TryFrom<&ReputationRecord> for ReputationInfo {
    type Error = WardenError;

    fn try_from(record: &ReputationRecord) -> Result<Self, Self::Error> {
        let audit_history = AuditHistory::decode(&record.audit_history)?;
        Ok(Self {
            audit_success_count: record.audit_success_count,
            total_audit_count: record.total_audit_count,
            vetted_at: record.vetted_at,
            contained: record.contained,
            disqualified: record.disqualified,
            unknown_audit_suspended: record.unknown_audit_suspended,
            offline_suspended: record.offline_suspended,
            under_review: record.under_review,
            online_score: record.online_score,
            audit_history,
            audit_reputation_alpha: record.audit_alpha,
            audit_reputation_beta: record.audit_beta,
            unknown_audit_reputation_alpha: record.unknown_audit_alpha,
            unknown_audit_reputation_beta: record.unknown_audit_beta,
            last_contact_success: record.last_contact_success,
            last_contact_failure: record.last_contact_failure,
        })
    }
}

impl ReputationInfo {
    /// Project the status subset.
    pub fn status(&self) -> ReputationStatus {
        ReputationStatus {
            contained: self.contained,
            disqualified: self.disqualified,
            unknown_audit_suspended: self.unknown_audit_suspended,
            offline_suspended: self.offline_suspended,
            vetted_at: self.vetted_at,
        }
    }

    pub fn audit_score(&self) -> f64 {
        self.audit_reputation_alpha / (self.audit_reputation_alpha + self.audit_reputation_beta)
    }

    pub fn unknown_audit_score(&self) -> f64 {
        self.unknown_audit_reputation_alpha
            / (self.unknown_audit_reputation_alpha + self.unknown_audit_reputation_beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(b: u8) -> NodeId {
        NodeId([b; 32])
    }

    #[test]
    fn new_record_has_clean_status() {
        let rec = ReputationRecord::new(node(1), 1.0, 1.0, Vec::new());
        let status = rec.status();
        assert_eq!(status, ReputationStatus::default());
        assert!(status.is_active());
        assert!(!status.is_vetted());
        assert!((rec.audit_score() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn either_suspension_makes_node_inactive() {
        let now = Utc::now();
        let mut status = ReputationStatus {
            unknown_audit_suspended: Some(now),
            ..Default::default()
        };
        assert!(status.is_suspended());
        assert!(!status.is_active());

        status.unknown_audit_suspended = None;
        status.offline_suspended = Some(now);
        assert!(status.is_suspended());
        assert!(!status.is_active());
    }

    #[test]
    fn disqualified_is_inactive() {
        let status = ReputationStatus {
            disqualified: Some(Utc::now()),
            ..Default::default()
        };
        assert!(status.is_disqualified());
        assert!(!status.is_active());
    }

    #[test]
    fn info_decodes_history() {
        let blob = AuditHistory::empty_blob().unwrap();
        let rec = ReputationRecord::new(node(2), 3.0, 1.0, blob);
        let info = ReputationInfo::try_from(&rec).unwrap();
        assert!(info.audit_history.windows.is_empty());
        assert!((info.audit_reputation_alpha - 3.0).abs() < 1e-12);
        assert!((info.audit_score() - 0.75).abs() < 1e-12);
        assert_eq!(info.status(), rec.status());
    }

    #[test]
    fn info_rejects_corrupt_history() {
        let rec = ReputationRecord::new(node(3), 1.0, 1.0, b"garbage".to_vec());
        let err = ReputationInfo::try_from(&rec).unwrap_err();
        assert!(matches!(err, WardenError::Decode(_)));
    }
}
