// crates/warden-reputation/src/service.rs
//
// ReputationService: the entry point used by the audit pipeline and operator
// tooling. Holds one validated configuration and the wall clock, and forwards
// to `ReputationDb`.

use chrono::{DateTime, Utc};

use warden_core::audit::AuditOutcome;
use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::record::{ReputationInfo, ReputationStatus};
use warden_core::traits::ReputationStore;

use crate::config::{InitialReputation, ReputationConfig};
use crate::db::{ReputationDb, UpdateRequest};
use crate::history::AuditHistoryTracker;

/// Reputation operations under a fixed configuration.
pub struct ReputationService<S, H> {
    db: ReputationDb<S, H>,
    config: ReputationConfig,
}

impl<S: ReputationStore, H: AuditHistoryTracker> ReputationService<S, H> {
    /// Validate the configuration and build the service.
    pub fn new(
        store: S,
        tracker: H,
        config: ReputationConfig,
        initial: InitialReputation,
    ) -> Result<Self, WardenError> {
        config.validate()?;
        initial.validate()?;
        Ok(Self {
            db: ReputationDb::new(store, tracker, initial),
            config,
        })
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    pub fn db(&self) -> &ReputationDb<S, H> {
        &self.db
    }

    /// Apply an audit outcome observed now.
    pub async fn apply_audit(
        &self,
        node_id: NodeId,
        outcome: AuditOutcome,
    ) -> Result<(ReputationStatus, bool), WardenError> {
        self.update_at(node_id, outcome, Utc::now()).await
    }

    /// Apply an audit outcome observed at `now`.
    pub async fn update_at(
        &self,
        node_id: NodeId,
        outcome: AuditOutcome,
        now: DateTime<Utc>,
    ) -> Result<(ReputationStatus, bool), WardenError> {
        let req = UpdateRequest {
            node_id,
            audit_outcome: outcome,
            config: self.config.clone(),
        };
        self.db.update(&req, now).await
    }

    pub async fn get(&self, node_id: &NodeId) -> Result<ReputationInfo, WardenError> {
        self.db.get(node_id).await
    }

    pub async fn set_node_status(
        &self,
        node_id: &NodeId,
        status: &ReputationStatus,
    ) -> Result<(), WardenError> {
        self.db.set_node_status(node_id, status).await
    }

    pub async fn disqualify_node(&self, node_id: &NodeId) -> Result<(), WardenError> {
        self.db.disqualify_node(node_id, Utc::now()).await
    }

    pub async fn suspend_node_unknown_audit(
        &self,
        node_id: &NodeId,
        at: DateTime<Utc>,
    ) -> Result<(), WardenError> {
        self.db.suspend_node_unknown_audit(node_id, at).await
    }

    pub async fn unsuspend_node_unknown_audit(&self, node_id: &NodeId) -> Result<(), WardenError> {
        self.db.unsuspend_node_unknown_audit(node_id).await
    }

    pub async fn init(&self, node_id: &NodeId) -> Result<(), WardenError> {
        self.db.init(node_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::WindowedHistoryTracker;
    use warden_store::MemoryReputationStore;

    #[test]
    fn invalid_config_rejected() {
        let config = ReputationConfig {
            audit_weight: 0.0,
            ..Default::default()
        };
        let result = ReputationService::new(
            MemoryReputationStore::new(),
            WindowedHistoryTracker::new(),
            config,
            InitialReputation::default(),
        );
        assert!(matches!(result, Err(WardenError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn apply_audit_uses_wall_clock() {
        let service = ReputationService::new(
            MemoryReputationStore::new(),
            WindowedHistoryTracker::new(),
            ReputationConfig::default(),
            InitialReputation::default(),
        )
        .unwrap();
        let id = NodeId([5; 32]);
        let before = Utc::now();
        service.apply_audit(id, AuditOutcome::Success).await.unwrap();
        let info = service.get(&id).await.unwrap();
        let contact = info.last_contact_success.expect("contact recorded");
        assert!(contact >= before && contact <= Utc::now());
    }

    #[tokio::test]
    async fn manual_disqualify_creates_record() {
        let service = ReputationService::new(
            MemoryReputationStore::new(),
            WindowedHistoryTracker::new(),
            ReputationConfig::default(),
            InitialReputation::default(),
        )
        .unwrap();
        let id = NodeId([6; 32]);
        service.disqualify_node(&id).await.unwrap();
        let info = service.get(&id).await.unwrap();
        assert!(info.disqualified.is_some());
        assert_eq!(info.total_audit_count, 0);
    }
}
