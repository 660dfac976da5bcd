// crates/warden-reputation/src/db.rs
//
// Transactional glue between the reputation engine and a `ReputationStore`.
//
// Every mutating operation runs inside one serializable transaction scoped to
// the node's record: read (or lazily insert), compute, write, commit. A
// failure anywhere aborts the whole transaction and is returned unchanged;
// nothing here retries.

use chrono::{DateTime, Utc};

use warden_core::audit::AuditOutcome;
use warden_core::error::WardenError;
use warden_core::history::AuditHistory;
use warden_core::identity::NodeId;
use warden_core::record::{ReputationInfo, ReputationRecord, ReputationStatus};
use warden_core::traits::{NodeTransaction, ReputationStore};
use warden_core::update::{FieldUpdate, ReputationUpdate};

use crate::config::{InitialReputation, ReputationConfig};
use crate::engine::ReputationEngine;
use crate::history::AuditHistoryTracker;

/// One audit outcome to apply, with the configuration to apply it under.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub node_id: NodeId,
    pub audit_outcome: AuditOutcome,
    pub config: ReputationConfig,
}

/// Reputation operations over a store and a history tracker.
pub struct ReputationDb<S, H> {
    store: S,
    engine: ReputationEngine<H>,
    initial: InitialReputation,
}

/// Read the node's record, inserting `initial` first if there is none.
fn get_or_insert(
    tx: &mut dyn NodeTransaction,
    initial: ReputationRecord,
) -> Result<ReputationRecord, WardenError> {
    match tx.get()? {
        Some(record) => Ok(record),
        None => {
            tracing::debug!(node_id = %tx.node_id(), "creating reputation entry");
            tx.insert(&initial)?;
            Ok(initial)
        }
    }
}

impl<S: ReputationStore, H: AuditHistoryTracker> ReputationDb<S, H> {
    /// Records created by this instance start from `initial` on both tracks.
    pub fn new(store: S, tracker: H, initial: InitialReputation) -> Self {
        Self {
            store,
            engine: ReputationEngine::new(tracker),
            initial,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn fresh_record(&self, id: NodeId) -> Result<ReputationRecord, WardenError> {
        Ok(ReputationRecord::new(
            id,
            self.initial.alpha,
            self.initial.beta,
            AuditHistory::empty_blob()?,
        ))
    }

    /// Apply one audit outcome.
    ///
    /// Returns the node's new status and whether it differs from the status
    /// before the call. A disqualified node is left untouched and reported
    /// as unchanged.
    pub async fn update(
        &self,
        req: &UpdateRequest,
        now: DateTime<Utc>,
    ) -> Result<(ReputationStatus, bool), WardenError> {
        let initial = self.fresh_record(req.node_id)?;
        let engine = &self.engine;
        let config = &req.config;
        let outcome = req.audit_outcome;

        let (status, changed) = self
            .store
            .run_in_transaction(&req.node_id, move |tx| {
                let record = get_or_insert(tx, initial)?;
                let old_status = record.status();

                if record.disqualified.is_some() {
                    return Ok((old_status, false));
                }

                let update = engine.evaluate(&record, outcome, config, now)?;
                let updated = tx.update_fields(&update)?;
                let new_status = updated.status();
                let changed = new_status != old_status;
                Ok((new_status, changed))
            })
            .await?;

        if changed {
            tracing::debug!(node_id = %req.node_id, ?status, "reputation status changed");
        }
        Ok((status, changed))
    }

    /// Full reputation view with the audit history decoded.
    pub async fn get(&self, id: &NodeId) -> Result<ReputationInfo, WardenError> {
        let record = self.store.get_by_id(id).await?;
        ReputationInfo::try_from(&record)
    }

    /// Overwrite the status fields, bypassing scoring. Fails with `NotFound`
    /// if the node has no record.
    pub async fn set_node_status(
        &self,
        id: &NodeId,
        status: &ReputationStatus,
    ) -> Result<(), WardenError> {
        self.store
            .update_fields(id, &ReputationUpdate::from_status(status))
            .await?;
        tracing::info!(node_id = %id, ?status, "reputation status overwritten");
        Ok(())
    }

    /// Disqualify the node at `now`, creating its record if needed.
    pub async fn disqualify_node(&self, id: &NodeId, now: DateTime<Utc>) -> Result<(), WardenError> {
        let update = ReputationUpdate {
            disqualified: FieldUpdate::Set(now),
            ..Default::default()
        };
        self.create_and_update(id, update).await?;
        tracing::info!(node_id = %id, dq_type = "manual", "disqualified");
        Ok(())
    }

    /// Mark the node unknown-audit suspended since `at`, creating its record
    /// if needed.
    pub async fn suspend_node_unknown_audit(
        &self,
        id: &NodeId,
        at: DateTime<Utc>,
    ) -> Result<(), WardenError> {
        let update = ReputationUpdate {
            unknown_audit_suspended: FieldUpdate::Set(at),
            ..Default::default()
        };
        self.create_and_update(id, update).await?;
        tracing::info!(node_id = %id, category = "unknown audits", "suspended manually");
        Ok(())
    }

    /// Lift an unknown-audit suspension, creating the record if needed.
    pub async fn unsuspend_node_unknown_audit(&self, id: &NodeId) -> Result<(), WardenError> {
        let update = ReputationUpdate {
            unknown_audit_suspended: FieldUpdate::Clear,
            ..Default::default()
        };
        self.create_and_update(id, update).await?;
        tracing::info!(node_id = %id, category = "unknown audits", "suspension lifted manually");
        Ok(())
    }

    /// Create a fresh record. Fails with `AlreadyExists` if there is one.
    pub async fn init(&self, id: &NodeId) -> Result<(), WardenError> {
        let record = self.fresh_record(*id)?;
        self.store.create(&record).await?;
        Ok(())
    }

    async fn create_and_update(
        &self,
        id: &NodeId,
        update: ReputationUpdate,
    ) -> Result<ReputationRecord, WardenError> {
        let initial = self.fresh_record(*id)?;
        self.store
            .run_in_transaction(id, move |tx| {
                get_or_insert(tx, initial)?;
                tx.update_fields(&update)
            })
            .await
    }
}
