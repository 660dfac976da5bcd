// crates/warden-reputation/src/engine.rs
//
// The audit-outcome state machine.
//
// Given the current record, one audit outcome, and the configuration, the
// engine computes every field change the audit causes:
//
//   1. Beta update of the audit and unknown-audit tracks, audit counters
//   2. vetting once enough audits have been evaluated
//   3. disqualification when the audit score falls to the DQ threshold
//   4. unknown-audit suspension, lifting, and grace-period disqualification
//   5. last-contact bookkeeping
//   6. online score and the offline review window
//   7. containment is always cleared
//
// The engine is pure apart from the history tracker it consults and never
// touches storage. The result is a single `ReputationUpdate` that the caller
// writes atomically. When several disqualification criteria fire in one
// call they are evaluated in the order audit, unknown-audit, offline and the
// last one wins; all of them set the same timestamp.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use warden_core::audit::AuditOutcome;
use warden_core::error::WardenError;
use warden_core::record::ReputationRecord;
use warden_core::update::{FieldUpdate, ReputationUpdate};

use crate::beta::{score, update_reputation};
use crate::config::{AuditHistoryConfig, ReputationConfig};
use crate::history::{AuditHistoryTracker, HistoryUpdate};

/// Stateless reputation computation over an `AuditHistoryTracker`.
#[derive(Debug, Clone, Default)]
pub struct ReputationEngine<H> {
    tracker: H,
}

impl<H: AuditHistoryTracker> ReputationEngine<H> {
    pub fn new(tracker: H) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &H {
        &self.tracker
    }

    /// Compute the field changes caused by one audit.
    ///
    /// The caller is responsible for skipping disqualified records; this
    /// function evaluates whatever it is given.
    pub fn evaluate(
        &self,
        record: &ReputationRecord,
        outcome: AuditOutcome,
        config: &ReputationConfig,
        now: DateTime<Utc>,
    ) -> Result<ReputationUpdate, WardenError> {
        let node_id = record.id;
        let lambda = config.audit_lambda;
        let weight = config.audit_weight;

        let (mut audit_alpha, mut audit_beta) = (record.audit_alpha, record.audit_beta);
        let (mut unknown_alpha, mut unknown_beta) =
            (record.unknown_audit_alpha, record.unknown_audit_beta);

        match outcome {
            AuditOutcome::Success => {
                // A success raises both tracks.
                (audit_alpha, audit_beta) =
                    update_reputation(true, audit_alpha, audit_beta, lambda, weight);
                (unknown_alpha, unknown_beta) =
                    update_reputation(true, unknown_alpha, unknown_beta, lambda, weight);
            }
            AuditOutcome::Failure => {
                (audit_alpha, audit_beta) =
                    update_reputation(false, audit_alpha, audit_beta, lambda, weight);
            }
            AuditOutcome::Unknown => {
                (unknown_alpha, unknown_beta) =
                    update_reputation(false, unknown_alpha, unknown_beta, lambda, weight);
            }
            AuditOutcome::Offline => {}
        }

        let total_audit_count = record.total_audit_count + 1;

        debug!(
            node_id = %node_id,
            %outcome,
            audit_alpha,
            audit_beta,
            unknown_audit_alpha = unknown_alpha,
            unknown_audit_beta = unknown_beta,
            "reputation updated"
        );

        let mut update = ReputationUpdate {
            total_audit_count: Some(total_audit_count),
            audit_alpha: Some(audit_alpha),
            audit_beta: Some(audit_beta),
            unknown_audit_alpha: Some(unknown_alpha),
            unknown_audit_beta: Some(unknown_beta),
            // Every evaluated audit ends containment.
            contained: Some(false),
            ..Default::default()
        };

        if outcome == AuditOutcome::Success {
            update.audit_success_count = Some(record.audit_success_count + 1);
        }

        if record.vetted_at.is_none() && total_audit_count >= config.audits_required_for_vetting {
            info!(node_id = %node_id, total_audit_count, "node vetted");
            update.vetted_at = FieldUpdate::Set(now);
        }

        if score(audit_alpha, audit_beta) <= config.audit_dq {
            info!(node_id = %node_id, dq_type = "audit failure", "disqualified");
            update.disqualified = FieldUpdate::Set(now);
        }

        let unknown_update = evaluate_unknown_suspension(
            record,
            outcome,
            score(unknown_alpha, unknown_beta),
            config,
            now,
        );
        update = update.merge(unknown_update);

        if outcome.is_up() {
            update.last_contact_success = FieldUpdate::Set(now);
        } else {
            update.last_contact_failure = FieldUpdate::Set(now);
        }

        let offline_update =
            self.evaluate_offline(record, outcome.is_up(), &config.audit_history, now)?;
        Ok(update.merge(offline_update))
    }

    /// Online score and the offline review window.
    fn evaluate_offline(
        &self,
        record: &ReputationRecord,
        is_up: bool,
        config: &AuditHistoryConfig,
        now: DateTime<Utc>,
    ) -> Result<ReputationUpdate, WardenError> {
        let node_id = record.id;
        let mut update = ReputationUpdate::default();

        if !config.offline_suspension_enabled {
            if record.offline_suspended.is_some() {
                update.offline_suspended = FieldUpdate::Clear;
            }
            if record.under_review.is_some() {
                update.under_review = FieldUpdate::Clear;
            }
            return Ok(update);
        }

        let HistoryUpdate {
            history,
            score: online_score,
            tracking_period_full,
        } = self.tracker.record(&record.audit_history, now, is_up, config)?;

        debug!(node_id = %node_id, online_score, tracking_period_full, "online score updated");
        update.audit_history = Some(history);
        update.online_score = Some(online_score);

        // Only penalize once a full tracking period of windows exists.
        let penalize = online_score < config.offline_threshold && tracking_period_full;

        match record.under_review {
            Some(review_start) => {
                // The suspended flag follows the score while under review.
                if !penalize && record.offline_suspended.is_some() {
                    update.offline_suspended = FieldUpdate::Clear;
                } else if penalize && record.offline_suspended.is_none() {
                    update.offline_suspended = FieldUpdate::Set(now);
                }

                let tracking_end = review_start
                    .checked_add_signed(config.grace_period())
                    .and_then(|grace_end| grace_end.checked_add_signed(config.tracking_period()))
                    .ok_or_else(|| {
                        WardenError::InvalidConfig(format!(
                            "offline review starting {} ends past the latest representable time",
                            review_start
                        ))
                    })?;
                if now > tracking_end {
                    if penalize {
                        if config.offline_dq_enabled {
                            info!(node_id = %node_id, dq_type = "node offline", "disqualified");
                            update.disqualified = FieldUpdate::Set(now);
                        }
                    } else {
                        info!(node_id = %node_id, online_score, "offline review passed");
                        update.under_review = FieldUpdate::Clear;
                        update.offline_suspended = FieldUpdate::Clear;
                    }
                }
            }
            None if penalize => {
                info!(node_id = %node_id, online_score, category = "offline", "suspended");
                update.under_review = FieldUpdate::Set(now);
                update.offline_suspended = FieldUpdate::Set(now);
            }
            None => {}
        }

        Ok(update)
    }
}

/// Unknown-audit suspension and grace-period disqualification.
fn evaluate_unknown_suspension(
    record: &ReputationRecord,
    outcome: AuditOutcome,
    unknown_score: f64,
    config: &ReputationConfig,
    now: DateTime<Utc>,
) -> ReputationUpdate {
    let node_id = record.id;
    let mut update = ReputationUpdate::default();

    if unknown_score > config.audit_dq {
        if record.unknown_audit_suspended.is_some() {
            info!(node_id = %node_id, category = "unknown audits", "suspension lifted");
            update.unknown_audit_suspended = FieldUpdate::Clear;
        }
        return update;
    }

    let Some(suspended_at) = record.unknown_audit_suspended else {
        // Newly suspended here, so not eligible for the grace-period DQ yet.
        info!(node_id = %node_id, category = "unknown audits", "suspended");
        update.unknown_audit_suspended = FieldUpdate::Set(now);
        return update;
    };

    if outcome != AuditOutcome::Success
        && config.suspension_dq_enabled
        && now - suspended_at > config.suspension_grace_period()
    {
        info!(
            node_id = %node_id,
            dq_type = "suspension grace period expired for unknown audits",
            "disqualified"
        );
        update.disqualified = FieldUpdate::Set(now);
        update.unknown_audit_suspended = FieldUpdate::Clear;
    }

    update
}
