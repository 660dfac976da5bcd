// crates/warden-core/src/update.rs
//
// Sparse field-level updates to a reputation record.
//
// A single audit evaluation touches a subset of the record's fields. Nullable
// timestamp fields need three states (leave alone / set / clear), so they use
// `FieldUpdate<T>`; plain fields use `Option<T>` where `None` means untouched.
// Several update sets can be merged before the one atomic write.

use chrono::{DateTime, Utc};

use crate::record::{ReputationRecord, ReputationStatus};

/// Tagged update for a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value as is.
    #[default]
    Unchanged,
    /// Overwrite with a value.
    Set(T),
    /// Overwrite with null.
    Clear,
}

impl<T: Clone> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// Build an unconditional overwrite from an optional value.
    pub fn overwrite(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        }
    }

    /// Combine with a later update to the same field. The later one wins
    /// unless it leaves the field unchanged.
    pub fn merge(self, later: FieldUpdate<T>) -> FieldUpdate<T> {
        match later {
            FieldUpdate::Unchanged => self,
            other => other,
        }
    }

    /// Apply to a stored nullable field.
    pub fn apply(&self, target: &mut Option<T>) {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Set(v) => *target = Some(v.clone()),
            FieldUpdate::Clear => *target = None,
        }
    }

    /// The value the field would hold after applying this update.
    pub fn resolve(&self, current: Option<&T>) -> Option<T> {
        match self {
            FieldUpdate::Unchanged => current.cloned(),
            FieldUpdate::Set(v) => Some(v.clone()),
            FieldUpdate::Clear => None,
        }
    }
}

/// A sparse set of changes to one `ReputationRecord`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReputationUpdate {
    pub audit_alpha: Option<f64>,
    pub audit_beta: Option<f64>,
    pub unknown_audit_alpha: Option<f64>,
    pub unknown_audit_beta: Option<f64>,
    pub total_audit_count: Option<u64>,
    pub audit_success_count: Option<u64>,
    pub online_score: Option<f64>,
    pub audit_history: Option<Vec<u8>>,
    pub contained: Option<bool>,

    pub vetted_at: FieldUpdate<DateTime<Utc>>,
    pub disqualified: FieldUpdate<DateTime<Utc>>,
    pub unknown_audit_suspended: FieldUpdate<DateTime<Utc>>,
    pub offline_suspended: FieldUpdate<DateTime<Utc>>,
    pub under_review: FieldUpdate<DateTime<Utc>>,
    pub last_contact_success: FieldUpdate<DateTime<Utc>>,
    pub last_contact_failure: FieldUpdate<DateTime<Utc>>,
}

fn merge_plain<T>(earlier: Option<T>, later: Option<T>) -> Option<T> {
    later.or(earlier)
}

fn apply_plain<T: Clone>(update: &Option<T>, target: &mut T) {
    if let Some(v) = update {
        *target = v.clone();
    }
}

impl ReputationUpdate {
    /// Unconditional overwrite of every status field. Used for
    /// administrative correction.
    pub fn from_status(status: &ReputationStatus) -> Self {
        Self {
            contained: Some(status.contained),
            disqualified: FieldUpdate::overwrite(status.disqualified),
            unknown_audit_suspended: FieldUpdate::overwrite(status.unknown_audit_suspended),
            offline_suspended: FieldUpdate::overwrite(status.offline_suspended),
            vetted_at: FieldUpdate::overwrite(status.vetted_at),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combine two update sets; fields touched by `later` win.
    pub fn merge(self, later: ReputationUpdate) -> ReputationUpdate {
        ReputationUpdate {
            audit_alpha: merge_plain(self.audit_alpha, later.audit_alpha),
            audit_beta: merge_plain(self.audit_beta, later.audit_beta),
            unknown_audit_alpha: merge_plain(self.unknown_audit_alpha, later.unknown_audit_alpha),
            unknown_audit_beta: merge_plain(self.unknown_audit_beta, later.unknown_audit_beta),
            total_audit_count: merge_plain(self.total_audit_count, later.total_audit_count),
            audit_success_count: merge_plain(self.audit_success_count, later.audit_success_count),
            online_score: merge_plain(self.online_score, later.online_score),
            audit_history: merge_plain(self.audit_history, later.audit_history),
            contained: merge_plain(self.contained, later.contained),
            vetted_at: self.vetted_at.merge(later.vetted_at),
            disqualified: self.disqualified.merge(later.disqualified),
            unknown_audit_suspended: self
                .unknown_audit_suspended
                .merge(later.unknown_audit_suspended),
            offline_suspended: self.offline_suspended.merge(later.offline_suspended),
            under_review: self.under_review.merge(later.under_review),
            last_contact_success: self.last_contact_success.merge(later.last_contact_success),
            last_contact_failure: self.last_contact_failure.merge(later.last_contact_failure),
        }
    }

    /// Write the touched fields into `record`.
    pub fn apply_to(&self, record: &mut ReputationRecord) {
        apply_plain(&self.audit_alpha, &mut record.audit_alpha);
        apply_plain(&self.audit_beta, &mut record.audit_beta);
        apply_plain(&self.unknown_audit_alpha, &mut record.unknown_audit_alpha);
        apply_plain(&self.unknown_audit_beta, &mut record.unknown_audit_beta);
        apply_plain(&self.total_audit_count, &mut record.total_audit_count);
        apply_plain(&self.audit_success_count, &mut record.audit_success_count);
        apply_plain(&self.online_score, &mut record.online_score);
        apply_plain(&self.audit_history, &mut record.audit_history);
        apply_plain(&self.contained, &mut record.contained);

        self.vetted_at.apply(&mut record.vetted_at);
        self.disqualified.apply(&mut record.disqualified);
        self.unknown_audit_suspended
            .apply(&mut record.unknown_audit_suspended);
        self.offline_suspended.apply(&mut record.offline_suspended);
        self.under_review.apply(&mut record.under_review);
        self.last_contact_success
            .apply(&mut record.last_contact_success);
        self.last_contact_failure
            .apply(&mut record.last_contact_failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NodeId;
    use chrono::Duration;

    fn record() -> ReputationRecord {
        ReputationRecord::new(NodeId([9; 32]), 1.0, 1.0, Vec::new())
    }

    #[test]
    fn unchanged_leaves_field_alone() {
        let now = Utc::now();
        let mut field = Some(now);
        FieldUpdate::<DateTime<Utc>>::Unchanged.apply(&mut field);
        assert_eq!(field, Some(now));
    }

    #[test]
    fn clear_nulls_field() {
        let mut field = Some(Utc::now());
        FieldUpdate::Clear.apply(&mut field);
        assert_eq!(field, None);
    }

    #[test]
    fn later_set_wins_on_merge() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::hours(1);
        let merged = FieldUpdate::Set(t1).merge(FieldUpdate::Set(t2));
        assert_eq!(merged, FieldUpdate::Set(t2));

        let kept = FieldUpdate::Set(t1).merge(FieldUpdate::Unchanged);
        assert_eq!(kept, FieldUpdate::Set(t1));

        let cleared = FieldUpdate::Set(t1).merge(FieldUpdate::Clear);
        assert_eq!(cleared, FieldUpdate::Clear);
    }

    #[test]
    fn update_sets_merge_field_by_field() {
        let now = Utc::now();
        let a = ReputationUpdate {
            audit_alpha: Some(2.0),
            disqualified: FieldUpdate::Set(now),
            ..Default::default()
        };
        let b = ReputationUpdate {
            audit_beta: Some(3.0),
            unknown_audit_suspended: FieldUpdate::Clear,
            ..Default::default()
        };
        let merged = a.merge(b);
        assert_eq!(merged.audit_alpha, Some(2.0));
        assert_eq!(merged.audit_beta, Some(3.0));
        assert_eq!(merged.disqualified, FieldUpdate::Set(now));
        assert_eq!(merged.unknown_audit_suspended, FieldUpdate::Clear);
    }

    #[test]
    fn from_status_overwrites_every_status_field() {
        let now = Utc::now();
        let mut rec = record();
        rec.contained = true;
        rec.unknown_audit_suspended = Some(now);
        rec.offline_suspended = Some(now);

        let status = ReputationStatus {
            contained: false,
            disqualified: Some(now),
            unknown_audit_suspended: None,
            offline_suspended: None,
            vetted_at: Some(now),
        };
        ReputationUpdate::from_status(&status).apply_to(&mut rec);
        assert_eq!(rec.status(), status);
        // Scoring fields untouched.
        assert!((rec.audit_alpha - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_update_is_noop() {
        let update = ReputationUpdate::default();
        assert!(update.is_empty());
        let mut rec = record();
        let before = rec.clone();
        update.apply_to(&mut rec);
        assert_eq!(rec, before);
    }
}
