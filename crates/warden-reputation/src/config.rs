// crates/warden-reputation/src/config.rs
//
// Reputation configuration. Passed explicitly with every update so the engine
// holds no global state; loaded from the `[reputation]` table of the operator
// config or populated with defaults.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use warden_core::error::WardenError;

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

/// Upper bound on every duration setting; keeps timestamp arithmetic in range.
pub const MAX_DURATION_SECS: u64 = 100 * 365 * DAY_SECS;

/// Parameters of the audit scoring, vetting, and suspension rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Forgetting factor, 0 < lambda <= 1.
    #[serde(default = "default_audit_lambda")]
    pub audit_lambda: f64,

    /// Weight of a single audit in the Beta update.
    #[serde(default = "default_audit_weight")]
    pub audit_weight: f64,

    /// Score at or below which the audit track disqualifies and the
    /// unknown-audit track suspends.
    #[serde(default = "default_audit_dq")]
    pub audit_dq: f64,

    /// Evaluated audits needed before a node is vetted.
    #[serde(default = "default_audits_required_for_vetting")]
    pub audits_required_for_vetting: u64,

    /// How long a node may stay unknown-audit suspended before a further
    /// non-success audit disqualifies it.
    #[serde(default = "default_suspension_grace_period_secs")]
    pub suspension_grace_period_secs: u64,

    /// Whether an expired unknown-audit suspension may disqualify.
    #[serde(default)]
    pub suspension_dq_enabled: bool,

    /// Offline tracking and review window.
    #[serde(default)]
    pub audit_history: AuditHistoryConfig,
}

/// Parameters of the online-score history and the offline review window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistoryConfig {
    /// Size of one up/down counting window.
    #[serde(default = "default_window_size_secs")]
    pub window_size_secs: u64,

    /// Span of windows that make up the online score.
    #[serde(default = "default_tracking_period_secs")]
    pub tracking_period_secs: u64,

    /// Time after a review starts before the tracking period begins.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Online score below which a node is penalized.
    #[serde(default = "default_offline_threshold")]
    pub offline_threshold: f64,

    /// Whether a failed offline review disqualifies.
    #[serde(default)]
    pub offline_dq_enabled: bool,

    /// Whether offline tracking and suspension run at all.
    #[serde(default = "default_offline_suspension_enabled")]
    pub offline_suspension_enabled: bool,
}

/// Starting Beta parameters for records created by `Init` or lazily on
/// first use. Both tracks start from the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialReputation {
    #[serde(default = "default_initial_alpha")]
    pub alpha: f64,
    #[serde(default = "default_initial_beta")]
    pub beta: f64,
}

fn default_audit_lambda() -> f64 {
    0.999
}

fn default_audit_weight() -> f64 {
    1.0
}

fn default_audit_dq() -> f64 {
    0.96
}

fn default_audits_required_for_vetting() -> u64 {
    100
}

fn default_suspension_grace_period_secs() -> u64 {
    7 * DAY_SECS
}

fn default_window_size_secs() -> u64 {
    12 * HOUR_SECS
}

fn default_tracking_period_secs() -> u64 {
    30 * DAY_SECS
}

fn default_grace_period_secs() -> u64 {
    7 * DAY_SECS
}

fn default_offline_threshold() -> f64 {
    0.6
}

fn default_offline_suspension_enabled() -> bool {
    true
}

fn default_initial_alpha() -> f64 {
    1000.0
}

fn default_initial_beta() -> f64 {
    1.0
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            audit_lambda: default_audit_lambda(),
            audit_weight: default_audit_weight(),
            audit_dq: default_audit_dq(),
            audits_required_for_vetting: default_audits_required_for_vetting(),
            suspension_grace_period_secs: default_suspension_grace_period_secs(),
            suspension_dq_enabled: false,
            audit_history: AuditHistoryConfig::default(),
        }
    }
}

impl Default for AuditHistoryConfig {
    fn default() -> Self {
        Self {
            window_size_secs: default_window_size_secs(),
            tracking_period_secs: default_tracking_period_secs(),
            grace_period_secs: default_grace_period_secs(),
            offline_threshold: default_offline_threshold(),
            offline_dq_enabled: false,
            offline_suspension_enabled: default_offline_suspension_enabled(),
        }
    }
}

impl Default for InitialReputation {
    fn default() -> Self {
        Self {
            alpha: default_initial_alpha(),
            beta: default_initial_beta(),
        }
    }
}

fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX / 1_000))
}

fn check_duration(name: &str, value: u64) -> Result<(), WardenError> {
    if value > MAX_DURATION_SECS {
        return Err(WardenError::InvalidConfig(format!(
            "{} must be at most {} seconds, got {}",
            name, MAX_DURATION_SECS, value
        )));
    }
    Ok(())
}

impl ReputationConfig {
    pub fn suspension_grace_period(&self) -> Duration {
        secs(self.suspension_grace_period_secs)
    }

    /// Reject values that would break the scoring invariants.
    pub fn validate(&self) -> Result<(), WardenError> {
        if !(self.audit_lambda > 0.0 && self.audit_lambda <= 1.0) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_lambda must be in (0, 1], got {}",
                self.audit_lambda
            )));
        }
        if !(self.audit_weight > 0.0) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_weight must be positive, got {}",
                self.audit_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.audit_dq) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_dq must be in [0, 1], got {}",
                self.audit_dq
            )));
        }
        check_duration(
            "suspension_grace_period_secs",
            self.suspension_grace_period_secs,
        )?;
        self.audit_history.validate()
    }
}

impl AuditHistoryConfig {
    pub fn window_size(&self) -> Duration {
        secs(self.window_size_secs)
    }

    pub fn tracking_period(&self) -> Duration {
        secs(self.tracking_period_secs)
    }

    pub fn grace_period(&self) -> Duration {
        secs(self.grace_period_secs)
    }

    /// Number of complete windows that fill one tracking period.
    pub fn windows_per_tracking_period(&self) -> u64 {
        if self.window_size_secs == 0 {
            return 0;
        }
        self.tracking_period_secs / self.window_size_secs
    }

    pub fn validate(&self) -> Result<(), WardenError> {
        check_duration("audit_history.window_size_secs", self.window_size_secs)?;
        check_duration("audit_history.tracking_period_secs", self.tracking_period_secs)?;
        check_duration("audit_history.grace_period_secs", self.grace_period_secs)?;
        if self.window_size_secs == 0 {
            return Err(WardenError::InvalidConfig(
                "audit_history.window_size_secs must be non-zero".to_string(),
            ));
        }
        if self.tracking_period_secs < self.window_size_secs {
            return Err(WardenError::InvalidConfig(format!(
                "audit_history.tracking_period_secs ({}) is shorter than one window ({})",
                self.tracking_period_secs, self.window_size_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.offline_threshold) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_history.offline_threshold must be in [0, 1], got {}",
                self.offline_threshold
            )));
        }
        Ok(())
    }
}

impl InitialReputation {
    pub fn validate(&self) -> Result<(), WardenError> {
        if !(self.alpha > 0.0 && self.beta > 0.0) {
            return Err(WardenError::InvalidConfig(format!(
                "initial alpha and beta must be positive, got ({}, {})",
                self.alpha, self.beta
            )));
        }
        Ok(())
    }
}
