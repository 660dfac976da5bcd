// crates/warden-reputation/src/history.rs
//
// Online-score history tracker.
//
// Audits are bucketed into fixed-size windows of up/down counts. The online
// score is the mean online ratio of every complete window inside the
// tracking period; the window currently being filled does not count. A
// tracking period is "full" once it holds enough complete windows to span
// the whole period, which is the earliest point a node can be penalized.

use chrono::{DateTime, Utc};

use warden_core::error::WardenError;
use warden_core::history::{AuditHistory, AuditWindow};

use crate::config::AuditHistoryConfig;

/// Result of recording one up/down observation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryUpdate {
    /// Re-encoded history blob to persist.
    pub history: Vec<u8>,
    /// Online score in [0, 1].
    pub score: f64,
    /// Whether the history spans a full tracking period.
    pub tracking_period_full: bool,
}

/// Turns a sequence of up/down observations into a smoothed online score.
///
/// The reputation engine passes the stored blob through untouched; only the
/// tracker interprets it.
pub trait AuditHistoryTracker: Send + Sync {
    fn record(
        &self,
        history: &[u8],
        now: DateTime<Utc>,
        is_up: bool,
        config: &AuditHistoryConfig,
    ) -> Result<HistoryUpdate, WardenError>;
}

/// Default tracker over `AuditHistory` windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowedHistoryTracker;

impl WindowedHistoryTracker {
    pub fn new() -> Self {
        Self
    }
}

/// Truncate `t` down to a multiple of `window_secs` since the Unix epoch.
fn window_start(t: DateTime<Utc>, window_secs: u64) -> Result<DateTime<Utc>, WardenError> {
    let window = i64::try_from(window_secs)
        .map_err(|_| WardenError::InvalidConfig(format!("window size {} too large", window_secs)))?;
    if window == 0 {
        return Err(WardenError::InvalidConfig(
            "audit history window size must be non-zero".to_string(),
        ));
    }
    let secs = t.timestamp();
    let start = secs - secs.rem_euclid(window);
    DateTime::from_timestamp(start, 0)
        .ok_or_else(|| WardenError::InvalidState(format!("window start {} out of range", start)))
}

/// Add one observation to `history` in place.
pub fn add_audit(
    history: &mut AuditHistory,
    is_up: bool,
    audit_time: DateTime<Utc>,
    config: &AuditHistoryConfig,
) -> Result<(), WardenError> {
    let new_window_start = window_start(audit_time, config.window_size_secs)?;
    let earliest_window = new_window_start
        .checked_sub_signed(config.tracking_period())
        .ok_or_else(|| {
            WardenError::InvalidConfig(format!(
                "tracking period of {}s reaches before the earliest representable time",
                config.tracking_period_secs
            ))
        })?;

    // Windows are kept oldest first, so expired ones form a prefix.
    let expired = history
        .windows
        .iter()
        .take_while(|w| w.window_start < earliest_window)
        .count();
    let mut windows_modified = expired > 0;
    history.windows.drain(..expired);

    let needs_new_window = history
        .windows
        .last()
        .map_or(true, |w| w.window_start < new_window_start);
    if needs_new_window {
        history.windows.push(AuditWindow::new(new_window_start));
        windows_modified = true;
    }

    let latest = history
        .windows
        .last_mut()
        .ok_or_else(|| WardenError::InvalidState("audit history has no windows".to_string()))?;
    if latest.window_start > new_window_start {
        return Err(WardenError::InvalidState(format!(
            "cannot add audit at {} to history; window {} already passed",
            audit_time, latest.window_start
        )));
    }

    if is_up {
        latest.online_count += 1;
    }
    latest.total_count += 1;

    // Scores only move when the set of complete windows changes.
    if !windows_modified {
        return Ok(());
    }

    if history.windows.len() <= 1 {
        history.score = 1.0;
        return Ok(());
    }

    let complete = &history.windows[..history.windows.len() - 1];
    let total: f64 = complete.iter().map(AuditWindow::online_ratio).sum();
    history.score = total / complete.len() as f64;
    Ok(())
}

impl AuditHistoryTracker for WindowedHistoryTracker {
    fn record(
        &self,
        history: &[u8],
        now: DateTime<Utc>,
        is_up: bool,
        config: &AuditHistoryConfig,
    ) -> Result<HistoryUpdate, WardenError> {
        let mut decoded = AuditHistory::decode(history)?;
        add_audit(&mut decoded, is_up, now, config)?;

        let complete_windows = decoded.windows.len().saturating_sub(1) as u64;
        let tracking_period_full = complete_windows >= config.windows_per_tracking_period();

        Ok(HistoryUpdate {
            history: decoded.encode()?,
            score: decoded.score,
            tracking_period_full,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn config() -> AuditHistoryConfig {
        AuditHistoryConfig {
            window_size_secs: 3600,
            tracking_period_secs: 4 * 3600,
            ..Default::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn window_start_truncates() {
        let t = t0() + Duration::minutes(59);
        assert_eq!(window_start(t, 3600).unwrap(), t0());
    }

    #[test]
    fn first_audit_scores_one() {
        let mut history = AuditHistory::default();
        add_audit(&mut history, false, t0(), &config()).unwrap();
        assert_eq!(history.windows.len(), 1);
        assert_eq!(history.windows[0].total_count, 1);
        assert_eq!(history.windows[0].online_count, 0);
        assert!((history.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn current_window_excluded_from_score() {
        let cfg = config();
        let mut history = AuditHistory::default();
        // Window 0: one up, one down.
        add_audit(&mut history, true, t0(), &cfg).unwrap();
        add_audit(&mut history, false, t0() + Duration::minutes(10), &cfg).unwrap();
        // Window 1: down, but it is the in-progress window.
        add_audit(&mut history, false, t0() + Duration::hours(1), &cfg).unwrap();
        assert_eq!(history.windows.len(), 2);
        assert!((history.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn expired_windows_are_dropped() {
        let cfg = config();
        let mut history = AuditHistory::default();
        for h in 0..8 {
            add_audit(&mut history, true, t0() + Duration::hours(h), &cfg).unwrap();
        }
        // Tracking period of 4h keeps the windows at [-4h, now].
        assert_eq!(history.windows.len(), 5);
        assert_eq!(history.windows[0].window_start, t0() + Duration::hours(3));
    }

    #[test]
    fn past_window_rejected() {
        let cfg = config();
        let mut history = AuditHistory::default();
        add_audit(&mut history, true, t0() + Duration::hours(2), &cfg).unwrap();
        let err = add_audit(&mut history, true, t0(), &cfg).unwrap_err();
        assert!(matches!(err, WardenError::InvalidState(_)));
    }

    #[test]
    fn tracking_period_fills_after_enough_windows() {
        let cfg = config();
        let tracker = WindowedHistoryTracker::new();
        let mut blob = Vec::new();
        let mut full = false;
        for h in 0..=4 {
            let update = tracker
                .record(&blob, t0() + Duration::hours(h), false, &cfg)
                .unwrap();
            blob = update.history;
            full = update.tracking_period_full;
            if h < 4 {
                assert!(!full, "period should not be full after {} windows", h + 1);
            }
        }
        assert!(full);
        let history = AuditHistory::decode(&blob).unwrap();
        assert!(history.score.abs() < 1e-12);
    }

    #[test]
    fn oversized_tracking_period_is_an_error() {
        let cfg = AuditHistoryConfig {
            tracking_period_secs: u64::MAX,
            ..config()
        };
        let err = WindowedHistoryTracker
            .record(&[], t0(), true, &cfg)
            .unwrap_err();
        assert!(matches!(err, WardenError::InvalidConfig(_)));
    }

    #[test]
    fn corrupt_blob_surfaces_decode_error() {
        let err = WindowedHistoryTracker
            .record(b"{not json", t0(), true, &config())
            .unwrap_err();
        assert!(matches!(err, WardenError::Decode(_)));
    }
}
