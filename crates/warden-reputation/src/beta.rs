// crates/warden-reputation/src/beta.rs
//
// Beta-distribution reputation update.
//
// A node's reputation on each track is a Beta(alpha, beta) distribution whose
// mean alpha / (alpha + beta) is the score. Each audit contributes one
// feedback value v in {+1, -1}:
//
//   alpha' = lambda * alpha + weight * (1 + v) / 2
//   beta'  = lambda * beta  + weight * (1 - v) / 2
//
// lambda is the forgetting factor: how much past evidence survives each
// update. weight scales how hard a single audit moves the distribution.

/// Apply one audit to an (alpha, beta) pair.
pub fn update_reputation(
    is_success: bool,
    alpha: f64,
    beta: f64,
    lambda: f64,
    weight: f64,
) -> (f64, f64) {
    let v: f64 = if is_success { 1.0 } else { -1.0 };
    let new_alpha = lambda * alpha + weight * (1.0 + v) / 2.0;
    let new_beta = lambda * beta + weight * (1.0 - v) / 2.0;
    (new_alpha, new_beta)
}

/// Mean of the Beta distribution.
pub fn score(alpha: f64, beta: f64) -> f64 {
    alpha / (alpha + beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_adds_weight_to_alpha() {
        let (a, b) = update_reputation(true, 1.0, 1.0, 1.0, 1.0);
        assert!((a - 2.0).abs() < 1e-12);
        assert!((b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn failure_adds_weight_to_beta() {
        let (a, b) = update_reputation(false, 1.0, 1.0, 1.0, 1.0);
        assert!((a - 1.0).abs() < 1e-12);
        assert!((b - 2.0).abs() < 1e-12);
    }

    #[test]
    fn lambda_forgets_history() {
        let (a, b) = update_reputation(false, 100.0, 0.0, 0.5, 1.0);
        assert!((a - 50.0).abs() < 1e-12);
        assert!((b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_failures_drive_score_down() {
        let (mut a, mut b) = (1000.0, 1.0);
        let start = score(a, b);
        for _ in 0..50 {
            (a, b) = update_reputation(false, a, b, 0.999, 1.0);
        }
        assert!(score(a, b) < start);
        assert!(a > 0.0 && b > 0.0);
    }
}
