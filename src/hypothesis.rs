//! # Stage: Hypothesis Test
//!
//! ## Responsibility
//! Welch's independent two-sample t-test (unequal variances) with a
//! two-sided p-value from the exact Student's t distribution.
//!
//! ## Guarantees
//! - Pure and deterministic: identical inputs give bit-identical results
//! - Antisymmetric: swapping the samples negates the statistic exactly and
//!   leaves df and the p-value unchanged
//! - `p_value` is always in [0, 1] and `reject_null == (p_value < alpha)`
//!
//! ## NOT Responsible For
//! - Pooled-variance (Student) or paired tests
//! - Wording the outcome (see [`crate::conclusion`])

use serde::{Deserialize, Serialize};

use crate::describe::{ensure_min_observations, moments_sorted};
use crate::distribution::student_t_two_sided_p;
use crate::error::{ContrastError, Result};
use crate::sample::Sample;

/// Conventional significance threshold.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Outcome of a Welch's t-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// t statistic, `(mean_a − mean_b) / SE`.
    pub statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Significance threshold the decision was made at.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub reject_null: bool,
}

/// Reject anything outside the open interval (0, 1), NaN included.
pub fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(ContrastError::InvalidAlpha(alpha))
    }
}

/// Run Welch's t-test of `sample_a` against `sample_b` at level `alpha`.
///
/// # Errors
/// - [`ContrastError::InvalidAlpha`] if `alpha` is not in (0, 1)
/// - [`ContrastError::InsufficientData`] if either sample has < 2 observations
/// - [`ContrastError::DegenerateVariance`] if both samples have zero variance
/// - [`ContrastError::NonFiniteStatistic`] if the spread of the samples
///   itself exceeds the `f64` range
pub fn compare(sample_a: &Sample, sample_b: &Sample, alpha: f64) -> Result<TestResult> {
    validate_alpha(alpha)?;
    ensure_min_observations(sample_a)?;
    ensure_min_observations(sample_b)?;

    let n_a = sample_a.len() as f64;
    let n_b = sample_b.len() as f64;
    let (mean_a, sd_a) = moments_sorted(&sample_a.sorted_values());
    let (mean_b, sd_b) = moments_sorted(&sample_b.sorted_values());
    if sd_a == 0.0 && sd_b == 0.0 {
        return Err(ContrastError::DegenerateVariance);
    }

    // Standard errors stay unsquared; the combined one is formed relative to
    // the larger so extreme magnitudes neither overflow nor underflow.
    let se_a = sd_a / n_a.sqrt();
    let se_b = sd_b / n_b.sqrt();
    let se_max = se_a.max(se_b);
    if !(se_max > 0.0 && se_max.is_finite()) {
        return Err(ContrastError::NonFiniteStatistic { quantity: "standard error" });
    }
    let (r_a, r_b) = (se_a / se_max, se_b / se_max);
    let se_total = se_max * (r_a * r_a + r_b * r_b).sqrt();

    let diff = mean_a - mean_b;
    let statistic = if diff.is_finite() {
        diff / se_total
    } else {
        (0.5 * mean_a - 0.5 * mean_b) / (0.5 * se_total)
    };
    if statistic.is_nan() {
        return Err(ContrastError::NonFiniteStatistic { quantity: "t statistic" });
    }

    // Welch–Satterthwaite from the variance weights w = se²/se_total², which
    // lie in [0, 1] and sum to 1.
    let w_a = (se_a / se_total).powi(2);
    let w_b = (se_b / se_total).powi(2);
    let df = 1.0 / (w_a * w_a / (n_a - 1.0) + w_b * w_b / (n_b - 1.0));
    if !(df.is_finite() && df > 0.0) {
        return Err(ContrastError::NonFiniteStatistic { quantity: "degrees of freedom" });
    }

    let p_value = student_t_two_sided_p(statistic, df);
    let reject_null = p_value < alpha;

    tracing::debug!(
        a = sample_a.label(),
        b = sample_b.label(),
        t = statistic,
        df,
        p = p_value,
        reject_null,
        "welch t-test"
    );

    Ok(TestResult { statistic, df, p_value, alpha, reject_null })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn s(label: &str, v: &[f64]) -> Sample {
        Sample::new(label, v.to_vec()).unwrap()
    }

    #[test]
    fn test_separated_groups_reject() {
        let a = s("a", &[70.0, 72.0, 68.0, 71.0, 69.0]);
        let b = s("b", &[75.0, 77.0, 74.0, 76.0, 78.0]);
        let r = compare(&a, &b, DEFAULT_ALPHA).unwrap();
        assert!((r.statistic + 6.0).abs() < 1e-12, "t={}", r.statistic);
        assert!((r.df - 8.0).abs() < 1e-12, "df={}", r.df);
        assert!((r.p_value - 3.2339e-4).abs() < 1e-7, "p={}", r.p_value);
        assert!(r.reject_null);
        assert_eq!(r.alpha, 0.05);
    }

    #[test]
    fn test_near_identical_groups_do_not_reject() {
        let a = s("a", &[50.0, 51.0, 49.0, 50.0, 50.0]);
        let b = s("b", &[50.0, 49.0, 51.0, 50.0, 50.0]);
        let r = compare(&a, &b, DEFAULT_ALPHA).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
        assert!(!r.reject_null);
    }

    #[test]
    fn test_unequal_sizes_and_variances() {
        let a = s("a", &[1.0, 2.0, 3.0, 4.0]);
        let b = s("b", &[2.0, 4.0, 6.0, 8.0, 10.0]);
        let r = compare(&a, &b, DEFAULT_ALPHA).unwrap();
        assert!((r.statistic + 2.251_436_323).abs() < 1e-8);
        assert!((r.df - 5.520_787_746).abs() < 1e-8);
        assert!((r.p_value - 0.069_133_59).abs() < 1e-6);
        assert!(!r.reject_null);
    }

    #[test]
    fn test_symmetry() {
        let a = s("a", &[3.1, 4.7, 2.2, 5.0]);
        let b = s("b", &[6.3, 5.9, 7.7, 6.1, 8.0]);
        let ab = compare(&a, &b, 0.05).unwrap();
        let ba = compare(&b, &a, 0.05).unwrap();
        assert_eq!(ab.statistic, -ba.statistic);
        assert_eq!(ab.p_value, ba.p_value);
        assert_eq!(ab.df, ba.df);
    }

    #[test]
    fn test_idempotent() {
        let a = s("a", &[1.5, 2.5, 3.5]);
        let b = s("b", &[2.0, 2.1, 9.0]);
        assert_eq!(compare(&a, &b, 0.1).unwrap(), compare(&a, &b, 0.1).unwrap());
    }

    #[test]
    fn test_one_zero_variance_is_fine() {
        let a = s("a", &[5.0, 5.0, 5.0]);
        let b = s("b", &[4.0, 6.0, 8.0]);
        let r = compare(&a, &b, 0.05).unwrap();
        assert!(r.statistic.is_finite());
        assert!((r.df - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_zero_variance_is_degenerate() {
        let a = s("a", &[5.0, 5.0, 5.0]);
        let b = s("b", &[7.0, 7.0]);
        assert!(matches!(compare(&a, &b, 0.05), Err(ContrastError::DegenerateVariance)));
    }

    #[test]
    fn test_insufficient_data() {
        let a = s("solo", &[5.0]);
        let b = s("b", &[4.0, 6.0]);
        match compare(&a, &b, 0.05) {
            Err(ContrastError::InsufficientData { label, count }) => {
                assert_eq!(label, "solo");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(compare(&b, &a, 0.05).is_err());
    }

    #[test]
    fn test_two_observations_each_is_enough() {
        let a = s("a", &[1.0, 2.0]);
        let b = s("b", &[3.0, 5.0]);
        assert!(compare(&a, &b, 0.05).is_ok());
    }

    #[test]
    fn test_invalid_alpha() {
        let a = s("a", &[1.0, 2.0]);
        let b = s("b", &[3.0, 5.0]);
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(compare(&a, &b, alpha), Err(ContrastError::InvalidAlpha(_))));
        }
    }

    fn scaled(label: &str, v: &[f64], k: f64) -> Sample {
        s(label, &v.iter().map(|x| x * k).collect::<Vec<_>>())
    }

    fn assert_close_rel(actual: f64, expected: f64, what: &str) {
        assert!(
            ((actual - expected) / expected).abs() < 1e-9,
            "{what}: {actual} vs {expected}"
        );
    }

    #[test]
    fn test_extreme_magnitudes_match_unit_scale() {
        let a = [0.0, 1.0, 2.0];
        let b = [0.0, 3.0, 6.0];
        let reference = compare(&s("a", &a), &s("b", &b), 0.05).unwrap();
        for k in [1e-300, 1e-200, 1e-160, 1e154, 1e300] {
            let r = compare(&scaled("a", &a, k), &scaled("b", &b, k), 0.05).unwrap();
            assert_close_rel(r.statistic, reference.statistic, "t");
            assert_close_rel(r.df, reference.df, "df");
            assert_close_rel(r.p_value, reference.p_value, "p");
            assert_eq!(r.reject_null, reference.reject_null);
        }
    }

    #[test]
    fn test_tiny_spread_is_not_degenerate() {
        let a = s("a", &[0.0, 1e-200]);
        let b = s("b", &[0.0, 1e-200]);
        let r = compare(&a, &b, 0.05).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_near_max_values_stay_finite() {
        let a = s("a", &[1.5e308, 1.6e308]);
        let b = s("b", &[1.0e308, 1.2e308]);
        let r = compare(&a, &b, 0.05).unwrap();
        let reference = compare(&s("a", &[1.5, 1.6]), &s("b", &[1.0, 1.2]), 0.05).unwrap();
        assert_close_rel(r.statistic, reference.statistic, "t");
        assert_close_rel(r.df, reference.df, "df");
        assert!((0.0..=1.0).contains(&r.p_value));
    }

    #[test]
    fn test_mean_difference_beyond_f64_range() {
        // 1.55e308 - (-1.55e308) overflows; the statistic must not
        let a = s("a", &[1.5e308, 1.6e308]);
        let b = s("b", &[-1.5e308, -1.6e308]);
        let r = compare(&a, &b, 0.05).unwrap();
        let reference = compare(&s("a", &[1.5, 1.6]), &s("b", &[-1.5, -1.6]), 0.05).unwrap();
        assert_close_rel(r.statistic, reference.statistic, "t");
        assert!(r.reject_null);
    }

    #[test]
    fn test_unrepresentable_spread_is_an_error() {
        // the sample standard deviation of ±1.7e308 is about 2.4e308
        let a = s("a", &[-1.7e308, 1.7e308]);
        let b = s("b", &[0.0, 1.0]);
        assert!(matches!(
            compare(&a, &b, 0.05),
            Err(ContrastError::NonFiniteStatistic { .. })
        ));
    }

    #[test]
    fn test_reject_tracks_alpha() {
        let a = s("a", &[1.0, 2.0, 3.0, 4.0]);
        let b = s("b", &[2.0, 4.0, 6.0, 8.0, 10.0]);
        // p ≈ 0.069
        assert!(!compare(&a, &b, 0.05).unwrap().reject_null);
        assert!(compare(&a, &b, 0.10).unwrap().reject_null);
    }
}
