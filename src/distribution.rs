//! # Stage: Distribution Functions
//!
//! ## Responsibility
//! Closed-form and continued-fraction evaluations of the distributions the
//! comparison needs: Student's t (for Welch p-values) and the normal
//! distribution (for questions asked of a simulation's generating model).
//!
//! ## Guarantees
//! - Non-panicking: out-of-domain inputs clamp to the boundary value
//! - Probabilities returned are always in [0, 1]
//!
//! ## NOT Responsible For
//! - Drawing random variates (see [`crate::sample::GaussianSpec`])

use std::f64::consts::{PI, SQRT_2};

// ---------------------------------------------------------------------------
// Gamma / Beta
// ---------------------------------------------------------------------------

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        return PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64));
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let clamp_tiny = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / clamp_tiny(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / clamp_tiny(1.0 + aa * d);
        c = clamp_tiny(1.0 + aa / c);
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / clamp_tiny(1.0 + aa * d);
        c = clamp_tiny(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Regularized incomplete beta function `I_x(a, b)`.
///
/// Returns 0 for `x <= 0` and 1 for `x >= 1`.
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // Use the symmetry relation where the continued fraction converges faster.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

// ---------------------------------------------------------------------------
// Student's t
// ---------------------------------------------------------------------------

/// Two-sided tail probability `P(|T| >= |t|)` for Student's t with `df`
/// degrees of freedom, i.e. `2 * (1 - CDF_t(|t|, df))`.
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Cumulative distribution function of Student's t.
pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    let tail = student_t_two_sided_p(t, df) / 2.0;
    if t >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

// ---------------------------------------------------------------------------
// Normal
// ---------------------------------------------------------------------------

/// Complementary error function, Chebyshev fit (fractional error < 1.2e-7).
fn erfc(x: f64) -> f64 {
    const COEFFS: [f64; 10] = [
        -1.265_512_23,
        1.000_023_68,
        0.374_091_96,
        0.096_784_18,
        -0.186_288_06,
        0.278_868_07,
        -1.135_203_98,
        1.488_515_87,
        -0.822_152_23,
        0.170_872_77,
    ];
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    // Horner from the highest-order coefficient down
    let poly = COEFFS.iter().rev().fold(0.0, |acc, c| acc * t + c);
    let r = t * (-z * z + poly).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// `P(X <= x)` for `X ~ N(mean, std_dev²)`.
///
/// A zero standard deviation is treated as a point mass at `mean`.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return if x >= mean { 1.0 } else { 0.0 };
    }
    (0.5 * erfc(-(x - mean) / (std_dev * SQRT_2))).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_ln_gamma_integer_is_log_factorial() {
        // Γ(5) = 4! = 24
        assert!(close(ln_gamma(5.0), 24.0_f64.ln(), 1e-12));
        assert!(close(ln_gamma(1.0), 0.0, 1e-12));
    }

    #[test]
    fn test_ln_gamma_half_is_log_sqrt_pi() {
        assert!(close(ln_gamma(0.5), PI.sqrt().ln(), 1e-12));
    }

    #[test]
    fn test_incomplete_beta_bounds() {
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 1.0), 1.0);
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, -0.5), 0.0);
    }

    #[test]
    fn test_incomplete_beta_uniform_case() {
        // I_x(1, 1) = x
        for x in [0.1, 0.25, 0.5, 0.9] {
            assert!(close(regularized_incomplete_beta(1.0, 1.0, x), x, 1e-12));
        }
    }

    #[test]
    fn test_t_cdf_df1_is_cauchy() {
        for t in [-3.0, -0.5, 0.5, 1.0, 10.0] {
            let expected = 0.5 + f64::atan(t) / PI;
            assert!(close(student_t_cdf(t, 1.0), expected, 1e-10), "t={t}");
        }
    }

    #[test]
    fn test_t_cdf_df2_closed_form() {
        for t in [-2.0_f64, 0.3, 1.0, 3.0] {
            let expected = 0.5 + t / (2.0 * (2.0 + t * t).sqrt());
            assert!(close(student_t_cdf(t, 2.0), expected, 1e-10), "t={t}");
        }
    }

    #[test]
    fn test_t_cdf_at_zero_is_half() {
        assert!(close(student_t_cdf(0.0, 7.3), 0.5, 1e-12));
    }

    #[test]
    fn test_two_sided_p_zero_statistic_is_one() {
        assert!(close(student_t_two_sided_p(0.0, 8.0), 1.0, 1e-12));
    }

    #[test]
    fn test_two_sided_p_known_value() {
        // |t| = 6 with 8 degrees of freedom
        assert!(close(student_t_two_sided_p(6.0, 8.0), 3.2339e-4, 1e-7));
    }

    #[test]
    fn test_two_sided_p_large_df_approaches_normal() {
        assert!(close(student_t_two_sided_p(1.96, 1e6), 0.05, 1e-4));
    }

    #[test]
    fn test_two_sided_p_infinite_statistic_is_zero() {
        assert_eq!(student_t_two_sided_p(f64::INFINITY, 4.0), 0.0);
    }

    #[test]
    fn test_normal_cdf_symmetry_and_center() {
        assert!(close(normal_cdf(28.0, 28.0, 3.0), 0.5, 1e-7));
        let lo = normal_cdf(25.0, 28.0, 3.0);
        let hi = normal_cdf(31.0, 28.0, 3.0);
        assert!(close(lo + hi, 1.0, 1e-7));
        // one standard deviation below the mean
        assert!(close(lo, 0.158_655_25, 1e-6));
    }

    #[test]
    fn test_normal_cdf_zero_sd_is_step() {
        assert_eq!(normal_cdf(0.9, 1.0, 0.0), 0.0);
        assert_eq!(normal_cdf(1.0, 1.0, 0.0), 1.0);
    }
}
