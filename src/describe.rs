//! # Stage: Descriptive Statistics
//!
//! ## Responsibility
//! Per-group summaries (count, mean, sample standard deviation, min,
//! quartiles, max) and Tukey-fence outlier screening.
//!
//! ## Guarantees
//! - Pure: a summary is a function of the multiset of values only; every
//!   statistic is computed from the sorted values, so input order never
//!   changes a single bit of the result
//! - Percentiles use linear interpolation between order statistics
//!   (`h = (n - 1) * q`)
//! - A constant sample has a standard deviation of exactly 0
//!
//! ## NOT Responsible For
//! - Hypothesis testing (see [`crate::hypothesis`])

use serde::{Deserialize, Serialize};

use crate::error::{ContrastError, Result};
use crate::sample::Sample;

/// Minimum observations for a sample variance.
pub const MIN_OBSERVATIONS: usize = 2;

// ---------------------------------------------------------------------------
// DescriptiveSummary
// ---------------------------------------------------------------------------

/// Descriptive statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveSummary {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (divisor n − 1).
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl DescriptiveSummary {
    /// Sample variance (divisor n − 1).
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// Interquartile range, `p75 - p25`.
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

/// Summarize a sample.
///
/// Fails with [`ContrastError::InsufficientData`] when the sample has fewer
/// than two observations.
pub fn summarize(sample: &Sample) -> Result<DescriptiveSummary> {
    ensure_min_observations(sample)?;
    let sorted = sample.sorted_values();
    let (mean, std_dev) = moments_sorted(&sorted);

    let summary = DescriptiveSummary {
        label: sample.label().to_string(),
        count: sorted.len(),
        mean,
        std_dev,
        min: sorted[0],
        p25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.50),
        p75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    };
    tracing::debug!(
        label = %summary.label,
        n = summary.count,
        mean = summary.mean,
        std_dev = summary.std_dev,
        "summarized sample"
    );
    Ok(summary)
}

pub(crate) fn ensure_min_observations(sample: &Sample) -> Result<()> {
    if sample.len() < MIN_OBSERVATIONS {
        return Err(ContrastError::InsufficientData {
            label: sample.label().to_string(),
            count: sample.len(),
        });
    }
    Ok(())
}

/// Mean and sample standard deviation (n − 1) of ascending, non-empty values.
///
/// Two-pass over values divided by a power of two near their largest
/// magnitude, so neither the sum nor the squares leave the normal range and
/// the result is bit-identical to the unscaled computation whenever that one
/// does not overflow or underflow. A sample whose min equals its max
/// short-circuits to `(min, 0.0)`.
pub(crate) fn moments_sorted(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len();
    let (first, last) = (sorted[0], sorted[n - 1]);
    if first == last {
        return (first, 0.0);
    }
    let scale = power_of_two_scale(first.abs().max(last.abs()));
    let mean = sorted.iter().map(|&x| x / scale).sum::<f64>() / n as f64;
    let ss = sorted
        .iter()
        .map(|&x| {
            let d = x / scale - mean;
            d * d
        })
        .sum::<f64>();
    (mean * scale, (ss / (n - 1) as f64).sqrt() * scale)
}

/// `2^k` with `k = floor(log2(magnitude))`, kept within `2^±1000`.
fn power_of_two_scale(magnitude: f64) -> f64 {
    const MAX_EXP: i32 = 1000;
    if magnitude == 0.0 || !magnitude.is_finite() {
        return 1.0;
    }
    let k = (magnitude.log2().floor() as i32).clamp(-MAX_EXP, MAX_EXP);
    f64::from_bits(((k + 1023) as u64) << 52)
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Quantile `q` in [0, 1] of arbitrary-order values, linear interpolation.
///
/// Returns `None` for an empty slice, a `q` outside [0, 1], or NaN input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(quantile_sorted(&sorted, q))
}

// ---------------------------------------------------------------------------
// Outlier screening
// ---------------------------------------------------------------------------

/// Tukey fences: `[p25 − k·IQR, p75 + k·IQR]`, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierFences {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierFences {
    /// Conventional multiplier for Tukey fences.
    pub const TUKEY_K: f64 = 1.5;

    pub fn from_summary(summary: &DescriptiveSummary) -> Self {
        Self::with_multiplier(summary, Self::TUKEY_K)
    }

    pub fn with_multiplier(summary: &DescriptiveSummary, k: f64) -> Self {
        let iqr = summary.iqr();
        Self {
            lower: summary.p25 - k * iqr,
            upper: summary.p75 + k * iqr,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Split a sample into its in-fence observations (as a new sample with
    /// the same label, original order preserved) and the rejected values.
    pub fn partition(&self, sample: &Sample) -> Result<(Sample, Vec<f64>)> {
        let (kept, outliers): (Vec<f64>, Vec<f64>) =
            sample.values().iter().partition(|&&v| self.contains(v));
        if !outliers.is_empty() {
            tracing::debug!(label = sample.label(), removed = outliers.len(), "outliers removed");
        }
        Ok((Sample::new(sample.label(), kept)?, outliers))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
