//! # Stage: Samples
//!
//! ## Responsibility
//! Construction of labelled, immutable numeric samples, either from literal
//! values, from text, or drawn from a seeded Gaussian.
//!
//! ## Guarantees
//! - Every stored value is finite; malformed input is rejected here, before
//!   any statistic is computed
//! - Reproducible: a [`GaussianSpec`] with the same seed always yields the same
//!   sample, and no process-wide RNG is touched
//!
//! ## NOT Responsible For
//! - Enforcing the two-observation minimum (checked by the analysis stages)

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::distribution::normal_cdf;
use crate::error::{ContrastError, Result};

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// An ordered, immutable sequence of observations from one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    label: String,
    values: Vec<f64>,
}

impl Sample {
    /// Build a sample from literal values.
    ///
    /// Fails with [`ContrastError::MalformedSample`] if the label is blank or
    /// any value is NaN or infinite.
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ContrastError::MalformedSample {
                label,
                reason: "group label must not be empty".into(),
            });
        }
        if let Some((idx, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ContrastError::MalformedSample {
                label,
                reason: format!("value #{} is not finite ({})", idx + 1, v),
            });
        }
        Ok(Self { label, values })
    }

    /// Parse a comma- or whitespace-separated list of numbers.
    pub fn parse(label: impl Into<String>, text: &str) -> Result<Self> {
        let label = label.into();
        let mut values = Vec::new();
        for token in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let v = token.parse::<f64>().map_err(|_| ContrastError::MalformedSample {
                label: label.clone(),
                reason: format!("'{}' is not a number", token),
            })?;
            values.push(v);
        }
        Self::new(label, values)
    }

    /// Draw a sample from the Gaussian described by `spec`.
    pub fn simulate(label: impl Into<String>, spec: &GaussianSpec) -> Result<Self> {
        let label = label.into();
        spec.validate().map_err(|reason| ContrastError::MalformedSample {
            label: label.clone(),
            reason,
        })?;
        let values = spec.draw().map_err(|reason| ContrastError::MalformedSample {
            label: label.clone(),
            reason,
        })?;
        tracing::debug!(label = %label, n = values.len(), seed = spec.seed, "simulated sample");
        Self::new(label, values)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of the values in ascending order.
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }
}

// ---------------------------------------------------------------------------
// GaussianSpec
// ---------------------------------------------------------------------------

/// Parameters of a simulated normal sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianSpec {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
    pub seed: u64,
    /// Round each draw to this many decimal places.
    #[serde(default)]
    pub decimals: Option<u32>,
}

impl GaussianSpec {
    pub fn new(mean: f64, std_dev: f64, count: usize, seed: u64) -> Self {
        Self { mean, std_dev, count, seed, decimals: None }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Range-check the parameters; returns an error string if invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.mean.is_finite() {
            return Err(format!("mean must be finite, got {}", self.mean));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(format!("std_dev must be finite and >= 0, got {}", self.std_dev));
        }
        if self.count == 0 {
            return Err("count must be >= 1".into());
        }
        Ok(())
    }

    fn draw(&self) -> std::result::Result<Vec<f64>, String> {
        let normal = Normal::new(self.mean, self.std_dev).map_err(|e| e.to_string())?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let scale = self.decimals.map(|d| 10f64.powi(d as i32));
        Ok((0..self.count)
            .map(|_| {
                let v = normal.sample(&mut rng);
                match scale {
                    Some(s) => (v * s).round() / s,
                    None => v,
                }
            })
            .collect())
    }

    /// `P(X < x)` under the generating distribution.
    pub fn probability_below(&self, x: f64) -> f64 {
        normal_cdf(x, self.mean, self.std_dev)
    }

    /// `P(lo < X < hi)` under the generating distribution; 0 when `hi <= lo`.
    pub fn probability_between(&self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return 0.0;
        }
        (self.probability_below(hi) - self.probability_below(lo)).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
