//! Crate-level error type.
//!
//! Every fallible operation in the library returns [`Result`], so callers can
//! bubble failures up with `?` and match on the variant when they need to
//! distinguish a bad sample from a bad config file.

use thiserror::Error;

/// Everything that can go wrong while building samples, running a comparison,
/// loading configuration, or writing reports.
#[derive(Debug, Error)]
pub enum ContrastError {
    /// A sample has fewer than the two observations needed for a variance.
    #[error("sample '{label}' has {count} observation(s); at least 2 are required")]
    InsufficientData { label: String, count: usize },

    /// Both samples have zero variance, so the t statistic is 0/0.
    #[error("both samples have zero variance; the t statistic is undefined")]
    DegenerateVariance,

    /// The samples span a range too wide for `f64`, so the statistic or its
    /// degrees of freedom could not be represented.
    #[error("welch t-test produced a non-finite {quantity}; the samples exceed the f64 range")]
    NonFiniteStatistic { quantity: &'static str },

    /// Significance threshold outside the open interval (0, 1).
    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    /// A value could not be accepted into a sample.
    #[error("malformed sample '{label}': {reason}")]
    MalformedSample { label: String, reason: String },

    /// A scenario definition failed its range checks.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ContrastError>;
