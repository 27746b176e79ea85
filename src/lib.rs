//! Two-group inferential comparison: summarize both samples, run Welch's
//! unequal-variance t-test, and word the verdict.
//!
//! ```
//! use contrast_lab::{compare, conclude, summarize, Sample, DEFAULT_ALPHA};
//!
//! let a = Sample::new("before", vec![70.0, 72.0, 68.0, 71.0, 69.0])?;
//! let b = Sample::new("after", vec![75.0, 77.0, 74.0, 76.0, 78.0])?;
//!
//! assert_eq!(summarize(&a)?.mean, 70.0);
//! let result = compare(&a, &b, DEFAULT_ALPHA)?;
//! assert!(result.reject_null);
//! println!("{}", conclude(&result, a.label(), b.label(), "score", DEFAULT_ALPHA));
//! # Ok::<(), contrast_lab::ContrastError>(())
//! ```

pub mod cli;
pub mod conclusion;
pub mod config;
pub mod describe;
pub mod distribution;
pub mod error;
pub mod hypothesis;
pub mod report;
pub mod sample;
pub mod scenario;

pub use conclusion::{conclude, Conclusion, Verdict};
pub use describe::{summarize, DescriptiveSummary, OutlierFences};
pub use error::{ContrastError, Result};
pub use hypothesis::{compare, TestResult, DEFAULT_ALPHA};
pub use sample::{GaussianSpec, Sample};
pub use scenario::{builtin_scenarios, ScenarioOutcome, ScenarioSpec};
