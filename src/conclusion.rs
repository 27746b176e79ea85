//! Plain-language verdicts for a [`TestResult`].

use serde::{Deserialize, Serialize};

use crate::hypothesis::TestResult;

/// Which way the test went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Reject,
    FailToReject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Reject => write!(f, "reject H0"),
            Verdict::FailToReject => write!(f, "fail to reject H0"),
        }
    }
}

/// A verdict together with its rendered sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub verdict: Verdict,
    pub text: String,
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render the conclusion for `result`.
///
/// Only `result.reject_null` selects the sentence; `alpha` is what gets
/// printed in it.
pub fn conclude(
    result: &TestResult,
    label_a: &str,
    label_b: &str,
    variable_name: &str,
    alpha: f64,
) -> Conclusion {
    if result.reject_null {
        Conclusion {
            verdict: Verdict::Reject,
            text: format!(
                "reject the null hypothesis: a statistically significant difference in \
                 {variable_name} exists between {label_a} and {label_b} (p < {alpha})"
            ),
        }
    } else {
        Conclusion {
            verdict: Verdict::FailToReject,
            text: format!(
                "fail to reject the null hypothesis: insufficient evidence of a difference \
                 (p >= {alpha})"
            ),
        }
    }
}
