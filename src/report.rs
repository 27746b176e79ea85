//! # Stage: Reports
//!
//! ## Responsibility
//! Turn scenario outcomes into files: the simulated dataset as CSV, a
//! Markdown analysis report, and a machine-readable JSON results document.
//!
//! ## Guarantees
//! - Rendering functions are pure; only [`write_outputs`] touches the disk
//! - CSV fields containing separators or quotes are quoted (RFC 4180)
//!
//! ## NOT Responsible For
//! - Charts

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::conclusion::Conclusion;
use crate::describe::DescriptiveSummary;
use crate::error::Result;
use crate::hypothesis::TestResult;
use crate::scenario::ScenarioOutcome;

pub const RESULTS_SCHEMA_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// The outcome's observations in long format: one row per observation,
/// group A first, ids numbered `1..=2n`.
pub fn dataset_csv(outcome: &ScenarioOutcome) -> String {
    let spec = &outcome.spec;
    let decimals = spec.decimals as usize;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{},{},{}",
        csv_field(&spec.unit),
        csv_field(&spec.factor),
        csv_field(&spec.variable)
    );

    let rows = [&outcome.sample_a, &outcome.sample_b]
        .into_iter()
        .flat_map(|s| s.values().iter().map(move |v| (s.label(), *v)));
    for (i, (label, value)) in rows.enumerate() {
        let _ = writeln!(
            out,
            "{}{},{},{:.*}",
            spec.unit_prefix,
            i + 1,
            csv_field(label),
            decimals,
            value
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn summary_row(out: &mut String, s: &DescriptiveSummary) {
    let _ = writeln!(
        out,
        "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
        s.label, s.count, s.mean, s.std_dev, s.min, s.p25, s.median, s.p75, s.max
    );
}

fn scenario_section(out: &mut String, o: &ScenarioOutcome) {
    let spec = &o.spec;
    let _ = writeln!(out, "## Scenario {}: {}\n", spec.id, spec.title);
    if !spec.context.is_empty() {
        let _ = writeln!(out, "**Context:** {}\n", spec.context);
    }
    if !spec.objective.is_empty() {
        let _ = writeln!(out, "**Research question:** {}\n", spec.objective);
    }
    if !spec.null_hypothesis.is_empty() {
        let _ = writeln!(out, "**Null hypothesis (H0):** {}\n", spec.null_hypothesis);
    }
    if !spec.alternative_hypothesis.is_empty() {
        let _ = writeln!(out, "**Alternative hypothesis (H1):** {}\n", spec.alternative_hypothesis);
    }
    let _ = writeln!(out, "**Variables:**");
    let _ = writeln!(
        out,
        "- Independent: {} ({}, {})",
        spec.factor, o.sample_a.label(), o.sample_b.label()
    );
    let _ = writeln!(out, "- Dependent: {}\n", spec.variable);

    let _ = writeln!(out, "**Descriptive summary:**\n");
    let _ = writeln!(out, "| {} | count | mean | std | min | 25% | 50% | 75% | max |", spec.factor);
    let _ = writeln!(out, "|---|---|---|---|---|---|---|---|---|");
    summary_row(out, &o.summary_a);
    summary_row(out, &o.summary_b);
    out.push('\n');

    let _ = writeln!(out, "**Welch's t-test:**");
    let _ = writeln!(out, "- t statistic: {:.4}", o.result.statistic);
    let _ = writeln!(out, "- degrees of freedom: {:.2}", o.result.df);
    let _ = writeln!(out, "- p-value: {:.4}", o.result.p_value);
    let _ = writeln!(out, "- significance level (alpha): {}\n", o.result.alpha);
    let _ = writeln!(out, "**Conclusion:** {}\n", o.conclusion);
    let _ = writeln!(out, "---\n");
}

/// Full Markdown report for a batch of outcomes.
pub fn markdown_report(
    outcomes: &[ScenarioOutcome],
    failures: &[FailedScenario],
    alpha: f64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Statistical analysis of simulated two-group experiments\n");
    let _ = writeln!(
        out,
        "Each section states the research question, the hypotheses, a descriptive \
         summary of both groups, and the outcome of Welch's t-test at alpha = {alpha}.\n"
    );
    let _ = writeln!(out, "---\n");

    for o in outcomes {
        scenario_section(&mut out, o);
    }

    if !failures.is_empty() {
        let _ = writeln!(out, "## Scenarios that could not be analysed\n");
        for f in failures {
            let _ = writeln!(out, "- #{}: {}", f.id, f.error);
        }
        out.push('\n');
    }

    let rejected = outcomes.iter().filter(|o| o.result.reject_null).count();
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(
        out,
        "{} of {} comparison(s) showed a statistically significant difference at alpha = {}.",
        rejected,
        outcomes.len(),
        alpha
    );
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// A scenario that failed before producing an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScenario {
    pub id: u32,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ScenarioRecord {
    pub id: u32,
    pub title: String,
    pub factor: String,
    pub variable: String,
    pub summaries: [DescriptiveSummary; 2],
    pub result: TestResult,
    pub conclusion: Conclusion,
}

#[derive(Debug, Serialize)]
pub struct ResultsDocument {
    pub schema_version: u8,
    pub alpha: f64,
    pub scenarios: Vec<ScenarioRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedScenario>,
}

impl ResultsDocument {
    pub fn new(outcomes: &[ScenarioOutcome], failures: &[FailedScenario], alpha: f64) -> Self {
        let scenarios = outcomes
            .iter()
            .map(|o| ScenarioRecord {
                id: o.spec.id,
                title: o.spec.title.clone(),
                factor: o.spec.factor.clone(),
                variable: o.spec.variable.clone(),
                summaries: [o.summary_a.clone(), o.summary_b.clone()],
                result: o.result.clone(),
                conclusion: o.conclusion.clone(),
            })
            .collect();
        Self {
            schema_version: RESULTS_SCHEMA_VERSION,
            alpha,
            scenarios,
            failures: failures.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Write `data_scenario{id}.csv` per outcome plus `report.md` and
/// `results.json` into `dir` (created if missing). Returns the written paths.
pub fn write_outputs(
    dir: &Path,
    outcomes: &[ScenarioOutcome],
    failures: &[FailedScenario],
    alpha: f64,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(outcomes.len() + 2);

    for o in outcomes {
        let path = dir.join(format!("data_scenario{}.csv", o.spec.id));
        std::fs::write(&path, dataset_csv(o))?;
        written.push(path);
    }

    let report_path = dir.join("report.md");
    std::fs::write(&report_path, markdown_report(outcomes, failures, alpha))?;
    written.push(report_path);

    let json_path = dir.join("results.json");
    let json = ResultsDocument::new(outcomes, failures, alpha).to_json()?;
    std::fs::write(&json_path, &json)?;
    written.push(json_path);

    tracing::info!(dir = %dir.display(), files = written.len(), "wrote outputs");
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
