//! # Stage: Scenario Runner
//!
//! ## Responsibility
//! Describe two-group comparisons as data and run each one through
//! simulate → summarize → compare → conclude.
//!
//! ## Guarantees
//! - Reproducible: every scenario carries its own seed; group B's stream is
//!   derived from it, so no two groups share a stream
//! - Isolated: one failing scenario never prevents the others from running
//!
//! ## NOT Responsible For
//! - Writing CSV / Markdown / JSON (see [`crate::report`])
//! - Loading scenario files (see [`crate::config`])

use serde::{Deserialize, Serialize};

use crate::conclusion::{conclude, Conclusion};
use crate::describe::{summarize, DescriptiveSummary, MIN_OBSERVATIONS};
use crate::error::{ContrastError, Result};
use crate::hypothesis::{compare, TestResult};
use crate::sample::{GaussianSpec, Sample};

/// XOR-ed into a scenario seed to get group B's seed.
const GROUP_B_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

const MAX_DECIMALS: u32 = 12;

// ---------------------------------------------------------------------------
// ScenarioSpec
// ---------------------------------------------------------------------------

/// Generating distribution of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub label: String,
    pub mean: f64,
    pub std_dev: f64,
}

/// Definition of a single two-group comparison.
///
/// ```toml
/// [[scenario]]
/// id = 7
/// title = "Standing desks and focus"
/// factor = "desk"
/// variable = "focus score"
/// count = 40
/// seed = 47
/// group_a = { label = "standing", mean = 62.0, std_dev = 9.0 }
/// group_b = { label = "sitting",  mean = 60.0, std_dev = 9.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub context: String,
    /// Research question, phrased as a question.
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub null_hypothesis: String,
    #[serde(default)]
    pub alternative_hypothesis: String,
    /// Independent variable (the grouping column).
    pub factor: String,
    /// Dependent variable (the measured column).
    pub variable: String,
    /// Name of the observation-id column.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Prefix for generated observation ids (`P1`, `P2`, ...).
    #[serde(default = "default_unit_prefix")]
    pub unit_prefix: String,
    pub group_a: GroupSpec,
    pub group_b: GroupSpec,
    /// Observations per group.
    pub count: usize,
    pub seed: u64,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_unit() -> String {
    "participant".into()
}

fn default_unit_prefix() -> String {
    "P".into()
}

fn default_decimals() -> u32 {
    2
}

impl ScenarioSpec {
    /// Range-check the definition.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> {
            Err(ContrastError::InvalidScenario(format!("#{}: {}", self.id, msg)))
        };

        if self.title.trim().is_empty() {
            return fail("title must not be empty".into());
        }
        if self.variable.trim().is_empty() || self.factor.trim().is_empty() {
            return fail("factor and variable names must not be empty".into());
        }
        for g in [&self.group_a, &self.group_b] {
            if g.label.trim().is_empty() {
                return fail("group labels must not be empty".into());
            }
            if !g.mean.is_finite() {
                return fail(format!("group '{}' mean must be finite", g.label));
            }
            if !g.std_dev.is_finite() || g.std_dev < 0.0 {
                return fail(format!("group '{}' std_dev must be finite and >= 0", g.label));
            }
        }
        if self.group_a.label == self.group_b.label {
            return fail(format!("group labels must differ, both are '{}'", self.group_a.label));
        }
        if self.count < MIN_OBSERVATIONS {
            return fail(format!("count must be >= {}, got {}", MIN_OBSERVATIONS, self.count));
        }
        if self.decimals > MAX_DECIMALS {
            return fail(format!("decimals must be <= {}, got {}", MAX_DECIMALS, self.decimals));
        }
        Ok(())
    }

    /// Generation parameters for group A.
    pub fn gaussian_a(&self) -> GaussianSpec {
        GaussianSpec::new(self.group_a.mean, self.group_a.std_dev, self.count, self.seed)
            .with_decimals(self.decimals)
    }

    /// Generation parameters for group B.
    pub fn gaussian_b(&self) -> GaussianSpec {
        GaussianSpec::new(
            self.group_b.mean,
            self.group_b.std_dev,
            self.count,
            self.seed ^ GROUP_B_SEED_MIX,
        )
        .with_decimals(self.decimals)
    }

    /// Draw both groups.
    pub fn simulate(&self) -> Result<(Sample, Sample)> {
        self.validate()?;
        let a = Sample::simulate(self.group_a.label.clone(), &self.gaussian_a())?;
        let b = Sample::simulate(self.group_b.label.clone(), &self.gaussian_b())?;
        Ok((a, b))
    }

    /// Simulate, summarize, test at `alpha`, and conclude.
    pub fn run(&self, alpha: f64) -> Result<ScenarioOutcome> {
        let (sample_a, sample_b) = self.simulate()?;
        let outcome = analyze(self.clone(), sample_a, sample_b, alpha)?;
        tracing::info!(
            scenario = self.id,
            t = outcome.result.statistic,
            p = outcome.result.p_value,
            verdict = %outcome.conclusion.verdict,
            "scenario complete"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// ScenarioOutcome
// ---------------------------------------------------------------------------

/// Everything one comparison produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub spec: ScenarioSpec,
    pub sample_a: Sample,
    pub sample_b: Sample,
    pub summary_a: DescriptiveSummary,
    pub summary_b: DescriptiveSummary,
    pub result: TestResult,
    pub conclusion: Conclusion,
}

/// Run the summarize → compare → conclude pipeline on existing samples.
///
/// Used directly for literal data, and by [`ScenarioSpec::run`] after
/// simulation.
pub fn analyze(
    spec: ScenarioSpec,
    sample_a: Sample,
    sample_b: Sample,
    alpha: f64,
) -> Result<ScenarioOutcome> {
    let summary_a = summarize(&sample_a)?;
    let summary_b = summarize(&sample_b)?;
    let result = compare(&sample_a, &sample_b, alpha)?;
    let conclusion = conclude(
        &result,
        sample_a.label(),
        sample_b.label(),
        &spec.variable,
        alpha,
    );
    Ok(ScenarioOutcome { spec, sample_a, sample_b, summary_a, summary_b, result, conclusion })
}

/// Run every scenario, returning one result per scenario in input order.
pub fn run_all(specs: &[ScenarioSpec], alpha: f64) -> Vec<(u32, Result<ScenarioOutcome>)> {
    specs
        .iter()
        .map(|spec| {
            let outcome = spec.run(alpha);
            if let Err(e) = &outcome {
                tracing::warn!(scenario = spec.id, error = %e, "scenario failed");
            }
            (spec.id, outcome)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Built-in scenarios
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn builtin(
    id: u32,
    title: &str,
    context: &str,
    objective: &str,
    null_hypothesis: &str,
    alternative_hypothesis: &str,
    factor: &str,
    variable: &str,
    unit: &str,
    unit_prefix: &str,
    a: (&str, f64),
    b: (&str, f64),
    std_dev: f64,
    count: usize,
) -> ScenarioSpec {
    ScenarioSpec {
        id,
        title: title.into(),
        context: context.into(),
        objective: objective.into(),
        null_hypothesis: null_hypothesis.into(),
        alternative_hypothesis: alternative_hypothesis.into(),
        factor: factor.into(),
        variable: variable.into(),
        unit: unit.into(),
        unit_prefix: unit_prefix.into(),
        group_a: GroupSpec { label: a.0.into(), mean: a.1, std_dev },
        group_b: GroupSpec { label: b.0.into(), mean: b.1, std_dev },
        count,
        seed: 40 + id as u64,
        decimals: default_decimals(),
    }
}

/// The six classroom comparisons, seeded `40 + id`.
pub fn builtin_scenarios() -> Vec<ScenarioSpec> {
    vec![
        builtin(
            1,
            "Caffeine and typing speed",
            "A publisher wants to know whether drinking coffee before work raises typing speed.",
            "Does caffeine have a significant effect on typing speed?",
            "Drinking caffeine does not change typing speed.",
            "Drinking caffeine increases typing speed.",
            "group",
            "typing speed (words/min)",
            "participant",
            "P",
            ("caffeine", 65.0),
            ("no caffeine", 58.0),
            8.0,
            100,
        ),
        builtin(
            2,
            "Exercise breaks and memory",
            "A corporate wellness firm asks whether a light exercise break improves short-term memory.",
            "Does light exercise improve employees' short-term memory?",
            "Light exercise does not change short-term memory scores.",
            "Light exercise improves short-term memory scores.",
            "condition",
            "memory score (0-100)",
            "employee",
            "E",
            ("exercise", 80.0),
            ("rest", 72.0),
            12.0,
            80,
        ),
        builtin(
            3,
            "Instrumental music and concentration",
            "A productivity app asks whether background instrumental music helps with logic tasks.",
            "Does instrumental music reduce the time needed to solve a logic test?",
            "Listening to instrumental music does not change logic-test solving time.",
            "Listening to instrumental music reduces logic-test solving time.",
            "group",
            "test time (seconds)",
            "user",
            "U",
            ("music", 150.0),
            ("silence", 170.0),
            30.0,
            120,
        ),
        builtin(
            4,
            "App design and checkout speed",
            "An e-commerce company is testing two versions (A and B) of its app.",
            "Does one app version let customers complete a purchase faster?",
            "App design does not affect checkout time (equal mean times).",
            "Checkout time differs between app versions A and B.",
            "app version",
            "checkout time (seconds)",
            "customer",
            "C",
            ("A", 70.0),
            ("B", 75.0),
            15.0,
            150,
        ),
        builtin(
            5,
            "Healthy snack and exam results",
            "A school is evaluating whether a healthy snack before an exam improves performance.",
            "Does a healthy snack before the exam improve academic performance?",
            "Offering a healthy snack does not change students' grades.",
            "Offering a healthy snack improves students' grades.",
            "group",
            "grade (0-100)",
            "student",
            "S",
            ("snack", 78.0),
            ("no snack", 70.0),
            10.0,
            100,
        ),
        builtin(
            6,
            "Communication training and sales",
            "A company trains its staff in effective communication and wants to check whether trained sellers sell more.",
            "Do communication courses increase monthly sales?",
            "Communication training does not change average monthly sales.",
            "Communication training increases average monthly sales.",
            "training",
            "monthly sales",
            "employee",
            "E",
            ("trained", 120.0),
            ("untrained", 100.0),
            25.0,
            70,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ScenarioSpec {
        builtin_scenarios().remove(0)
    }

    #[test]
    fn test_builtins_are_valid() {
        let all = builtin_scenarios();
        assert_eq!(all.len(), 6);
        for s in &all {
            s.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_ids_and_seeds() {
        for (i, s) in builtin_scenarios().iter().enumerate() {
            assert_eq!(s.id, i as u32 + 1);
            assert_eq!(s.seed, 41 + i as u64);
        }
    }

    #[test]
    fn test_validate_rejects_same_labels() {
        let mut s = spec();
        s.group_b.label = s.group_a.label.clone();
        assert!(matches!(s.validate(), Err(ContrastError::InvalidScenario(_))));
    }

    #[test]
    fn test_validate_rejects_small_count() {
        let s = ScenarioSpec { count: 1, ..spec() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_sd() {
        let mut s = spec();
        s.group_a.std_dev = -1.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let s = ScenarioSpec { title: " ".into(), ..spec() };
        let msg = s.validate().unwrap_err().to_string();
        assert!(msg.contains("#1"), "{msg}");
    }

    #[test]
    fn test_group_seeds_differ() {
        let s = spec();
        assert_eq!(s.gaussian_a().seed, 41);
        assert_eq!(s.gaussian_b().seed, 41 ^ 0x9E37_79B9_7F4A_7C15);
        let builtin_seeds: Vec<u64> = builtin_scenarios().iter().map(|b| b.seed).collect();
        assert!(!builtin_seeds.contains(&s.gaussian_b().seed));
    }

    #[test]
    fn test_simulate_sizes_and_labels() {
        let (a, b) = spec().simulate().unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(b.len(), 100);
        assert_eq!(a.label(), "caffeine");
        assert_eq!(b.label(), "no caffeine");
    }

    #[test]
    fn test_run_is_reproducible() {
        let s = spec();
        let r1 = s.run(0.05).unwrap();
        let r2 = s.run(0.05).unwrap();
        assert_eq!(r1.result, r2.result);
        assert_eq!(r1.summary_a, r2.summary_a);
    }

    #[test]
    fn test_run_large_effect_rejects() {
        // 7-point gap with sd 8 and n = 100 per group: t is around 6
        let out = spec().run(0.05).unwrap();
        assert!(out.result.reject_null, "p={}", out.result.p_value);
        assert!(out.conclusion.text.contains("typing speed"));
    }

    #[test]
    fn test_builtin_objectives_are_questions() {
        for s in builtin_scenarios() {
            assert!(s.objective.ends_with('?'), "#{}: {}", s.id, s.objective);
            assert!(s.objective.starts_with(char::is_uppercase), "#{}", s.id);
        }
    }

    #[test]
    fn test_analyze_literal_samples() {
        let a = Sample::new("a", vec![70.0, 72.0, 68.0, 71.0, 69.0]).unwrap();
        let b = Sample::new("b", vec![75.0, 77.0, 74.0, 76.0, 78.0]).unwrap();
        let out = analyze(spec(), a, b, 0.05).unwrap();
        assert_eq!(out.summary_a.mean, 70.0);
        assert_eq!(out.summary_b.mean, 76.0);
        assert!(out.result.reject_null);
    }

    #[test]
    fn test_run_all_isolates_failures() {
        let mut specs = builtin_scenarios();
        specs[1].count = 0;
        let results = run_all(&specs, 0.05);
        assert_eq!(results.len(), 6);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
        assert_eq!(results[1].0, 2);
    }

    #[test]
    fn test_spec_from_toml_uses_defaults() {
        let src = r#"
            id = 7
            title = "Desks"
            factor = "desk"
            variable = "focus"
            count = 10
            seed = 1
            group_a = { label = "standing", mean = 62.0, std_dev = 9.0 }
            group_b = { label = "sitting", mean = 60.0, std_dev = 9.0 }
        "#;
        let s: ScenarioSpec = toml::from_str(src).unwrap();
        assert_eq!(s.unit, "participant");
        assert_eq!(s.unit_prefix, "P");
        assert_eq!(s.decimals, 2);
        assert!(s.context.is_empty());
        s.validate().unwrap();
    }
}
