use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::AppConfig;
use crate::error::{ContrastError, Result};
use crate::sample::Sample;
use crate::scenario::{GroupSpec, ScenarioSpec};

#[derive(Parser, Debug)]
#[command(name = "contrast-lab")]
#[command(version)]
#[command(about = "Simulate two groups, compare them with Welch's t-test, and report the verdict")]
pub struct Args {
    /// TOML file with alpha, output_dir and extra [[scenario]] tables
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Significance threshold (overrides the config file)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Run only these scenario ids (repeatable)
    #[arg(long = "scenario", short = 's')]
    pub scenarios: Vec<u32>,

    /// Directory for CSV, Markdown and JSON outputs (overrides the config file)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print results without writing any files
    #[arg(long)]
    pub no_write: bool,

    /// Print the JSON results document instead of the coloured summary
    #[arg(long)]
    pub json: bool,

    /// List the available scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Literal values for group A, e.g. "70,72,68,71,69"
    #[arg(long, requires = "group_b", conflicts_with = "scenarios")]
    pub group_a: Option<String>,

    /// Literal values for group B
    #[arg(long, requires = "group_a", conflicts_with = "scenarios")]
    pub group_b: Option<String>,

    /// Label for literal group A
    #[arg(long, default_value = "A")]
    pub label_a: String,

    /// Label for literal group B
    #[arg(long, default_value = "B")]
    pub label_b: String,

    /// Name of the measured variable in literal mode
    #[arg(long, default_value = "value")]
    pub variable: String,

    /// More log output (-v debug, -vv trace)
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Default `tracing` filter for the given verbosity.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "contrast_lab=info",
        1 => "contrast_lab=debug",
        _ => "contrast_lab=trace",
    }
}

/// Fold command-line overrides into the loaded config.
pub fn apply_overrides(args: &Args, mut cfg: AppConfig) -> Result<AppConfig> {
    if let Some(alpha) = args.alpha {
        cfg.alpha = alpha;
    }
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Keep only the requested ids, in the order given; an empty request keeps all.
pub fn select_scenarios(all: Vec<ScenarioSpec>, ids: &[u32]) -> Result<Vec<ScenarioSpec>> {
    if ids.is_empty() {
        return Ok(all);
    }
    ids.iter()
        .map(|id| {
            all.iter()
                .find(|s| s.id == *id)
                .cloned()
                .ok_or_else(|| ContrastError::InvalidScenario(format!("no scenario with id {id}")))
        })
        .collect()
}

/// Fewest decimal places that print every value exactly as it was parsed.
fn literal_decimals(a: &Sample, b: &Sample) -> u32 {
    a.values()
        .iter()
        .chain(b.values())
        .map(|v| v.to_string().split_once('.').map_or(0, |(_, frac)| frac.len() as u32))
        .max()
        .unwrap_or(0)
}

/// The literal-mode samples and a scenario header describing them, or `None`
/// when no literal groups were given.
pub fn literal_comparison(args: &Args) -> Result<Option<(ScenarioSpec, Sample, Sample)>> {
    let (Some(raw_a), Some(raw_b)) = (&args.group_a, &args.group_b) else {
        return Ok(None);
    };
    let a = Sample::parse(args.label_a.clone(), raw_a)?;
    let b = Sample::parse(args.label_b.clone(), raw_b)?;
    let decimals = literal_decimals(&a, &b);

    let spec = ScenarioSpec {
        id: 0,
        title: format!("{} vs {}", a.label(), b.label()),
        context: String::new(),
        objective: String::new(),
        null_hypothesis: String::new(),
        alternative_hypothesis: String::new(),
        factor: "group".into(),
        variable: args.variable.clone(),
        unit: "observation".into(),
        unit_prefix: "O".into(),
        group_a: GroupSpec { label: a.label().to_string(), mean: 0.0, std_dev: 0.0 },
        group_b: GroupSpec { label: b.label().to_string(), mean: 0.0, std_dev: 0.0 },
        count: a.len().max(b.len()),
        seed: 0,
        decimals,
    };
    Ok(Some((spec, a, b)))
}
