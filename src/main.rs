use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use contrast_lab::cli::{self, Args};
use contrast_lab::config::AppConfig;
use contrast_lab::report::{self, FailedScenario, ResultsDocument};
use contrast_lab::scenario::{self, ScenarioOutcome};
use contrast_lab::Verdict;

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli::log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_outcome(o: &ScenarioOutcome) {
    println!(
        "\n{} {}",
        format!("[{}]", o.spec.id).bright_cyan().bold(),
        o.spec.title.bold()
    );
    for s in [&o.summary_a, &o.summary_b] {
        println!(
            "  {:<14} n={:<4} mean={:>9.2}  sd={:>8.2}  min={:>8.2}  median={:>8.2}  max={:>8.2}",
            s.label, s.count, s.mean, s.std_dev, s.min, s.median, s.max
        );
    }
    println!(
        "  t = {:.4}   df = {:.2}   p = {:.4}   alpha = {}",
        o.result.statistic, o.result.df, o.result.p_value, o.result.alpha
    );
    let verdict = match o.conclusion.verdict {
        Verdict::Reject => o.conclusion.text.green(),
        Verdict::FailToReject => o.conclusion.text.yellow(),
    };
    println!("  {}", verdict);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let cfg = cli::apply_overrides(&args, cfg)?;

    if args.list {
        for s in cfg.scenarios() {
            println!(
                "{:>3}  {:<40} {} vs {} (n={}, seed={})",
                s.id, s.title, s.group_a.label, s.group_b.label, s.count, s.seed
            );
        }
        return Ok(());
    }

    let mut outcomes: Vec<ScenarioOutcome> = Vec::new();
    let mut failures: Vec<FailedScenario> = Vec::new();

    if let Some((spec, a, b)) = cli::literal_comparison(&args)? {
        outcomes.push(scenario::analyze(spec, a, b, cfg.alpha)?);
    } else {
        let specs = cli::select_scenarios(cfg.scenarios(), &args.scenarios)?;
        for (id, result) in scenario::run_all(&specs, cfg.alpha) {
            match result {
                Ok(o) => outcomes.push(o),
                Err(e) => failures.push(FailedScenario { id, error: e.to_string() }),
            }
        }
    }

    if args.json {
        println!("{}", ResultsDocument::new(&outcomes, &failures, cfg.alpha).to_json()?);
    } else {
        for o in &outcomes {
            print_outcome(o);
        }
        for f in &failures {
            eprintln!("{} scenario #{}: {}", "error:".red().bold(), f.id, f.error);
        }
    }

    if !args.no_write {
        let written = report::write_outputs(&cfg.output_dir, &outcomes, &failures, cfg.alpha)?;
        if !args.json {
            println!(
                "\n{} {} file(s) in {}",
                "wrote".bright_cyan(),
                written.len(),
                cfg.output_dir.display()
            );
        }
    }

    if !failures.is_empty() {
        return Err(format!("{} scenario(s) failed", failures.len()).into());
    }
    Ok(())
}
