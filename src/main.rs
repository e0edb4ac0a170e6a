mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::input::{InputError, load_answers, load_fold, load_guessers};
use crate::model::config::{Checkpoints, ConfigError, EvalConfig, MismatchPolicy};
use crate::model::guessers::GuesserSet;
use crate::pipeline::driver::{Driver, DriverError};
use crate::pipeline::stage4_report::write_reports;
use crate::pipeline::{PipelineError, evaluate_fold};
use crate::report::{ReportError, RunSummary};

#[derive(Debug, Parser)]
#[command(
    name = "buzzstat",
    version,
    about = "Evaluation statistics for quiz-bowl buzzer runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate buzzer decisions for one or more folds.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory holding guessers.txt, answers.tsv and per-fold artifacts.
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Fold to evaluate; repeat for several.
    #[arg(long = "fold", default_values = ["dev", "test"])]
    folds: Vec<String>,
    /// Known guessers in order; overrides guessers.txt.
    #[arg(long, value_delimiter = ',')]
    guessers: Option<Vec<String>>,
    /// Worker threads (0 = one per core).
    #[arg(long, default_value_t = 0)]
    threads: usize,
    #[arg(long, value_delimiter = ',')]
    checkpoints: Option<Vec<f64>>,
    #[arg(long, value_enum, default_value_t = MismatchPolicy::Skip)]
    on_mismatch: MismatchPolicy,
    #[arg(long)]
    no_charts: bool,
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to start workers: {0}")]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to write reports: {0}")]
    Report(#[from] ReportError),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let Command::Run(args) = cli.command;
    logging::init(args.verbose, args.quiet);
    let started = Instant::now();

    let config = build_config(&args)?;
    let guessers = match &args.guessers {
        Some(names) => GuesserSet::new(names.clone())?,
        None => load_guessers(&args.input)?,
    };
    let answers = load_answers(&args.input)?;

    let driver = Driver::new(config.threads, !args.quiet)?;
    crate::info!(
        "evaluating folds {} with {} worker threads",
        args.folds.join(","),
        driver.threads()
    );

    let mut summary = RunSummary::new(&guessers, &config);
    for fold in &args.folds {
        let inputs = load_fold(&args.input, fold)?;
        let evaluation = evaluate_fold(&driver, &guessers, &answers, &inputs, &config)?;
        summary.insert(evaluation);
    }

    write_reports(&summary, &guessers, &args.out, !args.no_charts)?;
    crate::info!("done in {:.2?}", started.elapsed());
    Ok(())
}

fn build_config(args: &RunArgs) -> Result<EvalConfig, ConfigError> {
    let mut config = EvalConfig::default_v1();
    if let Some(values) = &args.checkpoints {
        config.checkpoints = Checkpoints::new(values.clone())?;
    }
    config.mismatch = args.on_mismatch;
    config.threads = args.threads;
    Ok(config)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
