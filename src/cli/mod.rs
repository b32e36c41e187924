// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Uses `clap` to parse
// the command line; all real work is delegated to Layer 2
// (application).

pub mod commands;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{Commands, ConfigArgs, PrepareArgs, RunAllArgs, TrainArgs};

use crate::application::{
    experiment::{DatasetSpec, ExperimentConfig, ExperimentKind},
    experiment_use_case::{ExperimentReport, ExperimentUseCase},
    prepare_use_case::PrepareUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "sentiment-lab",
    version,
    about = "Train convolutional and LSTM sentiment classifiers on labelled sentences and movie reviews."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case; this layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Train(args)   => run_train(args),
            Commands::RunAll(args)  => run_all(args),
            Commands::Config(args)  => run_config(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    let mut preset = ExperimentConfig::preset(ExperimentKind::Sentences);
    if let Some(dir) = &args.data_dir {
        preset = preset.with_data_dir(dir);
    }
    let DatasetSpec::Sentences { files, combined_csv, .. } = preset.dataset else {
        bail!("sentences preset has no sentence files");
    };
    let Some(output) = args.output.or(combined_csv) else {
        bail!("no output path for the combined table; pass --output");
    };

    let rows = PrepareUseCase::new(files, &output).execute()?;
    println!("Wrote {} rows to {}", rows, output.display());
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None       => ExperimentConfig::preset(args.experiment.into()),
    };
    let config = args.overrides.apply(config);

    let report = ExperimentUseCase::new(config, args.overrides.backend.into()).execute()?;
    print_report(&report);
    Ok(())
}

fn run_all(args: RunAllArgs) -> Result<()> {
    let mut reports = Vec::new();
    for kind in ExperimentKind::ALL {
        println!("\n=== {kind} ===");
        let config = args.overrides.apply(ExperimentConfig::preset(kind));
        reports.push(ExperimentUseCase::new(config, args.overrides.backend.into()).execute()?);
    }

    println!("\n{:<12} {:>10} {:>10}", "experiment", "train acc", "test acc");
    for report in &reports {
        println!(
            "{:<12} {:>9.2}% {:>9.2}%",
            report.name,
            report.train_eval.accuracy * 100.0,
            report.test_eval.accuracy * 100.0,
        );
    }
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    let config = ExperimentConfig::preset(args.experiment.into());
    match &args.output {
        Some(path) => {
            config.save(path)?;
            println!("Wrote {} config to {}", config.name, path.display());
        }
        None => println!("{}", config.to_json()?),
    }
    Ok(())
}

fn print_report(report: &ExperimentReport) {
    println!(
        "\n[{}] vocab={} train={} test={} params={}",
        report.name,
        report.vocab_size,
        report.train_examples,
        report.test_examples,
        report.summary.total_params(),
    );
    println!(
        "  train: loss={:.4} accuracy={:.2}%",
        report.train_eval.loss,
        report.train_eval.accuracy * 100.0
    );
    println!(
        "  test:  loss={:.4} accuracy={:.2}%",
        report.test_eval.loss,
        report.test_eval.accuracy * 100.0
    );
    if let Some(best) = report.history.best_epoch() {
        println!("  lowest val_loss {:.4} at epoch {}", best.val_loss, best.epoch);
    }
    for p in &report.predictions {
        let mark = if p.is_correct() { "ok " } else { "err" };
        println!("  [{mark}] p={:.3} label={} {}", p.probability, p.label, truncate(&p.text, 60));
    }
    println!("  curves: {}", report.plot_path.display());
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None           => text.to_string(),
    }
}
