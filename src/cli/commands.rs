// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands:
//   prepare  — write the combined sentence table as CSV
//   train    — run one experiment (preset or JSON config)
//   run-all  — run the three presets one after another
//   config   — print a preset as JSON, ready for editing
//
// clap's derive macros generate --help, error messages for
// bad values and the string -> number conversions.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{
    experiment::{ExperimentConfig, ExperimentKind},
    experiment_use_case::ComputeBackend,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Combine the labelled sentence files into one CSV
    Prepare(PrepareArgs),

    /// Train and evaluate one experiment
    Train(TrainArgs),

    /// Run every preset experiment in sequence
    RunAll(RunAllArgs),

    /// Print an experiment preset as JSON
    Config(ConfigArgs),
}

/// Preset experiments selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExperimentArg {
    Sentences,
    ImdbConv,
    ImdbLstm,
}

impl From<ExperimentArg> for ExperimentKind {
    fn from(a: ExperimentArg) -> Self {
        match a {
            ExperimentArg::Sentences => ExperimentKind::Sentences,
            ExperimentArg::ImdbConv  => ExperimentKind::ImdbConv,
            ExperimentArg::ImdbLstm  => ExperimentKind::ImdbLstm,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendArg {
    /// CPU (ndarray)
    #[default]
    Ndarray,
    /// GPU (wgpu)
    Wgpu,
}

impl From<BackendArg> for ComputeBackend {
    fn from(a: BackendArg) -> Self {
        match a {
            BackendArg::Ndarray => ComputeBackend::Ndarray,
            BackendArg::Wgpu    => ComputeBackend::Wgpu,
        }
    }
}

/// Flags shared by `train` and `run-all`; each one overrides
/// the matching field of the experiment config.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// Root directory holding the corpora
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory the training-curve SVGs are written to
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,

    /// Number of full passes through the training data
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Number of samples processed together in one step
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Compute backend for training
    #[arg(long, value_enum, default_value_t = BackendArg::Ndarray)]
    pub backend: BackendArg,
}

impl RunOverrides {
    pub fn apply(&self, mut config: ExperimentConfig) -> ExperimentConfig {
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.plot_dir {
            config.plot_dir = dir.clone();
        }
        if let Some(epochs) = self.epochs {
            config.training.epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.training.batch_size = batch_size;
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Preset to run
    #[arg(long, value_enum, default_value_t = ExperimentArg::Sentences, conflicts_with = "config")]
    pub experiment: ExperimentArg,

    /// JSON experiment config to run instead of a preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: RunOverrides,
}

#[derive(Args, Debug)]
pub struct RunAllArgs {
    #[command(flatten)]
    pub overrides: RunOverrides,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Root directory holding the corpora
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Where to write the combined CSV (defaults to the preset's path)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Preset to print
    #[arg(long, value_enum, default_value_t = ExperimentArg::Sentences)]
    pub experiment: ExperimentArg,

    /// Write the JSON to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let overrides = RunOverrides {
            epochs:   Some(2),
            plot_dir: Some(PathBuf::from("out")),
            ..RunOverrides::default()
        };
        let config = overrides.apply(ExperimentConfig::preset(ExperimentKind::ImdbConv));
        assert_eq!(config.training.epochs, 2);
        assert_eq!(config.training.batch_size, 128);
        assert_eq!(config.plot_dir, Path::new("out"));
    }
}
