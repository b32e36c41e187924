// ============================================================
// Layer 2 — Experiment Configuration
// ============================================================
// One ExperimentConfig fully describes a run: where the data
// comes from, how text is vectorized, which topology is built,
// how it is compiled and how long it trains. Three presets
// reproduce the standard experiments:
//
//   sentences — yelp/amazon/imdb labelled sentences,
//               sentiment_model(50), seq_len 100, 10 epochs
//   imdb-conv — aclImdb reviews, conv_model, seq_len 500
//   imdb-lstm — aclImdb reviews, lstm_model, seq_len 500
//
// Configs are plain serde data so any of them can be dumped
// to JSON, edited and fed back in with `--config`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::ml::topology::{CompileSpec, Topology};

/// Root every preset path is relative to
pub const DEFAULT_DATA_DIR: &str = "data";

/// One labelled-sentence file and the source tag its rows get
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path:   PathBuf,
    pub source: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self { path: path.into(), source: source.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSpec {
    /// Tab-separated sentence files, split into train/test at random
    Sentences {
        files:         Vec<SourceFile>,
        /// Where the combined table is written; skipped when absent
        #[serde(default)]
        combined_csv:  Option<PathBuf>,
        test_fraction: f64,
        /// Restrict training to these source tags; all sources when absent
        #[serde(default)]
        sources:       Option<Vec<String>>,
    },
    /// aclImdb review corpus, using its own train/test halves
    Imdb {
        dir:   PathBuf,
        #[serde(default)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSpec {
    pub epochs:     usize,
    pub batch_size: usize,
    /// Seeds the split, the shuffle and the weight initialisation
    pub seed:       u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name:      String,
    pub dataset:   DatasetSpec,
    /// Vocabulary cap: the most frequent `max_words` training tokens get ids
    pub max_words: usize,
    /// Every sequence is padded or truncated to this length
    pub seq_len:   usize,
    pub topology:  Topology,
    #[serde(default)]
    pub compile:   CompileSpec,
    pub training:  TrainingSpec,
    pub plot_dir:  PathBuf,
}

/// The three built-in experiments, in the order `run-all` runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentKind {
    Sentences,
    ImdbConv,
    ImdbLstm,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 3] = [Self::Sentences, Self::ImdbConv, Self::ImdbLstm];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sentences => "sentences",
            Self::ImdbConv  => "imdb-conv",
            Self::ImdbLstm  => "imdb-lstm",
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ExperimentConfig {
    pub fn preset(kind: ExperimentKind) -> Self {
        let data = Path::new(DEFAULT_DATA_DIR);
        let imdb = DatasetSpec::Imdb { dir: data.join("aclImdb"), limit: None };

        match kind {
            ExperimentKind::Sentences => {
                let dir = data.join("sentiment_labelled_sentences");
                Self {
                    name: kind.name().to_string(),
                    dataset: DatasetSpec::Sentences {
                        files: vec![
                            SourceFile::new(dir.join("yelp_labelled.txt"), "yelp"),
                            SourceFile::new(dir.join("amazon_cells_labelled.txt"), "amazon"),
                            SourceFile::new(dir.join("imdb_labelled.txt"), "imdb"),
                        ],
                        combined_csv:  Some(data.join("combined_sentences.csv")),
                        test_fraction: 0.25,
                        sources:       None,
                    },
                    max_words: 5000,
                    seq_len:   100,
                    topology:  Topology::sentiment_model(50),
                    compile:   CompileSpec::default(),
                    training:  TrainingSpec { epochs: 10, batch_size: 10, seed: 1000 },
                    plot_dir:  PathBuf::from("plots"),
                }
            }
            ExperimentKind::ImdbConv => Self {
                name:      kind.name().to_string(),
                dataset:   imdb,
                // ids 1..=9999 plus padding fill the fixed 10000-row table
                max_words: 9999,
                seq_len:   500,
                topology:  Topology::conv_model(),
                compile:   CompileSpec::default(),
                training:  TrainingSpec { epochs: 5, batch_size: 128, seed: 1000 },
                plot_dir:  PathBuf::from("plots"),
            },
            ExperimentKind::ImdbLstm => Self {
                name:      kind.name().to_string(),
                dataset:   imdb,
                max_words: 9999,
                seq_len:   500,
                topology:  Topology::lstm_model(),
                compile:   CompileSpec::default(),
                training:  TrainingSpec { epochs: 3, batch_size: 128, seed: 1000 },
                plot_dir:  PathBuf::from("plots"),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read experiment config '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid experiment config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Cannot write experiment config '{}'", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configs that would fail deep inside training.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("experiment name must not be empty");
        }
        if self.max_words == 0 {
            bail!("[{}] max_words must be at least 1", self.name);
        }
        if self.seq_len == 0 {
            bail!("[{}] seq_len must be at least 1", self.name);
        }
        if self.training.epochs == 0 || self.training.batch_size == 0 {
            bail!("[{}] epochs and batch_size must both be at least 1", self.name);
        }
        if !(self.compile.learning_rate.is_finite() && self.compile.learning_rate > 0.0) {
            bail!("[{}] learning rate must be a positive number", self.name);
        }
        if let DatasetSpec::Sentences { files, test_fraction, sources, .. } = &self.dataset {
            if files.is_empty() {
                bail!("[{}] no sentence files configured", self.name);
            }
            if !(*test_fraction > 0.0 && *test_fraction < 1.0) {
                bail!("[{}] test_fraction must lie strictly between 0 and 1, got {test_fraction}", self.name);
            }
            if let Some(sources) = sources {
                for wanted in sources {
                    if !files.iter().any(|f| &f.source == wanted) {
                        bail!("[{}] source '{wanted}' is not provided by any configured file", self.name);
                    }
                }
            }
        }
        Ok(())
    }

    /// Move every path under the default data root to `data_dir`.
    /// Paths outside the default root are left alone.
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        let rebase = |path: &mut PathBuf| {
            if let Ok(rest) = path.strip_prefix(DEFAULT_DATA_DIR) {
                *path = data_dir.join(rest);
            }
        };
        match &mut self.dataset {
            DatasetSpec::Sentences { files, combined_csv, .. } => {
                files.iter_mut().for_each(|f| rebase(&mut f.path));
                if let Some(csv) = combined_csv {
                    rebase(csv);
                }
            }
            DatasetSpec::Imdb { dir, .. } => rebase(dir),
        }
        self
    }

    /// Where this experiment's training curves are drawn
    pub fn plot_path(&self) -> PathBuf {
        self.plot_dir.join(format!("{}.svg", self.name))
    }
}
