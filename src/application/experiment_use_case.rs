// ============================================================
// Layer 2 — ExperimentUseCase
// ============================================================
// Runs one experiment end to end, strictly in order:
//
//   Step 1: Load the labelled examples     (Layer 4 - data)
//   Step 2: Split train / held-out         (Layer 4 - data)
//   Step 3: Fit the vocabulary on train    (Layer 4 - data)
//   Step 4: Vectorize both splits          (Layer 4 - data)
//   Step 5: Summarise + build the network  (Layer 5 - ml)
//   Step 6: Fit for the configured epochs  (Layer 5 - ml)
//   Step 7: Evaluate on both splits        (Layer 5 - ml)
//   Step 8: Plot the training curves       (Layer 6 - infra)
//
// The vocabulary only ever sees the training split, so nothing
// about the held-out text leaks into the model.

use anyhow::{bail, Result};
use burn::{
    backend::{wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    module::AutodiffModule,
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::{
    experiment::{DatasetSpec, ExperimentConfig},
    prepare_use_case::load_tables,
};
use crate::data::{
    dataset::SentimentDataset,
    loader::{ImdbLoader, ImdbSplit},
    splitter::split_train_val,
    table::{combine, write_combined_csv},
    vectorizer::TextVectorizer,
};
use crate::domain::{
    example::{LabeledExample, Sentiment},
    traits::ExampleSource,
};
use crate::infra::{metrics::TrainingHistory, plotter::plot_history};
use crate::ml::{
    evaluator::{evaluate, predict, Evaluation},
    model::build_model,
    topology::TopologySummary,
    trainer::{fit, FitOptions},
};

/// Which burn backend the numerical work runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeBackend {
    /// CPU, always available
    #[default]
    Ndarray,
    /// GPU through wgpu
    Wgpu,
}

/// Held-out examples shown with their predictions
const PREVIEW_SIZE: usize = 5;

/// One held-out example with the trained model's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub text:        String,
    pub label:       Sentiment,
    /// Probability of the positive class
    pub probability: f64,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        (self.probability >= 0.5) == (self.label == Sentiment::Positive)
    }
}

/// Everything one finished experiment produced.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub name:           String,
    pub vocab_size:     usize,
    pub train_examples: usize,
    pub test_examples:  usize,
    pub summary:        TopologySummary,
    pub history:        TrainingHistory,
    pub train_eval:     Evaluation,
    pub test_eval:      Evaluation,
    pub predictions:    Vec<Prediction>,
    pub plot_path:      PathBuf,
}

pub struct ExperimentUseCase {
    config:  ExperimentConfig,
    backend: ComputeBackend,
}

impl ExperimentUseCase {
    pub fn new(config: ExperimentConfig, backend: ComputeBackend) -> Self {
        Self { config, backend }
    }

    pub fn execute(&self) -> Result<ExperimentReport> {
        self.config.validate()?;
        tracing::info!("Running experiment '{}' on {:?}", self.config.name, self.backend);

        match self.backend {
            ComputeBackend::Ndarray => self.execute_on::<Autodiff<NdArray>>(&Default::default()),
            ComputeBackend::Wgpu    => self.execute_on::<Autodiff<Wgpu>>(&WgpuDevice::default()),
        }
    }

    fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<ExperimentReport> {
        let cfg = &self.config;

        // ── Steps 1-2: Load and split ─────────────────────────────────────────
        let (train, test) = self.load_splits()?;
        tracing::info!("Split: {} train, {} held-out", train.len(), test.len());

        // ── Step 3: Vocabulary from the training split only ───────────────────
        let texts: Vec<&str> = train.iter().map(|e| e.text.as_str()).collect();
        let vectorizer = TextVectorizer::fit(&texts, cfg.max_words)?;
        let vocab_size = vectorizer.vocab_size();
        tracing::info!("Vocabulary size: {vocab_size}");
        tracing::debug!(
            "Most frequent tokens: {:?}",
            (1..=10).filter_map(|id| vectorizer.word_of(id)).collect::<Vec<_>>()
        );

        // ── Step 4: Fixed-length integer sequences ────────────────────────────
        let train_set = SentimentDataset::new(vectorizer.vectorize(&train, cfg.seq_len)?);
        let test_set  = SentimentDataset::new(vectorizer.vectorize(&test, cfg.seq_len)?);
        tracing::debug!(
            "Positives: {} train, {} held-out",
            train_set.positive_count(),
            test_set.positive_count()
        );

        // ── Step 5: Summary and an untrained network ──────────────────────────
        let summary = cfg.topology.summary(vocab_size, cfg.seq_len)?;
        println!("{summary}");

        B::seed(cfg.training.seed);
        let model = build_model::<B>(&cfg.topology, vocab_size, device)?;

        // ── Step 6: Fixed-epoch training ──────────────────────────────────────
        let options = FitOptions {
            epochs:     cfg.training.epochs,
            batch_size: cfg.training.batch_size,
            seed:       cfg.training.seed,
        };
        let (model, history) = fit(
            model,
            &cfg.compile,
            train_set.clone(),
            test_set.clone(),
            &options,
            device,
        )?;

        // ── Step 7: Final evaluation on both splits ───────────────────────────
        let model      = model.valid();
        let train_eval = evaluate(&model, train_set, options.batch_size, device)?;
        let test_eval  = evaluate(&model, test_set, options.batch_size, device)?;
        println!("Training Accuracy: {:.2}%", train_eval.accuracy * 100.0);
        println!("Testing Accuracy:  {:.2}%", test_eval.accuracy * 100.0);

        let preview: Vec<LabeledExample> = test.iter().take(PREVIEW_SIZE).cloned().collect();
        let probabilities = predict(&model, vectorizer.vectorize(&preview, cfg.seq_len)?, device);
        let predictions = preview
            .into_iter()
            .zip(probabilities)
            .map(|(example, probability)| Prediction {
                text: example.text,
                label: example.label,
                probability,
            })
            .collect();

        // ── Step 8: Curves ────────────────────────────────────────────────────
        let plot_path = cfg.plot_path();
        plot_history(&history, &plot_path, &cfg.name)?;

        Ok(ExperimentReport {
            name: cfg.name.clone(),
            vocab_size,
            train_examples: train.len(),
            test_examples: test.len(),
            summary,
            history,
            train_eval,
            test_eval,
            predictions,
            plot_path,
        })
    }

    fn load_splits(&self) -> Result<(Vec<LabeledExample>, Vec<LabeledExample>)> {
        let cfg = &self.config;

        match &cfg.dataset {
            DatasetSpec::Sentences { files, combined_csv, test_fraction, sources } => {
                let tables = load_tables(files)?;
                if let Some(path) = combined_csv {
                    write_combined_csv(path, &tables)?;
                }

                let mut examples = combine(tables);
                if let Some(sources) = sources {
                    examples.retain(|e| sources.contains(&e.source));
                }
                if examples.is_empty() {
                    bail!("[{}] no examples left to train on", cfg.name);
                }

                Ok(split_train_val(examples, 1.0 - test_fraction, cfg.training.seed))
            }
            DatasetSpec::Imdb { dir, limit } => {
                let train = ImdbLoader::new(dir, ImdbSplit::Train, *limit).load_all()?;
                let test  = ImdbLoader::new(dir, ImdbSplit::Test, *limit).load_all()?;
                Ok((train, test))
            }
        }
    }
}

// ─── Integration Tests ────────────────────────────────────────────────────────
// Tiny corpora on disk, CPU backend, one or two epochs.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::experiment::{ExperimentKind, SourceFile, TrainingSpec};
    use crate::ml::topology::{Activation, LayerSpec, Topology};
    use std::{fs, path::Path};

    const POSITIVE: [&str; 4] = [
        "good food and great service",
        "great product works well",
        "loved it good value",
        "excellent and good quality",
    ];
    const NEGATIVE: [&str; 4] = [
        "bad food and awful service",
        "terrible product broke fast",
        "hated it bad value",
        "awful and bad quality",
    ];

    fn write_sentences(path: &Path) {
        let mut body = String::new();
        for (p, n) in POSITIVE.iter().zip(NEGATIVE) {
            body.push_str(&format!("{p}\t1\n{n}\t0\n"));
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_sentences_experiment_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let yelp   = dir.path().join("yelp.txt");
        let amazon = dir.path().join("amazon.txt");
        write_sentences(&yelp);
        write_sentences(&amazon);

        let mut config = ExperimentConfig::preset(ExperimentKind::Sentences);
        config.dataset = DatasetSpec::Sentences {
            files: vec![SourceFile::new(&yelp, "yelp"), SourceFile::new(&amazon, "amazon")],
            combined_csv:  Some(dir.path().join("combined.csv")),
            test_fraction: 0.25,
            sources:       None,
        };
        config.seq_len  = 12;
        config.topology = Topology::sentiment_model(8);
        config.training = TrainingSpec { epochs: 2, batch_size: 4, seed: 1000 };
        config.plot_dir = dir.path().join("plots");

        let report = ExperimentUseCase::new(config, ComputeBackend::Ndarray).execute().unwrap();

        assert_eq!(report.train_examples, 12);
        assert_eq!(report.test_examples, 4);
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.predictions.len(), 4);
        assert!((0.0..=1.0).contains(&report.test_eval.accuracy));
        assert!(report.plot_path.exists());
        assert_eq!(fs::read_to_string(dir.path().join("combined.csv")).unwrap().lines().count(), 17);
    }

    #[test]
    fn test_source_filter_restricts_training_rows() {
        let dir = tempfile::tempdir().unwrap();
        let yelp   = dir.path().join("yelp.txt");
        let amazon = dir.path().join("amazon.txt");
        write_sentences(&yelp);
        write_sentences(&amazon);

        let mut config = ExperimentConfig::preset(ExperimentKind::Sentences);
        config.dataset = DatasetSpec::Sentences {
            files: vec![SourceFile::new(&yelp, "yelp"), SourceFile::new(&amazon, "amazon")],
            combined_csv:  None,
            test_fraction: 0.25,
            sources:       Some(vec!["yelp".to_string()]),
        };
        config.seq_len  = 12;
        config.topology = Topology::sentiment_model(8);
        config.training = TrainingSpec { epochs: 1, batch_size: 4, seed: 1 };
        config.plot_dir = dir.path().join("plots");

        let report = ExperimentUseCase::new(config, ComputeBackend::Ndarray).execute().unwrap();
        assert_eq!(report.train_examples + report.test_examples, 8);
    }

    #[test]
    fn test_imdb_lstm_experiment_end_to_end() {
        let dir  = tempfile::tempdir().unwrap();
        let imdb = dir.path().join("aclImdb");
        for split in ["train", "test"] {
            for (polarity, texts) in [("pos", POSITIVE), ("neg", NEGATIVE)] {
                let folder = imdb.join(split).join(polarity);
                fs::create_dir_all(&folder).unwrap();
                for (i, text) in texts.iter().enumerate() {
                    fs::write(folder.join(format!("{i}_7.txt")), format!("{text}<br />the end")).unwrap();
                }
            }
        }

        let mut config = ExperimentConfig::preset(ExperimentKind::ImdbLstm);
        config.dataset  = DatasetSpec::Imdb { dir: imdb, limit: Some(3) };
        config.seq_len  = 8;
        config.topology = Topology {
            name: "tiny_lstm".into(),
            layers: vec![
                LayerSpec::Embedding { vocab_size: None, dim: 4 },
                LayerSpec::Lstm { units: 3, dropout: 0.0, return_sequences: true },
                LayerSpec::Lstm { units: 5, dropout: 0.0, return_sequences: false },
                LayerSpec::Dense { units: 1, activation: Activation::Sigmoid },
            ],
        };
        config.training = TrainingSpec { epochs: 1, batch_size: 4, seed: 3 };
        config.plot_dir = dir.path().join("plots");

        let report = ExperimentUseCase::new(config, ComputeBackend::Ndarray).execute().unwrap();
        assert_eq!((report.train_examples, report.test_examples), (6, 6));
        assert_eq!(report.history.len(), 1);
        let layers: Vec<&str> = report.summary.layers.iter().map(|l| l.layer.as_str()).collect();
        assert_eq!(layers, ["embedding", "lstm", "lstm", "dense_output"]);
        assert_eq!(report.summary.layers[0].params, report.vocab_size * 4);
    }

    #[test]
    fn test_prediction_correctness_uses_half_threshold() {
        let p = |label, probability| Prediction { text: String::new(), label, probability };
        assert!(p(Sentiment::Positive, 0.5).is_correct());
        assert!(p(Sentiment::Negative, 0.2).is_correct());
        assert!(!p(Sentiment::Negative, 0.7).is_correct());
    }

    #[test]
    fn test_missing_corpus_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ExperimentConfig::preset(ExperimentKind::ImdbConv);
        config.dataset = DatasetSpec::Imdb { dir: dir.path().join("nowhere"), limit: None };
        assert!(ExperimentUseCase::new(config, ComputeBackend::Ndarray).execute().is_err());
    }
}
