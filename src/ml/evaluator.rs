// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Scores a model on a dataset without touching its weights:
//
//   loss     — mean binary cross-entropy, weighted by batch size
//   accuracy — fraction of samples where (p >= 0.5) == label
//
// Generic over any Backend, so it runs on the inner (non-
// autodiff) backend after training and on a freshly built,
// untrained model alike.

use anyhow::{bail, Result};
use burn::{
    data::{
        dataloader::{batcher::Batcher, DataLoaderBuilder},
        dataset::Dataset,
    },
    nn::loss::BinaryCrossEntropyLossConfig,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::SentimentBatcher,
    dataset::{SentimentDataset, SentimentSample},
};
use crate::ml::model::SentimentNet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub loss:     f64,
    /// Fraction in [0, 1]
    pub accuracy: f64,
}

pub fn evaluate<B: Backend>(
    model:      &SentimentNet<B>,
    dataset:    SentimentDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Result<Evaluation> {
    if dataset.is_empty() {
        bail!("cannot evaluate on an empty dataset");
    }
    if batch_size == 0 {
        bail!("batch size must be at least 1");
    }

    let loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .build(dataset);

    let loss_fn = BinaryCrossEntropyLossConfig::new()
        .with_logits(true)
        .init(device);

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in loader.iter() {
        let n      = batch.labels.dims()[0];
        let logits = model.forward_logits(batch.tokens);

        let batch_loss: f64 = loss_fn
            .forward(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();

        loss_sum += batch_loss * n as f64;
        correct  += count_correct(logits, batch.labels);
        seen     += n;
    }

    let loss = loss_sum / seen as f64;
    if !loss.is_finite() {
        bail!("evaluation produced a non-finite loss ({loss})");
    }

    Ok(Evaluation { loss, accuracy: correct as f64 / seen as f64 })
}

/// Samples whose thresholded prediction equals the label.
/// A logit >= 0 is the same as a sigmoid probability >= 0.5.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2, Int>) -> usize {
    let predicted = logits.greater_equal_elem(0.0).int();
    let correct: i64 = predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as usize
}

/// Positive-class probability for each sample, in input order.
pub fn predict<B: Backend>(
    model:   &SentimentNet<B>,
    samples: Vec<SentimentSample>,
    device:  &B::Device,
) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let batch = SentimentBatcher::<B>::new(device.clone()).batch(samples);
    model.forward(batch.tokens).into_data().iter::<f64>().collect()
}
