// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fits a SentimentNet for a fixed number of epochs with Burn's
// DataLoader and the Adam optimizer. There is no early stopping
// and nothing is checkpointed: the loop always runs exactly
// `epochs` passes and hands back the trained model together
// with the per-epoch history.
//
//   - Training uses the AutodiffBackend B for gradients
//   - model.valid() returns the model on B::InnerBackend, which
//     is what the validation pass runs on (dropout disabled)
//   - Loss is binary cross-entropy on the pre-sigmoid logits

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    nn::loss::BinaryCrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::SentimentBatcher, dataset::SentimentDataset};
use crate::infra::metrics::{EpochMetrics, TrainingHistory};
use crate::ml::evaluator::{count_correct, evaluate};
use crate::ml::model::SentimentNet;
use crate::ml::topology::{CompileSpec, LossKind, OptimizerKind};

#[derive(Debug, Clone)]
pub struct FitOptions {
    pub epochs:     usize,
    pub batch_size: usize,
    /// Seed for the per-epoch shuffle of the training set
    pub seed:       u64,
}

pub fn fit<B: AutodiffBackend>(
    mut model: SentimentNet<B>,
    compile:   &CompileSpec,
    train:     SentimentDataset,
    valid:     SentimentDataset,
    options:   &FitOptions,
    device:    &B::Device,
) -> Result<(SentimentNet<B>, TrainingHistory)> {
    if train.is_empty() {
        bail!("cannot train on an empty dataset");
    }
    if options.epochs == 0 || options.batch_size == 0 {
        bail!("epochs and batch size must both be at least 1");
    }

    let mut optim = match compile.optimizer {
        OptimizerKind::Adam => AdamConfig::new().init(),
    };
    let loss_fn = match compile.loss {
        LossKind::BinaryCrossEntropy => BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(device),
    };

    let train_loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(options.batch_size)
        .shuffle(options.seed)
        .build(train);

    let mut history = TrainingHistory::default();

    for epoch in 1..=options.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let n      = batch.labels.dims()[0];
            let logits = model.forward_logits(batch.tokens);
            let loss   = loss_fn.forward(logits.clone(), batch.labels.clone());

            loss_sum += loss.clone().into_scalar().elem::<f64>() * n as f64;
            correct  += count_correct(logits.detach(), batch.labels);
            seen     += n;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(compile.learning_rate, model, grads);
        }

        let validation = evaluate(&model.valid(), valid.clone(), options.batch_size, device)?;

        let metrics = EpochMetrics::new(
            epoch,
            loss_sum / seen as f64,
            correct as f64 / seen as f64,
            validation.loss,
            validation.accuracy,
        );

        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.4} | val_loss={:.4} | val_accuracy={:.4}",
            epoch, options.epochs,
            metrics.train_loss, metrics.train_accuracy,
            metrics.val_loss, metrics.val_accuracy,
        );
        tracing::debug!(?metrics, "epoch finished");

        history.push(metrics);
    }

    tracing::info!("Training complete after {} epochs", options.epochs);
    Ok((model, history))
}
