// ============================================================
// Layer 6 — Training History
// ============================================================
// Per-epoch loss and accuracy on the training and validation
// splits. Produced by the trainer, consumed by the plotter and
// the final report; never written to disk.
//
// How to read it:
//   - Loss should decrease each epoch (model is learning)
//   - If val_loss rises while train_loss keeps falling the model
//     is overfitting; training still runs every configured epoch

use serde::{Deserialize, Serialize};

/// One epoch's numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean binary cross-entropy over the training samples
    pub train_loss: f64,

    /// Fraction of training samples classified correctly, in [0, 1]
    pub train_accuracy: f64,

    pub val_loss: f64,

    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:          usize,
        train_loss:     f64,
        train_accuracy: f64,
        val_loss:       f64,
        val_accuracy:   f64,
    ) -> Self {
        Self { epoch, train_loss, train_accuracy, val_loss, val_accuracy }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// The four named curves a history can be plotted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    TrainAccuracy,
    ValAccuracy,
    TrainLoss,
    ValLoss,
}

impl Series {
    pub fn label(self) -> &'static str {
        match self {
            Self::TrainAccuracy => "accuracy",
            Self::ValAccuracy   => "val_accuracy",
            Self::TrainLoss     => "loss",
            Self::ValLoss       => "val_loss",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// (epoch, value) points for one curve
    pub fn series(&self, series: Series) -> Vec<(f64, f64)> {
        self.epochs
            .iter()
            .map(|m| {
                let value = match series {
                    Series::TrainAccuracy => m.train_accuracy,
                    Series::ValAccuracy   => m.val_accuracy,
                    Series::TrainLoss     => m.train_loss,
                    Series::ValLoss       => m.val_loss,
                };
                (m.epoch as f64, value)
            })
            .collect()
    }

    /// Epoch with the lowest validation loss
    pub fn best_epoch(&self) -> Option<&EpochMetrics> {
        let mut best: Option<&EpochMetrics> = None;
        for m in &self.epochs {
            if best.map_or(true, |b| m.is_improvement(b.val_loss)) {
                best = Some(m);
            }
        }
        best
    }
}
