use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One encoded, padded sentence and its 0/1 target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub tokens: Vec<u32>,
    pub label:  u8,
}

/// Samples behind an `Arc` so the data loaders can each own a handle
/// without copying the encoded corpus.
#[derive(Debug, Clone)]
pub struct SentimentDataset {
    samples: Arc<Vec<SentimentSample>>,
}

impl SentimentDataset {
    pub fn new(samples: Vec<SentimentSample>) -> Self {
        Self { samples: Arc::new(samples) }
    }

    /// Length shared by every sequence, `None` when empty.
    pub fn seq_len(&self) -> Option<usize> {
        self.samples.first().map(|s| s.tokens.len())
    }

    pub fn positive_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label == 1).count()
    }
}

impl Dataset<SentimentSample> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
