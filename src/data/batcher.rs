// ============================================================
// Layer 4 — Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait to stack N padded samples
// into tensors:
//
//   tokens: [N, seq_len]  Int
//   labels: [N, 1]        Int   (0 or 1)
//
// Labels keep a trailing unit dimension so they line up with
// the model's [N, 1] output for the binary cross-entropy loss.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentimentSample;

#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>,
    pub labels: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SentimentSample, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentSample>) -> SentimentBatch<B> {
        let batch_size = items.len();
        // Every sequence was padded to the same length by the vectorizer
        let seq_len = items.first().map(|s| s.tokens.len()).unwrap_or(0);

        let tokens_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.tokens.iter().map(|&id| id as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(tokens_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        SentimentBatch { tokens, labels }
    }
}
