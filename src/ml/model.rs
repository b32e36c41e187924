use anyhow::Result;
use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

use crate::ml::topology::{Extractor, Plan, Topology};

/// Build an untrained network for `topology` with an embedding table that
/// covers `vocab_size` ids.
pub fn build_model<B: Backend>(
    topology:   &Topology,
    vocab_size: usize,
    device:     &B::Device,
) -> Result<SentimentNet<B>> {
    let plan = topology.plan(vocab_size)?;
    Ok(SentimentNet::from_plan(&plan, device))
}

#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv1d<B>,
    pub relu: bool,
}

impl<B: Backend> ConvBlock<B> {
    /// x: [batch, channels, len] → [batch, filters, len - kernel + 1]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.conv.forward(x);
        if self.relu { relu(x) } else { x }
    }
}

#[derive(Module, Debug)]
pub struct RecurrentBlock<B: Backend> {
    pub lstm:             Lstm<B>,
    pub dropout:          Dropout,
    pub return_sequences: bool,
}

impl<B: Backend> RecurrentBlock<B> {
    /// x: [batch, seq, features] → [batch, seq, units], or [batch, 1, units]
    /// when only the final step is returned.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let (hidden, _state) = self.lstm.forward(self.dropout.forward(x), None);
        if self.return_sequences {
            return hidden;
        }
        let [batch, seq, units] = hidden.dims();
        hidden.slice([0..batch, seq - 1..seq, 0..units])
    }
}

#[derive(Module, Debug)]
pub struct DenseBlock<B: Backend> {
    pub linear: Linear<B>,
    pub relu:   bool,
}

impl<B: Backend> DenseBlock<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        if self.relu { relu(x) } else { x }
    }
}

/// Embedding, then either a convolution stack with global max pooling or a
/// recurrent stack, then dense layers and a single sigmoid unit.
#[derive(Module, Debug)]
pub struct SentimentNet<B: Backend> {
    pub embedding: Embedding<B>,
    pub convs:     Vec<ConvBlock<B>>,
    pub recurrent: Vec<RecurrentBlock<B>>,
    pub hidden:    Vec<DenseBlock<B>>,
    pub output:    Linear<B>,
}

impl<B: Backend> SentimentNet<B> {
    pub fn from_plan(plan: &Plan, device: &B::Device) -> Self {
        let embedding = EmbeddingConfig::new(plan.table_size, plan.embedding_dim).init(device);

        let mut features  = plan.embedding_dim;
        let mut convs     = Vec::new();
        let mut recurrent = Vec::new();

        match &plan.extractor {
            Extractor::Convolutional(layers) => {
                for layer in layers {
                    let conv = Conv1dConfig::new(features, layer.filters, layer.kernel_size).init(device);
                    convs.push(ConvBlock { conv, relu: layer.relu });
                    features = layer.filters;
                }
            }
            Extractor::Recurrent(layers) => {
                for layer in layers {
                    recurrent.push(RecurrentBlock {
                        lstm:             LstmConfig::new(features, layer.units, true).init(device),
                        dropout:          DropoutConfig::new(layer.dropout).init(),
                        return_sequences: layer.return_sequences,
                    });
                    features = layer.units;
                }
            }
        }

        let mut hidden = Vec::new();
        for layer in &plan.hidden {
            hidden.push(DenseBlock {
                linear: LinearConfig::new(features, layer.units).init(device),
                relu:   layer.relu,
            });
            features = layer.units;
        }

        let output = LinearConfig::new(features, 1).init(device);

        Self { embedding, convs, recurrent, hidden, output }
    }

    /// tokens: [batch, seq_len] → [batch, seq_len, embedding_dim]
    pub fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.embedding.forward(tokens)
    }

    /// tokens: [batch, seq_len] → pre-sigmoid scores [batch, 1]
    pub fn forward_logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded = self.embed(tokens);
        let mut x = if self.recurrent.is_empty() {
            self.convolve(embedded)
        } else {
            self.recur(embedded)
        };
        for layer in &self.hidden {
            x = layer.forward(x);
        }
        self.output.forward(x)
    }

    /// tokens: [batch, seq_len] → probability of positive sentiment [batch, 1]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        sigmoid(self.forward_logits(tokens))
    }

    fn convolve(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        // Conv1d wants channels before time
        let mut x = embedded.swap_dims(1, 2);
        for block in &self.convs {
            x = block.forward(x);
        }
        // Global max pooling over the time axis
        let [batch, filters, _] = x.dims();
        x.max_dim(2).reshape([batch, filters])
    }

    fn recur(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut x = embedded;
        for block in &self.recurrent {
            x = block.forward(x);
        }
        let [batch, seq, units] = x.dims();
        x.slice([0..batch, seq - 1..seq, 0..units]).reshape([batch, units])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::topology::{Activation, LayerSpec};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn probabilities(t: Tensor<TestBackend, 2>) -> Vec<f32> {
        t.into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_sentiment_model_shapes() {
        let device = Default::default();
        let model: SentimentNet<TestBackend> =
            build_model(&Topology::sentiment_model(50), 1000, &device).unwrap();

        let tokens = Tensor::<TestBackend, 2, Int>::zeros([2, 100], &device);
        assert_eq!(model.embed(tokens.clone()).dims(), [2, 100, 50]);

        let probs = model.forward(tokens);
        assert_eq!(probs.dims(), [2, 1]);
        assert!(probabilities(probs).iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_parameter_count_matches_summary() {
        let device = Default::default();
        let topology = Topology::sentiment_model(16);
        let model: SentimentNet<TestBackend> = build_model(&topology, 200, &device).unwrap();
        let summary = topology.summary(200, 30).unwrap();
        assert_eq!(model.num_params(), summary.total_params());
    }

    #[test]
    fn test_recurrent_stack_forward() {
        let device = Default::default();
        let topology = Topology {
            name:   "small_lstm".into(),
            layers: vec![
                LayerSpec::Embedding { vocab_size: None, dim: 8 },
                LayerSpec::Lstm { units: 6, dropout: 0.2, return_sequences: true },
                LayerSpec::Lstm { units: 4, dropout: 0.2, return_sequences: false },
                LayerSpec::Dense { units: 3, activation: Activation::Linear },
                LayerSpec::Dense { units: 1, activation: Activation::Sigmoid },
            ],
        };
        let model: SentimentNet<TestBackend> = build_model(&topology, 20, &device).unwrap();
        assert_eq!(model.num_params(), topology.summary(20, 7).unwrap().total_params());

        let tokens = Tensor::<TestBackend, 2, Int>::ones([3, 7], &device);
        let probs  = model.forward(tokens);
        assert_eq!(probs.dims(), [3, 1]);
        assert!(probabilities(probs).iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_stacked_convolutions_forward() {
        let device = Default::default();
        let model: SentimentNet<TestBackend> =
            build_model(&Topology::conv_model(), 10_000, &device).unwrap();
        assert_eq!(model.convs.len(), 2);

        let tokens = Tensor::<TestBackend, 2, Int>::zeros([1, 20], &device);
        assert_eq!(model.forward(tokens).dims(), [1, 1]);
    }

    #[test]
    fn test_vocabulary_mismatch_fails_to_build() {
        let device = Default::default();
        let result: Result<SentimentNet<TestBackend>> =
            build_model(&Topology::lstm_model(), 20_000, &device);
        assert!(result.is_err());
    }
}
