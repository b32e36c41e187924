// ============================================================
// Layer 5 — Topology Descriptions
// ============================================================
// A network is described as data: an ordered list of layer
// specifications. One generic builder (model.rs) turns any
// valid description into a Burn module, so the three
// experiments differ only in the list they pass in.
//
// Accepted layer grammar:
//
//   Embedding
//   ( Conv1d+ GlobalMaxPool  |  Lstm+ )
//   Dense*
//   Dense(1, sigmoid)
//
// Within an Lstm stack every layer except the last must return
// its full sequence; the last one returns only its final step.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Linear,
    Sigmoid,
}

/// One layer of a sequential topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// `vocab_size: None` sizes the table from the fitted vocabulary.
    Embedding {
        #[serde(default)]
        vocab_size: Option<usize>,
        dim: usize,
    },
    Conv1d {
        filters:     usize,
        kernel_size: usize,
        activation:  Activation,
    },
    GlobalMaxPool,
    Lstm {
        units:            usize,
        dropout:          f64,
        return_sequences: bool,
    },
    Dense {
        units:      usize,
        activation: Activation,
    },
}

impl LayerSpec {
    fn kind(&self) -> &'static str {
        match self {
            Self::Embedding { .. } => "embedding",
            Self::Conv1d { .. }    => "conv1d",
            Self::GlobalMaxPool    => "global_max_pool",
            Self::Lstm { .. }      => "lstm",
            Self::Dense { .. }     => "dense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub name:   String,
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    /// Embedding → Conv1d(128, 5) → max pool → Dense 20 → Dense 5 → sigmoid.
    /// The embedding is sized from the fitted vocabulary.
    pub fn sentiment_model(embedding_dim: usize) -> Self {
        Self {
            name:   "sentiment_model".to_string(),
            layers: vec![
                LayerSpec::Embedding { vocab_size: None, dim: embedding_dim },
                LayerSpec::Conv1d { filters: 128, kernel_size: 5, activation: Activation::Relu },
                LayerSpec::GlobalMaxPool,
                LayerSpec::Dense { units: 20, activation: Activation::Relu },
                LayerSpec::Dense { units: 5, activation: Activation::Relu },
                LayerSpec::Dense { units: 1, activation: Activation::Sigmoid },
            ],
        }
    }

    /// Two stacked convolutions over a fixed 10000 × 64 embedding.
    pub fn conv_model() -> Self {
        Self {
            name:   "conv_model".to_string(),
            layers: vec![
                LayerSpec::Embedding { vocab_size: Some(10_000), dim: 64 },
                LayerSpec::Conv1d { filters: 128, kernel_size: 5, activation: Activation::Relu },
                LayerSpec::Conv1d { filters: 64, kernel_size: 5, activation: Activation::Relu },
                LayerSpec::GlobalMaxPool,
                LayerSpec::Dense { units: 10, activation: Activation::Relu },
                LayerSpec::Dense { units: 5, activation: Activation::Relu },
                LayerSpec::Dense { units: 1, activation: Activation::Sigmoid },
            ],
        }
    }

    /// Two stacked LSTMs (64 then 128 units) over a fixed 10000 × 32 embedding.
    pub fn lstm_model() -> Self {
        Self {
            name:   "lstm_model".to_string(),
            layers: vec![
                LayerSpec::Embedding { vocab_size: Some(10_000), dim: 32 },
                LayerSpec::Lstm { units: 64, dropout: 0.2, return_sequences: true },
                LayerSpec::Lstm { units: 128, dropout: 0.2, return_sequences: false },
                LayerSpec::Dense { units: 20, activation: Activation::Linear },
                LayerSpec::Dense { units: 1, activation: Activation::Sigmoid },
            ],
        }
    }

    /// Check the layer grammar and resolve the embedding size against the
    /// fitted vocabulary.
    pub fn plan(&self, vocab_size: usize) -> Result<Plan> {
        let name = &self.name;
        let mut layers = self.layers.iter().peekable();

        let (table_size, embedding_dim) = match layers.next() {
            Some(LayerSpec::Embedding { vocab_size: fixed, dim }) => {
                if *dim == 0 {
                    bail!("{name}: embedding dimension must be positive");
                }
                let table_size = match fixed {
                    Some(n) if *n < vocab_size => bail!(
                        "{name}: embedding holds {n} ids but the fitted vocabulary needs {vocab_size}"
                    ),
                    Some(n) => *n,
                    None    => vocab_size,
                };
                (table_size, *dim)
            }
            Some(other) => bail!("{name}: first layer must be an embedding, found {}", other.kind()),
            None        => bail!("{name}: topology has no layers"),
        };

        let extractor = match layers.peek() {
            Some(LayerSpec::Conv1d { .. }) => {
                let mut convs = Vec::new();
                while let Some(LayerSpec::Conv1d { filters, kernel_size, activation }) = layers.peek() {
                    if *filters == 0 || *kernel_size == 0 {
                        bail!("{name}: conv1d filters and kernel size must be positive");
                    }
                    convs.push(ConvPlan {
                        filters:     *filters,
                        kernel_size: *kernel_size,
                        relu:        hidden_relu(name, *activation)?,
                    });
                    layers.next();
                }
                match layers.next() {
                    Some(LayerSpec::GlobalMaxPool) => {}
                    Some(other) => bail!("{name}: expected global_max_pool after conv1d, found {}", other.kind()),
                    None        => bail!("{name}: expected global_max_pool after conv1d"),
                }
                Extractor::Convolutional(convs)
            }
            Some(LayerSpec::Lstm { .. }) => {
                let mut cells = Vec::new();
                while let Some(LayerSpec::Lstm { units, dropout, return_sequences }) = layers.peek() {
                    if *units == 0 {
                        bail!("{name}: lstm units must be positive");
                    }
                    if !(0.0..1.0).contains(dropout) {
                        bail!("{name}: lstm dropout must be in [0, 1), got {dropout}");
                    }
                    cells.push(LstmPlan {
                        units:            *units,
                        dropout:          *dropout,
                        return_sequences: *return_sequences,
                    });
                    layers.next();
                }
                let last = cells.len() - 1;
                for (i, cell) in cells.iter().enumerate() {
                    if i < last && !cell.return_sequences {
                        bail!("{name}: lstm layer {} feeds another lstm and must return sequences", i + 1);
                    }
                    if i == last && cell.return_sequences {
                        bail!("{name}: the last lstm layer must return only its final step");
                    }
                }
                Extractor::Recurrent(cells)
            }
            Some(other) => bail!("{name}: expected conv1d or lstm after the embedding, found {}", other.kind()),
            None        => bail!("{name}: topology has no feature extractor"),
        };

        let mut dense = Vec::new();
        for layer in layers {
            match layer {
                LayerSpec::Dense { units, activation } => {
                    if *units == 0 {
                        bail!("{name}: dense units must be positive");
                    }
                    dense.push((*units, *activation));
                }
                other => bail!("{name}: only dense layers may follow the feature extractor, found {}", other.kind()),
            }
        }

        match dense.pop() {
            Some((1, Activation::Sigmoid)) => {}
            _ => bail!("{name}: the last layer must be dense with 1 unit and sigmoid activation"),
        }

        let hidden = dense
            .into_iter()
            .map(|(units, activation)| Ok(DensePlan { units, relu: hidden_relu(name, activation)? }))
            .collect::<Result<Vec<_>>>()?;

        Ok(Plan { table_size, embedding_dim, extractor, hidden })
    }

    /// Output shape and parameter count of every layer for a given input
    /// length, in the order the layers were described.
    pub fn summary(&self, vocab_size: usize, seq_len: usize) -> Result<TopologySummary> {
        let plan = self.plan(vocab_size)?;
        if seq_len == 0 {
            bail!("{}: sequence length must be positive", self.name);
        }

        let mut rows = vec![LayerSummary {
            layer:        "embedding".to_string(),
            output_shape: vec![seq_len, plan.embedding_dim],
            params:       plan.table_size * plan.embedding_dim,
        }];

        let mut features = plan.embedding_dim;
        match &plan.extractor {
            Extractor::Convolutional(convs) => {
                let mut len = seq_len;
                for conv in convs {
                    if conv.kernel_size > len {
                        bail!(
                            "{}: conv1d kernel {} is longer than its input ({} steps)",
                            self.name, conv.kernel_size, len
                        );
                    }
                    len = len - conv.kernel_size + 1;
                    rows.push(LayerSummary {
                        layer:        "conv1d".to_string(),
                        output_shape: vec![len, conv.filters],
                        params:       conv.kernel_size * features * conv.filters + conv.filters,
                    });
                    features = conv.filters;
                }
                rows.push(LayerSummary {
                    layer:        "global_max_pool".to_string(),
                    output_shape: vec![features],
                    params:       0,
                });
            }
            Extractor::Recurrent(cells) => {
                for cell in cells {
                    // four gates, each with an input and a hidden projection (both biased)
                    let params = 4 * (features * cell.units + cell.units + cell.units * cell.units + cell.units);
                    let output_shape = if cell.return_sequences {
                        vec![seq_len, cell.units]
                    } else {
                        vec![cell.units]
                    };
                    rows.push(LayerSummary { layer: "lstm".to_string(), output_shape, params });
                    features = cell.units;
                }
            }
        }

        for dense in &plan.hidden {
            rows.push(LayerSummary {
                layer:        "dense".to_string(),
                output_shape: vec![dense.units],
                params:       features * dense.units + dense.units,
            });
            features = dense.units;
        }

        rows.push(LayerSummary {
            layer:        "dense_output".to_string(),
            output_shape: vec![1],
            params:       features + 1,
        });

        Ok(TopologySummary { name: self.name.clone(), layers: rows })
    }
}

/// Sigmoid is only supported on the output unit.
fn hidden_relu(name: &str, activation: Activation) -> Result<bool> {
    match activation {
        Activation::Relu    => Ok(true),
        Activation::Linear  => Ok(false),
        Activation::Sigmoid => bail!("{name}: sigmoid is only supported on the output layer"),
    }
}

// ─── Validated plan ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub table_size:    usize,
    pub embedding_dim: usize,
    pub extractor:     Extractor,
    /// Dense layers between the extractor and the sigmoid output
    pub hidden:        Vec<DensePlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extractor {
    Convolutional(Vec<ConvPlan>),
    Recurrent(Vec<LstmPlan>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvPlan {
    pub filters:     usize,
    pub kernel_size: usize,
    pub relu:        bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LstmPlan {
    pub units:            usize,
    pub dropout:          f64,
    pub return_sequences: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensePlan {
    pub units: usize,
    pub relu:  bool,
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub layer:        String,
    /// Shape without the batch dimension
    pub output_shape: Vec<usize>,
    pub params:       usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologySummary {
    pub name:   String,
    pub layers: Vec<LayerSummary>,
}

impl TopologySummary {
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.params).sum()
    }
}

impl fmt::Display for TopologySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: \"{}\"", self.name)?;
        writeln!(f, "{:<20} {:<22} {:>12}", "Layer", "Output shape", "Params")?;
        writeln!(f, "{}", "=".repeat(56))?;
        for row in &self.layers {
            let dims: Vec<String> = row.output_shape.iter().map(usize::to_string).collect();
            let shape = format!("(None, {})", dims.join(", "));
            writeln!(f, "{:<20} {:<22} {:>12}", row.layer, shape, row.params)?;
        }
        writeln!(f, "{}", "=".repeat(56))?;
        write!(f, "Total params: {}", self.total_params())
    }
}

// ─── Compile settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Adam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    BinaryCrossEntropy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Accuracy,
}

/// Optimizer, loss and metric shared by every topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSpec {
    pub optimizer:     OptimizerKind,
    pub loss:          LossKind,
    pub metric:        MetricKind,
    pub learning_rate: f64,
}

impl Default for CompileSpec {
    fn default() -> Self {
        Self {
            optimizer:     OptimizerKind::Adam,
            loss:          LossKind::BinaryCrossEntropy,
            metric:        MetricKind::Accuracy,
            learning_rate: 1e-3,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_model_summary_shapes() {
        let summary = Topology::sentiment_model(50).summary(1000, 100).unwrap();
        let shapes: Vec<Vec<usize>> = summary.layers.iter().map(|l| l.output_shape.clone()).collect();
        assert_eq!(shapes, vec![vec![100, 50], vec![96, 128], vec![128], vec![20], vec![5], vec![1]]);
        assert_eq!(summary.layers[0].params, 1000 * 50);
        assert_eq!(summary.layers[1].params, 5 * 50 * 128 + 128);
    }

    #[test]
    fn test_conv_model_shapes() {
        let summary = Topology::conv_model().summary(10_000, 500).unwrap();
        assert_eq!(summary.layers[1].output_shape, vec![496, 128]);
        assert_eq!(summary.layers[2].output_shape, vec![492, 64]);
        assert_eq!(summary.layers[3].output_shape, vec![64]);
        assert_eq!(summary.layers.last().unwrap().output_shape, vec![1]);
    }

    #[test]
    fn test_lstm_model_shapes() {
        let summary = Topology::lstm_model().summary(10_000, 500).unwrap();
        assert_eq!(summary.layers[1].output_shape, vec![500, 64]);
        assert_eq!(summary.layers[2].output_shape, vec![128]);
        assert_eq!(summary.layers[3].output_shape, vec![20]);
    }

    #[test]
    fn test_derived_embedding_tracks_vocabulary() {
        let plan = Topology::sentiment_model(50).plan(1234).unwrap();
        assert_eq!(plan.table_size, 1234);
        assert_eq!(plan.embedding_dim, 50);
        assert_eq!(plan.hidden, vec![
            DensePlan { units: 20, relu: true },
            DensePlan { units: 5, relu: true },
        ]);
    }

    #[test]
    fn test_fixed_embedding_too_small_is_rejected() {
        let err = Topology::conv_model().plan(10_001).unwrap_err();
        assert!(err.to_string().contains("10001"), "{err}");
        assert!(Topology::conv_model().plan(10_000).is_ok());
    }

    #[test]
    fn test_kernel_longer_than_sequence_is_rejected() {
        assert!(Topology::sentiment_model(8).summary(50, 4).is_err());
        assert!(Topology::sentiment_model(8).summary(50, 5).is_ok());
    }

    #[test]
    fn test_grammar_violations_are_rejected() {
        let mut no_pool = Topology::sentiment_model(8);
        no_pool.layers.remove(2);
        assert!(no_pool.plan(10).is_err());

        let mut bad_output = Topology::sentiment_model(8);
        bad_output.layers.pop();
        assert!(bad_output.plan(10).is_err());

        let mut bad_stack = Topology::lstm_model();
        bad_stack.layers[1] = LayerSpec::Lstm { units: 64, dropout: 0.2, return_sequences: false };
        assert!(bad_stack.plan(100).is_err());

        let headless = Topology { name: "headless".into(), layers: vec![LayerSpec::GlobalMaxPool] };
        assert!(headless.plan(10).is_err());
    }

    #[test]
    fn test_topology_json_shape() {
        let json = serde_json::to_value(Topology::lstm_model()).unwrap();
        assert_eq!(json["layers"][0]["type"], "embedding");
        assert_eq!(json["layers"][1]["type"], "lstm");
        assert_eq!(json["layers"][4]["activation"], "sigmoid");

        let pool: LayerSpec = serde_json::from_str(r#"{"type":"global_max_pool"}"#).unwrap();
        assert_eq!(pool, LayerSpec::GlobalMaxPool);
    }
}
