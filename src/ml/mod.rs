// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here.
//
//   topology.rs  — layer descriptions as data, the three preset
//                  architectures, grammar validation and the
//                  Keras-style summary
//
//   model.rs     — one generic builder turning a validated
//                  topology into a Burn module (embedding,
//                  Conv1d / LSTM stack, dense layers, sigmoid)
//
//   trainer.rs   — fixed-epoch training loop with Adam and
//                  binary cross-entropy
//
//   evaluator.rs — loss / accuracy of a model on a dataset

pub mod topology;

pub mod model;

pub mod trainer;

pub mod evaluator;
