// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal (prepare the data, or run an experiment).
//
// Rules for this layer:
//   - No ML math or model code here
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// Experiment description: presets, JSON load/save, validation
pub mod experiment;

// Load -> split -> vectorize -> build -> fit -> evaluate -> plot
pub mod experiment_use_case;

// Combined-table export of the sentence corpora
pub mod prepare_use_case;
