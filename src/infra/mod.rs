// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   metrics.rs — per-epoch loss/accuracy record produced by
//                the trainer
//
//   plotter.rs — renders that record as accuracy and loss
//                curves into an SVG file (plotters)

/// Per-epoch training history
pub mod metrics;

/// Accuracy / loss curve rendering
pub mod plotter;
