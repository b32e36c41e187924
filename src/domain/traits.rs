// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only ever asks a source for its rows;
// it never knows whether they came from a tab-separated file
// or from a directory of review files.

use anyhow::Result;
use crate::domain::example::LabeledExample;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce labelled examples.
///
/// Implementations:
///   - TsvLoader  → one `sentence\tlabel` file, tagged with a source name
///   - ImdbLoader → one split of the aclImdb review corpus
pub trait ExampleSource {
    /// Load every example this source provides, failing on the first
    /// malformed record.
    fn load_all(&self) -> Result<Vec<LabeledExample>>;
}
