// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the files on disk and the tensor batches
// fed to the model:
//
//   .txt files (tab-separated sentences / aclImdb reviews)
//       │
//       ▼
//   TsvLoader / ImdbLoader  → labelled examples, tagged by source
//       │
//       ▼
//   table                   → combined table + CSV snapshot
//       │
//       ▼
//   splitter                → seeded train / held-out split
//       │
//       ▼
//   TextVectorizer          → vocabulary + padded id sequences
//       │
//       ▼
//   SentimentDataset        → Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher        → [batch, seq_len] tensors

/// Tab-separated and aclImdb loaders
pub mod loader;

/// Row-wise union of tables and the combined CSV file
pub mod table;

/// Vocabulary fitting, encoding and padding
pub mod vectorizer;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle + split
pub mod splitter;
