// ============================================================
// Layer 4 — Example Loaders
// ============================================================
// Two sources of labelled text:
//
//   TsvLoader  — one `<sentence>\t<label>` file per corpus
//                (the yelp / amazon / imdb labelled sentences),
//                every row tagged with the source name passed in.
//
//   ImdbLoader — the aclImdb movie-review corpus on disk:
//                  <dir>/train/pos/*.txt   label 1
//                  <dir>/train/neg/*.txt   label 0
//                  <dir>/test/{pos,neg}/*.txt
//
// Both fail fast: a malformed line or a missing file stops the
// run with the file name and line number.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::example::{LabeledExample, Sentiment};
use crate::domain::traits::ExampleSource;

/// Loads one tab-separated sentence file.
pub struct TsvLoader {
    path:   PathBuf,
    source: String,
}

impl TsvLoader {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path:   path.into(),
            source: source.into(),
        }
    }
}

impl ExampleSource for TsvLoader {
    fn load_all(&self) -> Result<Vec<LabeledExample>> {
        // Quoting is off: review sentences contain bare `"` characters.
        // Flexible records let us report the exact line with a wrong
        // column count instead of a generic length mismatch.
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;

        let mut rows = Vec::new();

        for (i, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Cannot read record {} of '{}'", i + 1, self.path.display()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);

            if record.len() != 2 {
                bail!(
                    "'{}' line {}: expected 2 tab-separated columns, found {}",
                    self.path.display(),
                    line,
                    record.len()
                );
            }

            let label = Sentiment::parse(&record[1])
                .with_context(|| format!("'{}' line {}", self.path.display(), line))?;

            rows.push(LabeledExample::new(&record[0], label, self.source.as_str()));
        }

        tracing::info!(
            "Loaded {} rows from '{}' (source={})",
            rows.len(),
            self.path.display(),
            self.source
        );
        Ok(rows)
    }
}

// ─── aclImdb ──────────────────────────────────────────────────────────────────

/// Which half of the review corpus to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImdbSplit {
    Train,
    Test,
}

impl ImdbSplit {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test  => "test",
        }
    }
}

/// Loads one split of the aclImdb movie-review corpus.
pub struct ImdbLoader {
    dir:   PathBuf,
    split: ImdbSplit,
    /// Optional cap on reviews read per polarity
    limit: Option<usize>,
}

impl ImdbLoader {
    pub const SOURCE: &'static str = "imdb";

    pub fn new(dir: impl Into<PathBuf>, split: ImdbSplit, limit: Option<usize>) -> Self {
        Self { dir: dir.into(), split, limit }
    }

    fn load_polarity(&self, polarity: &str, label: Sentiment) -> Result<Vec<LabeledExample>> {
        let dir = self.dir.join(self.split.dir_name()).join(polarity);

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("Cannot read review directory '{}'", dir.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("Cannot list '{}'", dir.display()))?;

        files.retain(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"));
        // read_dir order is platform dependent
        files.sort();
        if let Some(limit) = self.limit {
            files.truncate(limit);
        }

        files
            .iter()
            .map(|path| {
                let text = read_review(path)?;
                Ok(LabeledExample::new(text, label, Self::SOURCE))
            })
            .collect()
    }
}

impl ExampleSource for ImdbLoader {
    fn load_all(&self) -> Result<Vec<LabeledExample>> {
        let mut rows = self.load_polarity("neg", Sentiment::Negative)?;
        rows.extend(self.load_polarity("pos", Sentiment::Positive)?);

        tracing::info!(
            "Loaded {} reviews from '{}' ({:?} split)",
            rows.len(),
            self.dir.display(),
            self.split
        );
        Ok(rows)
    }
}

/// Reviews carry HTML line breaks; they are not words.
fn read_review(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Cannot read review '{}'", path.display()))?;
    Ok(raw.replace("<br />", " ").trim().to_string())
}
