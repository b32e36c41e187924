// ============================================================
// Layer 3 — Labelled Example
// ============================================================
// One row of the sentiment corpus: free text, a binary label
// and a tag naming the file (or corpus) it came from.
//
// The label is a proper enum rather than a bare integer so a
// value outside {0, 1} can never reach the model.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Binary sentiment of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Parse the textual label found in the input files ("0" or "1").
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "0" => Ok(Self::Negative),
            "1" => Ok(Self::Positive),
            other => bail!("label must be 0 or 1, got '{other}'"),
        }
    }

    /// Numeric value used as the training target
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A sentence with its sentiment and the source it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// The raw sentence, exactly as it appeared before the tab
    pub text: String,

    pub label: Sentiment,

    /// Categorical tag such as "yelp", "amazon" or "imdb"
    pub source: String,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>, label: Sentiment, source: impl Into<String>) -> Self {
        Self {
            text:   text.into(),
            label,
            source: source.into(),
        }
    }
}
