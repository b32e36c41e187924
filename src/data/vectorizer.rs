// ============================================================
// Layer 4 — Text Vectorizer
// ============================================================
// Turns free text into fixed-length sequences of token ids.
//
//   "Good product!"  ──split──▶  ["good", "product"]
//                    ──ids────▶  [1, 3]
//                    ──pad────▶  [1, 3, 0, 0]      (len = 4)
//
// Vocabulary rules:
//   - Fitted on the training split only, never on held-out text
//   - Ranked by frequency, ties broken by first occurrence, so
//     fitting twice on the same texts gives the same ids
//   - Only the `max_words` most frequent words are kept and they
//     get ids 1..=max_words; id 0 is the padding sentinel
//   - Words not in the vocabulary are dropped when encoding
//
// Word splitting is delegated to the HuggingFace tokenizers
// crate: BertNormalizer (clean + lowercase) and the Whitespace
// pre-tokenizer. Tokens made only of punctuation are discarded.

use anyhow::{anyhow, bail, Result};
use std::{cmp::Reverse, collections::HashMap};
use tokenizers::{
    normalizers::BertNormalizer,
    pre_tokenizers::whitespace::Whitespace,
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

use crate::data::dataset::SentimentSample;
use crate::domain::example::LabeledExample;

/// Reserved id used to right-pad short sequences.
pub const PAD_ID: u32 = 0;

// ─── WordSplitter ─────────────────────────────────────────────────────────────
/// Normalises and splits a sentence into lowercase words.
pub struct WordSplitter {
    normalizer:    BertNormalizer,
    pre_tokenizer: Whitespace,
}

impl WordSplitter {
    pub fn new() -> Self {
        Self {
            normalizer:    BertNormalizer::new(true, true, None, true),
            pre_tokenizer: Whitespace::default(),
        }
    }

    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        let mut pre = PreTokenizedString::from(text);
        pre.normalize(|s| self.normalizer.normalize(s))
            .map_err(|e| anyhow!("Normalisation error: {e}"))?;
        self.pre_tokenizer
            .pre_tokenize(&mut pre)
            .map_err(|e| anyhow!("Pre-tokenisation error: {e}"))?;

        Ok(pre
            .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
            .into_iter()
            .map(|(word, _, _)| word)
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .map(str::to_owned)
            .collect())
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── TextVectorizer ───────────────────────────────────────────────────────────
/// A fitted vocabulary. Write-once: there is no incremental update.
pub struct TextVectorizer {
    splitter:   WordSplitter,
    word_index: HashMap<String, u32>,
    /// Retained words in id order (`words[0]` has id 1)
    words:      Vec<String>,
}

impl TextVectorizer {
    /// Build the vocabulary from training texts.
    pub fn fit<S: AsRef<str>>(texts: &[S], max_words: usize) -> Result<Self> {
        if max_words == 0 {
            bail!("max_words must be at least 1");
        }

        let splitter = WordSplitter::new();

        // word → (count, first position seen)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut position = 0usize;
        for text in texts {
            for word in splitter.split(text.as_ref())? {
                let entry = counts.entry(word).or_insert((0, position));
                entry.0 += 1;
                position += 1;
            }
        }

        if counts.is_empty() {
            bail!("cannot fit a vocabulary: the training texts contain no words");
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by_key(|(_, (count, first))| (Reverse(*count), *first));
        ranked.truncate(max_words);

        let words: Vec<String> = ranked.into_iter().map(|(word, _)| word).collect();
        let word_index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32 + 1))
            .collect();

        tracing::info!(
            "Vocabulary fitted: {} words kept (max_words={})",
            words.len(),
            max_words
        );

        Ok(Self { splitter, word_index, words })
    }

    /// Rows needed in an embedding table: retained words plus the pad id.
    pub fn vocab_size(&self) -> usize {
        self.words.len() + 1
    }

    pub fn id_of(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }

    /// Word for an id, `None` for the pad id or anything out of range.
    pub fn word_of(&self, id: u32) -> Option<&str> {
        let idx = (id as usize).checked_sub(1)?;
        self.words.get(idx).map(String::as_str)
    }

    /// Map text to ids, dropping words outside the vocabulary.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(self
            .splitter
            .split(text)?
            .iter()
            .filter_map(|w| self.id_of(w))
            .collect())
    }

    pub fn encode_padded(&self, text: &str, len: usize) -> Result<Vec<u32>> {
        Ok(pad_sequence(self.encode(text)?, len))
    }

    /// Encode every example to a fixed-length training sample.
    pub fn vectorize(&self, examples: &[LabeledExample], len: usize) -> Result<Vec<SentimentSample>> {
        examples
            .iter()
            .map(|ex| {
                Ok(SentimentSample {
                    tokens: self.encode_padded(&ex.text, len)?,
                    label:  ex.label.as_u8(),
                })
            })
            .collect()
    }
}

/// Right-pad with `PAD_ID` up to `len`; drop the tail beyond `len`.
pub fn pad_sequence(mut ids: Vec<u32>, len: usize) -> Vec<u32> {
    ids.truncate(len);
    ids.resize(len, PAD_ID);
    ids
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Sentiment;

    #[test]
    fn test_split_lowercases_and_drops_punctuation() {
        let words = WordSplitter::new().split("Wow... Loved THIS place!").unwrap();
        assert_eq!(words, ["wow", "loved", "this", "place"]);
    }

    #[test]
    fn test_good_bad_product_scenario() {
        let v = TextVectorizer::fit(&["good product", "bad product"], 10).unwrap();

        assert!(v.id_of("good").is_some());
        assert!(v.id_of("bad").is_some());
        assert!(v.id_of("product").is_some());
        assert_eq!(v.vocab_size(), 4);

        let seq = v.encode_padded("good product", 4).unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq[2], PAD_ID);
        assert_eq!(seq[3], PAD_ID);
        assert_eq!(seq[0], v.id_of("good").unwrap());
        assert_eq!(seq[1], v.id_of("product").unwrap());
    }

    #[test]
    fn test_most_frequent_word_gets_lowest_id() {
        let v = TextVectorizer::fit(&["b a", "a c", "a b"], 10).unwrap();
        assert_eq!(v.id_of("a"), Some(1));
        // b and c: b is more frequent
        assert_eq!(v.id_of("b"), Some(2));
        assert_eq!(v.id_of("c"), Some(3));
        assert_eq!(v.word_of(1), Some("a"));
        assert_eq!(v.word_of(PAD_ID), None);
    }

    #[test]
    fn test_ties_follow_first_occurrence() {
        let v = TextVectorizer::fit(&["zebra apple mango"], 10).unwrap();
        assert_eq!(v.id_of("zebra"), Some(1));
        assert_eq!(v.id_of("apple"), Some(2));
        assert_eq!(v.id_of("mango"), Some(3));
    }

    #[test]
    fn test_cap_limits_vocabulary() {
        let v = TextVectorizer::fit(&["a a a b b c"], 2).unwrap();
        assert_eq!(v.vocab_size(), 3);
        assert_eq!(v.id_of("c"), None);
        // c is out of vocabulary and is dropped
        assert_eq!(v.encode("a c b").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unseen_words_are_dropped() {
        let v = TextVectorizer::fit(&["good product"], 10).unwrap();
        assert_eq!(v.encode("terrible good service").unwrap(), vec![v.id_of("good").unwrap()]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let texts = ["the food was great", "the service was slow", "great value"];
        let v = TextVectorizer::fit(&texts, 100).unwrap();
        let first  = v.encode_padded("the food was slow", 8).unwrap();
        let second = v.encode_padded("the food was slow", 8).unwrap();
        assert_eq!(first, second);

        let refit = TextVectorizer::fit(&texts, 100).unwrap();
        assert_eq!(refit.encode_padded("the food was slow", 8).unwrap(), first);
    }

    #[test]
    fn test_pad_and_truncate_to_fixed_length() {
        assert_eq!(pad_sequence(vec![5, 6], 4), vec![5, 6, 0, 0]);
        assert_eq!(pad_sequence(vec![1, 2, 3, 4, 5], 3), vec![1, 2, 3]);
        assert_eq!(pad_sequence(vec![], 2), vec![0, 0]);
        assert_eq!(pad_sequence(vec![7, 8], 2), vec![7, 8]);
    }

    #[test]
    fn test_vectorize_gives_uniform_lengths() {
        let v = TextVectorizer::fit(&["one two three four five six"], 100).unwrap();
        let examples = vec![
            LabeledExample::new("one", Sentiment::Positive, "t"),
            LabeledExample::new("one two three four five six", Sentiment::Negative, "t"),
            LabeledExample::new("", Sentiment::Negative, "t"),
        ];
        let samples = v.vectorize(&examples, 4).unwrap();
        assert!(samples.iter().all(|s| s.tokens.len() == 4));
        assert_eq!(samples[0].label, 1);
        assert_eq!(samples[1].label, 0);
        assert_eq!(samples[2].tokens, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_vocabulary_is_rejected() {
        assert!(TextVectorizer::fit(&["!!! ...", ""], 10).is_err());
        assert!(TextVectorizer::fit::<&str>(&[], 10).is_err());
        assert!(TextVectorizer::fit(&["fine"], 0).is_err());
    }
}
