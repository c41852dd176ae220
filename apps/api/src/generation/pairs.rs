//! Word pairs and the tolerant line parser that extracts them from upstream text.
//!
//! Acceptance is strict (uppercase ASCII letters, digits and spaces, 1–50 chars per
//! word) while parsing is forgiving: any line that does not fit is dropped and the
//! rest of the response is still used.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest accepted word, in characters.
pub const MAX_WORD_LEN: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// WordPair
// ────────────────────────────────────────────────────────────────────────────

/// An ordered two-word association: one "match" in the deck.
///
/// Serialized as a two-element array `["LEFT", "RIGHT"]`. Deserialization runs the
/// same validation as the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "(String, String)", try_from = "(String, String)")]
pub struct WordPair {
    left: String,
    right: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidWord(pub String);

impl fmt::Display for InvalidWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' must be 1-{MAX_WORD_LEN} characters of A-Z, 0-9 or space",
            self.0
        )
    }
}

impl std::error::Error for InvalidWord {}

impl WordPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Result<Self, InvalidWord> {
        let left = left.into();
        let right = right.into();
        if !is_valid_word(&left) {
            return Err(InvalidWord(left));
        }
        if !is_valid_word(&right) {
            return Err(InvalidWord(right));
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }
}

impl From<WordPair> for (String, String) {
    fn from(pair: WordPair) -> Self {
        (pair.left, pair.right)
    }
}

impl TryFrom<(String, String)> for WordPair {
    type Error = InvalidWord;

    fn try_from((left, right): (String, String)) -> Result<Self, Self::Error> {
        WordPair::new(left, right)
    }
}

impl fmt::Display for WordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.left, self.right)
    }
}

/// 1 to `MAX_WORD_LEN` characters, each an uppercase ASCII letter, digit, or space.
pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty()
        && word.len() <= MAX_WORD_LEN
        && word
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b' ')
}

// ────────────────────────────────────────────────────────────────────────────
// PairCollection
// ────────────────────────────────────────────────────────────────────────────

/// Ordered, duplicate-free sequence of pairs. Order is generation order and drives
/// card placement downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PairCollection {
    pairs: Vec<WordPair>,
}

impl PairCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection keeping the first occurrence of each ordered tuple.
    pub fn from_pairs(pairs: impl IntoIterator<Item = WordPair>) -> Self {
        let mut seen = HashSet::new();
        let pairs = pairs
            .into_iter()
            .filter(|pair| seen.insert(pair.clone()))
            .collect();
        Self { pairs }
    }

    /// Appends `pair` unless an identical tuple is already present.
    /// Returns whether the pair was added.
    pub fn push_unique(&mut self, pair: WordPair) -> bool {
        if self.pairs.contains(&pair) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    pub fn truncate(&mut self, len: usize) {
        self.pairs.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordPair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[WordPair] {
        &self.pairs
    }

    /// Every word in card order: left then right of each pair, pairs in order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.left(), pair.right()])
    }
}

impl<'a> IntoIterator for &'a PairCollection {
    type Item = &'a WordPair;
    type IntoIter = std::slice::Iter<'a, WordPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<'de> Deserialize<'de> for PairCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs = Vec::<WordPair>::deserialize(deserializer)?;
        Ok(PairCollection::from_pairs(pairs))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Result of parsing one upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub pairs: PairCollection,
    /// Non-blank lines seen.
    pub lines_seen: usize,
    /// Lines dropped for shape or character-class violations.
    pub lines_rejected: usize,
    /// Well-formed lines dropped as exact duplicates.
    pub duplicates: usize,
}

/// Splits a single trimmed line on its one hyphen separator.
///
/// Returns `None` when the line has zero or several hyphens, when either side is empty
/// after trimming, or when either side fails `is_valid_word`.
pub fn parse_pair_line(line: &str) -> Option<WordPair> {
    let mut segments = line.split('-');
    let left = segments.next()?.trim();
    let right = segments.next()?.trim();
    if segments.next().is_some() {
        return None;
    }
    WordPair::new(left, right).ok()
}

/// Parses a raw free-text response into a deduplicated collection, preserving
/// first-seen order. Never fails; unusable lines are counted and skipped.
pub fn parse_pairs(raw: &str) -> ParseOutcome {
    let mut pairs = PairCollection::new();
    let mut lines_seen = 0;
    let mut lines_rejected = 0;
    let mut duplicates = 0;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        lines_seen += 1;
        match parse_pair_line(line) {
            Some(pair) => {
                if !pairs.push_unique(pair) {
                    duplicates += 1;
                }
            }
            None => {
                debug!("Dropping unusable generator line: {line:?}");
                lines_rejected += 1;
            }
        }
    }

    ParseOutcome {
        pairs,
        lines_seen,
        lines_rejected,
        duplicates,
    }
}
