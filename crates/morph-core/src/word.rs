// Fixed-length dictionary words and letter-position comparisons.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An uppercase dictionary word.
///
/// Equality is exact string match on the normalized (trimmed, uppercased)
/// form, so `"crane"` and `" CRANE "` produce the same `Word`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Normalize raw player or file input into a word.
    pub fn new(raw: &str) -> Self {
        Word(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of letters (chars, not bytes).
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every letter is an ASCII letter. Word lists are filtered on
    /// this before graph construction.
    pub fn is_alphabetic(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// The wildcard key for position `index`: the word with that letter
    /// replaced by `*` (`CRANE` at 2 -> `CR*NE`).
    pub fn wildcard_key(&self, index: usize) -> String {
        self.0
            .chars()
            .enumerate()
            .map(|(i, c)| if i == index { '*' } else { c })
            .collect()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Word {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Word {
    fn from(raw: &str) -> Self {
        Word::new(raw)
    }
}

/// Count the letter positions where `a` and `b` differ.
///
/// Extra letters in the longer word each count as a difference, so the result
/// is only a true Hamming distance for equal-length inputs.
pub fn hamming_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let mismatched = a.chars().zip(b.chars()).filter(|(x, y)| x != y).count();
    mismatched + a_len.abs_diff(b_len)
}
