// Wordle-style per-letter color feedback against a duel's target word.

use serde::{Deserialize, Serialize};

/// Per-letter classification of a word against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterColor {
    /// Right letter, right position.
    Green,
    /// Letter present elsewhere in the target and not already accounted for.
    Yellow,
    /// Letter absent (or all of its target occurrences already matched).
    Gray,
}

/// Compute the color feedback of `guess` against `target`.
///
/// Two passes over the guess:
/// 1. Exact position matches become green and are removed from the target's
///    remaining letters.
/// 2. Left to right, each non-green letter becomes yellow if a copy remains in
///    the target pool (consuming it), otherwise gray.
///
/// Returns one entry per letter of `guess`. Positions past the end of the
/// target can never be green but can still pick up a yellow.
pub fn color_feedback(guess: &str, target: &str) -> Vec<LetterColor> {
    let guess: Vec<char> = guess.chars().collect();
    let mut remaining: Vec<Option<char>> = target.chars().map(Some).collect();
    let mut result = vec![LetterColor::Gray; guess.len()];

    for (i, &letter) in guess.iter().enumerate() {
        if remaining.get(i).copied().flatten() == Some(letter) {
            result[i] = LetterColor::Green;
            remaining[i] = None;
        }
    }

    for (i, &letter) in guess.iter().enumerate() {
        if result[i] == LetterColor::Green {
            continue;
        }
        if let Some(slot) = remaining.iter_mut().find(|slot| **slot == Some(letter)) {
            *slot = None;
            result[i] = LetterColor::Yellow;
        }
    }

    result
}

/// Number of green letters in a feedback row.
pub fn count_greens(feedback: &[LetterColor]) -> usize {
    feedback
        .iter()
        .filter(|c| **c == LetterColor::Green)
        .count()
}

#[cfg(test)]
mod tests {
    use super::LetterColor::{Gray, Green, Yellow};
    use super::*;

    #[test]
    fn raise_against_crane() {
        assert_eq!(
            color_feedback("RAISE", "CRANE"),
            vec![Yellow, Yellow, Gray, Gray, Green]
        );
    }

    #[test]
    fn exact_match_is_all_green() {
        assert_eq!(color_feedback("SLATE", "SLATE"), vec![Green; 5]);
    }

    #[test]
    fn no_shared_letters_is_all_gray() {
        assert_eq!(color_feedback("BUMPY", "CRANE"), vec![Gray; 5]);
    }

    #[test]
    fn green_consumes_letter_before_yellow_pass() {
        // Target has one E, already matched at position 4; the leading E
        // must not also be yellow.
        assert_eq!(
            color_feedback("EERIE", "CRANE"),
            vec![Gray, Gray, Yellow, Gray, Green]
        );
    }

    #[test]
    fn duplicate_letters_take_yellow_first_come() {
        // Target has one L, matched green at position 1, so the leading L
        // gets nothing.
        assert_eq!(
            color_feedback("LLAMA", "PLATE"),
            vec![Gray, Green, Green, Gray, Gray]
        );
        // Target has one L and no green for it: only the first stray L is
        // yellow.
        assert_eq!(
            color_feedback("ALLOY", "LEAPT"),
            vec![Yellow, Yellow, Gray, Gray, Gray]
        );
    }

    #[test]
    fn count_greens_counts_only_green() {
        let feedback = color_feedback("RAISE", "CRANE");
        assert_eq!(count_greens(&feedback), 1);
        assert_eq!(count_greens(&[Green, Green, Yellow]), 2);
    }
}
