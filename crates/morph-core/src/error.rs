// Duel-level error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a duel operation can be refused. Rejections never mutate match
/// state; the match stays queryable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuelError {
    #[error("match {0} not found")]
    MatchNotFound(String),

    #[error("match {0} already exists")]
    MatchAlreadyExists(String),

    #[error("match is already finished")]
    MatchAlreadyFinished,

    #[error("player {0} is not in this match")]
    PlayerNotFound(String),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("you have already reached the target")]
    PlayerAlreadyCompleted,

    #[error("word must be {expected} letters (got {actual})")]
    InvalidWordLength { expected: usize, actual: usize },

    #[error("you must change exactly 1 letter (changed {changed})")]
    InvalidTransformation { changed: usize },

    #[error("{0} is not in the dictionary")]
    WordNotInDictionary(String),

    #[error("word validation is unavailable: {0}")]
    ValidationUnavailable(String),

    #[error("a duel needs two distinct players")]
    InvalidPlayers,

    #[error("no qualifying start/target word pair could be found")]
    NoWordPair,

    #[error("invalid start/target pair: {0}")]
    InvalidWordPair(String),
}

impl DuelError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            DuelError::MatchNotFound(_) => "MATCH_NOT_FOUND",
            DuelError::MatchAlreadyExists(_) => "MATCH_ALREADY_EXISTS",
            DuelError::MatchAlreadyFinished => "MATCH_ALREADY_FINISHED",
            DuelError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            DuelError::NotYourTurn => "NOT_YOUR_TURN",
            DuelError::PlayerAlreadyCompleted => "PLAYER_ALREADY_COMPLETED",
            DuelError::InvalidWordLength { .. } => "INVALID_WORD_LENGTH",
            DuelError::InvalidTransformation { .. } => "INVALID_TRANSFORMATION",
            DuelError::WordNotInDictionary(_) => "WORD_NOT_IN_DICTIONARY",
            DuelError::ValidationUnavailable(_) => "VALIDATION_UNAVAILABLE",
            DuelError::InvalidPlayers => "INVALID_PLAYERS",
            DuelError::NoWordPair => "NO_WORD_PAIR",
            DuelError::InvalidWordPair(_) => "INVALID_WORD_PAIR",
        }
    }

    /// Serializable `{code, message}` pair.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Wire form of a [`DuelError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
