// Duel state: players, paths, turn ownership, and conclusion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TurnLimitTie;
use crate::error::DuelError;
use crate::feedback::{color_feedback, count_greens, LetterColor};
use crate::hint::{HintResponse, HintSelector};
use crate::insight::{BranchLevel, InsightEngine, WordInsight};
use crate::word::{hamming_distance, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuelStatus {
    Active,
    Finished,
}

/// Why a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    ReachedTarget,
    TurnLimit,
}

/// A player identity as supplied by the caller. Seat order is turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeat {
    pub user_id: String,
    pub username: String,
}

impl PlayerSeat {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        PlayerSeat {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// One accepted word in a player's path. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationStep {
    pub word: Word,
    pub color_feedback: Vec<LetterColor>,
    pub timestamp: DateTime<Utc>,
    pub branch_level: BranchLevel,
    pub neighbor_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_to_target: Option<usize>,
}

impl TransformationStep {
    pub fn new(insight: &WordInsight, target: &Word, timestamp: DateTime<Utc>) -> Self {
        TransformationStep {
            word: insight.word.clone(),
            color_feedback: color_feedback(insight.word.as_str(), target.as_str()),
            timestamp,
            branch_level: insight.branch_level,
            neighbor_count: insight.neighbor_count,
            distance_to_target: insight.distance_to_target,
        }
    }

    pub fn greens(&self) -> usize {
        count_greens(&self.color_feedback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    pub user_id: String,
    pub username: String,
    pub current_word: Word,
    /// `path[0]` is always the shared start word.
    pub path: Vec<TransformationStep>,
    pub completed: bool,
    pub transformation_count: usize,
    pub hints_used: u32,
    pub last_insight: WordInsight,
}

impl PlayerProgress {
    fn new(seat: PlayerSeat, start: TransformationStep, start_insight: WordInsight) -> Self {
        PlayerProgress {
            user_id: seat.user_id,
            username: seat.username,
            current_word: start.word.clone(),
            path: vec![start],
            completed: false,
            transformation_count: 0,
            hints_used: 0,
            last_insight: start_insight,
        }
    }

    /// Green count of the most recent step.
    pub fn last_greens(&self) -> usize {
        self.path.last().map(TransformationStep::greens).unwrap_or(0)
    }
}

/// Outcome flags of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedMove {
    pub completed: bool,
    pub winner_declared: bool,
    pub turn_limit_reached: bool,
}

/// Full state of one duel. Serialized whole for every broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelState {
    pub match_id: String,
    pub start_word: Word,
    pub target_word: Word,
    /// Exactly two entries, in turn order.
    pub players: Vec<PlayerProgress>,
    pub current_player: String,
    pub turn_count: u32,
    pub status: DuelStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_reason: Option<EndReason>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub start_insight: WordInsight,
    pub target_insight: WordInsight,
}

impl DuelState {
    /// Seat both players on `start_insight.word`; the first seat moves first.
    pub fn new(
        match_id: impl Into<String>,
        seats: [PlayerSeat; 2],
        start_insight: WordInsight,
        target_insight: WordInsight,
        now: DateTime<Utc>,
    ) -> Self {
        let start_word = start_insight.word.clone();
        let target_word = target_insight.word.clone();
        let first_step = TransformationStep::new(&start_insight, &target_word, now);

        let current_player = seats[0].user_id.clone();
        let players = seats
            .into_iter()
            .map(|seat| PlayerProgress::new(seat, first_step.clone(), start_insight.clone()))
            .collect();

        DuelState {
            match_id: match_id.into(),
            start_word,
            target_word,
            players,
            current_player,
            turn_count: 0,
            status: DuelStatus::Active,
            winner_id: None,
            end_reason: None,
            started_at: now,
            finished_at: None,
            start_insight,
            target_insight,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == DuelStatus::Active
    }

    pub fn player(&self, user_id: &str) -> Option<&PlayerProgress> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    fn player_index(&self, user_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    /// Guard for operations that only need an active match and a seated
    /// player (hints).
    pub fn check_participant(&self, user_id: &str) -> Result<&PlayerProgress, DuelError> {
        if !self.is_active() {
            return Err(DuelError::MatchAlreadyFinished);
        }
        self.player(user_id)
            .ok_or_else(|| DuelError::PlayerNotFound(user_id.to_string()))
    }

    /// The state-local part of move validation, in order: active match,
    /// seated player, turn ownership, not yet completed, length, exactly one
    /// changed letter. Dictionary membership is checked by the caller.
    pub fn check_move(
        &self,
        user_id: &str,
        word: &Word,
        word_length: usize,
    ) -> Result<(), DuelError> {
        let player = self.check_participant(user_id)?;
        if self.current_player != user_id {
            return Err(DuelError::NotYourTurn);
        }
        if player.completed {
            return Err(DuelError::PlayerAlreadyCompleted);
        }
        if word.len() != word_length {
            return Err(DuelError::InvalidWordLength {
                expected: word_length,
                actual: word.len(),
            });
        }
        let changed = hamming_distance(player.current_word.as_str(), word.as_str());
        if changed != 1 {
            return Err(DuelError::InvalidTransformation { changed });
        }
        Ok(())
    }

    /// Append an already-validated move. Reaching the target concludes the
    /// match; otherwise the turn passes and the turn limit is checked.
    pub fn apply_move(
        &mut self,
        user_id: &str,
        insight: WordInsight,
        max_turns: u32,
        tie: TurnLimitTie,
        now: DateTime<Utc>,
    ) -> AppliedMove {
        let Some(idx) = self.player_index(user_id) else {
            return AppliedMove::default();
        };

        let step = TransformationStep::new(&insight, &self.target_word, now);
        let reached = step.word == self.target_word;

        let player = &mut self.players[idx];
        player.current_word = step.word.clone();
        player.path.push(step);
        player.transformation_count += 1;
        player.last_insight = insight;

        if reached {
            player.completed = true;
            let winner_declared =
                self.conclude(Some(user_id.to_string()), EndReason::ReachedTarget, now);
            return AppliedMove {
                completed: true,
                winner_declared,
                turn_limit_reached: false,
            };
        }

        let next = (idx + 1) % self.players.len();
        self.current_player = self.players[next].user_id.clone();
        self.turn_count += 1;

        let turn_limit_reached =
            self.turn_count >= max_turns && self.conclude_by_turn_limit(tie, now);
        AppliedMove {
            completed: false,
            winner_declared: false,
            turn_limit_reached,
        }
    }

    /// The turn-limit winner: the player whose latest word has the most
    /// greens. Ties follow `tie`.
    pub fn turn_limit_winner(&self, tie: TurnLimitTie) -> Option<String> {
        let best = self.players.iter().map(PlayerProgress::last_greens).max()?;
        let mut leaders = self.players.iter().filter(|p| p.last_greens() == best);
        let first = leaders.next()?;
        if leaders.next().is_some() && tie == TurnLimitTie::Draw {
            return None;
        }
        Some(first.user_id.clone())
    }

    /// Adjudicate and conclude by turn limit. `false` if already finished.
    pub fn conclude_by_turn_limit(&mut self, tie: TurnLimitTie, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        let winner = self.turn_limit_winner(tie);
        self.conclude(winner, EndReason::TurnLimit, now)
    }

    /// Serve a hint request for `user_id`, charging their budget.
    pub fn grant_hint(
        &mut self,
        user_id: &str,
        selector: &HintSelector,
        insights: &InsightEngine,
        count: usize,
    ) -> Result<HintResponse, DuelError> {
        self.check_participant(user_id)?;
        let target = self.target_word.clone();
        let Some(idx) = self.player_index(user_id) else {
            return Err(DuelError::PlayerNotFound(user_id.to_string()));
        };
        let player = &mut self.players[idx];
        Ok(selector.request(
            insights,
            &mut player.hints_used,
            &player.current_word,
            &target,
            count,
        ))
    }

    /// Compare-and-set `active -> finished`. Only the first caller commits;
    /// later calls return `false` and change nothing.
    pub fn conclude(
        &mut self,
        winner: Option<String>,
        reason: EndReason,
        now: DateTime<Utc>,
    ) -> bool {
        if self.status != DuelStatus::Active {
            return false;
        }
        self.status = DuelStatus::Finished;
        self.winner_id = winner;
        self.end_reason = Some(reason);
        self.finished_at = Some(now);
        true
    }
}
