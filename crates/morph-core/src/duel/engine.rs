// Duel engine: the orchestrating surface over matches.
//
// Moves follow validate-then-lock. State-local checks run under the match
// lock, the lock is released for the oracle call, then every check is re-run
// under the lock before the move is applied. Two racing submissions from the
// same player can both pass the first check, but only one survives the second.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::scoring::DuelSummary;
use super::state::{DuelState, DuelStatus, PlayerSeat};
use crate::broadcast::{Broadcaster, DuelEvent, NullBroadcaster};
use crate::config::{Config, GameConfig, ScoringConfig};
use crate::error::DuelError;
use crate::feedback::LetterColor;
use crate::graph::WordGraph;
use crate::hint::{HintResponse, HintSelector};
use crate::insight::{move_warnings, InsightEngine, WordInsight};
use crate::oracle::{with_timeout, OracleError, WordOracle};
use crate::store::{InMemoryMatchStore, MatchHandle, MatchStore};
use crate::word::Word;

// ---------------------------------------------------------------------------
// Settings and request/response types
// ---------------------------------------------------------------------------

/// The slice of [`Config`] the engine needs.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub game: GameConfig,
    pub scoring: ScoringConfig,
    pub oracle_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings::from_config(&Config::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        EngineSettings {
            game: config.game.clone(),
            scoring: config.scoring,
            oracle_timeout: config.oracle.timeout(),
        }
    }
}

/// Parameters for a new duel. Missing start/target words are picked at
/// random from words meeting the start-degree floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDuel {
    pub match_id: String,
    pub players: [PlayerSeat; 2],
    #[serde(default)]
    pub start_word: Option<String>,
    #[serde(default)]
    pub target_word: Option<String>,
}

/// An accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub feedback: Vec<LetterColor>,
    pub insight: WordInsight,
    pub warnings: Vec<String>,
    pub completed: bool,
    pub winner_declared: bool,
    pub state: DuelState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<DuelSummary>,
}

/// A refused move with the unchanged state, when the match exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRejection {
    pub error: DuelError,
    pub state: Option<DuelState>,
}

impl MoveRejection {
    fn new(error: DuelError, state: Option<DuelState>) -> Self {
        MoveRejection { error, state }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelStats {
    pub active_matches: usize,
    pub finished_matches: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DuelEngine {
    settings: EngineSettings,
    insights: Arc<InsightEngine>,
    hints: HintSelector,
    oracle: Arc<dyn WordOracle>,
    store: Arc<dyn MatchStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl DuelEngine {
    /// Engine over an in-memory store with events discarded.
    pub fn new(settings: EngineSettings, graph: Arc<WordGraph>, oracle: Arc<dyn WordOracle>) -> Self {
        let insights = Arc::new(InsightEngine::new(graph, &settings.game));
        let hints = HintSelector::new(
            settings.game.max_hints_per_player,
            settings.game.hints_per_request,
        );
        DuelEngine {
            settings,
            insights,
            hints,
            oracle,
            store: Arc::new(InMemoryMatchStore::new()),
            broadcaster: Arc::new(NullBroadcaster),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn MatchStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn insights(&self) -> &InsightEngine {
        &self.insights
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    pub async fn start_duel(&self, request: StartDuel) -> Result<DuelState, DuelError> {
        let [first, second] = &request.players;
        if first.user_id.is_empty() || second.user_id.is_empty() || first.user_id == second.user_id
        {
            return Err(DuelError::InvalidPlayers);
        }
        if self.store.get(&request.match_id).is_some() {
            return Err(DuelError::MatchAlreadyExists(request.match_id));
        }

        let (start, target) = self
            .choose_words(request.start_word.as_deref(), request.target_word.as_deref())
            .await?;

        let state = DuelState::new(
            request.match_id.clone(),
            request.players,
            self.insights.build_insight(&start, &target),
            self.insights.build_insight(&target, &target),
            Utc::now(),
        );

        let handle: MatchHandle = Arc::new(Mutex::new(state.clone()));
        self.store.insert(&request.match_id, handle)?;

        info!(
            "Duel {} started: {} -> {} ({} vs {})",
            state.match_id,
            state.start_word,
            state.target_word,
            state.players[0].user_id,
            state.players[1].user_id
        );
        self.broadcaster
            .publish(DuelEvent::Started {
                state: state.clone(),
            })
            .await;

        Ok(state)
    }

    async fn choose_words(
        &self,
        start: Option<&str>,
        target: Option<&str>,
    ) -> Result<(Word, Word), DuelError> {
        let start = match start {
            Some(raw) => Some(self.validate_chosen_word(raw).await?),
            None => None,
        };
        let target = match target {
            Some(raw) => Some(self.validate_chosen_word(raw).await?),
            None => None,
        };

        if let (Some(start), Some(target)) = (&start, &target) {
            if start == target {
                return Err(DuelError::InvalidWordPair(format!(
                    "start and target are both {start}"
                )));
            }
        }

        let attempts = self.settings.game.max_pick_attempts;
        for _ in 0..attempts {
            let s = match &start {
                Some(w) => w.clone(),
                None => self.pick_word().await?,
            };
            let t = match &target {
                Some(w) => w.clone(),
                None => self.pick_word().await?,
            };
            if s != t {
                return Ok((s, t));
            }
        }

        warn!("No distinct start/target pair after {attempts} attempts");
        Err(DuelError::NoWordPair)
    }

    async fn validate_chosen_word(&self, raw: &str) -> Result<Word, DuelError> {
        let word = Word::new(raw);
        let expected = self.settings.game.word_length;
        if word.len() != expected {
            return Err(DuelError::InvalidWordLength {
                expected,
                actual: word.len(),
            });
        }
        if self.oracle_is_valid(&word).await? {
            Ok(word)
        } else {
            Err(DuelError::WordNotInDictionary(word.to_string()))
        }
    }

    async fn pick_word(&self) -> Result<Word, DuelError> {
        let min_degree = self.settings.game.min_start_degree;
        let picked = with_timeout(
            self.settings.oracle_timeout,
            self.oracle.random_word(min_degree),
        )
        .await
        .map_err(oracle_unavailable)?;
        picked.ok_or(DuelError::NoWordPair)
    }

    async fn oracle_is_valid(&self, word: &Word) -> Result<bool, DuelError> {
        with_timeout(
            self.settings.oracle_timeout,
            self.oracle.is_valid_word(word.as_str()),
        )
        .await
        .map_err(oracle_unavailable)
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    pub async fn submit_move(
        &self,
        match_id: &str,
        user_id: &str,
        raw_word: &str,
    ) -> Result<MoveReport, MoveRejection> {
        let handle = self.store.get(match_id).ok_or_else(|| {
            MoveRejection::new(DuelError::MatchNotFound(match_id.to_string()), None)
        })?;
        let word = Word::new(raw_word);
        let word_length = self.settings.game.word_length;

        // Cheap checks first, without holding the lock over the oracle call.
        {
            let state = handle.lock().await;
            if let Err(error) = state.check_move(user_id, &word, word_length) {
                debug!("Move {word} by {user_id} in {match_id} rejected: {error}");
                return Err(MoveRejection::new(error, Some(state.clone())));
            }
        }

        let verdict = self.oracle_is_valid(&word).await;

        let mut state = handle.lock().await;
        if let Err(error) = state.check_move(user_id, &word, word_length) {
            debug!("Move {word} by {user_id} in {match_id} lost a race: {error}");
            return Err(MoveRejection::new(error, Some(state.clone())));
        }
        match verdict {
            Ok(true) => {}
            Ok(false) => {
                return Err(MoveRejection::new(
                    DuelError::WordNotInDictionary(word.to_string()),
                    Some(state.clone()),
                ));
            }
            Err(error) => return Err(MoveRejection::new(error, Some(state.clone()))),
        }

        let insight = self.insights.build_insight(&word, &state.target_word);
        let warnings = move_warnings(&insight, self.insights.thresholds());
        let applied = state.apply_move(
            user_id,
            insight.clone(),
            self.settings.game.max_turns,
            self.settings.game.turn_limit_tie,
            Utc::now(),
        );

        let feedback = state
            .player(user_id)
            .and_then(|p| p.path.last())
            .map(|step| step.color_feedback.clone())
            .unwrap_or_default();
        debug!(
            "Duel {match_id}: {user_id} played {word} (turn {})",
            state.turn_count
        );

        let snapshot = state.clone();
        let summary = self.summary_if_finished(&snapshot);
        if applied.winner_declared {
            info!("Duel {match_id}: {user_id} reached {} and wins", snapshot.target_word);
        }
        if applied.turn_limit_reached {
            info!(
                "Duel {match_id}: turn limit reached, winner {}",
                snapshot.winner_id.as_deref().unwrap_or("none (draw)")
            );
        }

        // Published before the lock drops so one match's events stay ordered.
        self.broadcaster
            .publish(DuelEvent::MoveAccepted {
                user_id: user_id.to_string(),
                state: snapshot.clone(),
            })
            .await;
        if let Some(summary) = &summary {
            self.broadcaster
                .publish(DuelEvent::Finished {
                    state: snapshot.clone(),
                    summary: summary.clone(),
                })
                .await;
        }
        drop(state);

        Ok(MoveReport {
            feedback,
            insight,
            warnings,
            completed: applied.completed,
            winner_declared: applied.winner_declared,
            state: snapshot,
            summary,
        })
    }

    // -----------------------------------------------------------------------
    // Hints
    // -----------------------------------------------------------------------

    /// Serve a hint to `user_id`. `limit == 0` means the configured default.
    pub async fn request_hint(
        &self,
        match_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<HintResponse, DuelError> {
        let handle = self.match_handle(match_id)?;
        let mut state = handle.lock().await;
        let response = state.grant_hint(user_id, &self.hints, &self.insights, limit)?;

        debug!(
            "Duel {match_id}: {user_id} hint {}/{} ({} suggestions)",
            response.hint_budget.used,
            response.hint_budget.limit,
            response.suggestions.len()
        );
        self.broadcaster
            .publish(DuelEvent::HintGranted {
                user_id: user_id.to_string(),
                state: state.clone(),
            })
            .await;

        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub async fn match_state(&self, match_id: &str) -> Result<DuelState, DuelError> {
        let handle = self.match_handle(match_id)?;
        let state = handle.lock().await;
        Ok(state.clone())
    }

    /// Evict a match from the store, along with any graph distances cached
    /// for its target.
    pub async fn delete_match(&self, match_id: &str) -> Result<(), DuelError> {
        let Some(handle) = self.store.remove(match_id) else {
            return Err(DuelError::MatchNotFound(match_id.to_string()));
        };
        let target = handle.lock().await.target_word.clone();
        if self.insights.forget_target(&target) {
            debug!("Dropped cached distances to {target}");
        }
        info!("Duel {match_id} deleted");
        Ok(())
    }

    /// Conclude an active match by turn-limit adjudication, as when an
    /// external round timer fires. Only the first conclusion commits; a match
    /// that already finished reports `MatchAlreadyFinished`.
    pub async fn force_conclude(
        &self,
        match_id: &str,
    ) -> Result<(DuelState, DuelSummary), DuelError> {
        let handle = self.match_handle(match_id)?;
        let mut state = handle.lock().await;
        if !state.conclude_by_turn_limit(self.settings.game.turn_limit_tie, Utc::now()) {
            return Err(DuelError::MatchAlreadyFinished);
        }

        let snapshot = state.clone();
        info!(
            "Duel {match_id} force-concluded, winner {}",
            snapshot.winner_id.as_deref().unwrap_or("none (draw)")
        );
        let summary = DuelSummary::from_state(&snapshot, &self.settings.scoring);
        self.broadcaster
            .publish(DuelEvent::Finished {
                state: snapshot.clone(),
                summary: summary.clone(),
            })
            .await;
        Ok((snapshot, summary))
    }

    pub async fn stats(&self) -> DuelStats {
        let mut stats = DuelStats {
            active_matches: 0,
            finished_matches: 0,
        };
        for id in self.store.match_ids() {
            let Some(handle) = self.store.get(&id) else {
                continue;
            };
            let status = handle.lock().await.status;
            match status {
                DuelStatus::Active => stats.active_matches += 1,
                DuelStatus::Finished => stats.finished_matches += 1,
            }
        }
        stats
    }

    /// Final standings, or `None` while the match is active.
    pub fn summary_if_finished(&self, state: &DuelState) -> Option<DuelSummary> {
        (!state.is_active()).then(|| DuelSummary::from_state(state, &self.settings.scoring))
    }

    fn match_handle(&self, match_id: &str) -> Result<MatchHandle, DuelError> {
        self.store
            .get(match_id)
            .ok_or_else(|| DuelError::MatchNotFound(match_id.to_string()))
    }
}

fn oracle_unavailable(error: OracleError) -> DuelError {
    warn!("Word oracle failed: {error}");
    DuelError::ValidationUnavailable(error.to_string())
}
