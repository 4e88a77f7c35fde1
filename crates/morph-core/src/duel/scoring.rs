// End-of-match scoring.

use serde::{Deserialize, Serialize};

use super::state::{DuelState, EndReason, PlayerProgress};
use crate::config::ScoringConfig;

/// `points_base - steps * penalty + winner bonus`, floored at zero.
pub fn score_player(player: &PlayerProgress, is_winner: bool, scoring: &ScoringConfig) -> u32 {
    let penalty = player.transformation_count as i64 * i64::from(scoring.points_per_step_penalty);
    let bonus = if is_winner {
        i64::from(scoring.first_to_finish_bonus)
    } else {
        0
    };
    let score = i64::from(scoring.points_base) - penalty + bonus;
    u32::try_from(score.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub user_id: String,
    pub username: String,
    pub transformation_count: usize,
    pub completed: bool,
    pub score: u32,
}

/// Final standings for a finished match, in seat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelSummary {
    pub match_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_reason: Option<EndReason>,
    pub standings: Vec<PlayerStanding>,
}

impl DuelSummary {
    pub fn from_state(state: &DuelState, scoring: &ScoringConfig) -> Self {
        let standings = state
            .players
            .iter()
            .map(|p| {
                let is_winner = state.winner_id.as_deref() == Some(p.user_id.as_str());
                PlayerStanding {
                    user_id: p.user_id.clone(),
                    username: p.username.clone(),
                    transformation_count: p.transformation_count,
                    completed: p.completed,
                    score: score_player(p, is_winner, scoring),
                }
            })
            .collect();

        DuelSummary {
            match_id: state.match_id.clone(),
            winner_id: state.winner_id.clone(),
            end_reason: state.end_reason,
            standings,
        }
    }
}
