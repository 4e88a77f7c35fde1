// Hint selection: ranked next-word suggestions under a per-player budget.

use serde::{Deserialize, Serialize};

use crate::insight::{BranchLevel, InsightEngine, WordInsight};
use crate::word::Word;

/// Why a suggestion was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintCategory {
    /// Strictly closer to the target.
    Distance,
    /// No closer, but lands on a high-branching word.
    Safe,
    /// No closer and not high-branching; keeps the player's options open.
    Structure,
}

impl HintCategory {
    pub fn classify(distance_delta: i64, branch_level: BranchLevel) -> Self {
        if distance_delta > 0 {
            HintCategory::Distance
        } else if branch_level == BranchLevel::High {
            HintCategory::Safe
        } else {
            HintCategory::Structure
        }
    }
}

/// A neighbor of the player's current word, ranked for usefulness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintSuggestion {
    #[serde(flatten)]
    pub insight: WordInsight,
    pub category: HintCategory,
    /// Current distance minus this word's distance; positive is progress.
    pub distance_delta: i64,
}

/// Snapshot of one player's hint allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintBudget {
    pub used: u32,
    pub remaining: u32,
    pub limit: u32,
}

impl HintBudget {
    pub fn new(used: u32, limit: u32) -> Self {
        HintBudget {
            used,
            remaining: limit.saturating_sub(used),
            limit,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Result of one hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintResponse {
    pub suggestions: Vec<HintSuggestion>,
    pub hint_budget: HintBudget,
}

/// Ranks suggestions and meters them against a fixed per-player limit.
#[derive(Debug, Clone, Copy)]
pub struct HintSelector {
    limit_per_player: u32,
    default_count: usize,
}

impl HintSelector {
    pub fn new(limit_per_player: u32, default_count: usize) -> Self {
        HintSelector {
            limit_per_player,
            default_count,
        }
    }

    pub fn limit_per_player(&self) -> u32 {
        self.limit_per_player
    }

    /// Serve one hint request against `hints_used`.
    ///
    /// Every request consumes exactly one unit, including requests that find
    /// no suggestions. Once the limit is reached the request returns nothing
    /// and `hints_used` stays clamped at the limit. `count == 0` means the
    /// configured default.
    pub fn request(
        &self,
        insights: &InsightEngine,
        hints_used: &mut u32,
        current: &Word,
        target: &Word,
        count: usize,
    ) -> HintResponse {
        if *hints_used >= self.limit_per_player {
            return HintResponse {
                suggestions: Vec::new(),
                hint_budget: HintBudget::new(*hints_used, self.limit_per_player),
            };
        }

        let count = if count == 0 { self.default_count } else { count };
        let suggestions = rank_suggestions(insights, current, target, count);

        *hints_used = (*hints_used + 1).min(self.limit_per_player);

        HintResponse {
            suggestions,
            hint_budget: HintBudget::new(*hints_used, self.limit_per_player),
        }
    }
}

/// Rank the neighbors of `current` as suggestions toward `target`.
///
/// Keeps neighbors that do not move away from the target, plus high-branching
/// detours even if they do. Sorted by progress, then branch level, then word
/// for a stable order; truncated to `count`.
pub fn rank_suggestions(
    insights: &InsightEngine,
    current: &Word,
    target: &Word,
    count: usize,
) -> Vec<HintSuggestion> {
    let neighbors = insights.graph().neighbors(current.as_str());
    if neighbors.is_empty() {
        return Vec::new();
    }

    let current_distance = insights.distance(current, target);

    let mut scored: Vec<HintSuggestion> = neighbors
        .iter()
        .map(|neighbor| {
            let insight = insights.build_insight(neighbor, target);
            let distance_delta = match (current_distance, insight.distance_to_target) {
                (Some(now), Some(then)) => now as i64 - then as i64,
                _ => 0,
            };
            HintSuggestion {
                category: HintCategory::classify(distance_delta, insight.branch_level),
                distance_delta,
                insight,
            }
        })
        .filter(|s| s.distance_delta >= 0 || s.insight.branch_level == BranchLevel::High)
        .collect();

    scored.sort_by(|a, b| {
        b.distance_delta
            .cmp(&a.distance_delta)
            .then_with(|| b.insight.branch_level.rank().cmp(&a.insight.branch_level.rank()))
            .then_with(|| a.insight.word.cmp(&b.insight.word))
    });
    scored.truncate(count);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchingThresholds, GameConfig};
    use crate::graph::WordGraph;
    use std::sync::Arc;

    fn engine(words: &[&str], high: usize, low: usize) -> InsightEngine {
        let rules = GameConfig {
            branching: BranchingThresholds { high, low },
            ..GameConfig::default()
        };
        InsightEngine::new(Arc::new(WordGraph::build(words, 5)), &rules)
    }

    fn words(suggestions: &[HintSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.insight.word.as_str()).collect()
    }

    #[test]
    fn categories() {
        assert_eq!(HintCategory::classify(1, BranchLevel::Low), HintCategory::Distance);
        assert_eq!(HintCategory::classify(0, BranchLevel::High), HintCategory::Safe);
        assert_eq!(HintCategory::classify(-1, BranchLevel::High), HintCategory::Safe);
        assert_eq!(HintCategory::classify(0, BranchLevel::Medium), HintCategory::Structure);
    }

    #[test]
    fn closer_neighbor_is_distance_and_high_sidestep_is_safe() {
        // Current BRAKE, target BLADE (distance 2).
        // BLAKE: distance 1 -> distance, delta 1.
        // DRAKE: distance 3, but it shares the ?RAKE bucket with three other
        // words, so with high = 3 it is high-branching -> safe, delta -1.
        let e = engine(
            &["BRAKE", "BLAKE", "BLADE", "DRAKE", "CRAKE", "TRAKE"],
            3,
            1,
        );
        let hints = rank_suggestions(&e, &Word::new("BRAKE"), &Word::new("BLADE"), 10);

        let blake = hints.iter().find(|s| s.insight.word.as_str() == "BLAKE").unwrap();
        assert_eq!(blake.category, HintCategory::Distance);
        assert_eq!(blake.distance_delta, 1);

        let drake = hints.iter().find(|s| s.insight.word.as_str() == "DRAKE").unwrap();
        assert_eq!(drake.insight.branch_level, BranchLevel::High);
        assert_eq!(drake.category, HintCategory::Safe);
        assert_eq!(drake.distance_delta, -1);

        // Progress first.
        assert_eq!(hints[0].insight.word.as_str(), "BLAKE");
    }

    #[test]
    fn moving_away_is_filtered_unless_high_branching() {
        // Current PLATE, target SLATE (distance 1). PLANE moves away
        // (distance 2) and is low-branching, so it is dropped. SLATE is the
        // target itself (delta 1). ELATE stays at distance 1 (delta 0).
        let e = engine(&["PLATE", "SLATE", "ELATE", "PLANE"], 12, 3);
        let hints = rank_suggestions(&e, &Word::new("PLATE"), &Word::new("SLATE"), 10);
        assert_eq!(words(&hints), vec!["SLATE", "ELATE"]);
        assert_eq!(hints[1].category, HintCategory::Structure);
    }

    #[test]
    fn high_branching_detour_survives_filter() {
        // PLANE moves away from SLATE but has degree >= high.
        let e = engine(&["PLATE", "SLATE", "PLANE", "PLANT", "PLANK", "PLANS"], 4, 1);
        let hints = rank_suggestions(&e, &Word::new("PLATE"), &Word::new("SLATE"), 10);
        let plane = hints.iter().find(|s| s.insight.word.as_str() == "PLANE").unwrap();
        assert_eq!(plane.distance_delta, -1);
        assert_eq!(plane.category, HintCategory::Safe);
        assert_eq!(hints.last().unwrap().insight.word.as_str(), "PLANE");
    }

    #[test]
    fn ties_break_on_branch_level() {
        // ELATE and ALATE are both delta 0 against SLATE from PLATE. ELITE
        // and ELATS lift ELATE to medium, so it outranks ALATE despite the
        // alphabetical order.
        let e = engine(&["PLATE", "ELATE", "ALATE", "ELITE", "ELATS"], 12, 2);
        let hints = rank_suggestions(&e, &Word::new("PLATE"), &Word::new("SLATE"), 10);
        let order = words(&hints);
        let elate = order.iter().position(|w| *w == "ELATE").unwrap();
        let alate = order.iter().position(|w| *w == "ALATE").unwrap();
        assert!(elate < alate);
    }

    #[test]
    fn truncates_to_requested_count() {
        let e = engine(&["PLATE", "SLATE", "ELATE", "ALATE", "BLATE"], 12, 3);
        let hints = rank_suggestions(&e, &Word::new("PLATE"), &Word::new("SLATE"), 2);
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].insight.word.as_str(), "SLATE");
    }

    #[test]
    fn isolated_word_yields_nothing() {
        let e = engine(&["PLATE", "BUMPY"], 12, 3);
        assert!(rank_suggestions(&e, &Word::new("BUMPY"), &Word::new("PLATE"), 3).is_empty());
    }

    #[test]
    fn every_request_consumes_one_unit_until_clamped() {
        let e = engine(&["PLATE", "SLATE", "BUMPY"], 12, 3);
        let selector = HintSelector::new(2, 3);
        let mut used = 0;

        let first = selector.request(&e, &mut used, &Word::new("PLATE"), &Word::new("SLATE"), 0);
        assert_eq!(first.suggestions.len(), 1);
        assert_eq!(first.hint_budget, HintBudget::new(1, 2));

        // No neighbors, still charged.
        let second = selector.request(&e, &mut used, &Word::new("BUMPY"), &Word::new("SLATE"), 0);
        assert!(second.suggestions.is_empty());
        assert_eq!(second.hint_budget.used, 2);
        assert!(second.hint_budget.is_exhausted());

        // Exhausted: nothing served, counter stays at the limit.
        let third = selector.request(&e, &mut used, &Word::new("PLATE"), &Word::new("SLATE"), 0);
        assert!(third.suggestions.is_empty());
        assert_eq!(used, 2);
        assert_eq!(third.hint_budget, HintBudget { used: 2, remaining: 0, limit: 2 });
    }

    #[test]
    fn suggestion_serializes_flat() {
        let e = engine(&["PLATE", "SLATE"], 12, 3);
        let hints = rank_suggestions(&e, &Word::new("PLATE"), &Word::new("SLATE"), 1);
        let json = serde_json::to_value(&hints[0]).unwrap();
        assert_eq!(json["word"], "SLATE");
        assert_eq!(json["category"], "distance");
        assert_eq!(json["distanceDelta"], 1);
        assert_eq!(json["branchLevel"], "low");
    }
}
