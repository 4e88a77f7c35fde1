// Word insights: branch classification and progress toward the target.
//
// Target-independent analysis (degree, branch level, neighbor sample) is
// cached per word for the process lifetime since the vocabulary is static.
// Distance is recomputed per request: Hamming is O(L), and graph distances
// come from a per-target BFS map that is itself cached.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BranchingThresholds, DistanceMetric, GameConfig};
use crate::graph::WordGraph;
use crate::word::{hamming_distance, Word};

/// Coarse classification of how many onward moves a word affords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchLevel {
    High,
    Medium,
    Low,
}

impl BranchLevel {
    /// Classify a degree: `high` at or above the high cutoff, `low` at or
    /// below the low cutoff, `medium` in between.
    pub fn from_degree(degree: usize, thresholds: &BranchingThresholds) -> Self {
        if degree >= thresholds.high {
            BranchLevel::High
        } else if degree <= thresholds.low {
            BranchLevel::Low
        } else {
            BranchLevel::Medium
        }
    }

    /// Sort priority for hint tie-breaks: high > medium > low.
    pub fn rank(&self) -> u8 {
        match self {
            BranchLevel::High => 2,
            BranchLevel::Medium => 1,
            BranchLevel::Low => 0,
        }
    }
}

/// Player-facing summary of landing on `word`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordInsight {
    pub word: Word,
    pub neighbor_count: usize,
    pub branch_level: BranchLevel,
    /// Bounded subset of neighbors, for display only.
    pub neighbor_sample: Vec<Word>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_to_target: Option<usize>,
}

/// The target-independent part of an insight.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WordAnalysis {
    neighbor_count: usize,
    branch_level: BranchLevel,
    neighbor_sample: Vec<Word>,
}

/// Builds [`WordInsight`]s over a shared graph. Safe to share across matches.
pub struct InsightEngine {
    graph: Arc<WordGraph>,
    thresholds: BranchingThresholds,
    neighbor_sample: usize,
    metric: DistanceMetric,
    analysis_cache: RwLock<HashMap<Word, Arc<WordAnalysis>>>,
    target_distances: RwLock<HashMap<Word, Arc<HashMap<Word, usize>>>>,
}

impl InsightEngine {
    pub fn new(graph: Arc<WordGraph>, rules: &GameConfig) -> Self {
        InsightEngine {
            graph,
            thresholds: rules.branching,
            neighbor_sample: rules.neighbor_sample,
            metric: rules.distance_metric,
            analysis_cache: RwLock::new(HashMap::new()),
            target_distances: RwLock::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    pub fn thresholds(&self) -> &BranchingThresholds {
        &self.thresholds
    }

    /// Summarize `word` relative to `target`. Never fails: words outside the
    /// graph come back with zero degree and `low` branching.
    pub fn build_insight(&self, word: &Word, target: &Word) -> WordInsight {
        let analysis = self.analysis(word);
        WordInsight {
            word: word.clone(),
            neighbor_count: analysis.neighbor_count,
            branch_level: analysis.branch_level,
            neighbor_sample: analysis.neighbor_sample.clone(),
            distance_to_target: self.distance(word, target),
        }
    }

    /// Distance from `word` to `target` under the configured metric.
    ///
    /// `None` when the lengths differ, or under the graph metric when either
    /// word is outside the graph or no path exists.
    pub fn distance(&self, word: &Word, target: &Word) -> Option<usize> {
        if word.len() != target.len() {
            return None;
        }
        match self.metric {
            DistanceMetric::Hamming => Some(hamming_distance(word.as_str(), target.as_str())),
            DistanceMetric::Graph => self.distances_to(target).get(word).copied(),
        }
    }

    /// Number of words with a cached analysis.
    pub fn cached_words(&self) -> usize {
        self.analysis_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop the cached graph distances to `target`. Matches still heading
    /// there recompute them on the next lookup.
    pub fn forget_target(&self, target: &Word) -> bool {
        self.target_distances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target)
            .is_some()
    }

    /// Number of targets with cached graph distances.
    pub fn cached_targets(&self) -> usize {
        self.target_distances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn analysis(&self, word: &Word) -> Arc<WordAnalysis> {
        if let Some(cached) = self
            .analysis_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(word)
        {
            return Arc::clone(cached);
        }

        let neighbors = self.graph.neighbors(word.as_str());
        let analysis = Arc::new(WordAnalysis {
            neighbor_count: neighbors.len(),
            branch_level: BranchLevel::from_degree(neighbors.len(), &self.thresholds),
            neighbor_sample: neighbors.iter().take(self.neighbor_sample).cloned().collect(),
        });

        // Two threads may race to fill the same word; both compute the same
        // value from the immutable graph, so the first insert wins.
        let mut cache = self
            .analysis_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(word.clone()).or_insert(analysis))
    }

    fn distances_to(&self, target: &Word) -> Arc<HashMap<Word, usize>> {
        if let Some(cached) = self
            .target_distances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
        {
            return Arc::clone(cached);
        }

        let distances = Arc::new(self.graph.distances_from(target.as_str()));
        debug!("Computed graph distances to {target}: {} reachable", distances.len());

        let mut cache = self
            .target_distances
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(target.clone()).or_insert(distances))
    }
}

/// Cautions attached to an accepted move: a `low` landing is a near
/// dead-end; a `medium` landing just above the low cutoff has few onward
/// moves.
pub fn move_warnings(insight: &WordInsight, thresholds: &BranchingThresholds) -> Vec<String> {
    match insight.branch_level {
        BranchLevel::Low => vec!["This move leads to a near dead-end. Choose carefully.".into()],
        BranchLevel::Medium if insight.neighbor_count <= thresholds.low + 1 => {
            vec!["Limited onward moves remain from this word.".into()]
        }
        _ => Vec::new(),
    }
}
