// Match store: the registry of live duels, one lock per match.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::duel::DuelState;
use crate::error::DuelError;

/// Exclusive handle to one match. Every read-validate-mutate sequence on a
/// match runs under this lock.
pub type MatchHandle = Arc<Mutex<DuelState>>;

/// Keyed registry of matches. Implementations only guard the map itself;
/// per-match serialization is the handle's job.
pub trait MatchStore: Send + Sync {
    fn get(&self, match_id: &str) -> Option<MatchHandle>;

    /// Insert a new match. Fails if the id is taken.
    fn insert(&self, match_id: &str, handle: MatchHandle) -> Result<(), DuelError>;

    fn remove(&self, match_id: &str) -> Option<MatchHandle>;

    fn match_ids(&self) -> Vec<String>;
}

/// Process-memory store.
#[derive(Default)]
pub struct InMemoryMatchStore {
    matches: RwLock<HashMap<String, MatchHandle>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for InMemoryMatchStore {
    fn get(&self, match_id: &str) -> Option<MatchHandle> {
        self.matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(match_id)
            .cloned()
    }

    fn insert(&self, match_id: &str, handle: MatchHandle) -> Result<(), DuelError> {
        let mut matches = self.matches.write().unwrap_or_else(PoisonError::into_inner);
        if matches.contains_key(match_id) {
            return Err(DuelError::MatchAlreadyExists(match_id.to_string()));
        }
        matches.insert(match_id.to_string(), handle);
        Ok(())
    }

    fn remove(&self, match_id: &str) -> Option<MatchHandle> {
        self.matches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(match_id)
    }

    fn match_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duel::PlayerSeat;
    use crate::insight::{BranchLevel, WordInsight};
    use crate::word::Word;
    use chrono::Utc;

    fn handle(match_id: &str) -> MatchHandle {
        let insight = |w: &str| WordInsight {
            word: Word::new(w),
            neighbor_count: 0,
            branch_level: BranchLevel::Low,
            neighbor_sample: vec![],
            distance_to_target: None,
        };
        Arc::new(Mutex::new(DuelState::new(
            match_id,
            [PlayerSeat::new("a", "A"), PlayerSeat::new("b", "B")],
            insight("SLATE"),
            insight("PLATE"),
            Utc::now(),
        )))
    }

    #[test]
    fn insert_get_remove() {
        let store = InMemoryMatchStore::new();
        store.insert("m1", handle("m1")).unwrap();
        store.insert("m2", handle("m2")).unwrap();
        assert!(store.get("m1").is_some());
        assert!(store.get("nope").is_none());
        assert_eq!(store.match_ids(), vec!["m1".to_string(), "m2".to_string()]);

        assert!(store.remove("m1").is_some());
        assert!(store.remove("m1").is_none());
        assert_eq!(store.match_ids(), vec!["m2".to_string()]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = InMemoryMatchStore::new();
        store.insert("m1", handle("m1")).unwrap();
        assert_eq!(
            store.insert("m1", handle("m1")),
            Err(DuelError::MatchAlreadyExists("m1".into()))
        );
    }

    #[tokio::test]
    async fn handles_share_one_state() {
        let store = InMemoryMatchStore::new();
        store.insert("m1", handle("m1")).unwrap();

        let first = store.get("m1").unwrap();
        first.lock().await.turn_count = 7;

        let second = store.get("m1").unwrap();
        assert_eq!(second.lock().await.turn_count, 7);
    }
}
