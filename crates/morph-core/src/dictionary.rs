// In-process dictionary: word-list loading, membership, and random picks.
//
// Membership covers the whole word list (any length). The morph graph only
// indexes words of the configured length and may be curated further
// (degree pruning, largest component), so a valid word can still be absent
// from the graph; the insight layer treats such words as disconnected.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DictionaryConfig;
use crate::graph::WordGraph;
use crate::oracle::{OracleError, WordOracle};
use crate::word::Word;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse word list {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("word list {path} contains no usable words")]
    Empty { path: PathBuf },
}

/// JSON word-list layout: `{ "words": ["crane", ...] }`.
#[derive(Debug, Deserialize)]
struct WordListFile {
    words: Vec<String>,
}

/// Word list plus the morph graph built from it.
pub struct Dictionary {
    words: HashSet<Word>,
    graph: Arc<WordGraph>,
}

impl Dictionary {
    /// Build from an in-memory list. The graph is built from the words of
    /// `word_length` letters, then curated according to `curation`.
    pub fn from_words<I, S>(words: I, word_length: usize, curation: &DictionaryConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<Word> = words
            .into_iter()
            .map(|w| Word::new(w.as_ref()))
            .filter(Word::is_alphabetic)
            .collect();

        let mut graph = WordGraph::build(words.iter().map(Word::as_str), word_length);
        if curation.prune_min_degree > 0 {
            graph.prune(curation.prune_min_degree);
        }
        if curation.largest_component_only {
            graph.retain_largest_component();
        }

        info!(
            "Dictionary loaded: {} words ({} morphable)",
            words.len(),
            graph.len()
        );

        Dictionary {
            words,
            graph: Arc::new(graph),
        }
    }

    /// Load the word list named by `config.path` (resolved against
    /// `base_dir` when relative). `.json` files use the `{"words": [...]}`
    /// layout; anything else is one word per line, `#` comments allowed.
    pub fn load(
        config: &DictionaryConfig,
        base_dir: &Path,
        word_length: usize,
    ) -> Result<Self, DictionaryError> {
        let path = if Path::new(&config.path).is_absolute() {
            PathBuf::from(&config.path)
        } else {
            base_dir.join(&config.path)
        };

        let text = std::fs::read_to_string(&path).map_err(|source| DictionaryError::Io {
            path: path.clone(),
            source,
        })?;

        let raw = if path.extension().is_some_and(|ext| ext == "json") {
            let file: WordListFile =
                serde_json::from_str(&text).map_err(|source| DictionaryError::Parse {
                    path: path.clone(),
                    source,
                })?;
            file.words
        } else {
            parse_word_lines(&text)
        };

        let dictionary = Dictionary::from_words(raw, word_length, config);
        if dictionary.graph.is_empty() {
            return Err(DictionaryError::Empty { path });
        }
        Ok(dictionary)
    }

    /// Shared handle to the morph graph.
    pub fn graph(&self) -> Arc<WordGraph> {
        Arc::clone(&self.graph)
    }

    /// Case-insensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(Word::new(word).as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// A random graph word with degree >= `min_degree`. Falls back to any
    /// graph word when none meets the floor; `None` on an empty graph.
    pub fn pick_random(&self, min_degree: usize) -> Option<Word> {
        let eligible = self.graph.words_with_min_degree(min_degree);
        let pool = if eligible.is_empty() {
            warn!("No words with degree >= {min_degree}; picking from the full graph");
            self.graph.words()
        } else {
            eligible
        };
        pool.choose(&mut rand::rng()).map(|w| (*w).clone())
    }
}

#[async_trait]
impl WordOracle for Dictionary {
    async fn is_valid_word(&self, word: &str) -> Result<bool, OracleError> {
        Ok(self.contains(word))
    }

    async fn random_word(&self, min_degree: usize) -> Result<Option<Word>, OracleError> {
        Ok(self.pick_random(min_degree))
    }
}

fn parse_word_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_curation() -> DictionaryConfig {
        DictionaryConfig {
            path: String::new(),
            prune_min_degree: 0,
            largest_component_only: false,
        }
    }

    #[test]
    fn membership_is_case_insensitive_and_covers_all_lengths() {
        let dict = Dictionary::from_words(["crane", "Plate", "cat"], 5, &no_curation());
        assert!(dict.contains("CRANE"));
        assert!(dict.contains("plate"));
        assert!(dict.contains("cat"));
        assert!(!dict.contains("XLATE"));
        assert_eq!(dict.len(), 3);
        // Only 5-letter words reach the graph.
        assert_eq!(dict.graph().len(), 2);
    }

    #[test]
    fn pick_random_respects_degree_floor() {
        let dict = Dictionary::from_words(
            ["PLATE", "SLATE", "ELATE", "PLANE", "PLANT"],
            5,
            &no_curation(),
        );
        for _ in 0..20 {
            let word = dict.pick_random(3).unwrap();
            assert_eq!(word.as_str(), "PLATE");
        }
    }

    #[test]
    fn pick_random_falls_back_when_floor_unreachable() {
        let dict = Dictionary::from_words(["CRANE", "CRATE"], 5, &no_curation());
        let word = dict.pick_random(10).unwrap();
        assert!(word.as_str() == "CRANE" || word.as_str() == "CRATE");
    }

    #[test]
    fn pick_random_on_empty_graph_is_none() {
        let dict = Dictionary::from_words(["CAT", "DOG"], 5, &no_curation());
        assert!(dict.pick_random(0).is_none());
    }

    #[test]
    fn curation_prunes_graph_but_not_membership() {
        let curation = DictionaryConfig {
            path: String::new(),
            prune_min_degree: 2,
            largest_component_only: true,
        };
        let dict = Dictionary::from_words(
            ["PLATE", "SLATE", "ELATE", "PLANE", "PLANT", "BUMPY"],
            5,
            &curation,
        );
        assert_eq!(dict.graph().len(), 3);
        assert!(dict.contains("PLANT"));
        assert!(!dict.graph().contains("PLANT"));
        assert!(!dict.graph().contains("BUMPY"));
    }

    #[tokio::test]
    async fn oracle_impl_reports_membership() {
        let dict = Dictionary::from_words(["SLATE", "PLATE"], 5, &no_curation());
        assert_eq!(dict.is_valid_word("plate").await, Ok(true));
        assert_eq!(dict.is_valid_word("xlate").await, Ok(false));
        assert!(dict.random_word(0).await.unwrap().is_some());
    }

    #[test]
    fn load_text_and_json_lists() {
        let tmp = std::env::temp_dir().join("morph_dictionary_load_test");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        fs::write(tmp.join("words.txt"), "# comment\ncrane\n\ncrate\n  plate \n").unwrap();
        fs::write(tmp.join("words.json"), r#"{"words": ["slate", "plate"]}"#).unwrap();

        let mut config = no_curation();
        config.path = "words.txt".into();
        let dict = Dictionary::load(&config, &tmp, 5).unwrap();
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("PLATE"));

        config.path = "words.json".into();
        let dict = Dictionary::load(&config, &tmp, 5).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.graph().degree("SLATE"), 1);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_errors_are_typed() {
        let tmp = std::env::temp_dir().join("morph_dictionary_error_test");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let mut config = no_curation();
        config.path = "missing.txt".into();
        assert!(matches!(
            Dictionary::load(&config, &tmp, 5),
            Err(DictionaryError::Io { .. })
        ));

        fs::write(tmp.join("bad.json"), "{ not json").unwrap();
        config.path = "bad.json".into();
        assert!(matches!(
            Dictionary::load(&config, &tmp, 5),
            Err(DictionaryError::Parse { .. })
        ));

        fs::write(tmp.join("short.txt"), "cat\ndog\n").unwrap();
        config.path = "short.txt".into();
        assert!(matches!(
            Dictionary::load(&config, &tmp, 5),
            Err(DictionaryError::Empty { .. })
        ));

        let _ = fs::remove_dir_all(&tmp);
    }
}
