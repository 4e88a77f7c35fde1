// One-letter adjacency graph over a fixed-length vocabulary.
//
// Built once per vocabulary load with wildcard bucketing: every word is filed
// under L keys (one per wildcarded position), and words sharing a key differ
// only at that position. This is O(N·L) key generation instead of O(N²)
// pairwise comparison. After construction the graph is read-only and safe to
// share across matches behind an `Arc`.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::{debug, info};

use crate::word::Word;

/// Returned for words the graph has never seen.
static EMPTY_NEIGHBORS: BTreeSet<Word> = BTreeSet::new();

/// Adjacency index: word -> every graph word differing in exactly one position.
///
/// Invariants: adjacency is symmetric and neighbor sets never contain the word
/// itself.
#[derive(Debug, Clone)]
pub struct WordGraph {
    word_length: usize,
    adjacency: HashMap<Word, BTreeSet<Word>>,
}

impl WordGraph {
    /// Build the graph from a raw word list.
    ///
    /// Input is normalized (trimmed, uppercased); entries that are not
    /// alphabetic or not exactly `word_length` letters are skipped, and
    /// duplicates collapse. Every kept word becomes a node, even when it ends
    /// up with no neighbors.
    pub fn build<I, S>(words: I, word_length: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut adjacency: HashMap<Word, BTreeSet<Word>> = HashMap::new();
        for raw in words {
            let word = Word::new(raw.as_ref());
            if word.is_alphabetic() && word.len() == word_length {
                adjacency.entry(word).or_default();
            }
        }

        let mut buckets: HashMap<String, Vec<Word>> = HashMap::new();
        for word in adjacency.keys() {
            for i in 0..word_length {
                buckets
                    .entry(word.wildcard_key(i))
                    .or_default()
                    .push(word.clone());
            }
        }

        let mut edges = 0usize;
        for bucket in buckets.values().filter(|b| b.len() > 1) {
            for (i, a) in bucket.iter().enumerate() {
                for b in &bucket[i + 1..] {
                    if let Some(set) = adjacency.get_mut(a) {
                        if set.insert(b.clone()) {
                            edges += 1;
                        }
                    }
                    if let Some(set) = adjacency.get_mut(b) {
                        set.insert(a.clone());
                    }
                }
            }
        }

        info!(
            "Word graph built: {} nodes, {} edges (length {})",
            adjacency.len(),
            edges,
            word_length
        );

        WordGraph {
            word_length,
            adjacency,
        }
    }

    /// The fixed word length this graph indexes.
    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Neighbors of `word`; the empty set for words not in the graph.
    ///
    /// Lookup is case-insensitive. Unknown words are never an error: callers
    /// treat them as maximally disconnected.
    pub fn neighbors(&self, word: &str) -> &BTreeSet<Word> {
        self.adjacency
            .get(word)
            .or_else(|| self.adjacency.get(Word::new(word).as_str()))
            .unwrap_or(&EMPTY_NEIGHBORS)
    }

    /// Number of neighbors; 0 for unknown words.
    pub fn degree(&self, word: &str) -> usize {
        self.neighbors(word).len()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.adjacency.contains_key(word) || self.adjacency.contains_key(Word::new(word).as_str())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// All nodes in sorted order.
    pub fn words(&self) -> Vec<&Word> {
        let mut words: Vec<&Word> = self.adjacency.keys().collect();
        words.sort();
        words
    }

    /// Words whose degree is at least `min_degree`, in sorted order.
    pub fn words_with_min_degree(&self, min_degree: usize) -> Vec<&Word> {
        let mut words: Vec<&Word> = self
            .adjacency
            .iter()
            .filter(|(_, n)| n.len() >= min_degree)
            .map(|(w, _)| w)
            .collect();
        words.sort();
        words
    }

    /// Iteratively remove words with fewer than `min_degree` neighbors until
    /// every remaining word meets the floor. Removing a word lowers its
    /// neighbors' degrees, which can cascade. Returns how many words were
    /// removed. `min_degree <= 1` only drops isolated words.
    pub fn prune(&mut self, min_degree: usize) -> usize {
        let mut removed = 0;
        loop {
            let sparse: Vec<Word> = self
                .adjacency
                .iter()
                .filter(|(_, n)| n.len() < min_degree)
                .map(|(w, _)| w.clone())
                .collect();
            if sparse.is_empty() {
                break;
            }
            for word in &sparse {
                self.remove_node(word);
            }
            removed += sparse.len();
        }
        if removed > 0 {
            info!(
                "Pruned {} words below degree {}; {} remain",
                removed,
                min_degree,
                self.adjacency.len()
            );
        }
        removed
    }

    /// Keep only the largest connected component. Ties go to the component
    /// containing the alphabetically smallest word. Returns how many words
    /// were removed.
    pub fn retain_largest_component(&mut self) -> usize {
        let mut seen: BTreeSet<Word> = BTreeSet::new();
        let mut largest: BTreeSet<Word> = BTreeSet::new();

        for start in self.words() {
            if seen.contains(start) {
                continue;
            }
            let component: BTreeSet<Word> = self.distances_from(start.as_str()).into_keys().collect();
            seen.extend(component.iter().cloned());
            if component.len() > largest.len() {
                largest = component;
            }
        }

        let outside: Vec<Word> = self
            .adjacency
            .keys()
            .filter(|w| !largest.contains(*w))
            .cloned()
            .collect();
        for word in &outside {
            self.remove_node(word);
        }
        debug!(
            "Largest component has {} words ({} dropped)",
            largest.len(),
            outside.len()
        );
        outside.len()
    }

    /// Breadth-first shortest-path lengths from `origin` to every reachable
    /// word, including `origin` itself at 0. Empty when `origin` is unknown.
    pub fn distances_from(&self, origin: &str) -> HashMap<Word, usize> {
        let mut distances = HashMap::new();
        let Some((origin, _)) = self
            .adjacency
            .get_key_value(origin)
            .or_else(|| self.adjacency.get_key_value(Word::new(origin).as_str()))
        else {
            return distances;
        };

        let mut queue = VecDeque::new();
        distances.insert(origin.clone(), 0);
        queue.push_back(origin.clone());

        while let Some(current) = queue.pop_front() {
            let next = distances[&current] + 1;
            for neighbor in self.neighbors(current.as_str()) {
                if !distances.contains_key(neighbor) {
                    distances.insert(neighbor.clone(), next);
                    queue.push_back(neighbor.clone());
                }
            }
        }
        distances
    }

    fn remove_node(&mut self, word: &Word) {
        if let Some(neighbors) = self.adjacency.remove(word) {
            for neighbor in neighbors {
                if let Some(set) = self.adjacency.get_mut(&neighbor) {
                    set.remove(word);
                }
            }
        }
    }
}
