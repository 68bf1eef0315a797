//! Word frequency tallies
//!
//! Each tally entry remembers the position of the word's first occurrence
//! in the full token sequence. Merging sums counts and keeps the smallest
//! position, so merging is commutative and associative and the ranking
//! tie-break (first appearance) does not depend on merge order.

use crate::wordcount::partition::Chunk;
use crate::wordcount::stopwords::StopWords;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Count and first position of one word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WordStat {
    count: u64,
    first_seen: usize,
}

/// A ranked word with its total count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Frequency table for a chunk or for a whole corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordTally {
    entries: HashMap<String, WordStat>,
}

impl WordTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the tokens of one chunk, skipping stop words
    pub fn from_chunk(chunk: &Chunk<'_>, stop_words: &StopWords) -> Self {
        let mut tally = Self::new();
        for (i, token) in chunk.tokens.iter().enumerate() {
            if stop_words.contains(token) {
                continue;
            }
            tally.add(token, chunk.offset + i);
        }
        tally
    }

    /// Record one occurrence of `word` at `position`
    pub fn add(&mut self, word: &str, position: usize) {
        match self.entries.get_mut(word) {
            Some(stat) => {
                stat.count += 1;
                stat.first_seen = stat.first_seen.min(position);
            }
            None => {
                self.entries.insert(
                    word.to_string(),
                    WordStat {
                        count: 1,
                        first_seen: position,
                    },
                );
            }
        }
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: WordTally) {
        for (word, stat) in other.entries {
            self.entries
                .entry(word)
                .and_modify(|existing| {
                    existing.count += stat.count;
                    existing.first_seen = existing.first_seen.min(stat.first_seen);
                })
                .or_insert(stat);
        }
    }

    /// Count for a word, if present
    pub fn get(&self, word: &str) -> Option<u64> {
        self.entries.get(word).map(|s| s.count)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total occurrences across all words
    pub fn total(&self) -> u64 {
        self.entries.values().map(|s| s.count).sum()
    }

    /// All words by descending count, ties by first appearance
    pub fn ranked(&self) -> Vec<WordCount> {
        let mut stats: Vec<(&String, &WordStat)> = self.entries.iter().collect();
        stats.sort_by_key(|(_, s)| (Reverse(s.count), s.first_seen));
        stats
            .into_iter()
            .map(|(word, s)| WordCount {
                word: word.clone(),
                count: s.count,
            })
            .collect()
    }

    /// The `n` highest-ranked words
    pub fn top(&self, n: usize) -> Vec<WordCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}
