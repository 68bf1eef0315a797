//! Stop-word set loading

use crate::error::{CountError, CountResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Immutable set of lowercase words to drop before counting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// An empty set that filters nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from an iterator of words (trimmed and lowercased)
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parse a one-word-per-line list
    pub fn parse(contents: &str) -> Self {
        Self::from_words(contents.lines())
    }

    /// Load from an optional file path
    ///
    /// No path, or a path that does not exist, gives an empty set.
    pub fn load(path: Option<&Path>) -> CountResult<Self> {
        let Some(path) = path else {
            return Ok(Self::empty());
        };
        if !path.exists() {
            debug!(path = %path.display(), "Stop-word file absent, filtering nothing");
            return Ok(Self::empty());
        }

        let contents = fs::read_to_string(path).map_err(|source| CountError::StopWords {
            path: path.to_path_buf(),
            source,
        })?;
        let stop_words = Self::parse(&contents);
        debug!(path = %path.display(), count = stop_words.len(), "Loaded stop words");
        Ok(stop_words)
    }

    /// Check a token against the set (case-insensitive)
    pub fn contains(&self, token: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        if self.words.contains(token) {
            return true;
        }
        token.chars().any(char::is_uppercase) && self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
