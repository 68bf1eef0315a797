//! Word tokenizer
//!
//! A word is a maximal run of Latin letters, Cyrillic letters (including the
//! Ukrainian `ї і є ґ`) and apostrophes. Everything else separates words.

use regex::Regex;
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Zа-яА-ЯёЁїЇіІєЄґҐ']+").expect("Invalid word regex")
});

/// Split text into lowercase word tokens, preserving order
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}
