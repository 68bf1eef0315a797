//! Chunk partitioning for parallel counting
//!
//! Chunks are size-balanced, not count-exact: the step is `N / parts`
//! and slicing continues until the input is exhausted, so a trailing
//! remainder chunk can push the chunk count above `parts`. Chunk count only
//! bounds parallelism; the merged counts do not depend on it.

/// A contiguous run of tokens handed to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the first token in the full sequence
    pub offset: usize,

    /// The tokens themselves
    pub tokens: &'a [String],
}

impl<'a> Chunk<'a> {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split `tokens` into contiguous chunks targeting `parts` pieces
///
/// - empty input yields no chunks
/// - `parts <= 1` or `tokens.len() <= parts` yields a single chunk
/// - otherwise chunks of `tokens.len() / parts` tokens, the last one holding
///   whatever remains
pub fn partition(tokens: &[String], parts: usize) -> Vec<Chunk<'_>> {
    let n = tokens.len();
    if n == 0 {
        return Vec::new();
    }
    if parts <= 1 || n <= parts {
        return vec![Chunk { offset: 0, tokens }];
    }

    let step = n / parts;
    tokens
        .chunks(step)
        .enumerate()
        .map(|(i, slice)| Chunk {
            offset: i * step,
            tokens: slice,
        })
        .collect()
}
