//! Chunked word counting
//!
//! Text is tokenized once, split into contiguous chunks, counted in
//! parallel and merged into a single ranking.

pub mod partition;
pub mod reducer;
pub mod stopwords;
pub mod tally;
pub mod tokenizer;

pub use partition::{partition, Chunk};
pub use reducer::{
    count_words, mapreduce_count, tally_chunks, tally_words, DEFAULT_THREADS, DEFAULT_TOP_N,
};
pub use stopwords::StopWords;
pub use tally::{WordCount, WordTally};
pub use tokenizer::tokenize;
