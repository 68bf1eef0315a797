//! fanout - Bounded-Concurrency Batch Tools
//!
//! Two batch jobs built on the same pattern: enumerate a fixed set of work
//! items, run them with a hard cap on concurrency, capture every per-item
//! outcome, then aggregate once all items are done.
//!
//! # Features
//!
//! - **Extension Sorting**: Copies every file of a tree into
//!   `<dst>/<extension>/`, with at most N copies in flight. A failed copy
//!   never cancels its siblings; failures are collected and reported after
//!   the batch completes.
//!
//! - **Chunked Word Counting**: Tokenizes a text once, splits the tokens
//!   into contiguous chunks and counts them on a scoped thread pool. The
//!   merged ranking is identical for any thread count.
//!
//! - **Text Acquisition**: Downloads pages with retries and reduces HTML to
//!   plain text.
//!
//! # Architecture
//!
//! ```text
//!  sort                                     wordcount
//! ┌──────────────────────────┐            ┌──────────────────────────┐
//! │ walkdir enumeration      │            │ fetch / read + tokenize  │
//! └────────────┬─────────────┘            └────────────┬─────────────┘
//!              │ FileTask ×N                           │ Chunk ×K
//!              ▼                                       ▼
//! ┌──────────────────────────┐            ┌──────────────────────────┐
//! │ tokio tasks              │            │ scoped threads           │
//! │ Semaphore(workers)       │            │ min(K, threads) workers  │
//! │ spawn_blocking copy      │            │ crossbeam channels       │
//! └────────────┬─────────────┘            └────────────┬─────────────┘
//!              │ CopyOutcome ×N                        │ WordTally ×K
//!              ▼                                       ▼
//! ┌──────────────────────────┐            ┌──────────────────────────┐
//! │ SortReport               │            │ merged WordTally         │
//! │ bucket counts, failures  │            │ top-N ranking            │
//! └──────────────────────────┘            └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Sort a downloads folder with 32 concurrent copies
//! fanout sort --src ~/Downloads --dst ~/Sorted -w 32
//!
//! # Ten most frequent words of a book, ignoring stop words
//! fanout wordcount --file book.txt --top 10 --stop-words stop.txt
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod progress;
pub mod report;
pub mod sorter;
pub mod wordcount;

pub use config::{CliArgs, SortConfig, TextSource, WordCountConfig};
pub use error::{CopyOutcome, FanoutError, Result};
pub use sorter::{sort_folder, BucketSorter, SortParams, SortReport};
pub use wordcount::{count_words, mapreduce_count, StopWords, WordCount};
