//! Chunked word-count reducer
//!
//! Tokens are split into chunks and fed through a bounded channel to a pool
//! of `min(chunks, threads)` scoped worker threads. Workers borrow the
//! chunks and the stop-word set, count locally, and send their tallies back
//! by value. The calling thread merges tallies in whatever order they
//! arrive.
//!
//! ```text
//!            ┌──────────── job channel (Chunk) ────────────┐
//!            ▼                     ▼                       ▼
//!      ┌──────────┐          ┌──────────┐            ┌──────────┐
//!      │counter-0 │          │counter-1 │    ...     │counter-K │
//!      └────┬─────┘          └────┬─────┘            └────┬─────┘
//!           └──────── result channel (WordTally) ─────────┘
//!                                 │
//!                                 ▼
//!                      merge on calling thread
//! ```

use crate::error::{CountResult, WorkerError};
use crate::wordcount::partition::{partition, Chunk};
use crate::wordcount::stopwords::StopWords;
use crate::wordcount::tally::{WordCount, WordTally};
use crate::wordcount::tokenizer::tokenize;
use crossbeam_channel::{bounded, unbounded};
use std::any::Any;
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Default number of counting threads
pub const DEFAULT_THREADS: usize = 8;

/// Default number of ranked words to return
pub const DEFAULT_TOP_N: usize = 20;

/// Count words in `text`, loading stop words from an optional file
///
/// A missing stop-word file filters nothing.
pub fn mapreduce_count(
    text: &str,
    threads: usize,
    stop_words_path: Option<&Path>,
    top_n: usize,
) -> CountResult<Vec<WordCount>> {
    let stop_words = StopWords::load(stop_words_path)?;
    count_words(text, threads, &stop_words, top_n)
}

/// Count words in `text` and return the `top_n` most frequent
pub fn count_words(
    text: &str,
    threads: usize,
    stop_words: &StopWords,
    top_n: usize,
) -> CountResult<Vec<WordCount>> {
    Ok(tally_words(text, threads, stop_words)?.top(top_n))
}

/// Tokenize, partition and count `text` into a merged tally
pub fn tally_words(text: &str, threads: usize, stop_words: &StopWords) -> CountResult<WordTally> {
    let start = Instant::now();
    let threads = threads.max(1);

    let tokens = tokenize(text);
    let chunks = partition(&tokens, threads);

    info!(
        tokens = tokens.len(),
        chunks = chunks.len(),
        threads = threads,
        stop_words = stop_words.len(),
        "Starting word count"
    );

    let tally = tally_chunks(&chunks, threads, stop_words)?;

    info!(
        distinct = tally.len(),
        counted = tally.total(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Word count completed"
    );

    Ok(tally)
}

/// Count pre-partitioned chunks on a pool of at most `threads` workers
pub fn tally_chunks(
    chunks: &[Chunk<'_>],
    threads: usize,
    stop_words: &StopWords,
) -> CountResult<WordTally> {
    if chunks.is_empty() {
        return Ok(WordTally::new());
    }

    let pool_size = chunks.len().min(threads.max(1));
    debug!(pool_size, chunks = chunks.len(), "Dispatching chunks");

    let (job_tx, job_rx) = bounded::<Chunk<'_>>(chunks.len());
    for chunk in chunks {
        if job_tx.send(*chunk).is_err() {
            break;
        }
    }
    drop(job_tx);

    let (result_tx, result_rx) = unbounded::<WordTally>();

    thread::scope(|scope| -> CountResult<WordTally> {
        let mut handles = Vec::with_capacity(pool_size);
        for id in 0..pool_size {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("counter-{}", id))
                .spawn_scoped(scope, move || {
                    while let Ok(chunk) = job_rx.recv() {
                        let tally = WordTally::from_chunk(&chunk, stop_words);
                        trace!(worker = id, offset = chunk.offset, words = tally.len(), "Chunk counted");
                        if result_tx.send(tally).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| WorkerError::InitFailed {
                    id,
                    reason: e.to_string(),
                })?;
            handles.push((id, handle));
        }
        drop(result_tx);

        let mut merged = WordTally::new();
        let mut received = 0;
        for partial in result_rx.iter() {
            merged.merge(partial);
            received += 1;
        }

        let mut failure = None;
        for (id, handle) in handles {
            if let Err(panic) = handle.join() {
                failure.get_or_insert(WorkerError::Panicked {
                    id,
                    message: panic_message(panic.as_ref()),
                });
            }
        }
        if let Some(e) = failure {
            return Err(e.into());
        }

        if received != chunks.len() {
            return Err(WorkerError::MissingResults {
                expected: chunks.len(),
                received,
            }
            .into());
        }

        Ok(merged)
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}
