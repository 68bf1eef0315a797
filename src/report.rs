//! JSON export of a word ranking

use crate::error::{FanoutError, Result};
use crate::wordcount::WordCount;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Serializable summary of one word-count run
#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    /// URL or file the text came from
    pub source: String,

    /// Counting threads requested
    pub threads: usize,

    /// Requested ranking length
    pub top_n: usize,

    /// Words counted after stop-word filtering
    pub total_words: u64,

    /// Distinct words after stop-word filtering
    pub distinct_words: usize,

    /// Ranked words, most frequent first
    pub entries: Vec<WordCount>,
}

impl RankingReport {
    /// Write the report as pretty-printed JSON, replacing any existing file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| FanoutError::Io(e.into()))?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(path = %path.display(), entries = self.entries.len(), "Wrote ranking report");
        Ok(())
    }
}
