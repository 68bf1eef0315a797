//! Error types for fanout
//!
//! This module defines the error hierarchy for both batch paths:
//! - Sorting errors (enumeration, destination setup, aggregate copy failure)
//! - Counting errors (stop-word loading, worker pool failures)
//! - Text acquisition errors (network, content)
//! - Configuration and CLI errors
//!
//! Per-file copy failures are never raised directly. They are captured as
//! [`CopyOutcome::Failed`] and folded into [`SortError::PartialCopyFailure`]
//! once every file has reached a terminal state.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the fanout library
#[derive(Error, Debug)]
pub enum FanoutError {
    /// Sorting errors
    #[error("Sort error: {0}")]
    Sort(#[from] SortError),

    /// Word counting errors
    #[error("Count error: {0}")]
    Count(#[from] CountError),

    /// Text acquisition errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Chart rendering errors
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the bucket sorter
#[derive(Error, Debug)]
pub enum SortError {
    /// Source root does not exist
    #[error("Source directory '{path}' does not exist")]
    SourceMissing { path: PathBuf },

    /// Source root is not a directory
    #[error("Source path '{path}' is not a directory")]
    SourceNotDirectory { path: PathBuf },

    /// Destination root could not be created
    #[error("Failed to create destination '{path}': {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more copies failed; raised only after all work completed
    #[error("Partial copy failure: {failed} of {total} file(s) failed")]
    PartialCopyFailure { failed: usize, total: usize },
}

/// Errors from the chunked word counter
#[derive(Error, Debug)]
pub enum CountError {
    /// Stop-word file exists but could not be read
    #[error("Failed to read stop words from '{path}': {source}")]
    StopWords {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker pool failure
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to start worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Fewer partial results arrived than chunks were dispatched
    #[error("Expected {expected} partial results, received {received}")]
    MissingResults { expected: usize, received: usize },
}

/// Text acquisition errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// All attempts failed with network or HTTP errors
    #[error("Network error for '{url}' after {attempts} attempt(s): {reason}")]
    Network {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// Response content type is not textual
    #[error("Unsupported Content-Type '{content_type}' for '{url}'")]
    UnsupportedContentType { url: String, content_type: String },

    /// Response body cleaned to nothing
    #[error("Empty or unreadable content at '{url}'")]
    EmptyContent { url: String },

    /// Local text file could not be read
    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Chart rendering errors
#[derive(Error, Debug)]
pub enum ChartError {
    /// Output directory could not be created
    #[error("Failed to create chart directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Drawing or encoding failed
    #[error("Failed to render chart '{path}': {reason}")]
    Render { path: PathBuf, reason: String },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be a positive integer")]
    InvalidWorkerCount { count: usize },

    /// Invalid thread count
    #[error("Invalid thread count {count}: must be a positive integer")]
    InvalidThreadCount { count: usize },

    /// Invalid top-N
    #[error("Invalid top count {count}: must be a positive integer")]
    InvalidTopCount { count: usize },

    /// Source directory problem
    #[error("Invalid source directory '{path}': {reason}")]
    InvalidSource { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },

    /// Stop-word file was named but does not exist
    #[error("Stop-word file not found: '{path}'")]
    MissingStopWords { path: PathBuf },

    /// Text source problem
    #[error("Invalid text source: {0}")]
    InvalidTextSource(String),
}

/// Result type alias for FanoutError
pub type Result<T> = std::result::Result<T, FanoutError>;

/// Result type alias for SortError
pub type SortResult<T> = std::result::Result<T, SortError>;

/// Result type alias for CountError
pub type CountResult<T> = std::result::Result<T, CountError>;

/// Result type alias for FetchError
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Represents the terminal state of copying a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Bytes and metadata copied into the bucket directory
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },

    /// Dry run: bucket directory ensured, nothing copied
    Planned {
        source: PathBuf,
        destination: PathBuf,
    },

    /// Failed with a captured error
    Failed { source: PathBuf, reason: String },
}

impl CopyOutcome {
    /// Returns true if this outcome represents a captured failure
    pub fn is_failure(&self) -> bool {
        matches!(self, CopyOutcome::Failed { .. })
    }

    /// Returns the source path associated with this outcome
    pub fn source(&self) -> &std::path::Path {
        match self {
            CopyOutcome::Copied { source, .. } => source,
            CopyOutcome::Planned { source, .. } => source,
            CopyOutcome::Failed { source, .. } => source,
        }
    }

    /// Captured error text for a failed outcome
    pub fn reason(&self) -> Option<&str> {
        match self {
            CopyOutcome::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
