//! Extension bucket sorter
//!
//! Copies every regular file of a source tree into `dst/<bucket>/`, where
//! the bucket is the file's lowercased extension.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────┐
//! │  task.rs     │────►│ executor.rs  │────►│ SortReport           │
//! │  walkdir     │     │ Semaphore    │     │ - bucket counts      │
//! │  FileTask ×N │     │ spawn_block. │     │ - captured failures  │
//! └──────────────┘     └──────────────┘     └──────────────────────┘
//! ```

pub mod bucket;
pub mod executor;
pub mod task;

pub use bucket::{bucket_for, NO_EXT_BUCKET};
pub use executor::{
    copy_with_metadata, sort_folder, BucketSorter, SortParams, SortProgress, SortReport,
    DEFAULT_WORKERS,
};
pub use task::{enumerate_files, Enumeration, FileTask};
