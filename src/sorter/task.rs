//! File tasks and source tree enumeration
//!
//! Enumeration runs to completion before any copy is dispatched, so the
//! full work set (and therefore the bucket tally) is known up front.

use crate::error::{SortError, SortResult};
use crate::sorter::bucket::bucket_for;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A single file to be sorted into a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Full path to the source file
    pub source: PathBuf,

    /// Bucket key derived from the file extension
    pub bucket: String,
}

impl FileTask {
    /// Create a task for a source file, deriving its bucket
    pub fn new(source: PathBuf) -> Self {
        let bucket = bucket_for(&source);
        Self { source, bucket }
    }

    /// Destination path for this file under `dst_root`
    ///
    /// Returns `None` when the source has no file name (e.g. a path ending in `..`).
    pub fn destination(&self, dst_root: &Path) -> Option<PathBuf> {
        self.source
            .file_name()
            .map(|name| dst_root.join(&self.bucket).join(name))
    }
}

/// Result of enumerating a source tree
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Every regular file found
    pub tasks: Vec<FileTask>,

    /// Entries that could not be read while walking
    pub skipped: u64,
}

impl Enumeration {
    /// Count files per bucket over the full work set
    pub fn bucket_counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for task in &self.tasks {
            *counts.entry(task.bucket.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Verify that the source root exists and is a directory
pub fn check_source(src: &Path) -> SortResult<()> {
    if !src.exists() {
        return Err(SortError::SourceMissing {
            path: src.to_path_buf(),
        });
    }
    if !src.is_dir() {
        return Err(SortError::SourceNotDirectory {
            path: src.to_path_buf(),
        });
    }
    Ok(())
}

/// Recursively enumerate every regular file beneath `src`
///
/// Symlinks are not followed into directories, but a symlink that resolves
/// to a regular file is included. Unreadable entries are logged and counted
/// in [`Enumeration::skipped`].
pub fn enumerate_files(src: &Path) -> SortResult<Enumeration> {
    check_source(src)?;

    let mut enumeration = Enumeration::default();

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                enumeration.skipped += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if is_file {
            enumeration.tasks.push(FileTask::new(entry.into_path()));
        }
    }

    debug!(
        files = enumeration.tasks.len(),
        skipped = enumeration.skipped,
        "Enumeration finished"
    );

    Ok(enumeration)
}
