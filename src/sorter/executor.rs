//! Bounded fan-out copy executor
//!
//! Every enumerated file gets its own tokio task. Tasks create their bucket
//! directory freely, then wait on a shared semaphore before copying, so at
//! most `workers` copies are in flight at once. The byte copy itself runs on
//! the blocking pool.
//!
//! ```text
//!  enumerate_files ──► FileTask ×N
//!                         │
//!            ┌────────────┼────────────┐
//!            ▼            ▼            ▼
//!      create_dir_all create_dir_all create_dir_all   (ungated)
//!            │            │            │
//!            └──── Semaphore(workers) ─┘              (admission gate)
//!                         │
//!                  spawn_blocking(copy)
//!                         │
//!                         ▼
//!             CopyOutcome ×N ──► SortReport
//! ```
//!
//! Failures are captured per file and never cancel siblings. The executor
//! only reports [`SortError::PartialCopyFailure`] after every task has
//! reached a terminal state.

use crate::error::{CopyOutcome, SortError, SortResult};
use crate::sorter::task::{enumerate_files, FileTask};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default number of concurrent copies
pub const DEFAULT_WORKERS: usize = 100;

/// Parameters for a sort run
#[derive(Debug, Clone)]
pub struct SortParams {
    /// Source root, walked recursively
    pub src: PathBuf,

    /// Destination root; buckets are created directly beneath it
    pub dst: PathBuf,

    /// Maximum concurrent copies (values below 1 are treated as 1)
    pub workers: usize,

    /// Create bucket directories but copy nothing
    pub dry_run: bool,
}

impl SortParams {
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            workers: DEFAULT_WORKERS,
            dry_run: false,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn permits(&self) -> usize {
        self.workers.max(1)
    }
}

/// Progress snapshot emitted after each file reaches a terminal state
#[derive(Debug, Clone, Default)]
pub struct SortProgress {
    pub completed: u64,
    pub total: u64,
    pub failed: u64,
    pub bytes_copied: u64,
}

/// Callback invoked with progress snapshots
pub type ProgressFn = Arc<dyn Fn(SortProgress) + Send + Sync>;

/// Counters shared by all copy tasks
#[derive(Debug, Default)]
struct SortStats {
    completed: AtomicU64,
    copied: AtomicU64,
    failed: AtomicU64,
    bytes_copied: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
}

impl SortStats {
    fn record(&self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Copied { bytes, .. } => {
                self.copied.fetch_add(1, Ordering::Relaxed);
                self.bytes_copied.fetch_add(*bytes, Ordering::Relaxed);
            }
            CopyOutcome::Planned { .. } => {}
            CopyOutcome::Failed { .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn admit(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }

    fn snapshot(&self, total: u64) -> SortProgress {
        SortProgress {
            completed: self.completed.load(Ordering::SeqCst),
            total,
            failed: self.failed.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
        }
    }
}

/// Marks one admitted file; leaving the gate decrements the in-flight count
struct InFlight<'a>(&'a SortStats);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Result of a completed sort
#[derive(Debug, Clone)]
pub struct SortReport {
    /// Files per bucket, over the full enumeration
    pub buckets: BTreeMap<String, u64>,

    /// Number of files enumerated
    pub total_files: usize,

    /// Files actually copied
    pub copied: u64,

    /// Sum of copied file sizes
    pub bytes_copied: u64,

    /// Captured per-file failures
    pub failures: Vec<CopyOutcome>,

    /// Entries that could not be read during enumeration
    pub skipped: u64,

    /// Whether this was a dry run
    pub dry_run: bool,

    /// Most files ever admitted past the gate at the same time
    pub peak_in_flight: u64,

    /// Wall-clock time for the whole run
    pub duration: Duration,
}

impl SortReport {
    /// Number of captured failures
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Sum of all bucket counts
    pub fn bucket_total(&self) -> u64 {
        self.buckets.values().sum()
    }
}

/// Sorts a source tree into extension buckets with bounded concurrency
pub struct BucketSorter {
    params: Arc<SortParams>,
    stats: Arc<SortStats>,
    progress: Option<ProgressFn>,
}

impl BucketSorter {
    /// Create a new sorter
    pub fn new(params: SortParams) -> Self {
        Self {
            params: Arc::new(params),
            stats: Arc::new(SortStats::default()),
            progress: None,
        }
    }

    /// Attach a progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(SortProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Run the sort, failing if any copy failed outside dry-run mode
    pub async fn run(self) -> SortResult<SortReport> {
        let report = self.execute().await?;

        if report.failed() > 0 && !report.dry_run {
            warn!(
                failed = report.failed(),
                total = report.total_files,
                "Completed with errors"
            );
            return Err(SortError::PartialCopyFailure {
                failed: report.failed(),
                total: report.total_files,
            });
        }

        Ok(report)
    }

    /// Run the sort and return the full report, including captured failures
    pub async fn execute(self) -> SortResult<SortReport> {
        let start_time = Instant::now();
        let params = Arc::clone(&self.params);

        let enumeration = enumerate_files(&params.src)?;

        fs::create_dir_all(&params.dst).map_err(|source| SortError::CreateDestination {
            path: params.dst.clone(),
            source,
        })?;

        let total = enumeration.tasks.len();
        let buckets = enumeration.bucket_counts();

        info!(
            src = %params.src.display(),
            dst = %params.dst.display(),
            workers = params.permits(),
            dry_run = params.dry_run,
            files = total,
            "Start sorting"
        );

        let semaphore = Arc::new(Semaphore::new(params.permits()));
        let dst_root = Arc::new(params.dst.clone());

        let mut handles: Vec<(PathBuf, JoinHandle<CopyOutcome>)> = Vec::with_capacity(total);
        for task in enumeration.tasks {
            let source = task.source.clone();
            let semaphore = Arc::clone(&semaphore);
            let dst_root = Arc::clone(&dst_root);
            let stats = Arc::clone(&self.stats);
            let progress = self.progress.clone();
            let dry_run = params.dry_run;

            let handle = tokio::spawn(async move {
                let outcome = process_file(task, &dst_root, &semaphore, &stats, dry_run).await;
                stats.record(&outcome);
                if let Some(callback) = progress {
                    callback(stats.snapshot(total as u64));
                }
                outcome
            });
            handles.push((source, handle));
        }

        // Join everything before aggregating
        let mut failures = Vec::new();
        for (source, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(path = %source.display(), error = %e, "Copy task aborted");
                    let outcome = CopyOutcome::Failed {
                        source,
                        reason: format!("copy task aborted: {}", e),
                    };
                    self.stats.record(&outcome);
                    outcome
                }
            };
            if outcome.is_failure() {
                failures.push(outcome);
            }
        }

        let duration = start_time.elapsed();
        let report = SortReport {
            buckets,
            total_files: total,
            copied: self.stats.copied.load(Ordering::Relaxed),
            bytes_copied: self.stats.bytes_copied.load(Ordering::Relaxed),
            failures,
            skipped: enumeration.skipped,
            dry_run: params.dry_run,
            peak_in_flight: self.stats.peak_in_flight.load(Ordering::SeqCst),
            duration,
        };

        info!(
            buckets = %format_buckets(&report.buckets),
            copied = report.copied,
            failed = report.failed(),
            peak_in_flight = report.peak_in_flight,
            duration_ms = duration.as_millis() as u64,
            "Done"
        );

        Ok(report)
    }
}

/// Sort `params.src` into buckets under `params.dst`
pub async fn sort_folder(params: SortParams) -> SortResult<SortReport> {
    BucketSorter::new(params).run().await
}

/// Process a single file: ensure its bucket, wait for admission, copy
async fn process_file(
    task: FileTask,
    dst_root: &Path,
    semaphore: &Semaphore,
    stats: &SortStats,
    dry_run: bool,
) -> CopyOutcome {
    let Some(destination) = task.destination(dst_root) else {
        return CopyOutcome::Failed {
            source: task.source,
            reason: "source has no file name".into(),
        };
    };

    let bucket_dir = dst_root.join(&task.bucket);
    if let Err(e) = tokio::fs::create_dir_all(&bucket_dir).await {
        error!(dir = %bucket_dir.display(), error = %e, "Failed to create bucket directory");
        return CopyOutcome::Failed {
            source: task.source,
            reason: format!("create {}: {}", bucket_dir.display(), e),
        };
    }

    let _permit = match semaphore.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return CopyOutcome::Failed {
                source: task.source,
                reason: "admission gate closed".into(),
            }
        }
    };
    let _admitted = stats.admit();

    if dry_run {
        debug!(src = %task.source.display(), dst = %destination.display(), "[dry-run]");
        return CopyOutcome::Planned {
            source: task.source,
            destination,
        };
    }

    let source = task.source.clone();
    let target = destination.clone();
    match tokio::task::spawn_blocking(move || copy_with_metadata(&source, &target)).await {
        Ok(Ok(bytes)) => {
            debug!(src = %task.source.display(), dst = %destination.display(), bytes, "Copied");
            CopyOutcome::Copied {
                source: task.source,
                destination,
                bytes,
            }
        }
        Ok(Err(e)) => {
            error!(src = %task.source.display(), dst = %destination.display(), error = %e, "Copy failed");
            CopyOutcome::Failed {
                source: task.source,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            error!(src = %task.source.display(), error = %e, "Copy task panicked");
            CopyOutcome::Failed {
                source: task.source,
                reason: format!("copy task panicked: {}", e),
            }
        }
    }
}

/// Copy file bytes, permissions and access/modification times
///
/// Returns the number of bytes copied.
pub fn copy_with_metadata(src: &Path, dst: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dst)?;
    let metadata = fs::metadata(src)?;

    let mut times = fs::FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    // fs::copy already applied the source permissions, which may be read-only
    #[cfg(windows)]
    let file = {
        use std::os::windows::fs::OpenOptionsExt;
        const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
        fs::OpenOptions::new()
            .access_mode(FILE_WRITE_ATTRIBUTES)
            .open(dst)?
    };
    #[cfg(not(windows))]
    let file = fs::File::open(dst)?;

    file.set_times(times)?;
    Ok(bytes)
}

fn format_buckets(buckets: &BTreeMap<String, u64>) -> String {
    buckets
        .iter()
        .map(|(bucket, count)| format!("{}:{}", bucket, count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_params_coerce_workers() {
        let params = SortParams::new("/a", "/b").workers(0);
        assert_eq!(params.permits(), 1);
        assert_eq!(SortParams::new("/a", "/b").permits(), DEFAULT_WORKERS);
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"payload").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_times(fs::FileTimes::new().set_modified(old))
            .unwrap();

        let bytes = copy_with_metadata(&src, &dst).unwrap();
        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn test_copy_read_only_source() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("locked.txt");
        let dst = dir.path().join("copy.txt");
        fs::write(&src, b"frozen").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(1_200_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_times(fs::FileTimes::new().set_modified(old))
            .unwrap();
        let mut perms = fs::metadata(&src).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&src, perms).unwrap();

        assert_eq!(copy_with_metadata(&src, &dst).unwrap(), 6);
        let copied = fs::metadata(&dst).unwrap();
        assert!(copied.permissions().readonly());
        assert_eq!(copied.modified().unwrap(), old);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_workers() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        for i in 0..120 {
            write(src.path(), &format!("d{}/f{}.{}", i % 5, i, ["a", "b", "c"][i % 3]), "payload");
        }

        for workers in [1, 3, 8] {
            let out = dst.path().join(format!("w{}", workers));
            let report = sort_folder(SortParams::new(src.path(), &out).workers(workers))
                .await
                .unwrap();
            assert_eq!(report.copied, 120);
            assert!(report.peak_in_flight >= 1);
            assert!(
                report.peak_in_flight <= workers as u64,
                "peak {} exceeds {} workers",
                report.peak_in_flight,
                workers
            );
        }
    }

    #[test]
    fn test_admission_tracks_peak() {
        let stats = SortStats::default();
        {
            let _a = stats.admit();
            let _b = stats.admit();
            assert_eq!(stats.in_flight.load(Ordering::SeqCst), 2);
        }
        let _c = stats.admit();
        assert_eq!(stats.in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(stats.peak_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_worker_still_completes() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        for i in 0..20 {
            write(src.path(), &format!("f{}.log", i), "x");
        }

        let report = sort_folder(SortParams::new(src.path(), dst.path()).workers(1))
            .await
            .unwrap();

        assert_eq!(report.buckets.get("log"), Some(&20));
        assert_eq!(report.copied, 20);
        assert_eq!(fs::read_dir(dst.path().join("log")).unwrap().count(), 20);
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "a.txt", "1");
        write(src.path(), "b.md", "22");
        write(src.path(), "c", "333");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let report = BucketSorter::new(SortParams::new(src.path(), dst.path()).workers(2))
            .with_progress(move |p| sink.lock().unwrap().push(p.completed))
            .run()
            .await
            .unwrap();

        assert_eq!(report.bytes_copied, 6);
        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failures_do_not_cancel_siblings() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "a.txt", "a");
        write(src.path(), "nested/b.TXT", "b");
        write(src.path(), "c", "c");
        write(src.path(), "nested/deep/d.docx", "d");

        // A regular file where the txt bucket should go blocks that bucket
        fs::write(dst.path().join("txt"), "in the way").unwrap();

        let report = BucketSorter::new(SortParams::new(src.path(), dst.path()))
            .execute()
            .await
            .unwrap();
        assert_eq!(report.failed(), 2);
        assert_eq!(report.copied, 2);
        assert_eq!(report.bucket_total(), 4);
        assert!(dst.path().join("no_ext/c").exists());
        assert!(dst.path().join("docx/d.docx").exists());

        let err = sort_folder(SortParams::new(src.path(), dst.path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SortError::PartialCopyFailure { failed: 2, total: 4 }
        ));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_raise_on_failures() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "a.txt", "a");
        fs::write(dst.path().join("txt"), "in the way").unwrap();

        let report = sort_folder(SortParams::new(src.path(), dst.path()).dry_run(true))
            .await
            .unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.buckets.get("txt"), Some(&1));
    }

    #[tokio::test]
    async fn test_missing_source_is_fatal() {
        let dir = tempdir().unwrap();
        let err = sort_folder(SortParams::new(dir.path().join("missing"), dir.path().join("out")))
            .await
            .unwrap_err();
        assert!(matches!(err, SortError::SourceMissing { .. }));
        assert!(!dir.path().join("out").exists());
    }
}
