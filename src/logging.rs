//! Process-wide logging setup
//!
//! Logs go to stderr and, optionally, to an append-only file. Setup runs at
//! most once per process; later calls are no-ops, so output destinations are
//! never duplicated.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Level for this crate's targets
    pub level: LogLevel,

    /// Forces at least debug level
    pub verbose: bool,

    /// Optional log file, appended to
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> String {
        let level = match (self.verbose, self.level) {
            (true, LogLevel::Trace) => LogLevel::Trace,
            (true, _) => LogLevel::Debug,
            (false, level) => level,
        };
        format!("fanout={},warn", level.as_str())
    }
}

/// Install the global subscriber
///
/// Returns `true` only for the call that actually installed it.
pub fn init(settings: &LogSettings) -> bool {
    let mut installed = false;
    INIT.get_or_init(|| {
        installed = install(settings);
    });
    installed
}

fn install(settings: &LogSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.directive()));

    let (file, file_error) = match settings.file.as_deref().map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(file_layer)
        .try_init()
        .is_ok();

    if let (Some(e), Some(path)) = (file_error, settings.file.as_ref()) {
        warn!(path = %path.display(), error = %e, "Cannot open log file, logging to console only");
    }

    installed
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
