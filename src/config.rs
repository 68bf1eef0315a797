//! Configuration types for fanout
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation for each subcommand
//!
//! Invalid values are rejected here, before any batch work starts.

use crate::chart::DEFAULT_FIGURE;
use crate::error::ConfigError;
use crate::logging::{LogLevel, LogSettings};
use crate::sorter::{SortParams, DEFAULT_WORKERS};
use crate::wordcount::{DEFAULT_THREADS, DEFAULT_TOP_N};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

/// Bounded-concurrency batch tools
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fanout",
    version,
    about = "Bounded-concurrency batch tools: extension sorting and parallel word counting",
    long_about = "Runs batch jobs as bounded fan-outs over a fixed work set.\n\n\
                  sort:      copies every file of a tree into <dst>/<extension>/ with at most\n\
                  \u{20}          N copies in flight.\n\
                  wordcount: splits a text into chunks, counts words on a thread pool and\n\
                  \u{20}          prints the most frequent words.",
    after_help = "EXAMPLES:\n    \
        fanout sort --src ~/Downloads --dst ~/Sorted -w 32\n    \
        fanout sort --src ./data --dst ./buckets --dry-run\n    \
        fanout wordcount --url https://www.gutenberg.org/files/1342/1342-0.txt --top 10\n    \
        fanout wordcount --file book.txt --threads 16 --stop-words stop.txt --json top.json\n    \
        fanout wordcount --file book.txt --figure charts/top.png --no-chart"
)]
pub struct CliArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Log level for fanout messages (RUST_LOG overrides)
    #[arg(
        long,
        value_enum,
        default_value_t = LogLevel::Info,
        env = "FANOUT_LOG_LEVEL",
        global = true
    )]
    pub log_level: LogLevel,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Also append logs to this file
    #[arg(long, env = "FANOUT_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Quiet mode - suppress banners and progress output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

impl CliArgs {
    /// Logging options derived from the global flags
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level,
            verbose: self.verbose,
            file: self.log_file.clone(),
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy files into per-extension bucket directories
    Sort(SortArgs),

    /// Count word frequencies in a text and rank the top words
    Wordcount(WordCountArgs),
}

/// Arguments for `fanout sort`
#[derive(Args, Debug, Clone)]
pub struct SortArgs {
    /// Source directory (read recursively)
    #[arg(long, value_name = "DIR")]
    pub src: PathBuf,

    /// Destination directory for bucket folders
    #[arg(long, value_name = "DIR")]
    pub dst: PathBuf,

    /// Maximum concurrent copy operations
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Create bucket folders and report counts without copying
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `fanout wordcount`
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct WordCountArgs {
    /// URL of the text to analyze
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Local text file to analyze
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Number of most frequent words to show
    #[arg(long, default_value_t = DEFAULT_TOP_N, value_name = "NUM")]
    pub top: usize,

    /// Number of counting threads
    #[arg(long, default_value_t = DEFAULT_THREADS, value_name = "NUM")]
    pub threads: usize,

    /// Stop-word file, one word per line
    #[arg(long, value_name = "FILE")]
    pub stop_words: Option<PathBuf>,

    /// Write the ranking as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Skip the console bar chart
    #[arg(long)]
    pub no_chart: bool,

    /// PNG file for the ranking chart
    #[arg(long, default_value = DEFAULT_FIGURE, value_name = "FILE")]
    pub figure: PathBuf,

    /// Do not render the PNG chart
    #[arg(long)]
    pub no_plot: bool,
}

/// Validated configuration for a sort run
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Executor parameters
    pub params: SortParams,

    /// Show banner and progress bar
    pub show_progress: bool,
}

impl SortConfig {
    /// Validate arguments and prepare the destination root
    pub fn from_args(args: SortArgs, quiet: bool) -> Result<Self, ConfigError> {
        if !args.src.exists() {
            return Err(ConfigError::InvalidSource {
                path: args.src,
                reason: "does not exist".into(),
            });
        }
        if !args.src.is_dir() {
            return Err(ConfigError::InvalidSource {
                path: args.src,
                reason: "not a directory".into(),
            });
        }

        if args.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
            });
        }

        fs::create_dir_all(&args.dst).map_err(|e| ConfigError::InvalidOutputPath {
            path: args.dst.clone(),
            reason: format!("cannot create: {}", e),
        })?;

        Ok(Self {
            params: SortParams::new(args.src, args.dst)
                .workers(args.workers)
                .dry_run(args.dry_run),
            show_progress: !quiet,
        })
    }
}

/// Where the text to count comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Url(String),
    File(PathBuf),
}

impl TextSource {
    /// Human-readable description for banners and reports
    pub fn describe(&self) -> String {
        match self {
            TextSource::Url(url) => url.clone(),
            TextSource::File(path) => path.display().to_string(),
        }
    }
}

/// Validated configuration for a word-count run
#[derive(Debug, Clone)]
pub struct WordCountConfig {
    pub source: TextSource,
    pub top_n: usize,
    pub threads: usize,
    pub stop_words: Option<PathBuf>,
    pub json_output: Option<PathBuf>,
    /// PNG chart destination; `None` when plotting is disabled
    pub figure: Option<PathBuf>,
    pub show_chart: bool,
    pub show_progress: bool,
}

impl WordCountConfig {
    /// Validate arguments
    pub fn from_args(args: WordCountArgs, quiet: bool) -> Result<Self, ConfigError> {
        if args.top == 0 {
            return Err(ConfigError::InvalidTopCount { count: args.top });
        }

        if args.threads == 0 {
            return Err(ConfigError::InvalidThreadCount {
                count: args.threads,
            });
        }

        if let Some(ref path) = args.stop_words {
            if !path.exists() {
                return Err(ConfigError::MissingStopWords { path: path.clone() });
            }
        }

        let source = match (args.url, args.file) {
            (Some(url), None) => {
                let trimmed = url.trim();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(ConfigError::InvalidTextSource(format!(
                        "'{}' is not an http(s) URL",
                        url
                    )));
                }
                TextSource::Url(trimmed.to_string())
            }
            (None, Some(file)) => {
                if !file.is_file() {
                    return Err(ConfigError::InvalidTextSource(format!(
                        "'{}' is not a readable file",
                        file.display()
                    )));
                }
                TextSource::File(file)
            }
            _ => {
                return Err(ConfigError::InvalidTextSource(
                    "exactly one of --url or --file is required".into(),
                ))
            }
        };

        if let Some(ref json) = args.json {
            if let Some(parent) = json.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| ConfigError::InvalidOutputPath {
                        path: json.clone(),
                        reason: format!("cannot create parent directory: {}", e),
                    })?;
                }
            }
        }

        Ok(Self {
            source,
            top_n: args.top,
            threads: args.threads,
            stop_words: args.stop_words,
            json_output: args.json,
            figure: (!args.no_plot).then_some(args.figure),
            show_chart: !args.no_chart && !quiet,
            show_progress: !quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    fn wordcount_args(cli: CliArgs) -> WordCountArgs {
        match cli.command {
            Command::Wordcount(args) => args,
            other => panic!("expected wordcount, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_defaults() {
        let cli = parse(&["fanout", "sort", "--src", "a", "--dst", "b"]);
        match cli.command {
            Command::Sort(args) => {
                assert_eq!(args.workers, DEFAULT_WORKERS);
                assert!(!args.dry_run);
            }
            other => panic!("expected sort, got {:?}", other),
        }
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "fanout", "wordcount", "--file", "x.txt", "-v", "--log-level", "warn",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_wordcount_requires_source() {
        assert!(CliArgs::try_parse_from(["fanout", "wordcount"]).is_err());
        assert!(CliArgs::try_parse_from([
            "fanout", "wordcount", "--url", "http://a", "--file", "b"
        ])
        .is_err());
    }

    #[test]
    fn test_sort_config_validation() {
        let dir = tempdir().unwrap();
        let dst = dir.path().join("out/nested");

        let args = SortArgs {
            src: dir.path().to_path_buf(),
            dst: dst.clone(),
            workers: 0,
            dry_run: false,
        };
        assert!(matches!(
            SortConfig::from_args(args.clone(), false),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));

        let config = SortConfig::from_args(SortArgs { workers: 5, ..args }, true).unwrap();
        assert_eq!(config.params.workers, 5);
        assert!(!config.show_progress);
        assert!(dst.is_dir());
    }

    #[test]
    fn test_large_counts_accepted() {
        let dir = tempdir().unwrap();
        let args = SortArgs {
            src: dir.path().to_path_buf(),
            dst: dir.path().join("out"),
            workers: 50_000,
            dry_run: false,
        };
        assert_eq!(SortConfig::from_args(args, true).unwrap().params.workers, 50_000);

        let text = dir.path().join("book.txt");
        fs::write(&text, "words").unwrap();
        let args = wordcount_args(parse(&[
            "fanout",
            "wordcount",
            "--file",
            text.to_str().unwrap(),
            "--threads",
            "4096",
        ]));
        assert_eq!(WordCountConfig::from_args(args, true).unwrap().threads, 4096);
    }

    #[test]
    fn test_figure_flags() {
        let dir = tempdir().unwrap();
        let text = dir.path().join("book.txt");
        fs::write(&text, "words").unwrap();
        let text_arg = text.to_str().unwrap();

        let args = wordcount_args(parse(&["fanout", "wordcount", "--file", text_arg]));
        let config = WordCountConfig::from_args(args, false).unwrap();
        assert_eq!(config.figure, Some(PathBuf::from(DEFAULT_FIGURE)));

        let args = wordcount_args(parse(&[
            "fanout", "wordcount", "--file", text_arg, "--no-plot",
        ]));
        assert_eq!(WordCountConfig::from_args(args, false).unwrap().figure, None);
    }

    #[test]
    fn test_sort_config_rejects_missing_source() {
        let dir = tempdir().unwrap();
        let args = SortArgs {
            src: dir.path().join("missing"),
            dst: dir.path().join("out"),
            workers: 4,
            dry_run: false,
        };
        assert!(matches!(
            SortConfig::from_args(args, false),
            Err(ConfigError::InvalidSource { .. })
        ));
    }

    #[test]
    fn test_wordcount_config_validation() {
        let dir = tempdir().unwrap();
        let text = dir.path().join("book.txt");
        fs::write(&text, "words").unwrap();
        let text_arg = text.to_str().unwrap();

        let args = wordcount_args(parse(&["fanout", "wordcount", "--file", text_arg, "--top", "0"]));
        assert!(matches!(
            WordCountConfig::from_args(args, false),
            Err(ConfigError::InvalidTopCount { .. })
        ));

        let args = wordcount_args(parse(&[
            "fanout", "wordcount", "--file", text_arg, "--threads", "0",
        ]));
        assert!(matches!(
            WordCountConfig::from_args(args, false),
            Err(ConfigError::InvalidThreadCount { .. })
        ));

        let missing = dir.path().join("nope.txt");
        let args = wordcount_args(parse(&[
            "fanout",
            "wordcount",
            "--file",
            text_arg,
            "--stop-words",
            missing.to_str().unwrap(),
        ]));
        assert!(matches!(
            WordCountConfig::from_args(args, false),
            Err(ConfigError::MissingStopWords { .. })
        ));

        let args = wordcount_args(parse(&["fanout", "wordcount", "--url", "ftp://x/y"]));
        assert!(matches!(
            WordCountConfig::from_args(args, false),
            Err(ConfigError::InvalidTextSource(_))
        ));

        let json = dir.path().join("reports/top.json");
        let args = wordcount_args(parse(&[
            "fanout",
            "wordcount",
            "--file",
            text_arg,
            "--json",
            json.to_str().unwrap(),
        ]));
        let config = WordCountConfig::from_args(args, false).unwrap();
        assert_eq!(config.source, TextSource::File(text.clone()));
        assert_eq!(config.top_n, DEFAULT_TOP_N);
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert!(config.show_chart);
        assert!(dir.path().join("reports").is_dir());
    }
}
