//! fanout - bounded-concurrency batch tools
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use fanout::chart::render_top_words;
use clap::Parser;
use fanout::config::{CliArgs, Command, SortConfig, TextSource, WordCountConfig};
use fanout::error::{FetchError, SortError};
use fanout::fetch::{fetch_text, read_text_file, FetchConfig};
use fanout::logging;
use fanout::progress::{
    print_bar_chart, print_ranking, print_sort_header, print_sort_summary,
    print_wordcount_header, ProgressReporter,
};
use fanout::report::RankingReport;
use fanout::sorter::BucketSorter;
use fanout::wordcount::{tally_words, StopWords};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit status when the text could not be acquired
const EXIT_ACQUISITION: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<FetchError>().is_some() {
                ExitCode::from(EXIT_ACQUISITION)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    logging::init(&args.log_settings());

    match args.command {
        Command::Sort(sort_args) => {
            let config =
                SortConfig::from_args(sort_args, args.quiet).context("Invalid configuration")?;
            run_sort(config)
        }
        Command::Wordcount(count_args) => {
            let config = WordCountConfig::from_args(count_args, args.quiet)
                .context("Invalid configuration")?;
            run_wordcount(config)
        }
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")
}

fn run_sort(config: SortConfig) -> Result<()> {
    let params = config.params;

    if config.show_progress {
        print_sort_header(
            &params.src.display().to_string(),
            &params.dst.display().to_string(),
            params.workers,
            params.dry_run,
        );
    }

    let progress = config.show_progress.then(|| ProgressReporter::new(0));
    if let Some(ref p) = progress {
        p.set_status("Scanning source tree...");
    }

    let mut sorter = BucketSorter::new(params);
    if let Some(ref p) = progress {
        let p = p.clone();
        sorter = sorter.with_progress(move |snapshot| p.update(&snapshot));
    }

    let runtime = build_runtime()?;
    let report = runtime
        .block_on(sorter.execute())
        .context("Sort failed")?;

    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    if config.show_progress {
        print_sort_summary(&report);
    }

    if report.failed() > 0 {
        if report.dry_run {
            warn!(failed = report.failed(), "Dry run found files that cannot be sorted");
        } else {
            return Err(SortError::PartialCopyFailure {
                failed: report.failed(),
                total: report.total_files,
            })
            .context("Sort failed");
        }
    }

    Ok(())
}

fn run_wordcount(config: WordCountConfig) -> Result<()> {
    let source = config.source.describe();

    if config.show_progress {
        print_wordcount_header(&source, config.threads, config.top_n);
    }

    let text = acquire_text(&config)?;
    let stop_words =
        StopWords::load(config.stop_words.as_deref()).context("Failed to load stop words")?;

    let spinner = config
        .show_progress
        .then(|| ProgressReporter::spinner("Counting words..."));

    let tally = tally_words(&text, config.threads, &stop_words).context("Word count failed")?;
    let ranking = tally.top(config.top_n);

    if let Some(ref s) = spinner {
        s.finish_and_clear();
    }

    info!(ranked = ranking.len(), distinct = tally.len(), "Ranking ready");

    print_ranking(&ranking);
    if config.show_chart {
        print_bar_chart(&ranking);
    }

    if let Some(ref path) = config.figure {
        let title = format!("Top {} words", config.top_n);
        let written = render_top_words(&ranking, path, &title).context("Failed to render chart")?;
        if config.show_progress {
            println!("Chart saved to {}", written.display());
        }
    }

    if let Some(ref path) = config.json_output {
        let report = RankingReport {
            source,
            threads: config.threads,
            top_n: config.top_n,
            total_words: tally.total(),
            distinct_words: tally.len(),
            entries: ranking,
        };
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(())
}

fn acquire_text(config: &WordCountConfig) -> Result<String> {
    match &config.source {
        TextSource::File(path) => Ok(read_text_file(path)?),
        TextSource::Url(url) => {
            let spinner = config
                .show_progress
                .then(|| ProgressReporter::spinner("Downloading text..."));

            let runtime = build_runtime()?;
            let result = runtime.block_on(fetch_text(url, &FetchConfig::default()));

            if let Some(ref s) = spinner {
                match result {
                    Ok(ref text) => s.finish(&format!("Downloaded {} characters", text.len())),
                    Err(_) => s.finish_and_clear(),
                }
            }

            Ok(result?)
        }
    }
}
