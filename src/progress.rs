//! Console output for batch runs
//!
//! Provides a live progress bar for copies, a spinner for single long steps
//! (downloads, counting), and the banners, summaries and rankings printed to
//! stdout.

use crate::sorter::{SortProgress, SortReport};
use crate::wordcount::WordCount;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Widest bar drawn by [`print_bar_chart`]
const CHART_WIDTH: usize = 40;

/// Failures listed individually in the sort summary
const MAX_LISTED_FAILURES: usize = 10;

/// Progress display for a batch
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Bar for a batch of `total` items
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress template")
                .progress_chars("=> "),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Spinner for a step with no known length
    pub fn spinner(status: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(status.to_string());

        Self { bar }
    }

    /// Update the bar from a copy snapshot
    pub fn update(&self, progress: &SortProgress) {
        self.bar.set_length(progress.total);
        self.bar.set_position(progress.completed);

        let mut msg = format!("copied {}", format_size(progress.bytes_copied, BINARY));
        if progress.failed > 0 {
            msg.push_str(&format!(" | failed {}", format_number(progress.failed)));
        }
        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of a sort
pub fn print_sort_header(src: &str, dst: &str, workers: usize, dry_run: bool) {
    print_banner();
    println!("  {} {}", style("Source:").bold(), src);
    println!("  {} {}", style("Destination:").bold(), dst);
    println!("  {} {}", style("Workers:").bold(), workers);
    if dry_run {
        println!("  {} {}", style("Mode:").bold(), style("dry run").yellow());
    }
    println!();
}

/// Print a header at the start of a word count
pub fn print_wordcount_header(source: &str, threads: usize, top_n: usize) {
    print_banner();
    println!("  {} {}", style("Source:").bold(), source);
    println!("  {} {}", style("Threads:").bold(), threads);
    println!("  {} {}", style("Top:").bold(), top_n);
    println!();
}

fn print_banner() {
    println!();
    println!(
        "{} {}",
        style("fanout").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
}

/// Print a summary of a finished sort
pub fn print_sort_summary(report: &SortReport) {
    let duration_secs = report.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        report.total_files as f64 / duration_secs
    } else {
        0.0
    };

    let title = if report.dry_run {
        "Dry Run Complete"
    } else {
        "Sort Complete"
    };

    println!();
    println!("{}", style(title).green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(report.total_files as u64)
    );
    if !report.dry_run {
        println!(
            "  {} {} ({})",
            style("Copied:").bold(),
            format_number(report.copied),
            format_size(report.bytes_copied, BINARY)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );

    if !report.buckets.is_empty() {
        println!("  {}", style("Buckets:").bold());
        let width = report.buckets.keys().map(|b| b.chars().count()).max().unwrap_or(0);
        for (bucket, count) in &report.buckets {
            println!("    {:<width$}  {}", bucket, format_number(*count), width = width);
        }
    }

    if report.skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(report.skipped)
        );
    }

    if report.failed() > 0 {
        println!(
            "  {} {}",
            style("Failed:").red().bold(),
            format_number(report.failed() as u64)
        );
        for outcome in report.failures.iter().take(MAX_LISTED_FAILURES) {
            println!(
                "    {} {}",
                style(outcome.source().display()).dim(),
                outcome.reason().unwrap_or("")
            );
        }
        if report.failed() > MAX_LISTED_FAILURES {
            println!(
                "    {}",
                style(format!("... and {} more", report.failed() - MAX_LISTED_FAILURES)).dim()
            );
        }
    }
    println!();
}

/// Print the ranking as an aligned table
pub fn print_ranking(ranking: &[WordCount]) {
    println!();
    if ranking.is_empty() {
        println!("{}", style("No words to rank").yellow());
        println!();
        return;
    }

    println!("{}", style("Top Words").green().bold());
    println!("{}", style("─".repeat(50)).dim());

    let rank_width = ranking.len().to_string().len();
    let word_width = ranking
        .iter()
        .map(|w| w.word.chars().count())
        .max()
        .unwrap_or(0);

    for (i, entry) in ranking.iter().enumerate() {
        println!(
            "  {:>rank_width$}. {:<word_width$}  {}",
            i + 1,
            entry.word,
            format_number(entry.count),
            rank_width = rank_width,
            word_width = word_width,
        );
    }
    println!();
}

/// Print a horizontal bar chart of the ranking
pub fn print_bar_chart(ranking: &[WordCount]) {
    if ranking.is_empty() {
        return;
    }

    println!("{}", style("Frequency").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    for line in chart_lines(ranking, CHART_WIDTH) {
        println!("  {}", line);
    }
    println!();
}

/// Render chart rows; bars scale to the largest count
fn chart_lines(ranking: &[WordCount], width: usize) -> Vec<String> {
    let max = ranking.iter().map(|w| w.count).max().unwrap_or(0);
    let word_width = ranking
        .iter()
        .map(|w| w.word.chars().count())
        .max()
        .unwrap_or(0);

    ranking
        .iter()
        .map(|entry| {
            let len = if max == 0 {
                0
            } else {
                ((entry.count as f64 / max as f64) * width as f64).round() as usize
            };
            format!(
                "{:<word_width$} │{} {}",
                entry.word,
                "█".repeat(len.max(1)),
                entry.count,
                word_width = word_width,
            )
        })
        .collect()
}
