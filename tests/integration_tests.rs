//! Integration tests for fanout
//!
//! These tests drive both batch paths end to end against temporary
//! directories.

use fanout::error::{FanoutError, SortError};
use fanout::report::RankingReport;
use fanout::sorter::{sort_folder, BucketSorter, SortParams, NO_EXT_BUCKET};
use fanout::wordcount::{mapreduce_count, tally_words, StopWords, WordCount};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn build_tree(root: &Path) {
    write(root, "a.txt", "alpha");
    write(root, "nested/b.TXT", "bravo");
    write(root, "c", "charlie");
    write(root, "nested/deep/d.docx", "delta");
}

#[tokio::test]
async fn test_sort_end_to_end() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    build_tree(src.path());

    let report = sort_folder(SortParams::new(src.path(), dst.path()).workers(2))
        .await
        .unwrap();

    assert_eq!(report.total_files, 4);
    assert_eq!(report.copied, 4);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.buckets.get("txt"), Some(&2));
    assert_eq!(report.buckets.get("docx"), Some(&1));
    assert_eq!(report.buckets.get(NO_EXT_BUCKET), Some(&1));

    assert_eq!(sorted_names(dst.path()), vec!["docx", "no_ext", "txt"]);
    assert_eq!(sorted_names(&dst.path().join("txt")), vec!["a.txt", "b.TXT"]);
    assert_eq!(
        fs::read_to_string(dst.path().join("no_ext/c")).unwrap(),
        "charlie"
    );
    assert_eq!(
        fs::read_to_string(dst.path().join("docx/d.docx")).unwrap(),
        "delta"
    );

    // Sources are copied, not moved
    assert!(src.path().join("nested/deep/d.docx").exists());
}

#[tokio::test]
async fn test_dry_run_then_real_copy() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    build_tree(src.path());

    let planned = sort_folder(SortParams::new(src.path(), dst.path()).dry_run(true))
        .await
        .unwrap();

    assert!(planned.dry_run);
    assert_eq!(planned.copied, 0);
    assert_eq!(planned.bucket_total(), 4);
    assert_eq!(sorted_names(dst.path()), vec!["docx", "no_ext", "txt"]);
    for bucket in ["docx", "no_ext", "txt"] {
        let dir = dst.path().join(bucket);
        assert!(dir.is_dir(), "{} missing", bucket);
        assert!(sorted_names(&dir).is_empty(), "{} not empty after dry run", bucket);
    }

    let copied = sort_folder(SortParams::new(src.path(), dst.path()))
        .await
        .unwrap();

    assert!(!copied.dry_run);
    assert_eq!(copied.buckets, planned.buckets);
    assert_eq!(copied.copied, 4);
    assert_eq!(sorted_names(&dst.path().join("txt")), vec!["a.txt", "b.TXT"]);
    assert_eq!(sorted_names(&dst.path().join("docx")), vec!["d.docx"]);
    assert_eq!(sorted_names(&dst.path().join("no_ext")), vec!["c"]);
}

#[tokio::test]
async fn test_bucket_counts_cover_every_file() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    for i in 0..50 {
        let ext = ["rs", "md", "json", ""][i % 4];
        let name = if ext.is_empty() {
            format!("dir{}/file{}", i % 3, i)
        } else {
            format!("dir{}/file{}.{}", i % 3, i, ext)
        };
        write(src.path(), &name, "x");
    }

    let report = BucketSorter::new(SortParams::new(src.path(), dst.path()).workers(7))
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_files, 50);
    assert_eq!(report.bucket_total(), 50);
    assert_eq!(report.copied, 50);
}

#[tokio::test]
async fn test_empty_source() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();

    let report = sort_folder(SortParams::new(src.path(), dst.path().join("out")))
        .await
        .unwrap();

    assert_eq!(report.total_files, 0);
    assert!(report.buckets.is_empty());
    assert!(dst.path().join("out").is_dir());
}

#[tokio::test]
async fn test_sort_error_converts_to_fanout_error() {
    let dir = tempdir().unwrap();
    let err = sort_folder(SortParams::new(dir.path().join("missing"), dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, SortError::SourceMissing { .. }));

    let top: FanoutError = err.into();
    assert!(top.to_string().contains("does not exist"));
}

#[test]
fn test_wordcount_end_to_end_with_stop_words() {
    let dir = tempdir().unwrap();
    let stop = dir.path().join("stop.txt");
    fs::write(&stop, "the\nA\n\n  an  \n").unwrap();

    let text = "The dog saw a cat. The cat saw the dog; an owl saw both!";
    let top = mapreduce_count(text, 3, Some(&stop), 3).unwrap();

    assert_eq!(
        top,
        vec![
            WordCount {
                word: "saw".into(),
                count: 3
            },
            WordCount {
                word: "dog".into(),
                count: 2
            },
            WordCount {
                word: "cat".into(),
                count: 2
            },
        ]
    );
}

#[test]
fn test_wordcount_missing_stop_word_file_filters_nothing() {
    let dir = tempdir().unwrap();
    let top = mapreduce_count("the the dog", 2, Some(&dir.path().join("absent.txt")), 1).unwrap();
    assert_eq!(top[0].word, "the");
    assert_eq!(top[0].count, 2);
}

#[test]
fn test_ranking_report_from_tally() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("top.json");

    let tally = tally_words("b a b c b a", 4, &StopWords::empty()).unwrap();
    let report = RankingReport {
        source: "inline".into(),
        threads: 4,
        top_n: 2,
        total_words: tally.total(),
        distinct_words: tally.len(),
        entries: tally.top(2),
    };
    report.write_json(&path).unwrap();

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"total_words\": 6"));
    assert!(json.contains("\"word\": \"b\""));
    assert!(!json.contains("\"word\": \"c\""));
}
