mod common;

use std::path::Path;

use anyhow::Result;
use path_annotate::processor::AnnotatorConfig;
use path_annotate::report::Report;
use tempfile::tempdir;

use common::{PYTHON_RUST_CONFIG, annotate_with, read_bytes, write_file};

const FILE_COUNT: usize = 60;

/// Populates a tree mixing inserts, updates, no-ops and skips.
fn populate(root: &Path) -> Result<()> {
  for i in 0..FILE_COUNT {
    let dir = format!("pkg{}/sub{}", i % 4, i % 3);
    match i % 5 {
      0 => write_file(root, &format!("{}/mod{}.py", dir, i), format!("x = {}\n", i))?,
      1 => write_file(root, &format!("{}/lib{}.rs", dir, i), "// wrong/place.rs\nfn f() {}\r\n")?,
      2 => write_file(root, &format!("{}/ok{}.py", dir, i), format!("# {}/ok{}.py\n", dir, i))?,
      3 => write_file(root, &format!("{}/run{}.sh", dir, i), "#!/bin/sh\necho $1\n")?,
      _ => write_file(root, &format!("{}/notes{}.txt", dir, i), "plain text\n")?,
    };
  }
  Ok(())
}

async fn run_with(concurrency: usize) -> Result<(tempfile::TempDir, Report)> {
  let root = tempdir()?;
  populate(root.path())?;

  let report = annotate_with(root.path(), PYTHON_RUST_CONFIG, |config| AnnotatorConfig {
    concurrency: Some(concurrency),
    ..config
  })
  .await?;

  Ok((root, report))
}

fn summarize(report: &Report) -> Vec<(String, &'static str, Option<String>)> {
  report
    .outcomes()
    .iter()
    .map(|o| (o.rel_path.clone(), o.status_label(), o.signature.clone()))
    .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_results_independent_of_concurrency() -> Result<()> {
  let (serial_root, serial) = run_with(1).await?;
  let (parallel_root, parallel) = run_with(8).await?;

  assert_eq!(serial.counts, parallel.counts);
  assert_eq!(summarize(&serial), summarize(&parallel));
  assert_eq!(serial.counts.scanned, FILE_COUNT);
  assert_eq!(serial.counts.errored, 0);

  for outcome in serial.outcomes() {
    assert_eq!(
      read_bytes(serial_root.path(), &outcome.rel_path)?,
      read_bytes(parallel_root.path(), &outcome.rel_path)?,
      "content differs for {}",
      outcome.rel_path
    );
  }

  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_outcomes_sorted_and_counts_consistent() -> Result<()> {
  let (_root, report) = run_with(16).await?;

  let paths: Vec<&str> = report.outcomes().iter().map(|o| o.rel_path.as_str()).collect();
  let mut sorted = paths.clone();
  sorted.sort_unstable();
  assert_eq!(paths, sorted);

  let counts = report.counts;
  assert_eq!(counts.scanned, counts.excluded + counts.unmatched + counts.matched);
  assert_eq!(counts.matched, counts.inserted + counts.updated + counts.unchanged + counts.errored);
  assert_eq!(counts.unmatched, FILE_COUNT / 5);
  assert_eq!(counts.updated, FILE_COUNT / 5);
  assert_eq!(counts.unchanged, FILE_COUNT / 5);
  assert_eq!(counts.inserted, 2 * FILE_COUNT / 5);

  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_rerun_is_idempotent() -> Result<()> {
  let (root, _first) = run_with(8).await?;

  let second = annotate_with(root.path(), PYTHON_RUST_CONFIG, |config| AnnotatorConfig {
    concurrency: Some(8),
    ..config
  })
  .await?;

  assert_eq!(second.total_changes(), 0);
  assert_eq!(second.counts.unchanged, second.counts.matched);

  Ok(())
}
