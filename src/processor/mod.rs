//! # Processor Module
//!
//! This module contains the core of path-annotate: walking the scan root,
//! routing files to signatures, and inserting or updating path headers.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - Encoding-aware reads and atomic writes
//! - [`header`] - Header slot classification and content edits
//! - [`file_collector`] - Directory traversal and path normalization
//!
//! The [`Annotator`] struct is the main entry point, orchestrating the
//! submodules. Matched files are processed by a bounded pool of blocking
//! workers; a single collector folds their outcomes into the [`Report`].

mod file_collector;
mod file_io;
mod header;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub use file_collector::{CollectedEntry, FileCollector, normalize_relative_path, relative_path_string};
pub use file_io::{DecodedText, FileIO, TextEncoding};
use futures::StreamExt;
pub use header::{HeaderEdit, NewlineStyle, PathStyle, canonical_header, classify, is_stale_header};
use tracing::{debug, trace};

use crate::config::{Config, ConfigError, Signature};
use crate::ignore::ExcludeSet;
use crate::matcher::{MatchResult, SignatureMatcher};
use crate::report::{FileOutcome, HeaderDecision, OutcomeSink, Report, SilentSink};

/// Per-file error. Recorded on the file's outcome; never aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
  /// The file (or a directory on the way to it) could not be read.
  #[error("Failed to read '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The file's byte-order marker promises an encoding its content does not
  /// honor.
  #[error("Failed to decode '{path}': {message}")]
  Decode { path: PathBuf, message: String },

  /// The file could not be replaced.
  #[error("Failed to write '{path}': {source}")]
  Write { path: PathBuf, source: std::io::Error },
}

/// A matched file handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
  /// Absolute path.
  pub path: PathBuf,
  /// Root-relative, forward-slash path.
  pub rel_path: String,
  /// Name of the matched signature.
  pub signature: String,
  /// Comment token of the matched signature.
  pub comment_prefix: String,
  /// Required suffix of the matched signature.
  pub required_suffix: Option<String>,
}

impl FileTask {
  /// Creates a task for a file matched by `signature`.
  pub fn new(path: PathBuf, rel_path: String, signature: &Signature) -> Self {
    Self {
      path,
      rel_path,
      signature: signature.name.clone(),
      comment_prefix: signature.comment_prefix.clone(),
      required_suffix: signature.required_suffix.clone(),
    }
  }
}

/// Options that affect how a single file is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
  /// Classify only; never write.
  pub dry_run: bool,
  /// How the path is rendered in the header.
  pub path_style: PathStyle,
}

/// Reads, classifies and (unless dry-running) rewrites one file.
///
/// Failures are captured in the returned outcome.
pub fn process_file(task: &FileTask, options: ProcessOptions) -> FileOutcome {
  let mut decided = None;

  match annotate(task, options, &mut decided) {
    Ok(written) => FileOutcome::processed(
      task.path.clone(),
      task.rel_path.clone(),
      task.signature.clone(),
      decided.unwrap_or(HeaderDecision::NoOp),
      written,
    ),
    Err(error) => {
      debug!("Error processing {}: {}", task.rel_path, error);
      FileOutcome::failed(
        task.path.clone(),
        task.rel_path.clone(),
        Some(task.signature.clone()),
        decided,
        error,
      )
    }
  }
}

/// Returns whether the file was written. `decided` is filled in as soon as
/// the header decision is known, so a failed write still reports it.
fn annotate(task: &FileTask, options: ProcessOptions, decided: &mut Option<HeaderDecision>) -> Result<bool, FileError> {
  let text = FileIO::read_text(&task.path)?;
  let newline = NewlineStyle::detect(&text.bytes);
  let header = canonical_header(&task.comment_prefix, &task.rel_path, options.path_style);
  let edit = classify(&text.bytes, &header, &task.comment_prefix, task.required_suffix.as_deref());
  *decided = Some(edit.decision);

  let Some(updated) = edit.apply(&text.bytes, &header, newline) else {
    trace!("{}: header already correct", task.rel_path);
    return Ok(false);
  };

  if options.dry_run {
    trace!("{}: would {} header (dry run)", task.rel_path, edit.decision.label());
    return Ok(false);
  }

  trace!(
    "{}: {} header ({:?}, {})",
    task.rel_path,
    edit.decision.label(),
    text.encoding,
    newline.name()
  );
  FileIO::write_text(&task.path, text.encoding, &updated)?;
  Ok(true)
}

/// Configuration for creating an Annotator instance.
pub struct AnnotatorConfig {
  /// Directory to scan. Relative paths in headers are computed against it.
  pub root: PathBuf,
  /// Loaded signatures.
  pub config: Config,

  // Behavior flags
  pub dry_run: bool,
  pub path_style: PathStyle,

  /// Gitignore-style patterns applied before any signature is considered.
  pub global_excludes: Vec<String>,
  /// Number of parallel workers. `None` uses the number of CPUs.
  pub concurrency: Option<usize>,
  /// Receives every outcome as it is recorded.
  pub sink: Option<Arc<dyn OutcomeSink>>,
}

impl AnnotatorConfig {
  /// Creates a new AnnotatorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// AnnotatorConfig {
  ///     dry_run: true,
  ///     ..AnnotatorConfig::new(root, config)
  /// }
  /// ```
  pub fn new(root: PathBuf, config: Config) -> Self {
    Self {
      root,
      config,
      dry_run: false,
      path_style: PathStyle::Relative,
      global_excludes: vec![],
      concurrency: None,
      sink: None,
    }
  }
}

/// Walks a root directory and keeps a path header at the top of every file a
/// signature matches.
pub struct Annotator {
  root: PathBuf,
  config: Config,
  global_excludes: ExcludeSet,
  options: ProcessOptions,
  concurrency: usize,
  sink: Arc<dyn OutcomeSink>,
}

impl Annotator {
  /// Creates a new annotator.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] if the root is not an existing directory or a
  /// global exclude pattern does not compile.
  pub fn new(config: AnnotatorConfig) -> Result<Self, ConfigError> {
    // Header paths and anchored excludes are computed against this root.
    let root = match config.root.canonicalize() {
      Ok(root) if root.is_dir() => root,
      _ => return Err(ConfigError::InvalidRoot { path: config.root }),
    };

    let global_excludes =
      ExcludeSet::new(&config.global_excludes).map_err(|source| ConfigError::InvalidExclude {
        scope: "global excludes".to_string(),
        source,
      })?;

    let concurrency = config.concurrency.unwrap_or_else(num_cpus::get).max(1);

    Ok(Self {
      root,
      config: config.config,
      global_excludes,
      options: ProcessOptions {
        dry_run: config.dry_run,
        path_style: config.path_style,
      },
      concurrency,
      sink: config.sink.unwrap_or_else(|| Arc::new(SilentSink)),
    })
  }

  /// The scan root.
  pub fn root(&self) -> &std::path::Path {
    &self.root
  }

  /// Number of parallel workers.
  pub const fn concurrency(&self) -> usize {
    self.concurrency
  }

  /// Runs the annotator over the whole root.
  ///
  /// Per-file failures are recorded in the report and never abort the run.
  pub async fn run(&self) -> Report {
    let start_time = Instant::now();
    let mut report = Report::new(self.options.dry_run);
    self.sink.on_start(&self.root, self.options.dry_run);

    let tasks = self.scan(&mut report);
    debug!(
      "Dispatching {} matched files to {} workers",
      tasks.len(),
      self.concurrency
    );

    let options = self.options;
    let mut outcomes = futures::stream::iter(tasks)
      .map(|task| async move {
        let path = task.path.clone();
        let rel_path = task.rel_path.clone();
        let signature = task.signature.clone();

        match tokio::task::spawn_blocking(move || process_file(&task, options)).await {
          Ok(outcome) => outcome,
          Err(join_error) => FileOutcome::failed(
            path.clone(),
            rel_path,
            Some(signature),
            None,
            FileError::Read {
              path,
              source: std::io::Error::other(format!("worker failed: {}", join_error)),
            },
          ),
        }
      })
      .buffer_unordered(self.concurrency);

    while let Some(outcome) = outcomes.next().await {
      self.record(&mut report, outcome);
    }

    report.finish(start_time.elapsed());
    debug!(
      "Run finished in {}ms: {} changes, {} errors",
      report.elapsed.as_millis(),
      report.total_changes(),
      report.total_errors()
    );

    report
  }

  /// Walks the root, records skipped and unreadable entries directly, and
  /// returns the matched files.
  fn scan(&self, report: &mut Report) -> Vec<FileTask> {
    let matcher = SignatureMatcher::new(&self.config, &self.global_excludes);
    let mut tasks = Vec::new();

    for entry in FileCollector::new(self.root.clone()).collect() {
      match entry {
        CollectedEntry::File { path, rel_path } => match matcher.match_path(&rel_path) {
          MatchResult::Matched(signature) => tasks.push(FileTask::new(path, rel_path, signature)),
          MatchResult::Skipped(reason) => {
            trace!("Skipping {}: {}", rel_path, reason);
            self.record(report, FileOutcome::skipped(path, rel_path, reason));
          }
        },
        CollectedEntry::Unreadable { path, rel_path, source } => {
          let error = FileError::Read {
            path: path.clone(),
            source,
          };
          self.record(report, FileOutcome::failed(path, rel_path, None, None, error));
        }
      }
    }

    tasks
  }

  fn record(&self, report: &mut Report, outcome: FileOutcome) {
    self.sink.on_outcome(&outcome, self.options.dry_run);
    report.record(outcome);
  }
}
