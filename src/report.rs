//! # Report Module
//!
//! This module folds per-file outcomes into the run report and turns a report
//! into an exit classification or a machine-readable file (JSON, CSV).
//!
//! Outcomes arrive in completion order from the worker pool; the report sorts
//! them by relative path when the run finishes so that every presentation is
//! reproducible regardless of concurrency.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::matcher::SkipReason;
use crate::processor::FileError;

/// What the annotator decided for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderDecision {
  /// No header was recognized; one is inserted.
  Insert,
  /// A header for this comment prefix exists but names the wrong path.
  Update,
  /// The header is already correct.
  #[serde(rename = "noop")]
  NoOp,
  /// No signature matched, or the file was excluded.
  Skip,
}

impl HeaderDecision {
  /// Whether the decision modifies the file.
  pub const fn is_change(self) -> bool {
    matches!(self, HeaderDecision::Insert | HeaderDecision::Update)
  }

  /// Lowercase name used in reports.
  pub const fn label(self) -> &'static str {
    match self {
      HeaderDecision::Insert => "insert",
      HeaderDecision::Update => "update",
      HeaderDecision::NoOp => "noop",
      HeaderDecision::Skip => "skip",
    }
  }
}

/// The terminal state of one file.
#[derive(Debug)]
pub struct FileOutcome {
  /// Absolute path.
  pub path: PathBuf,
  /// Root-relative, forward-slash path.
  pub rel_path: String,
  /// Name of the matched signature.
  pub signature: Option<String>,
  /// The header decision. `None` when the file failed before it could be
  /// classified.
  pub decision: Option<HeaderDecision>,
  /// Why the file was skipped.
  pub skip_reason: Option<SkipReason>,
  /// Whether the file was rewritten on disk.
  pub written: bool,
  /// The per-file error, if processing failed.
  pub error: Option<FileError>,
}

impl FileOutcome {
  /// A file that was not handed to any signature.
  pub const fn skipped(path: PathBuf, rel_path: String, reason: SkipReason) -> Self {
    Self {
      path,
      rel_path,
      signature: None,
      decision: Some(HeaderDecision::Skip),
      skip_reason: Some(reason),
      written: false,
      error: None,
    }
  }

  /// A matched file that was classified (and possibly written).
  pub const fn processed(
    path: PathBuf,
    rel_path: String,
    signature: String,
    decision: HeaderDecision,
    written: bool,
  ) -> Self {
    Self {
      path,
      rel_path,
      signature: Some(signature),
      decision: Some(decision),
      skip_reason: None,
      written,
      error: None,
    }
  }

  /// A file whose processing failed.
  pub const fn failed(
    path: PathBuf,
    rel_path: String,
    signature: Option<String>,
    decision: Option<HeaderDecision>,
    error: FileError,
  ) -> Self {
    Self {
      path,
      rel_path,
      signature,
      decision,
      skip_reason: None,
      written: false,
      error: Some(error),
    }
  }

  /// Whether processing failed.
  pub const fn is_error(&self) -> bool {
    self.error.is_some()
  }

  /// Whether the outcome counts as a change (Insert or Update without error).
  pub fn is_change(&self) -> bool {
    !self.is_error() && self.decision.is_some_and(HeaderDecision::is_change)
  }

  /// Short status label: the decision, or `error`.
  pub fn status_label(&self) -> &'static str {
    match (&self.error, self.decision) {
      (Some(_), _) | (None, None) => "error",
      (None, Some(decision)) => decision.label(),
    }
  }
}

/// Receives outcomes as the orchestrator records them.
///
/// Skipped files are reported during the walk; processed files in completion
/// order. Implementations must not assume any ordering.
pub trait OutcomeSink: Send + Sync {
  /// Called once before the walk starts.
  fn on_start(&self, _root: &Path, _dry_run: bool) {}

  /// Called once per file.
  fn on_outcome(&self, outcome: &FileOutcome, dry_run: bool);
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl OutcomeSink for SilentSink {
  fn on_outcome(&self, _outcome: &FileOutcome, _dry_run: bool) {}
}

/// Aggregate counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
  /// Every regular file the walk produced.
  pub scanned: usize,
  /// Skipped because of a global or per-signature exclude.
  pub excluded: usize,
  /// Skipped because no signature includes the path.
  pub unmatched: usize,
  /// Handed to a signature (including those that later errored).
  pub matched: usize,
  /// Headers inserted.
  pub inserted: usize,
  /// Headers updated.
  pub updated: usize,
  /// Headers already correct.
  pub unchanged: usize,
  /// Files that failed.
  pub errored: usize,
}

/// The result of a run.
#[derive(Debug, Default)]
pub struct Report {
  /// Aggregate counters.
  pub counts: ReportCounts,
  /// Whether writes were suppressed.
  pub dry_run: bool,
  /// Wall-clock duration of the run.
  pub elapsed: Duration,
  outcomes: Vec<FileOutcome>,
}

impl Report {
  /// Creates an empty report.
  pub fn new(dry_run: bool) -> Self {
    Self {
      dry_run,
      ..Self::default()
    }
  }

  /// Folds one outcome into the counters and keeps it.
  pub fn record(&mut self, outcome: FileOutcome) {
    let counts = &mut self.counts;
    counts.scanned += 1;

    if outcome.is_error() {
      counts.errored += 1;
      if outcome.signature.is_some() {
        counts.matched += 1;
      }
    } else {
      match outcome.decision {
        Some(HeaderDecision::Insert) => {
          counts.matched += 1;
          counts.inserted += 1;
        }
        Some(HeaderDecision::Update) => {
          counts.matched += 1;
          counts.updated += 1;
        }
        Some(HeaderDecision::NoOp) => {
          counts.matched += 1;
          counts.unchanged += 1;
        }
        Some(HeaderDecision::Skip) | None => match outcome.skip_reason {
          Some(SkipReason::NoMatch) | None => counts.unmatched += 1,
          Some(_) => counts.excluded += 1,
        },
      }
    }

    self.outcomes.push(outcome);
  }

  /// Orders outcomes by relative path and stores the run duration.
  pub fn finish(&mut self, elapsed: Duration) {
    self.outcomes.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    self.elapsed = elapsed;
  }

  /// All outcomes, ordered by relative path once the run has finished.
  pub fn outcomes(&self) -> &[FileOutcome] {
    &self.outcomes
  }

  /// Looks up the outcome for a relative path.
  pub fn outcome(&self, rel_path: &str) -> Option<&FileOutcome> {
    self.outcomes.iter().find(|outcome| outcome.rel_path == rel_path)
  }

  /// Number of inserts plus updates.
  pub const fn total_changes(&self) -> usize {
    self.counts.inserted + self.counts.updated
  }

  /// Number of files that failed.
  pub const fn total_errors(&self) -> usize {
    self.counts.errored
  }

  /// Outcomes that changed (or would change) a file.
  pub fn changes(&self) -> impl Iterator<Item = &FileOutcome> {
    self.outcomes.iter().filter(|outcome| outcome.is_change())
  }

  /// Outcomes that failed.
  pub fn errors(&self) -> impl Iterator<Item = &FileOutcome> {
    self.outcomes.iter().filter(|outcome| outcome.is_error())
  }
}

/// Exit code for configuration and usage errors raised before scanning.
pub const CONFIG_ERROR_EXIT_CODE: u8 = 1;

/// How a finished run maps onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
  /// No errors, and either no changes or changes are allowed.
  Success,
  /// At least one file failed.
  FileErrors,
  /// `fail_on_change` is set and at least one file changed (or would change).
  ChangesDetected,
}

impl RunStatus {
  /// Classifies a report. File errors take precedence over changes.
  pub const fn classify(report: &Report, fail_on_change: bool) -> Self {
    if report.total_errors() > 0 {
      RunStatus::FileErrors
    } else if fail_on_change && report.total_changes() > 0 {
      RunStatus::ChangesDetected
    } else {
      RunStatus::Success
    }
  }

  /// The process exit code.
  pub const fn exit_code(self) -> u8 {
    match self {
      RunStatus::Success => 0,
      RunStatus::FileErrors => 2,
      RunStatus::ChangesDetected => 3,
    }
  }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl std::fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportFormat::Json => write!(f, "JSON"),
      ReportFormat::Csv => write!(f, "CSV"),
    }
  }
}

/// Error returned when parsing a string into a ReportFormat fails
#[derive(Debug, thiserror::Error)]
#[error("Invalid report format: {0}")]
pub struct ParseReportFormatError(pub String);

impl std::str::FromStr for ReportFormat {
  type Err = ParseReportFormatError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "json" => Ok(ReportFormat::Json),
      "csv" => Ok(ReportFormat::Csv),
      _ => Err(ParseReportFormatError(s.to_string())),
    }
  }
}

/// Serializable view of one outcome.
#[derive(Debug, Serialize)]
struct FileRecord<'a> {
  path: &'a str,
  status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  signature: Option<&'a str>,
  written: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  reason: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl<'a> From<&'a FileOutcome> for FileRecord<'a> {
  fn from(outcome: &'a FileOutcome) -> Self {
    Self {
      path: &outcome.rel_path,
      status: outcome.status_label(),
      signature: outcome.signature.as_deref(),
      written: outcome.written,
      reason: outcome.skip_reason.as_ref().map(ToString::to_string),
      error: outcome.error.as_ref().map(ToString::to_string),
    }
  }
}

/// Serializable summary block.
#[derive(Debug, Serialize)]
struct SummaryRecord {
  #[serde(flatten)]
  counts: ReportCounts,
  total_changes: usize,
  dry_run: bool,
  processing_time_seconds: f64,
  generated_at: String,
}

impl SummaryRecord {
  fn new(report: &Report) -> Self {
    Self {
      counts: report.counts,
      total_changes: report.total_changes(),
      dry_run: report.dry_run,
      processing_time_seconds: report.elapsed.as_secs_f64(),
      generated_at: Local::now().to_rfc3339(),
    }
  }
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
  summary: SummaryRecord,
  files: Vec<FileRecord<'a>>,
}

/// Report Generator for writing run reports to disk
pub struct ReportGenerator<'a> {
  /// Format of the report to generate
  format: ReportFormat,
  /// Path where the report will be saved
  output_path: &'a Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  ///
  /// # Parameters
  ///
  /// * `format` - The format to use for the report
  /// * `output_path` - The path where the report will be saved
  pub const fn new(format: ReportFormat, output_path: &'a Path) -> Self {
    Self { format, output_path }
  }

  /// Render the report and write it to the output path.
  ///
  /// # Errors
  ///
  /// Returns an error if the report cannot be serialized or written.
  pub fn generate(&self, report: &Report) -> Result<()> {
    let content = self.render(report)?;

    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write report to {}", self.output_path.display()))
  }

  /// Render the report without writing it.
  ///
  /// # Errors
  ///
  /// Returns an error if JSON serialization fails.
  pub fn render(&self, report: &Report) -> Result<String> {
    match self.format {
      ReportFormat::Json => Self::render_json(report),
      ReportFormat::Csv => Ok(Self::render_csv(report)),
    }
  }

  fn render_json(report: &Report) -> Result<String> {
    let document = ReportDocument {
      summary: SummaryRecord::new(report),
      files: report.outcomes().iter().map(FileRecord::from).collect(),
    };

    serde_json::to_string_pretty(&document).context("Failed to serialize JSON report")
  }

  fn render_csv(report: &Report) -> String {
    let mut csv = String::from("file_path,status,signature,written,notes\n");

    for outcome in report.outcomes() {
      let record = FileRecord::from(outcome);
      let note = record.error.or(record.reason).unwrap_or_default();
      csv.push_str(&format!(
        "{},{},{},{},{}\n",
        csv_field(record.path),
        record.status,
        csv_field(record.signature.unwrap_or("")),
        record.written,
        csv_field(&note)
      ));
    }

    let counts = &report.counts;
    csv.push_str("\n# Summary\n");
    csv.push_str(&format!("Files scanned,{}\n", counts.scanned));
    csv.push_str(&format!("Excluded,{}\n", counts.excluded));
    csv.push_str(&format!("Unmatched,{}\n", counts.unmatched));
    csv.push_str(&format!("Inserted,{}\n", counts.inserted));
    csv.push_str(&format!("Updated,{}\n", counts.updated));
    csv.push_str(&format!("Unchanged,{}\n", counts.unchanged));
    csv.push_str(&format!("Errors,{}\n", counts.errored));
    csv.push_str(&format!("Dry run,{}\n", report.dry_run));
    csv.push_str(&format!("Generated on,{}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));

    csv
  }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}
