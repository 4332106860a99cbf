//! # Output Module
//!
//! This module centralizes all user-facing output for path-annotate.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation
//!
//! [`Console`] is the only writer. It is created once from the resolved
//! verbosity and color choice and handed to the annotator as its
//! [`OutcomeSink`].

use std::path::Path;

use owo_colors::{OwoColorize, Style};

use crate::logging::Verbosity;
use crate::report::{FileOutcome, HeaderDecision, OutcomeSink, Report};

/// Symbols used in output
pub mod symbols {
  /// Header inserted
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Skipped
  pub const SKIPPED: &str = "-";
  /// Header updated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
  /// Header already correct
  pub const UNCHANGED: &str = "=";
}

/// Prefix for every change line in a dry run.
pub const DRY_RUN_PREFIX: &str = "[DRY RUN]";

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Terminal writer with a fixed verbosity and color choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
  verbosity: Verbosity,
  color: bool,
}

impl Console {
  /// Creates a console.
  ///
  /// # Parameters
  ///
  /// * `verbosity` - How much to print
  /// * `color` - Whether to emit ANSI colors (already resolved)
  pub const fn new(verbosity: Verbosity, color: bool) -> Self {
    Self { verbosity, color }
  }

  fn paint(&self, text: &str, style: Style) -> String {
    if self.color {
      text.style(style).to_string()
    } else {
      text.to_string()
    }
  }

  /// Formats the per-file line for an outcome, or `None` if the outcome is
  /// not shown at this verbosity.
  ///
  /// Errors are always shown. Changes are shown with `-v`, unchanged and
  /// skipped files with `-vv`.
  pub fn outcome_line(&self, outcome: &FileOutcome, dry_run: bool) -> Option<String> {
    if let Some(error) = &outcome.error {
      return Some(format!(
        "{} {}: {}",
        self.paint(symbols::FAILURE, Style::new().red().bold()),
        outcome.rel_path,
        error
      ));
    }

    let decision = outcome.decision?;
    let signature = outcome.signature.as_deref().unwrap_or("-");

    let line = match decision {
      HeaderDecision::Insert | HeaderDecision::Update if self.verbosity.is_verbose() => {
        let (symbol, style, verb) = match (decision, dry_run) {
          (HeaderDecision::Insert, false) => (symbols::SUCCESS, Style::new().green(), "Inserted header"),
          (HeaderDecision::Insert, true) => (symbols::SUCCESS, Style::new().green(), "Would insert header"),
          (_, false) => (symbols::UPDATED, Style::new().yellow(), "Updated header"),
          (_, true) => (symbols::UPDATED, Style::new().yellow(), "Would update header"),
        };
        let line = format!(
          "{} {}: {} [{}]",
          self.paint(symbol, style),
          verb,
          outcome.rel_path,
          signature
        );
        if dry_run {
          format!("{} {}", self.paint(DRY_RUN_PREFIX, Style::new().cyan()), line)
        } else {
          line
        }
      }
      HeaderDecision::NoOp if self.verbosity >= Verbosity::Trace => format!(
        "{} Unchanged: {} [{}]",
        self.paint(symbols::UNCHANGED, Style::new().dimmed()),
        outcome.rel_path,
        signature
      ),
      HeaderDecision::Skip if self.verbosity >= Verbosity::Trace => {
        let reason = outcome
          .skip_reason
          .as_ref()
          .map_or_else(|| "skipped".to_string(), ToString::to_string);
        format!(
          "{} Skipped: {} ({})",
          self.paint(symbols::SKIPPED, Style::new().dimmed()),
          self.paint(&outcome.rel_path, Style::new().dimmed()),
          reason
        )
      }
      _ => return None,
    };

    Some(line)
  }

  /// Formats the summary table.
  pub fn summary_table(&self, report: &Report) -> String {
    let counts = &report.counts;
    let title = if report.dry_run {
      format!("Summary {}", DRY_RUN_PREFIX)
    } else {
      "Summary".to_string()
    };

    let error_style = if counts.errored > 0 {
      Style::new().red().bold()
    } else {
      Style::new().cyan()
    };

    let rows = [
      ("Files scanned", counts.scanned, Style::new()),
      ("Excluded", counts.excluded, Style::new().dimmed()),
      ("Unmatched", counts.unmatched, Style::new().dimmed()),
      ("Matched", counts.matched, Style::new()),
      ("Inserted", counts.inserted, Style::new().green()),
      ("Updated", counts.updated, Style::new().yellow()),
      ("Unchanged", counts.unchanged, Style::new().cyan()),
      ("Errors", counts.errored, error_style),
    ];

    let mut table = format!("{}\n", self.paint(&title, Style::new().bold()));
    for (label, value, style) in rows {
      table.push_str(&format!(
        "  {:<14}{}\n",
        format!("{}:", label),
        self.paint(&format!("{:>6}", value), style)
      ));
    }
    table.push_str(&format!(
      "  {:<14}{:>6}\n",
      "Time:",
      format!("{:.2}s", report.elapsed.as_secs_f64())
    ));

    let errored: Vec<&FileOutcome> = report.errors().collect();
    if !errored.is_empty() {
      table.push_str(&format!(
        "\n{} {} {} failed:\n",
        self.paint(symbols::FAILURE, Style::new().red()),
        errored.len(),
        if errored.len() == 1 { "file" } else { "files" }
      ));
      for outcome in errored {
        let message = outcome.error.as_ref().map(ToString::to_string).unwrap_or_default();
        table.push_str(&format!("  {}: {}\n", outcome.rel_path, message));
      }
    }

    table
  }

  /// Formats the list of changed files, truncated unless verbose.
  pub fn changed_files(&self, report: &Report) -> Option<String> {
    let changed: Vec<&FileOutcome> = report.changes().collect();
    if changed.is_empty() {
      return None;
    }

    let count = changed.len();
    let verb = if report.dry_run { "Would annotate" } else { "Annotated" };
    let mut text = format!(
      "{} {} {} {}:\n",
      self.paint(symbols::SUCCESS, Style::new().green()),
      verb,
      count,
      if count == 1 { "file" } else { "files" }
    );

    let limit = if self.verbosity.is_verbose() {
      count
    } else {
      DEFAULT_FILE_LIST_LIMIT
    };

    for outcome in changed.iter().take(limit) {
      let marker = if outcome.decision == Some(HeaderDecision::Update) {
        symbols::UPDATED
      } else {
        "+"
      };
      text.push_str(&format!("  {} {}\n", marker, outcome.rel_path));
    }

    if count > limit {
      text.push_str(&format!(
        "  {} ... and {} more (use -v to see all)\n",
        self.paint("", Style::new().dimmed()),
        count - limit
      ));
    }

    Some(text)
  }

  /// Prints the summary table to stdout (suppressed by `-q`).
  pub fn print_summary(&self, report: &Report) {
    if self.verbosity.is_quiet() {
      return;
    }

    if let Some(changed) = self.changed_files(report)
      && !self.verbosity.is_verbose()
    {
      println!("{}", changed);
    }
    print!("{}", self.summary_table(report));
  }

  /// Prints an informational message to stdout (suppressed by `-q`).
  pub fn info(&self, message: &str) {
    if !self.verbosity.is_quiet() {
      println!("{}", self.paint(message, Style::new().yellow()));
    }
  }

  /// Prints an error to stderr. Never suppressed.
  pub fn error(&self, message: &str) {
    eprintln!("{} {}", self.paint("ERROR:", Style::new().red().bold()), message);
  }
}

impl OutcomeSink for Console {
  fn on_start(&self, root: &Path, dry_run: bool) {
    if self.verbosity.is_verbose() {
      eprintln!("Scanning {}", root.display());
    }
    if dry_run && !self.verbosity.is_quiet() {
      println!(
        "{} No files will be modified.",
        self.paint(DRY_RUN_PREFIX, Style::new().cyan())
      );
    }
  }

  fn on_outcome(&self, outcome: &FileOutcome, dry_run: bool) {
    let Some(line) = self.outcome_line(outcome, dry_run) else {
      return;
    };

    if outcome.is_error() {
      eprintln!("{}", line);
    } else {
      println!("{}", line);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::time::Duration;

  use super::*;
  use crate::matcher::SkipReason;
  use crate::processor::FileError;

  fn processed(rel_path: &str, decision: HeaderDecision) -> FileOutcome {
    FileOutcome::processed(
      PathBuf::from("/root").join(rel_path),
      rel_path.to_string(),
      "python".to_string(),
      decision,
      decision.is_change(),
    )
  }

  fn plain(verbosity: Verbosity) -> Console {
    Console::new(verbosity, false)
  }

  #[test]
  fn test_change_lines_need_verbose() {
    let outcome = processed("src/a.py", HeaderDecision::Insert);
    assert!(plain(Verbosity::Normal).outcome_line(&outcome, false).is_none());
    assert_eq!(
      plain(Verbosity::Verbose).outcome_line(&outcome, false).as_deref(),
      Some("\u{2713} Inserted header: src/a.py [python]")
    );
  }

  #[test]
  fn test_dry_run_lines_are_prefixed() {
    let outcome = processed("src/a.py", HeaderDecision::Update);
    assert_eq!(
      plain(Verbosity::Verbose).outcome_line(&outcome, true).as_deref(),
      Some("[DRY RUN] \u{21bb} Would update header: src/a.py [python]")
    );
  }

  #[test]
  fn test_unchanged_and_skipped_need_trace() {
    let unchanged = processed("src/a.py", HeaderDecision::NoOp);
    let skipped = FileOutcome::skipped(
      PathBuf::from("/root/build/x.py"),
      "build/x.py".to_string(),
      SkipReason::GlobalExclude,
    );

    assert!(plain(Verbosity::Verbose).outcome_line(&unchanged, false).is_none());
    assert!(plain(Verbosity::Verbose).outcome_line(&skipped, false).is_none());
    assert_eq!(
      plain(Verbosity::Trace).outcome_line(&skipped, false).as_deref(),
      Some("- Skipped: build/x.py (global exclude)")
    );
  }

  #[test]
  fn test_errors_always_shown() {
    let outcome = FileOutcome::failed(
      PathBuf::from("/root/a.py"),
      "a.py".to_string(),
      Some("python".to_string()),
      Some(HeaderDecision::Insert),
      FileError::Write {
        path: PathBuf::from("/root/a.py"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
      },
    );

    let line = plain(Verbosity::Quiet)
      .outcome_line(&outcome, false)
      .expect("errors are shown");
    assert!(line.starts_with("\u{2717} a.py: Failed to write"));
  }

  #[test]
  fn test_summary_table_counts() {
    let mut report = Report::new(true);
    report.record(processed("a.py", HeaderDecision::Insert));
    report.record(processed("b.py", HeaderDecision::NoOp));
    report.finish(Duration::from_millis(10));

    let table = plain(Verbosity::Normal).summary_table(&report);
    assert!(table.starts_with("Summary [DRY RUN]\n"));
    assert!(table.contains("  Files scanned:     2\n"));
    assert!(table.contains("  Inserted:          1\n"));
    assert!(table.contains("  Errors:            0\n"));
    assert!(!table.contains("failed:"));
  }

  #[test]
  fn test_changed_files_truncated() {
    let mut report = Report::new(false);
    for i in 0..25 {
      report.record(processed(&format!("f{:02}.py", i), HeaderDecision::Insert));
    }
    report.finish(Duration::ZERO);

    let text = plain(Verbosity::Normal).changed_files(&report).expect("changes");
    assert!(text.contains("Annotated 25 files:"));
    assert!(text.contains("... and 5 more (use -v to see all)"));

    let all = plain(Verbosity::Verbose).changed_files(&report).expect("changes");
    assert!(!all.contains("more"));
  }

  #[test]
  fn test_no_changes_no_list() {
    let mut report = Report::new(false);
    report.record(processed("a.py", HeaderDecision::NoOp));
    assert!(plain(Verbosity::Normal).changed_files(&report).is_none());
  }
}
