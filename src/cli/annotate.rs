//! # Annotate Command
//!
//! This module implements the annotate command: load the configuration, walk
//! the root, and map the run report onto an exit status.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::{debug, warn};

use path_annotate::config::Config;
use path_annotate::logging::{ColorMode, Verbosity};
use path_annotate::output::Console;
use path_annotate::processor::{Annotator, AnnotatorConfig, PathStyle};
use path_annotate::report::{ReportFormat, ReportGenerator, RunStatus};
use path_annotate::workspace::Workspace;

/// Arguments for the annotate command
#[derive(Args, Debug, Default)]
pub struct AnnotateArgs {
  /// Root directory to scan. Header paths are relative to it.
  #[arg(long, value_name = "DIR")]
  pub root: PathBuf,

  /// Path to the signature configuration file (TOML, or JSON by extension)
  #[arg(long, short = 'c', value_name = "FILE")]
  pub config: PathBuf,

  /// Gitignore-style pattern excluded for every signature (repeatable)
  #[arg(long, short = 'e', value_name = "PATTERN")]
  pub exclude: Vec<String>,

  /// Only consider these signatures (repeatable)
  #[arg(long, short = 's', value_name = "NAME")]
  pub signature: Vec<String>,

  /// Classify files without modifying them
  #[arg(long)]
  pub dry_run: bool,

  /// Exit with status 3 when any file was (or would be) changed
  #[arg(long)]
  pub fail_on_change: bool,

  /// Print a summary table when the run finishes
  #[arg(long)]
  pub print_summary: bool,

  /// Number of files processed in parallel [default: number of CPUs]
  #[arg(long, short = 'j', value_name = "N", value_parser = parse_concurrency)]
  pub concurrency: Option<usize>,

  /// Increase verbosity (-v per-file changes, -vv everything)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(long, value_name = "WHEN", default_value_t = ColorMode::Auto, value_enum)]
  pub color: ColorMode,

  /// Disable colored output (same as --color never)
  #[arg(long)]
  pub no_color: bool,

  /// Write header paths with a leading slash (`# /src/app.py`)
  #[arg(long)]
  pub leading_slash: bool,

  /// Write a JSON report of the run to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Write a CSV report of the run to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,
}

impl AnnotateArgs {
  /// Verbosity derived from `-q` and `-v`.
  pub const fn verbosity(&self) -> Verbosity {
    Verbosity::from_flags(self.quiet, self.verbose)
  }

  /// Color mode after applying `--no-color`.
  pub const fn color_mode(&self) -> ColorMode {
    if self.no_color { ColorMode::Never } else { self.color }
  }

  const fn path_style(&self) -> PathStyle {
    if self.leading_slash {
      PathStyle::LeadingSlash
    } else {
      PathStyle::Relative
    }
  }
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
  match value.parse::<usize>() {
    Ok(0) => Err("concurrency must be at least 1".to_string()),
    Ok(n) => Ok(n),
    Err(e) => Err(format!("invalid number '{}': {}", value, e)),
  }
}

/// Run the annotate command with the given arguments.
///
/// # Errors
///
/// Returns an error for anything that prevents the run from starting: an
/// invalid root, an unreadable or invalid configuration, an unknown signature
/// name, or a bad exclude pattern. Per-file failures are not errors here; they
/// are reflected in the returned [`RunStatus`].
pub async fn run_annotate(args: AnnotateArgs, console: Console) -> Result<RunStatus> {
  let workspace = Workspace::resolve(&args.root)?;

  let config = Config::load(&args.config)?.restrict_to(&args.signature)?;
  if config.enabled().next().is_none() {
    warn!("No enabled signatures in {}; nothing will be annotated", args.config.display());
  }

  let path_style = args.path_style();
  let annotator = Annotator::new(AnnotatorConfig {
    dry_run: args.dry_run,
    path_style,
    global_excludes: args.exclude,
    concurrency: args.concurrency,
    sink: Some(Arc::new(console)),
    ..AnnotatorConfig::new(workspace.into_root(), config)
  })?;

  let report = annotator.run().await;

  if args.print_summary {
    console.print_summary(&report);
  }

  let requested_reports = [
    (ReportFormat::Json, args.report_json.as_ref()),
    (ReportFormat::Csv, args.report_csv.as_ref()),
  ];
  for (format, output_path) in requested_reports {
    let Some(output_path) = output_path else {
      continue;
    };

    let report_generator = ReportGenerator::new(format, output_path);
    if let Err(e) = report_generator.generate(&report) {
      console.error(&format!("Error generating {} report: {:#}", format, e));
    } else {
      console.info(&format!("Generated {} report at {}", format, output_path.display()));
    }
  }

  let status = RunStatus::classify(&report, args.fail_on_change);
  debug!(
    "Exit status {:?}: {} changes, {} errors",
    status,
    report.total_changes(),
    report.total_errors()
  );

  Ok(status)
}

