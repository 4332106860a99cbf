use std::io::IsTerminal as _;

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, Layer as _};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// How much the tool prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
  /// Errors only.
  Quiet,
  /// Warnings and the requested summary.
  #[default]
  Normal,
  /// Per-file lines and debug diagnostics.
  Verbose,
  /// Everything, including per-file trace diagnostics.
  Trace,
}

impl Verbosity {
  /// Derives the verbosity from the `-q` flag and the `-v` count.
  ///
  /// `-q` wins over any number of `-v`.
  pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
    match (quiet, verbose) {
      (true, _) => Verbosity::Quiet,
      (false, 0) => Verbosity::Normal,
      (false, 1) => Verbosity::Verbose,
      (false, _) => Verbosity::Trace,
    }
  }

  /// Whether per-file lines are printed.
  pub fn is_verbose(self) -> bool {
    self >= Verbosity::Verbose
  }

  /// Whether informational output is suppressed.
  pub fn is_quiet(self) -> bool {
    self == Verbosity::Quiet
  }

  /// Default `tracing` filter for this verbosity.
  pub const fn filter_directive(self) -> &'static str {
    match self {
      Verbosity::Quiet => "error",
      Verbosity::Normal => "warn",
      Verbosity::Verbose => "path_annotate=debug",
      Verbosity::Trace => "path_annotate=trace",
    }
  }
}

/// Enum representing the color mode options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
  /// Automatically determine whether to use colors based on TTY detection
  #[default]
  Auto,
  /// Never use colors
  Never,
  /// Always use colors
  Always,
}

impl ColorMode {
  /// Decides once, at startup, whether output is colored.
  ///
  /// `Auto` colors only when stdout is a terminal and `NO_COLOR` is unset.
  pub fn resolve(self) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    self.resolve_with(std::io::stdout().is_terminal(), no_color_env)
  }

  /// [`ColorMode::resolve`] with the environment supplied by the caller.
  pub const fn resolve_with(self, is_terminal: bool, no_color_env: bool) -> bool {
    match self {
      ColorMode::Auto => is_terminal && !no_color_env,
      ColorMode::Never => false,
      ColorMode::Always => true,
    }
  }
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the verbosity-derived filter. Calling this more than
/// once is harmless: later calls leave the first subscriber in place.
pub fn init_tracing(verbosity: Verbosity, color: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

  let _ = tracing_subscriber::registry()
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .with_filter(filter),
    )
    .try_init();
}
