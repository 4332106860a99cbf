//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod annotate;

pub use annotate::{AnnotateArgs, run_annotate};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Add or update path headers under the current directory
  path-annotate --root . --config path-annotate.toml

  # Preview changes and fail CI if any file is missing its header
  path-annotate --root . --config path-annotate.toml --dry-run --fail-on-change

  # Skip vendored code and only use the python signature
  path-annotate --root . --config path-annotate.toml --exclude \"**/vendor/**\" --signature python

  # Show every change and a summary table
  path-annotate --root . --config path-annotate.toml -v --print-summary

Exit status:
  0  success
  1  configuration or usage error
  2  one or more files could not be processed
  3  --fail-on-change was given and files changed
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub args: AnnotateArgs,
}
