//! # path-annotate
//!
//! A tool that keeps a relative-path comment at the top of every matching
//! source file.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use path_annotate::logging::init_tracing;
use path_annotate::output::Console;
use path_annotate::report::CONFIG_ERROR_EXIT_CODE;

use crate::cli::{Cli, run_annotate};

#[tokio::main]
async fn main() -> ExitCode {
  // Usage errors share the configuration error status; help and version exit 0.
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let _ = err.print();
      return if err.use_stderr() {
        ExitCode::from(CONFIG_ERROR_EXIT_CODE)
      } else {
        ExitCode::SUCCESS
      };
    }
  };

  let verbosity = cli.args.verbosity();
  let color = cli.args.color_mode().resolve();
  init_tracing(verbosity, color);
  let console = Console::new(verbosity, color);

  match run_annotate(cli.args, console).await {
    Ok(status) => ExitCode::from(status.exit_code()),
    Err(e) => {
      console.error(&format!("{:#}", e));
      ExitCode::from(CONFIG_ERROR_EXIT_CODE)
    }
  }
}
