//! # path-annotate
//!
//! A tool that keeps a canonical relative-path comment at the top of every
//! source file a configuration matches, such as `# src/app/utils.py` or
//! `// web/src/index.ts`.
//!
//! `path-annotate` modifies source files in place, touches at most one line per
//! file, and is idempotent: running it on its own output changes nothing.
//!
//! ## Features
//!
//! * Named signatures pairing include globs/extensions with a comment prefix
//! * First-match precedence in configuration order
//! * Gitignore-style global and per-signature excludes
//! * Interpreter directives (`#!`) kept on the first line
//! * Byte-order markers, UTF-16, and CRLF/LF/CR line endings preserved
//! * Atomic writes that keep file permissions
//! * Dry-run mode and exit codes for CI
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//!
//! use path_annotate::config::Config;
//! use path_annotate::processor::{Annotator, AnnotatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Path::new("path-annotate.toml"))?;
//!
//!     let annotator = Annotator::new(AnnotatorConfig {
//!         dry_run: true,
//!         global_excludes: vec!["**/node_modules/**".to_string()],
//!         ..AnnotatorConfig::new(PathBuf::from("."), config)
//!     })?;
//!
//!     let report = annotator.run().await;
//!     println!("{} files would change", report.total_changes());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`config`] - Signature configuration
//! * [`matcher`] - Routing paths to signatures
//! * [`processor`] - Walking, header classification, and file rewriting
//! * [`report`] - Run report, exit classification, and report files
//! * [`output`] - Console output
//! * [`logging`] - Tracing setup and color mode
//!
//! [`config`]: crate::config
//! [`matcher`]: crate::matcher
//! [`processor`]: crate::processor
//! [`report`]: crate::report
//! [`output`]: crate::output
//! [`logging`]: crate::logging

pub mod config;
pub mod ignore;
pub mod logging;
pub mod matcher;
pub mod output;
pub mod processor;
pub mod report;
pub mod workspace;
