//! # Logging Module
//!
//! This module provides the logging setup for path-annotate:
//! - Diagnostic logging through `tracing`, written to stderr
//! - Verbosity levels derived from `-q` and `-v`
//! - Color mode resolution
//!
//! Nothing here is global state apart from the `tracing` subscriber itself:
//! the resolved verbosity and color choice are handed to
//! [`Console`](crate::output::Console) explicitly.
//!
//! ## Example
//!
//! ```rust
//! use path_annotate::logging::{ColorMode, Verbosity, init_tracing};
//!
//! let verbosity = Verbosity::from_flags(false, 1);
//! let color = ColorMode::Never.resolve();
//! init_tracing(verbosity, color);
//!
//! tracing::debug!("Processing file: {}", "example.rs");
//! ```

mod modes;

pub use modes::{ColorMode, Verbosity, init_tracing};
