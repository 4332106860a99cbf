//! # Ignore Module
//!
//! This module contains the exclusion filter: gitignore-style patterns that
//! veto a file for every signature (global excludes) or for a single signature
//! (per-signature excludes).
//!
//! It supports:
//! - Recursive `**` wildcards (`**/node_modules/**`)
//! - Directory-anchored patterns (`build/`, `/vendor`)
//! - Extension wildcards (`*.min.js`)
//!
//! Negated (`!pattern`) entries are rejected when the set is built.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::trace;

/// Error raised when an exclude pattern cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
  /// The pattern is not a valid gitignore-style glob.
  #[error("Invalid exclude pattern '{pattern}': {source}")]
  Invalid { pattern: String, source: ignore::Error },

  /// Negated patterns would let one pattern re-include what another excluded.
  #[error("Negated exclude pattern '{pattern}' is not supported")]
  Negated { pattern: String },
}

/// A compiled set of gitignore-style exclude patterns.
///
/// Paths handed to [`ExcludeSet::is_excluded`] are always relative to the scan
/// root and use forward slashes.
///
/// # Examples
///
/// ```rust
/// use path_annotate::ignore::ExcludeSet;
///
/// # fn main() -> Result<(), path_annotate::ignore::PatternError> {
/// let excludes = ExcludeSet::new(&["**/node_modules/**".to_string(), "build/".to_string()])?;
///
/// assert!(excludes.is_excluded("web/node_modules/pkg/index.js"));
/// assert!(excludes.is_excluded("build/gen.py"));
/// assert!(!excludes.is_excluded("src/app.py"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ExcludeSet {
  matcher: Gitignore,
  patterns: Vec<String>,
}

impl ExcludeSet {
  /// Compiles the given patterns.
  ///
  /// Blank entries are ignored. Patterns come from flags and config arrays,
  /// not from a `.gitignore` file, so a leading `#` is part of the pattern
  /// rather than a comment. Backslashes are normalized to forward slashes.
  ///
  /// # Errors
  ///
  /// Returns [`PatternError`] for a negated or malformed pattern.
  pub fn new(patterns: &[String]) -> Result<Self, PatternError> {
    // Relative paths are matched as-is; "." disables root stripping.
    let mut builder = GitignoreBuilder::new(".");
    let mut kept = Vec::with_capacity(patterns.len());

    for raw in patterns {
      let pattern = raw.trim().replace('\\', "/");
      if pattern.is_empty() {
        continue;
      }
      if pattern.starts_with('!') {
        return Err(PatternError::Negated { pattern });
      }

      // The gitignore parser drops `#` lines; `\#` is its literal form.
      let line = if pattern.starts_with('#') {
        format!("\\{}", pattern)
      } else {
        pattern.clone()
      };
      builder.add_line(None, &line).map_err(|source| PatternError::Invalid {
        pattern: pattern.clone(),
        source,
      })?;
      kept.push(pattern);
    }

    let matcher = builder.build().map_err(|source| PatternError::Invalid {
      pattern: kept.join(", "),
      source,
    })?;

    Ok(Self { matcher, patterns: kept })
  }

  /// An exclude set that matches nothing.
  pub fn empty() -> Self {
    Self {
      matcher: Gitignore::empty(),
      patterns: Vec::new(),
    }
  }

  /// Returns `true` when no pattern was compiled.
  pub const fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  /// Checks whether a root-relative path is excluded.
  ///
  /// The path itself and every parent directory are tested, so `build/`
  /// excludes `build/gen/out.py`.
  pub fn is_excluded(&self, rel_path: &str) -> bool {
    if self.is_empty() || rel_path.is_empty() {
      return false;
    }

    let excluded = self
      .matcher
      .matched_path_or_any_parents(Path::new(rel_path), false)
      .is_ignore();
    if excluded {
      trace!("Excluded: {} (matches exclude pattern)", rel_path);
    }
    excluded
  }
}

impl Default for ExcludeSet {
  fn default() -> Self {
    Self::empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(patterns: &[&str]) -> ExcludeSet {
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    ExcludeSet::new(&patterns).expect("patterns should compile")
  }

  #[test]
  fn test_recursive_wildcard() {
    let excludes = set(&["**/node_modules/**"]);
    assert!(excludes.is_excluded("node_modules/a.js"));
    assert!(excludes.is_excluded("web/app/node_modules/lib/a.js"));
    assert!(!excludes.is_excluded("web/app/src/a.js"));
  }

  #[test]
  fn test_directory_pattern_excludes_descendants() {
    let excludes = set(&["build/"]);
    assert!(excludes.is_excluded("build/out.py"));
    assert!(excludes.is_excluded("pkg/build/deep/out.py"));
    assert!(!excludes.is_excluded("builder.py"));
  }

  #[test]
  fn test_anchored_pattern_only_matches_at_root() {
    let excludes = set(&["/vendor"]);
    assert!(excludes.is_excluded("vendor/lib.rs"));
    assert!(!excludes.is_excluded("src/vendor/lib.rs"));
  }

  #[test]
  fn test_extension_wildcard() {
    let excludes = set(&["*.min.js"]);
    assert!(excludes.is_excluded("static/app.min.js"));
    assert!(!excludes.is_excluded("static/app.js"));
  }

  #[test]
  fn test_backslash_patterns_are_normalized() {
    let excludes = set(&["generated\\"]);
    assert!(excludes.is_excluded("generated/x.py"));
  }

  #[test]
  fn test_blank_entries_skipped() {
    let excludes = set(&["", "  "]);
    assert!(excludes.is_empty());
    assert!(!excludes.is_excluded("anything.py"));
  }

  #[test]
  fn test_leading_hash_is_literal() {
    let excludes = set(&["#scratch/"]);
    assert!(!excludes.is_empty());
    assert!(excludes.is_excluded("#scratch/notes.py"));
    assert!(excludes.is_excluded("pkg/#scratch/notes.py"));
    assert!(!excludes.is_excluded("scratch/notes.py"));
  }

  #[test]
  fn test_negated_pattern_rejected() {
    let err = ExcludeSet::new(&["!keep.py".to_string()]).expect_err("negation must fail");
    assert!(matches!(err, PatternError::Negated { .. }));
  }

  #[test]
  fn test_invalid_pattern_rejected() {
    let err = ExcludeSet::new(&["src/[".to_string()]).expect_err("unclosed class must fail");
    assert!(matches!(err, PatternError::Invalid { .. }));
    assert!(err.to_string().contains("src/["));
  }

  #[test]
  fn test_empty_set_matches_nothing() {
    let excludes = ExcludeSet::empty();
    assert!(!excludes.is_excluded("src/a.py"));
  }
}
