//! # Matcher Module
//!
//! This module selects the signature that applies to a path.
//!
//! Signatures are tried in declaration order. A signature is a candidate when
//! the path satisfies one of its include mechanisms, ends with its required
//! suffix (if any), and is not vetoed by the global excludes or the
//! signature's own excludes. The first candidate wins. A signature that
//! includes the path but excludes it does not stop the search: the next
//! signature still gets its chance.

use tracing::trace;

use crate::config::{Config, Signature};
use crate::ignore::ExcludeSet;

/// Why a path was not handed to a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// The path matched a global exclude pattern.
  GlobalExclude,
  /// At least one signature included the path but its excludes vetoed it,
  /// and no later signature took it. Names the first such signature.
  SignatureExclude { signature: String },
  /// No enabled signature includes the path.
  NoMatch,
}

impl std::fmt::Display for SkipReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SkipReason::GlobalExclude => write!(f, "global exclude"),
      SkipReason::SignatureExclude { signature } => write!(f, "signature '{}' exclude", signature),
      SkipReason::NoMatch => write!(f, "no matching signature"),
    }
  }
}

/// Result of matching a path against the configuration.
#[derive(Debug, Clone)]
pub enum MatchResult<'a> {
  /// The path is handled by this signature.
  Matched(&'a Signature),
  /// The path is skipped.
  Skipped(SkipReason),
}

impl<'a> MatchResult<'a> {
  /// The matched signature, if any.
  pub const fn signature(&self) -> Option<&'a Signature> {
    match self {
      MatchResult::Matched(signature) => Some(signature),
      MatchResult::Skipped(_) => None,
    }
  }
}

/// Routes root-relative paths to signatures.
pub struct SignatureMatcher<'a> {
  config: &'a Config,
  global_excludes: &'a ExcludeSet,
}

impl<'a> SignatureMatcher<'a> {
  /// Creates a matcher over a configuration and the invocation's global
  /// excludes.
  pub const fn new(config: &'a Config, global_excludes: &'a ExcludeSet) -> Self {
    Self {
      config,
      global_excludes,
    }
  }

  /// Finds the signature for a root-relative, forward-slash path.
  pub fn match_path(&self, rel_path: &str) -> MatchResult<'a> {
    if self.global_excludes.is_excluded(rel_path) {
      trace!("Skipping: {} (global exclude)", rel_path);
      return MatchResult::Skipped(SkipReason::GlobalExclude);
    }

    let mut vetoed_by: Option<&'a Signature> = None;

    for signature in self.config.enabled() {
      if !signature.includes(rel_path) || !signature.suffix_matches(rel_path) {
        continue;
      }

      if signature.exclude.is_excluded(rel_path) {
        trace!("{}: excluded by signature '{}', trying next", rel_path, signature.name);
        vetoed_by.get_or_insert(signature);
        continue;
      }

      trace!("{}: matched signature '{}'", rel_path, signature.name);
      return MatchResult::Matched(signature);
    }

    match vetoed_by {
      Some(signature) => MatchResult::Skipped(SkipReason::SignatureExclude {
        signature: signature.name.clone(),
      }),
      None => MatchResult::Skipped(SkipReason::NoMatch),
    }
  }
}
