//! # Header Module
//!
//! This module computes the canonical path header for a file and decides how
//! the file's current header slot relates to it.
//!
//! The header slot is the first line of the file, or the line after an
//! interpreter directive (`#!/usr/bin/env python3`). All work happens on
//! UTF-8 bytes with the byte-order marker already removed; nothing outside the
//! header slot is ever rewritten.

use crate::report::HeaderDecision;

/// Characters that never appear in a path written by this tool.
const DISALLOWED_PATH_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

/// Line terminator convention of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineStyle {
  /// `\n`
  Lf,
  /// `\r\n`
  CrLf,
  /// A lone `\r`
  Cr,
}

impl NewlineStyle {
  /// Detects the convention from the first terminator in `content`.
  ///
  /// Content without any terminator defaults to [`NewlineStyle::Lf`].
  pub fn detect(content: &[u8]) -> Self {
    match content.iter().position(|&b| b == b'\n' || b == b'\r') {
      Some(i) if content[i] == b'\n' => NewlineStyle::Lf,
      Some(i) if content.get(i + 1) == Some(&b'\n') => NewlineStyle::CrLf,
      Some(_) => NewlineStyle::Cr,
      None => NewlineStyle::Lf,
    }
  }

  /// The terminator bytes.
  pub const fn as_bytes(self) -> &'static [u8] {
    match self {
      NewlineStyle::Lf => b"\n",
      NewlineStyle::CrLf => b"\r\n",
      NewlineStyle::Cr => b"\r",
    }
  }

  /// Short name for logs and reports.
  pub const fn name(self) -> &'static str {
    match self {
      NewlineStyle::Lf => "LF",
      NewlineStyle::CrLf => "CRLF",
      NewlineStyle::Cr => "CR",
    }
  }
}

/// How the relative path is presented inside the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathStyle {
  /// `src/app/utils.py`
  #[default]
  Relative,
  /// `/src/app/utils.py`
  LeadingSlash,
}

/// Builds the canonical header text (without a line terminator).
///
/// `rel_path` is the stored root-relative form; the leading slash is only
/// added here.
pub fn canonical_header(comment_prefix: &str, rel_path: &str, style: PathStyle) -> String {
  match style {
    PathStyle::Relative => format!("{} {}", comment_prefix, rel_path),
    PathStyle::LeadingSlash => format!("{} /{}", comment_prefix, rel_path),
  }
}

/// Returns `(content_end, next_line_start)` for the line beginning at `start`.
///
/// `\r\n`, `\n` and a lone `\r` all terminate a line.
fn line_bounds(content: &[u8], start: usize) -> (usize, usize) {
  let rest = &content[start..];
  match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
    Some(i) if rest[i] == b'\r' && rest.get(i + 1) == Some(&b'\n') => (start + i, start + i + 2),
    Some(i) => (start + i, start + i + 1),
    None => (content.len(), content.len()),
  }
}

/// Returns `true` for an interpreter directive line.
///
/// `#![...]` is a Rust inner attribute, not a directive.
fn starts_with_directive(content: &[u8]) -> bool {
  content.starts_with(b"#!") && !content.starts_with(b"#![")
}

/// Checks whether a header-slot line is an out-of-date header of this
/// signature: the comment prefix, one space, then something path-shaped.
pub fn is_stale_header(line: &[u8], comment_prefix: &str, required_suffix: Option<&str>) -> bool {
  let Some(rest) = line
    .strip_prefix(comment_prefix.as_bytes())
    .and_then(|rest| rest.strip_prefix(b" "))
  else {
    return false;
  };

  let Ok(candidate) = std::str::from_utf8(rest) else {
    return false;
  };

  looks_like_path(candidate) && required_suffix.is_none_or(|suffix| candidate.ends_with(suffix))
}

fn looks_like_path(candidate: &str) -> bool {
  !candidate.is_empty()
    && candidate
      .chars()
      .all(|c| !c.is_whitespace() && !c.is_control() && !DISALLOWED_PATH_CHARS.contains(&c))
    && (candidate.contains('/') || candidate.contains('.'))
}

/// Where and how the header goes, as decided by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEdit {
  /// Insert, Update, or NoOp.
  pub decision: HeaderDecision,
  slot_start: usize,
  slot_end: usize,
  directive_unterminated: bool,
}

impl HeaderEdit {
  /// Byte offset of the header slot.
  pub const fn slot_start(&self) -> usize {
    self.slot_start
  }

  /// Produces the new content, or `None` when nothing changes.
  ///
  /// Inserted terminators use `newline`; an updated line keeps its own
  /// terminator.
  pub fn apply(&self, content: &[u8], header: &str, newline: NewlineStyle) -> Option<Vec<u8>> {
    let terminator = newline.as_bytes();
    let mut out = Vec::with_capacity(content.len() + header.len() + 2 * terminator.len());

    match self.decision {
      HeaderDecision::Insert => {
        out.extend_from_slice(&content[..self.slot_start]);
        if self.directive_unterminated {
          out.extend_from_slice(terminator);
        }
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(terminator);
        out.extend_from_slice(&content[self.slot_start..]);
      }
      HeaderDecision::Update => {
        out.extend_from_slice(&content[..self.slot_start]);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&content[self.slot_end..]);
      }
      HeaderDecision::NoOp | HeaderDecision::Skip => return None,
    }

    Some(out)
  }
}

/// Classifies a file's header slot against the canonical `header`.
pub fn classify(content: &[u8], header: &str, comment_prefix: &str, required_suffix: Option<&str>) -> HeaderEdit {
  let mut slot_start = 0;
  let mut directive_unterminated = false;

  if starts_with_directive(content) {
    let (line_end, next) = line_bounds(content, 0);
    slot_start = next;
    directive_unterminated = line_end == next;
  }

  let insert = |slot_start: usize| HeaderEdit {
    decision: HeaderDecision::Insert,
    slot_start,
    slot_end: slot_start,
    directive_unterminated,
  };

  if slot_start >= content.len() {
    return insert(content.len());
  }

  let (slot_end, _) = line_bounds(content, slot_start);
  let line = &content[slot_start..slot_end];

  let decision = if line == header.as_bytes() {
    HeaderDecision::NoOp
  } else if is_stale_header(line, comment_prefix, required_suffix) {
    HeaderDecision::Update
  } else {
    return insert(slot_start);
  };

  HeaderEdit {
    decision,
    slot_start,
    slot_end,
    directive_unterminated: false,
  }
}
