//! # Workspace Module
//!
//! This module resolves the scan root that path-annotate operates on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::ConfigError;

/// The resolved scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  /// Resolves `root` against the current directory and canonicalizes it.
  ///
  /// # Errors
  ///
  /// Returns an error if the path does not exist or is not a directory.
  pub fn resolve(root: &Path) -> Result<Self> {
    let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
    Self::resolve_from(root, &current_dir)
  }

  /// [`Workspace::resolve`] relative to an explicit directory.
  ///
  /// # Errors
  ///
  /// Returns an error if the path does not exist or is not a directory.
  pub fn resolve_from(root: &Path, current_dir: &Path) -> Result<Self> {
    let absolute = abs_path_or_current(root, current_dir);
    let canonical = absolute
      .canonicalize()
      .with_context(|| format!("Failed to resolve root directory: {}", root.display()))?;

    if !canonical.is_dir() {
      return Err(ConfigError::InvalidRoot { path: canonical }.into());
    }

    debug!("Using scan root: {}", canonical.display());
    Ok(Self { root: canonical })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn into_root(self) -> PathBuf {
    self.root
  }
}

fn abs_path_or_current(path: &Path, current_dir: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    current_dir.join(path)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_resolve_relative_root() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp_dir.path().join("project")).expect("mkdir");

    let workspace = Workspace::resolve_from(Path::new("project"), temp_dir.path()).expect("resolve");
    let expected = temp_dir.path().join("project").canonicalize().expect("canonicalize");
    assert_eq!(workspace.root(), expected.as_path());
  }

  #[test]
  fn test_resolve_missing_root_fails() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let err = Workspace::resolve_from(Path::new("missing"), temp_dir.path()).expect_err("should fail");
    assert!(err.to_string().contains("missing"));
  }

  #[test]
  fn test_resolve_file_root_fails() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let file = temp_dir.path().join("file.txt");
    std::fs::write(&file, "").expect("write");

    let err = Workspace::resolve_from(&file, temp_dir.path()).expect_err("should fail");
    assert!(matches!(
      err.downcast_ref::<ConfigError>(),
      Some(ConfigError::InvalidRoot { .. })
    ));
  }
}
