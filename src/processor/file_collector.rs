//! # File Collector Module
//!
//! This module walks the scan root and produces every regular file together
//! with its root-relative, forward-slash path.
//!
//! Symbolic links are never followed: a link to a directory is not entered and
//! a link to a file is not annotated.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

/// One item produced by the walk.
#[derive(Debug)]
pub enum CollectedEntry {
  /// A regular file.
  File {
    /// Absolute path.
    path: PathBuf,
    /// Root-relative path with `/` separators.
    rel_path: String,
  },
  /// A directory entry that could not be read.
  Unreadable {
    /// Path of the entry, or the root if unknown.
    path: PathBuf,
    /// Root-relative path with `/` separators.
    rel_path: String,
    /// The underlying I/O error.
    source: std::io::Error,
  },
}

/// File collector for directory traversal.
pub struct FileCollector {
  /// Root of the scan
  root: PathBuf,
}

impl FileCollector {
  /// Creates a new FileCollector for the given scan root.
  ///
  /// # Parameters
  ///
  /// * `root` - The directory to walk
  pub const fn new(root: PathBuf) -> Self {
    Self { root }
  }

  /// Traverses the root recursively.
  ///
  /// Entries come back in a stable order (sorted by file name within each
  /// directory). Unreadable entries are reported, not dropped, so the caller
  /// can account for them.
  ///
  /// # Returns
  ///
  /// A vector of collected entries.
  pub fn collect(&self) -> Vec<CollectedEntry> {
    debug!("Scanning directory: {}", self.root.display());
    let start_time = std::time::Instant::now();

    let mut entries = Vec::with_capacity(1000);

    for item in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
      match item {
        Ok(entry) => {
          let file_type = entry.file_type();
          if file_type.is_symlink() {
            trace!("Skipping symlink: {}", entry.path().display());
            continue;
          }
          if !file_type.is_file() {
            continue;
          }

          let rel_path = relative_path_string(entry.path(), &self.root);
          entries.push(CollectedEntry::File {
            path: entry.into_path(),
            rel_path,
          });
        }
        Err(err) => {
          let path = err.path().map_or_else(|| self.root.clone(), Path::to_path_buf);
          let rel_path = relative_path_string(&path, &self.root);
          let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
          debug!("Error reading {}: {}", path.display(), source);
          entries.push(CollectedEntry::Unreadable { path, rel_path, source });
        }
      }
    }

    debug!(
      "Found {} entries in {}ms",
      entries.len(),
      start_time.elapsed().as_millis()
    );

    entries
  }
}

/// Root-relative path of `path` as a `/`-separated string.
///
/// This is the form used for matching, for headers, and for reports.
pub fn relative_path_string(path: &Path, root: &Path) -> String {
  let relative = normalize_relative_path(path, root);
  let components: Vec<String> = relative
    .components()
    .map(|component| component.as_os_str().to_string_lossy().into_owned())
    .collect();

  components.join("/")
}

/// Normalizes a path to be relative to a given directory.
///
/// # Parameters
///
/// * `path` - The path to normalize
/// * `base` - The directory to make the path relative to
///
/// # Returns
///
/// The normalized relative path, or `.` for the base itself.
pub fn normalize_relative_path(path: &Path, base: &Path) -> PathBuf {
  // Walk results are always joined onto the root, absolute or not.
  if let Ok(stripped) = path.strip_prefix(base) {
    return strip_cur_dir(stripped);
  }

  if path.is_absolute()
    && let Some(rel_path) = pathdiff::diff_paths(path, base)
  {
    return strip_cur_dir(&rel_path);
  }

  strip_cur_dir(path)
}

fn strip_cur_dir(path: &Path) -> PathBuf {
  let normalized: PathBuf = path
    .components()
    .filter(|component| !matches!(component, std::path::Component::CurDir))
    .collect();

  if normalized.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    normalized
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  fn files(entries: &[CollectedEntry]) -> Vec<&str> {
    entries
      .iter()
      .filter_map(|entry| match entry {
        CollectedEntry::File { rel_path, .. } => Some(rel_path.as_str()),
        CollectedEntry::Unreadable { .. } => None,
      })
      .collect()
  }

  #[test]
  fn test_normalize_relative_path_strips_root() {
    let path = Path::new("/repo/src/app/utils.py");
    assert_eq!(
      normalize_relative_path(path, Path::new("/repo")),
      PathBuf::from("src/app/utils.py")
    );
  }

  #[test]
  fn test_normalize_relative_path_strips_relative_root() {
    assert_eq!(
      normalize_relative_path(Path::new("proj/src/a.py"), Path::new("proj")),
      PathBuf::from("src/a.py")
    );
    assert_eq!(
      normalize_relative_path(Path::new("../work/proj/lib.rs"), Path::new("../work/proj")),
      PathBuf::from("lib.rs")
    );
    assert_eq!(relative_path_string(Path::new("proj"), Path::new("proj")), ".");
  }

  #[test]
  fn test_normalize_relative_path_of_root_is_dot() {
    assert_eq!(normalize_relative_path(Path::new("/repo"), Path::new("/repo")), PathBuf::from("."));
  }

  #[test]
  fn test_normalize_relative_path_skips_cur_dir() {
    assert_eq!(
      normalize_relative_path(Path::new("./src/./a.py"), Path::new("/repo")),
      PathBuf::from("src/a.py")
    );
  }

  #[test]
  fn test_relative_path_string_uses_forward_slashes() {
    let root = Path::new("/repo");
    let path = root.join("src").join("nested").join("mod.rs");
    assert_eq!(relative_path_string(&path, root), "src/nested/mod.rs");
  }

  #[test]
  fn test_collect_is_sorted_and_recursive() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("src/b")).expect("mkdir");
    std::fs::write(root.join("z.py"), "").expect("write");
    std::fs::write(root.join("src/b/c.py"), "").expect("write");
    std::fs::write(root.join("src/a.py"), "").expect("write");

    let entries = FileCollector::new(root.to_path_buf()).collect();
    assert_eq!(files(&entries), vec!["src/a.py", "src/b/c.py", "z.py"]);
  }

  #[cfg(unix)]
  #[test]
  fn test_collect_skips_symlinks() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("real")).expect("mkdir");
    std::fs::write(root.join("real/a.py"), "").expect("write");
    std::os::unix::fs::symlink(root.join("real"), root.join("linked_dir")).expect("symlink dir");
    std::os::unix::fs::symlink(root.join("real/a.py"), root.join("linked.py")).expect("symlink file");

    let entries = FileCollector::new(root.to_path_buf()).collect();
    assert_eq!(files(&entries), vec!["real/a.py"]);
  }
}
