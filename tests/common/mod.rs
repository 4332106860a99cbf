#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use path_annotate::config::Config;
use path_annotate::processor::{Annotator, AnnotatorConfig};
use path_annotate::report::Report;

/// Python and Rust signatures, with Python migrations excluded.
pub const PYTHON_RUST_CONFIG: &str = r##"
[[signatures]]
name = "python"
enabled = true
comment_prefix = "#"
extensions = [".py"]
exclude = ["**/migrations/**"]

[[signatures]]
name = "rust"
enabled = true
comment_prefix = "//"
extensions = [".rs"]

[[signatures]]
name = "shell"
enabled = true
comment_prefix = "#"
extensions = [".sh"]
"##;

/// Writes `content` to `root/rel_path`, creating parent directories.
pub fn write_file(root: &Path, rel_path: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
  let path = root.join(rel_path);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Reads `root/rel_path` as a string.
pub fn read_file(root: &Path, rel_path: &str) -> Result<String> {
  let path = root.join(rel_path);
  fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Reads `root/rel_path` as raw bytes.
pub fn read_bytes(root: &Path, rel_path: &str) -> Result<Vec<u8>> {
  let path = root.join(rel_path);
  fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Writes a config file next to (not inside) the scan root.
pub fn write_config(dir: &Path, content: &str) -> Result<PathBuf> {
  let path = dir.join("path-annotate.toml");
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Runs the annotator over `root` with a TOML config and optional overrides.
pub async fn annotate_with(
  root: &Path,
  config: &str,
  configure: impl FnOnce(AnnotatorConfig) -> AnnotatorConfig,
) -> Result<Report> {
  let config = Config::from_toml_str(config)?;
  let annotator = Annotator::new(configure(AnnotatorConfig::new(root.to_path_buf(), config)))?;
  Ok(annotator.run().await)
}

/// Runs the annotator over `root` with default options.
pub async fn annotate(root: &Path, config: &str) -> Result<Report> {
  annotate_with(root, config, |c| c).await
}
