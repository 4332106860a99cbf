//! # Configuration Module
//!
//! This module loads the signature configuration for path-annotate.
//!
//! A signature is a named rule describing which files to annotate and which
//! comment syntax to use. The configuration file is TOML with a top-level
//! `[[signatures]]` array; its declaration order is the precedence order:
//!
//! ```toml
//! # Python sources, except migrations
//! [[signatures]]
//! name = "python"
//! enabled = true
//! comment_prefix = "#"
//! extensions = [".py"]
//! exclude = ["**/migrations/**"]
//!
//! [[signatures]]
//! name = "rust"
//! enabled = true
//! comment_prefix = "//"
//! globs = ["src/**/*.rs"]
//! ```
//!
//! A file whose extension is `.json` or `.jsonc` is read as JSON with the same
//! schema. `//` and `/* */` comments are allowed there.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use json_comments::StripComments;
use serde::Deserialize;
use tracing::debug;

use crate::ignore::{ExcludeSet, PatternError};

/// Error type for configuration operations.
///
/// Every variant is fatal: it is raised before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// The config file contains invalid JSON.
  #[error("Failed to parse config file '{path}': {source}")]
  JsonParseError { path: PathBuf, source: serde_json::Error },

  /// A signature entry is missing a required key or has an invalid value.
  #[error("Invalid signature #{index} ({name}): {message}")]
  InvalidSignature { index: usize, name: String, message: String },

  /// Two signatures share the same name.
  #[error("Duplicate signature name '{name}'")]
  DuplicateSignature { name: String },

  /// A signature name requested by the caller does not exist.
  #[error("Signature(s) not found in config: {}", .names.join(", "))]
  UnknownSignature { names: Vec<String> },

  /// An include glob could not be compiled.
  #[error("Invalid glob '{pattern}' in signature '{signature}': {source}")]
  InvalidGlob {
    signature: String,
    pattern: String,
    source: globset::Error,
  },

  /// An exclude pattern could not be compiled.
  #[error("Invalid exclude pattern in {scope}: {source}")]
  InvalidExclude { scope: String, source: PatternError },

  /// The scan root does not exist or is not a directory.
  #[error("Root '{path}' is not a directory")]
  InvalidRoot { path: PathBuf },
}

/// A signature entry as it appears in the configuration file.
///
/// Everything is optional here so that validation can name the missing key
/// instead of surfacing a generic deserialization error.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
  /// Unique signature name.
  pub name: Option<String>,

  /// Whether the signature participates in matching. Defaults to `false`.
  #[serde(default)]
  pub enabled: bool,

  /// Comment token written before the path (e.g. `#`, `//`, `--`).
  pub comment_prefix: Option<String>,

  /// Literal suffix every matching path must end with.
  #[serde(default)]
  pub required_suffix: Option<String>,

  /// Include globs, matched against the root-relative path.
  #[serde(default)]
  pub globs: Vec<String>,

  /// Include suffixes (e.g. `.py`, `.d.ts`, `Dockerfile`).
  #[serde(default)]
  pub extensions: Vec<String>,

  /// Gitignore-style patterns that veto this signature.
  #[serde(default)]
  pub exclude: Vec<String>,
}

/// Raw configuration file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
  /// Signatures in precedence order. The key is required; an empty array is
  /// allowed.
  pub signatures: Vec<SignatureConfig>,
}

/// A validated, compiled signature.
#[derive(Debug, Clone)]
pub struct Signature {
  /// Unique name.
  pub name: String,
  /// Disabled signatures are kept for reference but never match.
  pub enabled: bool,
  /// Comment token written before the path.
  pub comment_prefix: String,
  /// Suffix every matching path (and recognized header) must end with.
  pub required_suffix: Option<String>,
  /// Include suffixes.
  pub extensions: Vec<String>,
  /// Source globs, kept for display.
  pub globs: Vec<String>,
  glob_set: GlobSet,
  /// Per-signature exclude patterns.
  pub exclude: ExcludeSet,
}

impl Signature {
  /// Compiles a signature from its raw configuration entry.
  ///
  /// `index` is the entry's position in the file and only used in error
  /// messages.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError`] if a required key is missing, no include
  /// mechanism is configured, or a pattern does not compile.
  pub fn from_config(index: usize, raw: SignatureConfig) -> Result<Self, ConfigError> {
    let display_name = raw.name.clone().unwrap_or_else(|| "N/A".to_string());
    let invalid = |message: &str| ConfigError::InvalidSignature {
      index,
      name: display_name.clone(),
      message: message.to_string(),
    };

    let name = match raw.name {
      Some(name) if !name.trim().is_empty() => name,
      Some(_) => return Err(invalid("'name' cannot be empty")),
      None => return Err(invalid("missing required key 'name'")),
    };

    let comment_prefix = match raw.comment_prefix {
      Some(prefix) if !prefix.trim().is_empty() => prefix,
      Some(_) => return Err(invalid("'comment_prefix' cannot be empty")),
      None => return Err(invalid("missing required key 'comment_prefix'")),
    };
    if comment_prefix.contains(['\n', '\r']) {
      return Err(invalid("'comment_prefix' cannot contain a line break"));
    }

    if raw.globs.is_empty() && raw.extensions.is_empty() {
      return Err(invalid("at least one of 'globs' or 'extensions' is required"));
    }
    if raw.extensions.iter().any(|ext| ext.is_empty()) {
      return Err(invalid("'extensions' cannot contain an empty entry"));
    }

    let required_suffix = raw.required_suffix.filter(|suffix| !suffix.is_empty());
    let glob_set = build_include_globs(&name, &raw.globs)?;
    let exclude = ExcludeSet::new(&raw.exclude).map_err(|source| ConfigError::InvalidExclude {
      scope: format!("signature '{}'", name),
      source,
    })?;

    Ok(Self {
      name,
      enabled: raw.enabled,
      comment_prefix,
      required_suffix,
      extensions: raw.extensions,
      globs: raw.globs,
      glob_set,
      exclude,
    })
  }

  /// Checks the include mechanisms: any glob or any extension suffix.
  pub fn includes(&self, rel_path: &str) -> bool {
    self.extensions.iter().any(|ext| rel_path.ends_with(ext.as_str())) || self.glob_set.is_match(rel_path)
  }

  /// Checks the required suffix, if one is configured.
  pub fn suffix_matches(&self, rel_path: &str) -> bool {
    self
      .required_suffix
      .as_deref()
      .is_none_or(|suffix| rel_path.ends_with(suffix))
  }
}

/// Compiles include globs.
///
/// `*` is allowed to cross `/`, and a glob without any `/` also matches at any
/// depth, so `*.py` and `Makefile` behave the way users expect.
fn build_include_globs(signature: &str, globs: &[String]) -> Result<GlobSet, ConfigError> {
  let mut builder = GlobSetBuilder::new();

  for pattern in globs {
    let normalized = pattern.replace('\\', "/");
    let mut add_pattern = |p: &str| -> Result<(), ConfigError> {
      let glob = GlobBuilder::new(p)
        .literal_separator(false)
        .build()
        .map_err(|source| ConfigError::InvalidGlob {
          signature: signature.to_string(),
          pattern: pattern.clone(),
          source,
        })?;
      builder.add(glob);
      Ok(())
    };

    add_pattern(&normalized)?;
    if !normalized.contains('/') {
      add_pattern(&format!("**/{}", normalized))?;
    }
  }

  builder.build().map_err(|source| ConfigError::InvalidGlob {
    signature: signature.to_string(),
    pattern: globs.join(", "),
    source,
  })
}

/// The loaded configuration: signatures in precedence order.
///
/// Immutable once loaded; global excludes are supplied separately at
/// invocation time.
#[derive(Debug, Clone, Default)]
pub struct Config {
  signatures: Vec<Signature>,
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
  /// validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let is_json = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonc"));

    let config = if is_json {
      Self::from_json_str(&content).map_err(|e| match e {
        ConfigError::JsonParseError { source, .. } => ConfigError::JsonParseError {
          path: path.to_path_buf(),
          source,
        },
        other => other,
      })?
    } else {
      Self::from_toml_str(&content).map_err(|e| match e {
        ConfigError::ParseError { source, .. } => ConfigError::ParseError {
          path: path.to_path_buf(),
          source,
        },
        other => other,
      })?
    };

    debug!(
      "Loaded {} signatures ({} enabled)",
      config.signatures.len(),
      config.enabled().count()
    );

    Ok(config)
  }

  /// Parse a TOML document.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] on a syntax error or an invalid signature.
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::ParseError {
      path: PathBuf::new(),
      source,
    })?;
    Self::from_file(file)
  }

  /// Parse a JSON document. Comments are stripped before parsing, so error
  /// positions still point into the original text.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] on a syntax error or an invalid signature.
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    let reader = StripComments::new(content.as_bytes());
    let file: ConfigFile = serde_json::from_reader(reader).map_err(|source| ConfigError::JsonParseError {
      path: PathBuf::new(),
      source,
    })?;
    Self::from_file(file)
  }

  /// Validate and compile raw signature entries.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] for the first invalid or duplicate signature.
  pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
    let mut seen = HashSet::new();
    let mut signatures = Vec::with_capacity(file.signatures.len());

    for (index, raw) in file.signatures.into_iter().enumerate() {
      let signature = Signature::from_config(index, raw)?;
      if !seen.insert(signature.name.clone()) {
        return Err(ConfigError::DuplicateSignature { name: signature.name });
      }
      signatures.push(signature);
    }

    Ok(Self { signatures })
  }

  /// All signatures in declaration order, including disabled ones.
  pub fn signatures(&self) -> &[Signature] {
    &self.signatures
  }

  /// Enabled signatures in declaration order.
  pub fn enabled(&self) -> impl Iterator<Item = &Signature> {
    self.signatures.iter().filter(|s| s.enabled)
  }

  /// Restrict matching to the named signatures, keeping declaration order.
  ///
  /// An empty list leaves the configuration unchanged.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::UnknownSignature`] listing every name that is not
  /// declared in the configuration.
  pub fn restrict_to(self, names: &[String]) -> Result<Self, ConfigError> {
    if names.is_empty() {
      return Ok(self);
    }

    let mut missing: Vec<String> = names
      .iter()
      .filter(|name| !self.signatures.iter().any(|s| &s.name == *name))
      .cloned()
      .collect();
    if !missing.is_empty() {
      missing.sort();
      missing.dedup();
      return Err(ConfigError::UnknownSignature { names: missing });
    }

    let signatures = self
      .signatures
      .into_iter()
      .filter(|s| names.contains(&s.name))
      .collect();

    Ok(Self { signatures })
  }
}
