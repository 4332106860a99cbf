//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the annotator:
//! encoding detection on read, re-encoding on write, and atomic replacement
//! that keeps the original file's permissions.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::FileError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Text encodings the annotator reads and writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
  /// UTF-8 without a byte-order marker. Also covers arbitrary bytes that are
  /// not valid UTF-8: they pass through untouched.
  Utf8,
  /// UTF-8 with a leading byte-order marker.
  Utf8Bom,
  /// UTF-16 little endian with a byte-order marker.
  Utf16Le,
  /// UTF-16 big endian with a byte-order marker.
  Utf16Be,
}

impl TextEncoding {
  /// Detects the encoding from the byte-order marker, if any.
  pub fn detect(bytes: &[u8]) -> Self {
    if bytes.starts_with(UTF8_BOM) {
      TextEncoding::Utf8Bom
    } else if bytes.starts_with(UTF16_LE_BOM) {
      TextEncoding::Utf16Le
    } else if bytes.starts_with(UTF16_BE_BOM) {
      TextEncoding::Utf16Be
    } else {
      TextEncoding::Utf8
    }
  }

  const fn bom(self) -> &'static [u8] {
    match self {
      TextEncoding::Utf8 => b"",
      TextEncoding::Utf8Bom => UTF8_BOM,
      TextEncoding::Utf16Le => UTF16_LE_BOM,
      TextEncoding::Utf16Be => UTF16_BE_BOM,
    }
  }
}

/// File content with its byte-order marker removed and transcoded to UTF-8
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
  /// The encoding to write back with.
  pub encoding: TextEncoding,
  /// Content without the byte-order marker.
  pub bytes: Vec<u8>,
}

/// Decodes raw file bytes.
///
/// # Errors
///
/// Returns a message when a UTF-16 file has an odd byte count or contains
/// unpaired surrogates.
pub fn decode(raw: Vec<u8>) -> Result<DecodedText, String> {
  let encoding = TextEncoding::detect(&raw);
  let bom_len = encoding.bom().len();

  let bytes = match encoding {
    TextEncoding::Utf8 => raw,
    TextEncoding::Utf8Bom => raw[bom_len..].to_vec(),
    TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
      let body = &raw[bom_len..];
      if body.len() % 2 != 0 {
        return Err("UTF-16 content has an odd number of bytes".to_string());
      }
      let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| match encoding {
          TextEncoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
          _ => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .collect();
      String::from_utf16(&units)
        .map_err(|e| format!("invalid UTF-16 content: {}", e))?
        .into_bytes()
    }
  };

  Ok(DecodedText { encoding, bytes })
}

/// Encodes UTF-8 bytes back into `encoding`, restoring its byte-order marker.
///
/// # Errors
///
/// Returns a message if UTF-16 output is requested for bytes that are not
/// valid UTF-8.
pub fn encode(encoding: TextEncoding, bytes: &[u8]) -> Result<Vec<u8>, String> {
  let mut out = Vec::with_capacity(bytes.len() * 2 + 3);
  out.extend_from_slice(encoding.bom());

  match encoding {
    TextEncoding::Utf8 | TextEncoding::Utf8Bom => out.extend_from_slice(bytes),
    TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
      let text = std::str::from_utf8(bytes).map_err(|e| format!("cannot encode as UTF-16: {}", e))?;
      for unit in text.encode_utf16() {
        let pair = match encoding {
          TextEncoding::Utf16Le => unit.to_le_bytes(),
          _ => unit.to_be_bytes(),
        };
        out.extend_from_slice(&pair);
      }
    }
  }

  Ok(out)
}

/// File I/O operations for the annotator.
pub struct FileIO;

impl FileIO {
  /// Reads and decodes a file.
  ///
  /// # Errors
  ///
  /// Returns [`FileError::Read`] if the file cannot be read and
  /// [`FileError::Decode`] if its byte-order marker promises an encoding the
  /// content does not honor.
  pub fn read_text(path: &Path) -> Result<DecodedText, FileError> {
    let raw = std::fs::read(path).map_err(|source| FileError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    decode(raw).map_err(|message| FileError::Decode {
      path: path.to_path_buf(),
      message,
    })
  }

  /// Encodes `bytes` and atomically replaces the file.
  ///
  /// # Errors
  ///
  /// Returns [`FileError::Write`] if the content cannot be encoded or the file
  /// cannot be replaced. The original file is left intact in that case.
  pub fn write_text(path: &Path, encoding: TextEncoding, bytes: &[u8]) -> Result<(), FileError> {
    let content = encode(encoding, bytes).map_err(|message| FileError::Write {
      path: path.to_path_buf(),
      source: std::io::Error::new(std::io::ErrorKind::InvalidData, message),
    })?;

    Self::write_atomic(path, &content).map_err(|source| FileError::Write {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Writes `content` to a temporary file in the same directory, copies the
  /// original permissions onto it, then renames it over `path`.
  ///
  /// Readers see either the old or the new content, never a partial write.
  pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(path);
    let permissions = std::fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.as_file().set_permissions(permissions)?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
  }
}

fn parent_dir(path: &Path) -> PathBuf {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_detect_encodings() {
    assert_eq!(TextEncoding::detect(b"plain"), TextEncoding::Utf8);
    assert_eq!(TextEncoding::detect(b"\xEF\xBB\xBFx"), TextEncoding::Utf8Bom);
    assert_eq!(TextEncoding::detect(b"\xFF\xFEx\x00"), TextEncoding::Utf16Le);
    assert_eq!(TextEncoding::detect(b"\xFE\xFF\x00x"), TextEncoding::Utf16Be);
  }

  #[test]
  fn test_utf8_passes_through_invalid_bytes() {
    let raw = b"x = 1\n\xff\xfe\n".to_vec();
    let decoded = decode(raw.clone()).expect("decode");
    assert_eq!(decoded.encoding, TextEncoding::Utf8);
    assert_eq!(decoded.bytes, raw);
  }

  #[test]
  fn test_utf8_bom_is_stripped_and_restored() {
    let decoded = decode(b"\xEF\xBB\xBFimport os\n".to_vec()).expect("decode");
    assert_eq!(decoded.bytes, b"import os\n");

    let encoded = encode(decoded.encoding, b"# a.py\nimport os\n").expect("encode");
    assert_eq!(encoded, b"\xEF\xBB\xBF# a.py\nimport os\n".to_vec());
  }

  #[test]
  fn test_utf16_le_transcoding() {
    let mut raw = UTF16_LE_BOM.to_vec();
    for unit in "x = 'é'\n".encode_utf16() {
      raw.extend_from_slice(&unit.to_le_bytes());
    }

    let decoded = decode(raw.clone()).expect("decode");
    assert_eq!(decoded.encoding, TextEncoding::Utf16Le);
    assert_eq!(decoded.bytes, "x = 'é'\n".as_bytes());
    assert_eq!(encode(decoded.encoding, &decoded.bytes).expect("encode"), raw);
  }

  #[test]
  fn test_utf16_be_transcoding() {
    let mut raw = UTF16_BE_BOM.to_vec();
    for unit in "a\r\n".encode_utf16() {
      raw.extend_from_slice(&unit.to_be_bytes());
    }

    let decoded = decode(raw.clone()).expect("decode");
    assert_eq!(decoded.bytes, b"a\r\n");
    assert_eq!(encode(TextEncoding::Utf16Be, &decoded.bytes).expect("encode"), raw);
  }

  #[test]
  fn test_utf16_odd_length_is_error() {
    assert!(decode(b"\xFF\xFEa".to_vec()).is_err());
  }

  #[test]
  fn test_utf16_unpaired_surrogate_is_error() {
    assert!(decode(b"\xFF\xFE\x00\xD8".to_vec()).is_err());
  }

  #[test]
  fn test_write_atomic_replaces_content() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("a.py");
    std::fs::write(&path, "old").expect("write");

    FileIO::write_atomic(&path, b"new").expect("atomic write");
    assert_eq!(std::fs::read(&path).expect("read"), b"new");

    let leftovers = std::fs::read_dir(temp_dir.path()).expect("read dir").count();
    assert_eq!(leftovers, 1);
  }

  #[cfg(unix)]
  #[test]
  fn test_write_atomic_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("run.sh");
    std::fs::write(&path, "#!/bin/sh\n").expect("write");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    FileIO::write_atomic(&path, b"#!/bin/sh\n# run.sh\n").expect("atomic write");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
  }

  #[test]
  fn test_read_missing_file_is_read_error() {
    let err = FileIO::read_text(Path::new("/nonexistent/a.py")).expect_err("should fail");
    assert!(matches!(err, FileError::Read { .. }));
  }
}
