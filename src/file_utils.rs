//! Various utilities for working with files

use crate::errors::{Result, ResultExt};
use log::trace;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Joins paths without changing the original one.
pub trait PathBufWithAdded {
  fn with_added<P: AsRef<Path>>(&self, path: P) -> PathBuf;
}

impl<T: AsRef<Path>> PathBufWithAdded for T {
  fn with_added<P: AsRef<Path>>(&self, path: P) -> PathBuf {
    let mut p = self.as_ref().to_path_buf();
    p.push(path);
    p
  }
}

/// Reads entire content of a file to a string.
pub fn file_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
  fs::read_to_string(path.as_ref())
    .chain_err(|| format!("failed to read file: {}", path.as_ref().display()))
}

/// Creates a file at `path` (and its missing parent directories) and
/// writes `text` to it, replacing any previous content.
pub fn save_to_file<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent() {
    if !parent.as_os_str().is_empty() && !parent.exists() {
      trace!("creating directory: {}", parent.display());
      fs::create_dir_all(parent)
        .chain_err(|| format!("failed to create directory: {}", parent.display()))?;
    }
  }
  fs::write(path, text).chain_err(|| format!("failed to write file: {}", path.display()))
}

/// Reads a TOML file and deserializes it.
pub fn load_toml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
  let path = path.as_ref();
  let text = file_to_string(path)?;
  toml::from_str(&text).chain_err(|| format!("failed to parse TOML file: {}", path.display()))
}

/// Converts `path` to a `str`, failing on non-UTF-8 paths.
pub fn path_to_str(path: &Path) -> Result<&str> {
  path
    .to_str()
    .chain_err(|| format!("path is not valid unicode: {}", path.display()))
}
