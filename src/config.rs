//! Configuration of a generation run.

use crate::binding_context::GeneratorOptions;
use crate::c_parser::{Language, ParserConfig};
use crate::errors::{ErrorKind, Result};
use crate::file_utils::{load_toml, PathBufWithAdded};
use log::debug;
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/// User supplied rule of the type conversion table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeMapEntry {
  /// Whole-word C type spelling to replace
  pub pattern: String,
  pub replacement: String,
}

/// Partial configuration as it appears in a TOML file or on the
/// command line. Every field is optional; `Config::from_partial`
/// checks that required ones are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
  pub header: Option<PathBuf>,
  pub output: Option<PathBuf>,
  pub library: Option<String>,
  pub namespace: Option<String>,
  #[serde(default)]
  pub include_dirs: Vec<PathBuf>,
  #[serde(default)]
  pub clang_args: Vec<String>,
  pub language: Option<Language>,
  pub std: Option<String>,
  pub skip_system_headers: Option<bool>,
  #[serde(default)]
  pub type_map: Vec<TypeMapEntry>,
}

impl PartialConfig {
  /// Loads a TOML config file. Relative paths in the file are
  /// relative to the directory containing it.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<PartialConfig> {
    let path = path.as_ref();
    debug!("loading config: {}", path.display());
    let mut config: PartialConfig = load_toml(path)?;
    if let Some(dir) = path.parent() {
      let resolve = |p: PathBuf| if p.is_relative() { dir.with_added(p) } else { p };
      config.header = config.header.map(resolve);
      config.output = config.output.map(resolve);
      config.include_dirs = config.include_dirs.into_iter().map(resolve).collect();
    }
    Ok(config)
  }

  /// Returns `self` with values from `other` taking precedence.
  /// List values are concatenated.
  pub fn merge(self, other: PartialConfig) -> PartialConfig {
    let mut include_dirs = self.include_dirs;
    include_dirs.extend(other.include_dirs);
    let mut clang_args = self.clang_args;
    clang_args.extend(other.clang_args);
    let mut type_map = self.type_map;
    type_map.extend(other.type_map);
    PartialConfig {
      header: other.header.or(self.header),
      output: other.output.or(self.output),
      library: other.library.or(self.library),
      namespace: other.namespace.or(self.namespace),
      include_dirs,
      clang_args,
      language: other.language.or(self.language),
      std: other.std.or(self.std),
      skip_system_headers: other.skip_system_headers.or(self.skip_system_headers),
      type_map,
    }
  }
}

/// Complete configuration of a generation run.
#[derive(Debug, Clone)]
pub struct Config {
  pub header_path: PathBuf,
  /// File the bindings are written to
  pub output_path: PathBuf,
  pub library_name: String,
  pub namespace: String,
  pub include_dirs: Vec<PathBuf>,
  pub clang_arguments: Vec<String>,
  pub language: Language,
  pub standard: Option<String>,
  pub skip_system_headers: bool,
  /// Rules evaluated before the built-in conversion table
  pub type_map: Vec<TypeMapEntry>,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
  value.ok_or_else(|| ErrorKind::InvalidConfig(format!("missing required value: {}", name)).into())
}

impl Config {
  pub fn new<P1, P2, S1, S2>(header_path: P1, output_path: P2, library_name: S1, namespace: S2) -> Config
  where
    P1: Into<PathBuf>,
    P2: Into<PathBuf>,
    S1: Into<String>,
    S2: Into<String>,
  {
    Config {
      header_path: header_path.into(),
      output_path: output_path.into(),
      library_name: library_name.into(),
      namespace: namespace.into(),
      include_dirs: Vec::new(),
      clang_arguments: Vec::new(),
      language: Language::default(),
      standard: None,
      skip_system_headers: true,
      type_map: Vec::new(),
    }
  }

  /// Builds the configuration, failing with `InvalidConfig` if
  /// the header, output, library or namespace is missing.
  pub fn from_partial(partial: PartialConfig) -> Result<Config> {
    Ok(Config {
      header_path: required(partial.header, "header")?,
      output_path: required(partial.output, "output")?,
      library_name: required(partial.library, "library")?,
      namespace: required(partial.namespace, "namespace")?,
      include_dirs: partial.include_dirs,
      clang_arguments: partial.clang_args,
      language: partial.language.unwrap_or_default(),
      standard: partial.std,
      skip_system_headers: partial.skip_system_headers.unwrap_or(true),
      type_map: partial.type_map,
    })
  }

  pub fn parser_config(&self) -> ParserConfig {
    ParserConfig {
      header_path: self.header_path.clone(),
      include_dirs: self.include_dirs.clone(),
      language: self.language,
      standard: self.standard.clone(),
      arguments: self.clang_arguments.clone(),
      skip_system_headers: self.skip_system_headers,
    }
  }

  pub fn generator_options(&self) -> GeneratorOptions {
    GeneratorOptions::new(self.library_name.clone(), self.namespace.clone())
  }

  /// User type-map rules as `(pattern, replacement)` pairs.
  pub fn type_map_rules(&self) -> Vec<(String, String)> {
    self
      .type_map
      .iter()
      .map(|e| (e.pattern.clone(), e.replacement.clone()))
      .collect()
  }
}
