//! Command line interface.

use crate::c_parser::Language;
use crate::config::{Config, PartialConfig};
use crate::errors::Result;
use crate::launcher;
use clap::Parser;
use log::debug;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "beef_bindgen", version)]
/// Generates Beef bindings for a C header.
///
/// Values given here override values from the config file.
pub struct Options {
  #[arg(long)]
  /// TOML config file
  pub config: Option<PathBuf>,
  #[arg(long)]
  /// C header to generate bindings for
  pub header: Option<PathBuf>,
  #[arg(short, long)]
  /// Output file
  pub output: Option<PathBuf>,
  #[arg(short, long)]
  /// Name of the dynamic library the functions are imported from
  pub library: Option<String>,
  #[arg(short, long)]
  /// Namespace of the generated file (e.g. `Vendor.Lib`)
  pub namespace: Option<String>,
  #[arg(short = 'I', long = "include-dir")]
  /// Include directory passed to clang
  pub include_dirs: Vec<PathBuf>,
  #[arg(long = "clang-arg", allow_hyphen_values = true)]
  /// Extra argument passed to clang
  pub clang_args: Vec<String>,
  #[arg(long, value_enum)]
  /// Language of the header
  pub language: Option<Language>,
  #[arg(long = "std")]
  /// Language standard (default: gnu11 for C, gnu++20 for C++)
  pub standard: Option<String>,
  #[arg(long)]
  /// Log specification, e.g. `debug` (default: `RUST_LOG` or `info`)
  pub log_level: Option<String>,
}

impl Options {
  fn to_partial_config(&self) -> PartialConfig {
    PartialConfig {
      header: self.header.clone(),
      output: self.output.clone(),
      library: self.library.clone(),
      namespace: self.namespace.clone(),
      include_dirs: self.include_dirs.clone(),
      clang_args: self.clang_args.clone(),
      language: self.language,
      std: self.standard.clone(),
      skip_system_headers: None,
      type_map: Vec::new(),
    }
  }

  /// Loads the config file, if any, and applies the command line
  /// values on top of it.
  pub fn config(&self) -> Result<Config> {
    let file_config = match self.config {
      Some(ref path) => PartialConfig::load(path)?,
      None => PartialConfig::default(),
    };
    Config::from_partial(file_config.merge(self.to_partial_config()))
  }
}

pub fn run_from_args() -> Result<()> {
  run(Options::parse())
}

pub fn run(options: Options) -> Result<()> {
  let _logger = crate::log::init(options.log_level.as_ref().map(|s| s.as_str()))?;
  debug!("{:?}", options);
  let config = options.config()?;
  launcher::run(&config)
}
