#![allow(deprecated)]

use crate::c_ast::Diagnostic;
use log::error;

error_chain! {
  foreign_links {
    Io(std::io::Error);
    Regex(regex::Error);
    Toml(toml::de::Error);
    Logger(flexi_logger::FlexiLoggerError);
  }

  errors {
    HeaderNotFound(path: String) {
      display("header file not found: {}", path)
    }
    ClangInitFailed(message: String) {
      display("clang init failed: {}", message)
    }
    ParseFailed(path: String, diagnostics: Vec<Diagnostic>) {
      display("failed to parse {} ({} diagnostics)", path, diagnostics.len())
    }
    InvalidConfig(message: String) {
      display("invalid configuration: {}", message)
    }
    StageFailed(stage: String) {
      display("generation stage failed: {}", stage)
    }
  }
}

impl Error {
  /// Returns diagnostics attached to a parse failure.
  pub fn diagnostics(&self) -> Option<&[Diagnostic]> {
    if let ErrorKind::ParseFailed(_, ref diagnostics) = *self.kind() {
      Some(diagnostics)
    } else {
      None
    }
  }

  pub fn display_report(&self) {
    if let Some(diagnostics) = self.diagnostics() {
      for diagnostic in diagnostics {
        error!("{}", diagnostic);
      }
    }
    error!("Error:");
    let items: Vec<_> = self.iter().collect();
    for (i, err) in items.iter().rev().enumerate() {
      error!("{:>w$}: {}", i, err, w = 4);
    }
  }
}

pub fn fancy_unwrap<T>(value: Result<T>) -> T {
  match value {
    Ok(value) => value,
    Err(err) => {
      err.display_report();
      std::process::exit(1);
    }
  }
}
