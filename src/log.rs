//! Logger setup and rendering of front-end diagnostics.

use crate::c_ast::{Diagnostic, Severity};
use crate::errors::Result;
use flexi_logger::{colored_default_format, Logger, LoggerHandle};
use log::{debug, error, warn};

/// Level used when neither the command line nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Starts the global logger writing to stderr. `spec` is a flexi_logger
/// specification like `info` or `debug, beef_bindgen::c_parser=trace`.
/// Without `spec`, `RUST_LOG` is used if set.
///
/// The returned handle must be kept alive for as long as messages
/// should be written.
pub fn init(spec: Option<&str>) -> Result<LoggerHandle> {
  let logger = match spec {
    Some(spec) => Logger::try_with_str(spec)?,
    None => Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?,
  };
  let handle = logger
    .log_to_stderr()
    .format(colored_default_format)
    .start()?;
  Ok(handle)
}

/// Logs a diagnostic at the level matching its severity.
pub fn diagnostic(diagnostic: &Diagnostic) {
  match diagnostic.severity {
    Severity::Ignored | Severity::Note => debug!("{}", diagnostic),
    Severity::Warning => warn!("{}", diagnostic),
    Severity::Error | Severity::Fatal => error!("{}", diagnostic),
  }
}
