//! Logging bootstrap. Level comes from the TASKLIST_LOG environment
//! variable (trace|debug|info|warn|error), warn when unset; output goes to
//! stderr so it never mixes with rendered boards or JSON on stdout.

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

const LOG_ENV_VAR: &str = "TASKLIST_LOG";
const DEFAULT_LEVEL: &str = "warn";

/// The returned handle must stay alive for the process lifetime.
pub fn init() -> Result<LoggerHandle, FlexiLoggerError> {
    let level = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    Logger::try_with_str(&level)?.log_to_stderr().start()
}
