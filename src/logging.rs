// src/logging.rs

use crate::config::get_config;
use crate::errors::{AuraError, AuraResult};
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};

/// Routes `log` macros to a file next to the config. The terminal is owned
/// by the UI, so nothing may ever write to stdout/stderr while running.
/// The returned handle must stay alive for the duration of the program.
pub fn initialize_logging() -> AuraResult<LoggerHandle> {
    let log_dir = dirs::home_dir()
        .ok_or_else(|| AuraError::config("Could not determine home directory"))?
        .join(".config")
        .join("aura-chat")
        .join("logs");

    Logger::try_with_str(get_config().log_level)
        .map_err(|e| AuraError::config(format!("Invalid log level: {}", e)))?
        .log_to_file(FileSpec::default().directory(log_dir).basename("aura-chat"))
        .write_mode(WriteMode::BufferAndFlush)
        .start()
        .map_err(|e| AuraError::config(format!("Failed to start logger: {}", e)))
}
