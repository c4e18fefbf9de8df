//! CLI runner for common setup.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from the same state.

use std::path::Path;

use locupdates::config::{ConfigFile, DEFAULT_LOG_FILE_NAME};
use locupdates::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to load instead of `~/.locupdates/config.ini`
    /// * `debug_mode` - When true, enables debug-level logging and mirrors
    ///   it to stderr regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let log_path = &config.logging.file;
        let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());

        // Fixes go to stdout, so console logging (when enabled) goes to stderr.
        let logging_guard = init_logging(log_dir, &log_file, debug_mode, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("locupdates v{}", locupdates::VERSION);
        info!(log_file = %self.config.logging.file.display(), "locupdates CLI: {} command", command);
    }
}
