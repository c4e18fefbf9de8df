//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::coordinator::DEFAULT_COMMAND_BUFFER;
use crate::request::{Priority, DEFAULT_FASTEST_INTERVAL, DEFAULT_INTERVAL};

/// Default target cadence in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = DEFAULT_INTERVAL.as_millis() as u64;

/// Default fastest cadence in milliseconds.
pub const DEFAULT_FASTEST_INTERVAL_MS: u64 = DEFAULT_FASTEST_INTERVAL.as_millis() as u64;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "locupdates.log";

/// Upper bound for the command channel capacity.
pub const MAX_COMMAND_BUFFER: usize = 1024;

/// Default log file path (~/.locupdates/locupdates.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            updates: UpdateSettings {
                interval_ms: DEFAULT_INTERVAL_MS,
                fastest_interval_ms: DEFAULT_FASTEST_INTERVAL_MS,
                priority: Priority::HighAccuracy,
            },
            coordinator: CoordinatorSettings {
                trust_accepted_resolution: false,
                command_buffer: DEFAULT_COMMAND_BUFFER,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
