//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::request::Priority;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Update cadence settings
    pub updates: UpdateSettings,
    /// Coordinator behaviour settings
    pub coordinator: CoordinatorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Update request configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSettings {
    /// Target cadence between fixes, in milliseconds.
    pub interval_ms: u64,
    /// Fastest allowed cadence, in milliseconds. Must not exceed `interval_ms`.
    pub fastest_interval_ms: u64,
    /// Accuracy/power tradeoff.
    pub priority: Priority,
}

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSettings {
    /// Skip the settings re-check after the user accepts a resolution.
    pub trust_accepted_resolution: bool,
    /// Command channel capacity.
    pub command_buffer: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
