//! Configuration file handling for ~/.locupdates/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;
use crate::coordinator::{CoordinatorConfig, DEFAULT_EVENT_CAPACITY};
use crate::request::UpdateRequest;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.locupdates/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.locupdates/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Build the update request described by the `[updates]` section.
    pub fn update_request(&self) -> Result<UpdateRequest, ConfigFileError> {
        UpdateRequest::from_millis(
            self.updates.interval_ms,
            self.updates.fastest_interval_ms,
            self.updates.priority,
        )
        .map_err(|e| ConfigFileError::InvalidValue {
            section: "updates".to_string(),
            key: "fastest_interval_ms".to_string(),
            value: self.updates.fastest_interval_ms.to_string(),
            reason: e.to_string(),
        })
    }

    /// Build the coordinator configuration from the `[coordinator]` section.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            trust_accepted_resolution: self.coordinator.trust_accepted_resolution,
            command_buffer: self.coordinator.command_buffer,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Get the path to the config directory (~/.locupdates).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".locupdates")
}

/// Get the path to the config file (~/.locupdates/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
