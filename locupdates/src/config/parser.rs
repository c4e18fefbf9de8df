//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::MAX_COMMAND_BUFFER;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::request::UpdateRequest;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [updates] section
    if let Some(section) = ini.section(Some("updates")) {
        if let Some(v) = section.get("interval_ms") {
            config.updates.interval_ms = parse_millis("interval_ms", v)?;
        }
        if let Some(v) = section.get("fastest_interval_ms") {
            config.updates.fastest_interval_ms = parse_millis("fastest_interval_ms", v)?;
        }
        if let Some(v) = section.get("priority") {
            config.updates.priority = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "updates".to_string(),
                key: "priority".to_string(),
                value: v.to_string(),
                reason: "must be one of: high_accuracy, balanced, low_power, no_power".to_string(),
            })?;
        }
    }

    // Both intervals are known now; validate them together.
    UpdateRequest::from_millis(
        config.updates.interval_ms,
        config.updates.fastest_interval_ms,
        config.updates.priority,
    )
    .map_err(|e| ConfigFileError::InvalidValue {
        section: "updates".to_string(),
        key: "fastest_interval_ms".to_string(),
        value: config.updates.fastest_interval_ms.to_string(),
        reason: e.to_string(),
    })?;

    // [coordinator] section
    if let Some(section) = ini.section(Some("coordinator")) {
        if let Some(v) = section.get("trust_accepted_resolution") {
            config.coordinator.trust_accepted_resolution = parse_bool(v);
        }
        if let Some(v) = section.get("command_buffer") {
            let parsed: usize = v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "coordinator".to_string(),
                key: "command_buffer".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if parsed == 0 || parsed > MAX_COMMAND_BUFFER {
                return Err(ConfigFileError::InvalidValue {
                    section: "coordinator".to_string(),
                    key: "command_buffer".to_string(),
                    value: v.to_string(),
                    reason: format!("must be between 1 and {}", MAX_COMMAND_BUFFER),
                });
            }
            config.coordinator.command_buffer = parsed;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigFileError::InvalidValue {
            section: "updates".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer (milliseconds)".to_string(),
        }),
    }
}

/// Parse a boolean value from config.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
