//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::defaults::MAX_COMMAND_BUFFER;
use super::parser::{expand_tilde, parse_bool};
use super::settings::ConfigFile;
use crate::request::{Priority, UpdateRequest};

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Update settings
    UpdatesIntervalMs,
    UpdatesFastestIntervalMs,
    UpdatesPriority,

    // Coordinator settings
    CoordinatorTrustAcceptedResolution,
    CoordinatorCommandBuffer,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "updates.interval_ms" => Ok(ConfigKey::UpdatesIntervalMs),
            "updates.fastest_interval_ms" => Ok(ConfigKey::UpdatesFastestIntervalMs),
            "updates.priority" => Ok(ConfigKey::UpdatesPriority),

            "coordinator.trust_accepted_resolution" => {
                Ok(ConfigKey::CoordinatorTrustAcceptedResolution)
            }
            "coordinator.command_buffer" => Ok(ConfigKey::CoordinatorCommandBuffer),

            "logging.file" => Ok(ConfigKey::LoggingFile),

            _ => Err(ConfigKeyError::UnknownKey(s.to_string())),
        }
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "updates.interval_ms").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::UpdatesIntervalMs => "updates.interval_ms",
            ConfigKey::UpdatesFastestIntervalMs => "updates.fastest_interval_ms",
            ConfigKey::UpdatesPriority => "updates.priority",
            ConfigKey::CoordinatorTrustAcceptedResolution => {
                "coordinator.trust_accepted_resolution"
            }
            ConfigKey::CoordinatorCommandBuffer => "coordinator.command_buffer",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "updates").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or(self.name())
    }

    /// Get the key name within the section (e.g., "interval_ms").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::UpdatesIntervalMs => config.updates.interval_ms.to_string(),
            ConfigKey::UpdatesFastestIntervalMs => config.updates.fastest_interval_ms.to_string(),
            ConfigKey::UpdatesPriority => config.updates.priority.as_str().to_string(),
            ConfigKey::CoordinatorTrustAcceptedResolution => {
                config.coordinator.trust_accepted_resolution.to_string()
            }
            ConfigKey::CoordinatorCommandBuffer => config.coordinator.command_buffer.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    /// Interval changes are also checked against the other interval; on any
    /// failure the config is left untouched.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;

        let mut updated = config.clone();
        self.set_validated(&mut updated, value)?;

        UpdateRequest::from_millis(
            updated.updates.interval_ms,
            updated.updates.fastest_interval_ms,
            updated.updates.priority,
        )
        .map_err(|e| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: e.to_string(),
        })?;

        *config = updated;
        Ok(())
    }

    /// Apply an already-validated value.
    fn set_validated(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::UpdatesIntervalMs => {
                config.updates.interval_ms = self.parse_number(value)?;
            }
            ConfigKey::UpdatesFastestIntervalMs => {
                config.updates.fastest_interval_ms = self.parse_number(value)?;
            }
            ConfigKey::UpdatesPriority => {
                config.updates.priority =
                    value
                        .parse()
                        .map_err(|e: crate::request::RequestError| {
                            ConfigKeyError::ValidationFailed {
                                key: self.name().to_string(),
                                reason: e.to_string(),
                            }
                        })?;
            }
            ConfigKey::CoordinatorTrustAcceptedResolution => {
                config.coordinator.trust_accepted_resolution = parse_bool(value);
            }
            ConfigKey::CoordinatorCommandBuffer => {
                config.coordinator.command_buffer = self.parse_number(value)?;
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value
            .parse()
            .map_err(|_| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason: "must be a positive integer".to_string(),
            })
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::UpdatesIntervalMs => Box::new(PositiveIntegerSpec),
            ConfigKey::UpdatesFastestIntervalMs => Box::new(PositiveIntegerSpec),
            ConfigKey::UpdatesPriority => Box::new(OneOfSpec::new(PRIORITY_NAMES)),
            ConfigKey::CoordinatorTrustAcceptedResolution => Box::new(BooleanSpec),
            ConfigKey::CoordinatorCommandBuffer => {
                Box::new(RangeSpec::new(1, MAX_COMMAND_BUFFER as u64))
            }
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::UpdatesIntervalMs,
            ConfigKey::UpdatesFastestIntervalMs,
            ConfigKey::UpdatesPriority,
            ConfigKey::CoordinatorTrustAcceptedResolution,
            ConfigKey::CoordinatorCommandBuffer,
            ConfigKey::LoggingFile,
        ]
    }
}

const PRIORITY_NAMES: &[&str] = &[
    Priority::HighAccuracy.as_str(),
    Priority::Balanced.as_str(),
    Priority::LowPower.as_str(),
    Priority::NoPower.as_str(),
];

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification that requires the value to be one of a set of options.
struct OneOfSpec {
    options: &'static [&'static str],
}

impl OneOfSpec {
    fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl ValueSpecification for OneOfSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        if self.options.iter().any(|opt| *opt == normalized) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", self.options.join(", ")))
        }
    }
}

/// Specification for non-zero integer values.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

/// Specification for integers within an inclusive range.
struct RangeSpec {
    min: u64,
    max: u64,
}

impl RangeSpec {
    fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.trim().parse::<u64>() {
            Ok(n) if (self.min..=self.max).contains(&n) => Ok(()),
            _ => Err(format!("must be between {} and {}", self.min, self.max)),
        }
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.trim().to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Convert path to display string, collapsing home dir to ~.
fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
