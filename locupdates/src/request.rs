//! Update request configuration.
//!
//! An [`UpdateRequest`] describes how often location fixes are wanted and how
//! the device should trade accuracy against power. It is validated once on
//! construction and never mutated afterwards; changing the cadence means
//! building a new request.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default target cadence between fixes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10_000);

/// Default cap on how fast fixes may arrive.
pub const DEFAULT_FASTEST_INTERVAL: Duration = Duration::from_millis(5_000);

/// Accuracy versus power tradeoff requested from the fix provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Most accurate fixes available (GPS).
    #[default]
    HighAccuracy,
    /// Block-level accuracy (~100m), typically Wi-Fi and cell.
    Balanced,
    /// City-level accuracy (~10km).
    LowPower,
    /// No fixes of our own; only piggyback on other consumers.
    NoPower,
}

impl Priority {
    /// All priorities, most accurate first.
    pub const ALL: [Priority; 4] = [
        Priority::HighAccuracy,
        Priority::Balanced,
        Priority::LowPower,
        Priority::NoPower,
    ];

    /// Config-file spelling of this priority.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HighAccuracy => "high_accuracy",
            Self::Balanced => "balanced",
            Self::LowPower => "low_power",
            Self::NoPower => "no_power",
        }
    }

    /// Whether satisfying this priority needs a precise (GPS) source.
    pub fn requires_precise_source(&self) -> bool {
        matches!(self, Self::HighAccuracy)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| RequestError::UnknownPriority(s.to_string()))
    }
}

/// Errors produced when building an [`UpdateRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The target interval must be non-zero.
    #[error("update interval must be greater than zero")]
    ZeroInterval,

    /// The fastest interval must be non-zero.
    #[error("fastest update interval must be greater than zero")]
    ZeroFastestInterval,

    /// The fastest interval caps cadence, so it cannot exceed the target interval.
    #[error("fastest interval ({fastest_ms}ms) exceeds interval ({interval_ms}ms)")]
    FastestExceedsInterval { interval_ms: u64, fastest_ms: u64 },

    /// Unrecognised priority name.
    #[error("unknown priority '{0}' (expected high_accuracy, balanced, low_power or no_power)")]
    UnknownPriority(String),
}

/// Immutable description of the wanted update cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    interval: Duration,
    fastest_interval: Duration,
    priority: Priority,
}

impl UpdateRequest {
    /// Build a validated request.
    pub fn new(
        interval: Duration,
        fastest_interval: Duration,
        priority: Priority,
    ) -> Result<Self, RequestError> {
        if interval.is_zero() {
            return Err(RequestError::ZeroInterval);
        }
        if fastest_interval.is_zero() {
            return Err(RequestError::ZeroFastestInterval);
        }
        if fastest_interval > interval {
            return Err(RequestError::FastestExceedsInterval {
                interval_ms: interval.as_millis() as u64,
                fastest_ms: fastest_interval.as_millis() as u64,
            });
        }

        Ok(Self {
            interval,
            fastest_interval,
            priority,
        })
    }

    /// Build a request from millisecond values, as found in config files.
    pub fn from_millis(
        interval_ms: u64,
        fastest_interval_ms: u64,
        priority: Priority,
    ) -> Result<Self, RequestError> {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(fastest_interval_ms),
            priority,
        )
    }

    /// Target cadence between fixes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fastest cadence fixes may be delivered at.
    pub fn fastest_interval(&self) -> Duration {
        self.fastest_interval
    }

    /// Accuracy/power tradeoff.
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            fastest_interval: DEFAULT_FASTEST_INTERVAL,
            priority: Priority::HighAccuracy,
        }
    }
}

impl fmt::Display for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "every {}ms (fastest {}ms, {})",
            self.interval.as_millis(),
            self.fastest_interval.as_millis(),
            self.priority
        )
    }
}
