//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let trust_accepted_resolution = if config.coordinator.trust_accepted_resolution {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[updates]
; Target time between location fixes, in milliseconds (default: 10000)
interval_ms = {}
; Fastest rate fixes may arrive at, in milliseconds (default: 5000)
; Must not be larger than interval_ms
fastest_interval_ms = {}
; Accuracy/power tradeoff:
;   high_accuracy - most precise fixes (GPS)
;   balanced      - block-level accuracy (~100m)
;   low_power     - city-level accuracy (~10km)
;   no_power      - only fixes requested by other consumers
priority = {}

[coordinator]
; Subscribe immediately after the user accepts a settings change instead of
; checking the settings again first (default: false)
trust_accepted_resolution = {}
; Capacity of the command queue feeding the coordinator (default: 32)
command_buffer = {}

[logging]
; Log file location (cleared at the start of each session)
file = {}
"#,
        config.updates.interval_ms,
        config.updates.fastest_interval_ms,
        config.updates.priority,
        trust_accepted_resolution,
        config.coordinator.command_buffer,
        path_to_string(&config.logging.file),
    )
}

/// Convert a path to a string for INI output.
fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
