//! Coordinator configuration.

/// Default command channel capacity.
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Default broadcast capacity for coordinator events.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for the location coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Subscribe straight after an accepted settings resolution instead of
    /// re-checking the settings first.
    pub trust_accepted_resolution: bool,

    /// Capacity of the command channel feeding the coordinator task.
    pub command_buffer: usize,

    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            trust_accepted_resolution: false,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
