//! Coordinator state, events and status snapshot.

use std::fmt;

use crate::request::UpdateRequest;
use crate::subscription::SubscriptionHandle;

/// Logical state of the start sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Permission dialog outstanding.
    AwaitingPermission,
    /// Checking device settings against the request.
    AwaitingSettings,
    /// Settings resolution dialog outstanding.
    AwaitingResolution,
    /// Updates wanted and allowed; subscribed while in the foreground.
    Running,
    /// The user denied the permission for the last attempt.
    PermissionDenied,
    /// Device settings cannot satisfy the request.
    SettingsBlocked,
}

impl CoordinatorState {
    /// Whether a start attempt is underway and its next step is pending.
    pub fn is_attempt_in_progress(&self) -> bool {
        matches!(
            self,
            Self::AwaitingPermission | Self::AwaitingSettings | Self::AwaitingResolution
        )
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::AwaitingPermission => "AwaitingPermission",
            Self::AwaitingSettings => "AwaitingSettings",
            Self::AwaitingResolution => "AwaitingResolution",
            Self::Running => "Running",
            Self::PermissionDenied => "PermissionDenied",
            Self::SettingsBlocked => "SettingsBlocked",
        };
        f.write_str(name)
    }
}

/// User-facing messages raised by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An explicit start was requested; displays may clear old fixes.
    UpdatesStarted,
    /// Updates were explicitly stopped.
    UpdatesStopped,
    /// The location permission was denied.
    PermissionDenied,
    /// Device settings cannot satisfy the request.
    SettingsBlocked,
    /// The user declined the settings change.
    ResolutionRejected,
    /// The settings dialog could not be shown.
    ResolutionLaunchFailed(String),
    /// The fix stream refused the subscription.
    SubscriptionFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdatesStarted => write!(f, "Location updates requested"),
            Self::UpdatesStopped => write!(f, "Location updates stopped"),
            Self::PermissionDenied => write!(f, "Location permission denied"),
            Self::SettingsBlocked => {
                write!(f, "Location settings are insufficient on this device")
            }
            Self::ResolutionRejected => write!(f, "Location settings were not changed"),
            Self::ResolutionLaunchFailed(reason) => {
                write!(f, "Could not open location settings: {}", reason)
            }
            Self::SubscriptionFailed(reason) => {
                write!(f, "Could not subscribe to location updates: {}", reason)
            }
        }
    }
}

/// Broadcast to observers of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// The logical state changed.
    Transition {
        from: CoordinatorState,
        to: CoordinatorState,
    },
    /// Something the user should be told about.
    Notice(Notice),
}

/// Point-in-time view of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    /// Logical state.
    pub state: CoordinatorState,
    /// Whether the user wants updates running.
    pub intent: bool,
    /// Whether the host context is active (resumed).
    pub foreground: bool,
    /// Active subscription, if any.
    pub subscription: Option<SubscriptionHandle>,
    /// Incremented on every stop; stale dialog results carry an older value.
    pub generation: u64,
    /// Request in effect.
    pub request: UpdateRequest,
}

impl CoordinatorStatus {
    /// Initial status for a fresh coordinator.
    pub fn initial(request: UpdateRequest) -> Self {
        Self {
            state: CoordinatorState::Idle,
            intent: false,
            foreground: true,
            subscription: None,
            generation: 0,
            request,
        }
    }

    /// Whether fixes are currently flowing.
    pub fn is_receiving(&self) -> bool {
        self.subscription.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(CoordinatorState::default(), CoordinatorState::Idle);
    }

    #[test]
    fn test_attempt_in_progress_states() {
        assert!(CoordinatorState::AwaitingPermission.is_attempt_in_progress());
        assert!(CoordinatorState::AwaitingSettings.is_attempt_in_progress());
        assert!(CoordinatorState::AwaitingResolution.is_attempt_in_progress());
        assert!(!CoordinatorState::Idle.is_attempt_in_progress());
        assert!(!CoordinatorState::Running.is_attempt_in_progress());
        assert!(!CoordinatorState::PermissionDenied.is_attempt_in_progress());
        assert!(!CoordinatorState::SettingsBlocked.is_attempt_in_progress());
    }

    #[test]
    fn test_initial_status() {
        let status = CoordinatorStatus::initial(UpdateRequest::default());
        assert_eq!(status.state, CoordinatorState::Idle);
        assert!(!status.intent);
        assert!(status.foreground);
        assert!(!status.is_receiving());
        assert_eq!(status.generation, 0);
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(
            Notice::PermissionDenied.to_string(),
            "Location permission denied"
        );
        assert_eq!(
            Notice::ResolutionLaunchFailed("no activity".to_string()).to_string(),
            "Could not open location settings: no activity"
        );
    }
}
