//! Settings negotiator: check, then resolve if the user can fix it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::request::UpdateRequest;

/// How the device settings compare with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsStatus {
    /// Settings already satisfy the request.
    Satisfied,
    /// A user-facing dialog can change the settings to satisfy the request.
    ResolvableUnsatisfied,
    /// Settings cannot be changed on this device (no hardware, airplane
    /// mode with network location required, ...).
    HardUnsatisfied,
}

impl fmt::Display for SettingsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfied => write!(f, "Satisfied"),
            Self::ResolvableUnsatisfied => write!(f, "ResolvableUnsatisfied"),
            Self::HardUnsatisfied => write!(f, "HardUnsatisfied"),
        }
    }
}

/// User's answer in the settings resolution dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The user applied the suggested settings change.
    Accepted,
    /// The user dismissed the dialog.
    Rejected,
}

/// The resolution dialog could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to launch settings resolution: {reason}")]
pub struct ResolutionLaunchError {
    /// Host-provided reason.
    pub reason: String,
}

impl ResolutionLaunchError {
    /// Create a launch error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Interpreted result of one resolution attempt.
///
/// A launch failure is kept distinct for reporting but follows the same
/// path as [`ResolutionResult::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Settings are presumed satisfied now.
    Accepted,
    /// User declined the change.
    Rejected,
    /// Dialog could not be shown; treated as rejected.
    LaunchFailed(String),
}

impl fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
            Self::LaunchFailed(reason) => write!(f, "LaunchFailed ({})", reason),
        }
    }
}

/// Port onto the host's location settings.
pub trait SettingsService: Send + Sync + 'static {
    /// Compare current device settings with the request.
    fn check_settings(&self, request: &UpdateRequest) -> SettingsStatus;

    /// Launch the resolution dialog and resolve with the user's answer.
    fn request_resolution(
        &self,
    ) -> impl Future<Output = Result<ResolutionOutcome, ResolutionLaunchError>> + Send;
}

/// Settings negotiator over a [`SettingsService`].
pub struct SettingsNegotiator<S: SettingsService> {
    service: Arc<S>,
}

impl<S: SettingsService> SettingsNegotiator<S> {
    /// Create a negotiator over the given service.
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Check the request against current device settings.
    pub fn check(&self, request: &UpdateRequest) -> SettingsStatus {
        let status = self.service.check_settings(request);
        tracing::debug!(%status, priority = %request.priority(), "Location settings checked");
        status
    }

    /// Run the resolution dialog.
    ///
    /// Launch failures never propagate: they are logged and reported as
    /// [`ResolutionResult::LaunchFailed`], which callers handle like a rejection.
    pub async fn resolve(&self) -> ResolutionResult {
        match self.service.request_resolution().await {
            Ok(ResolutionOutcome::Accepted) => {
                tracing::info!("Location settings resolution accepted");
                ResolutionResult::Accepted
            }
            Ok(ResolutionOutcome::Rejected) => {
                tracing::info!("Location settings resolution rejected by user");
                ResolutionResult::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "Settings resolution could not be launched, treating as rejected");
                ResolutionResult::LaunchFailed(e.reason)
            }
        }
    }
}
