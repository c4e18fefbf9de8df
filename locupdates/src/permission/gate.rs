//! Permission gate: check, optionally explain, then request.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Result of a permission query or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Location permission is held.
    Granted,
    /// Location permission is not held.
    Denied,
}

impl PermissionOutcome {
    /// Map a raw "is granted" flag onto an outcome.
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    /// True for [`PermissionOutcome::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for PermissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "Granted"),
            Self::Denied => write!(f, "Denied"),
        }
    }
}

/// Port onto the host permission system.
///
/// `request_permission` and `show_rationale` drive user-facing dialogs that
/// cannot be force-closed; each call must resolve exactly once.
pub trait PermissionService: Send + Sync + 'static {
    /// Whether the location permission is currently held.
    fn query_permission(&self) -> bool;

    /// Whether a prior denial means the user should be told why before asking again.
    fn should_show_rationale(&self) -> bool;

    /// Surface the rationale and resolve once the user acknowledges it.
    fn show_rationale(&self) -> impl Future<Output = ()> + Send;

    /// Issue the OS permission request and resolve with the user's answer.
    fn request_permission(
        &self,
        rationale_shown: bool,
    ) -> impl Future<Output = PermissionOutcome> + Send;
}

/// Permission gate over a [`PermissionService`].
pub struct PermissionGate<P: PermissionService> {
    service: Arc<P>,
}

impl<P: PermissionService> PermissionGate<P> {
    /// Create a gate over the given service.
    pub fn new(service: Arc<P>) -> Self {
        Self { service }
    }

    /// Synchronous query of the current permission state.
    pub fn check(&self) -> PermissionOutcome {
        PermissionOutcome::from_granted(self.service.query_permission())
    }

    /// Whether the next request should be preceded by a rationale.
    pub fn should_show_rationale(&self) -> bool {
        self.service.should_show_rationale()
    }

    /// Request the permission.
    ///
    /// With `show_rationale` the rationale is surfaced first and the OS
    /// request is only issued after it is acknowledged. Never retries: one
    /// call, one outcome.
    pub async fn request(&self, show_rationale: bool) -> PermissionOutcome {
        if show_rationale {
            tracing::debug!("Showing location permission rationale");
            self.service.show_rationale().await;
        }

        let outcome = self.service.request_permission(show_rationale).await;
        tracing::info!(%outcome, rationale_shown = show_rationale, "Location permission request answered");
        outcome
    }
}
