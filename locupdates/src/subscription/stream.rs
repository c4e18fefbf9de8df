//! Fix stream port.

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::fix::RawFix;
use crate::request::UpdateRequest;

/// Identifier the fix stream assigns to one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamRegistration(pub u64);

impl fmt::Display for StreamRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration-{}", self.0)
    }
}

/// Errors reported by a fix stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixStreamError {
    /// The provider refused the registration.
    #[error("fix stream refused subscription: {0}")]
    Refused(String),

    /// The provider is not available at all.
    #[error("fix stream unavailable")]
    Unavailable,
}

/// Port onto the external location fix provider.
///
/// Fixes for a registration are pushed into the supplied sender in the order
/// the provider produces them. After `unsubscribe` resolves the provider
/// must not push any more fixes for that registration.
pub trait FixStream: Send + Sync + 'static {
    /// Register for fixes at the cadence described by `request`.
    fn subscribe(
        &self,
        request: &UpdateRequest,
        fixes: mpsc::UnboundedSender<RawFix>,
    ) -> Result<StreamRegistration, FixStreamError>;

    /// Remove a registration; resolves once the provider acknowledges.
    fn unsubscribe(&self, registration: StreamRegistration) -> impl Future<Output = ()> + Send;
}
