//! Update subscription - owner of the single active fix stream registration.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::stream::{FixStream, FixStreamError, StreamRegistration};
use crate::fix::{FixSink, LocationFix, RawFix};
use crate::request::UpdateRequest;

/// Opaque token for the active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// Bookkeeping for the live registration.
struct ActiveSubscription {
    handle: SubscriptionHandle,
    registration: StreamRegistration,
    cancellation: CancellationToken,
    forwarder: JoinHandle<u64>,
}

/// Owns at most one registration with the fix stream.
pub struct UpdateSubscription<F: FixStream> {
    stream: Arc<F>,
    sink: Arc<dyn FixSink>,
    active: Option<ActiveSubscription>,
    next_handle: u64,
}

impl<F: FixStream> UpdateSubscription<F> {
    /// Create an idle subscription delivering to `sink`.
    pub fn new(stream: Arc<F>, sink: Arc<dyn FixSink>) -> Self {
        Self {
            stream,
            sink,
            active: None,
            next_handle: 1,
        }
    }

    /// Current handle, if subscribed.
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        self.active.as_ref().map(|a| a.handle)
    }

    /// Whether a registration is live.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Register with the fix stream.
    ///
    /// Returns the existing handle unchanged when already subscribed, so the
    /// stream never sees a second registration. Must be called inside a
    /// tokio runtime: the forwarding task is spawned here.
    pub fn begin(
        &mut self,
        request: &UpdateRequest,
    ) -> Result<SubscriptionHandle, FixStreamError> {
        if let Some(active) = &self.active {
            tracing::debug!(handle = %active.handle, "Subscription already active, reusing handle");
            return Ok(active.handle);
        }

        let (fix_tx, fix_rx) = mpsc::unbounded_channel();
        let registration = self.stream.subscribe(request, fix_tx)?;

        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;

        let cancellation = CancellationToken::new();
        let forwarder = tokio::spawn(forward_fixes(
            fix_rx,
            Arc::clone(&self.sink),
            cancellation.clone(),
            handle,
        ));

        tracing::info!(
            %handle,
            %registration,
            interval_ms = request.interval().as_millis() as u64,
            fastest_interval_ms = request.fastest_interval().as_millis() as u64,
            priority = %request.priority(),
            "Location updates subscribed"
        );

        self.active = Some(ActiveSubscription {
            handle,
            registration,
            cancellation,
            forwarder,
        });

        Ok(handle)
    }

    /// Unregister from the fix stream. No-op when not subscribed.
    ///
    /// Fixes the stream dispatched before acknowledging the unsubscribe are
    /// still forwarded; once this returns the forwarding task has exited.
    pub async fn end(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.stream.unsubscribe(active.registration).await;
        active.cancellation.cancel();

        match active.forwarder.await {
            Ok(delivered) => {
                tracing::info!(handle = %active.handle, delivered, "Location updates unsubscribed");
            }
            Err(e) => {
                tracing::warn!(handle = %active.handle, error = %e, "Fix forwarding task failed");
            }
        }
    }
}

/// Forward raw fixes to the sink in arrival order, stamping receipt time.
async fn forward_fixes(
    mut fixes: mpsc::UnboundedReceiver<RawFix>,
    sink: Arc<dyn FixSink>,
    cancellation: CancellationToken,
    handle: SubscriptionHandle,
) -> u64 {
    let mut delivered: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                // Flush what the stream queued before its unsubscribe returned.
                while let Ok(raw) = fixes.try_recv() {
                    deliver(&*sink, raw, handle);
                    delivered += 1;
                }
                break;
            }
            raw = fixes.recv() => match raw {
                Some(raw) => {
                    deliver(&*sink, raw, handle);
                    delivered += 1;
                }
                None => {
                    tracing::debug!(%handle, "Fix stream closed its sender");
                    break;
                }
            },
        }
    }

    delivered
}

fn deliver(sink: &dyn FixSink, raw: RawFix, handle: SubscriptionHandle) {
    let fix = LocationFix::received(raw);
    tracing::trace!(%handle, lat = fix.latitude, lon = fix.longitude, "Forwarding fix");
    sink.on_fix(fix);
}
