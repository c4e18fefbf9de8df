//! Client handle for a running coordinator.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::state::{CoordinatorEvent, CoordinatorStatus};
use crate::request::UpdateRequest;

/// Errors returned by [`CoordinatorHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The coordinator task has exited.
    #[error("location coordinator is no longer running")]
    Closed,

    /// The coordinator exited before answering a query.
    #[error("location coordinator dropped the reply")]
    NoReply,
}

/// Messages from handles into the coordinator task.
#[derive(Debug)]
pub(super) enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    Reconfigure(UpdateRequest),
    Status(oneshot::Sender<CoordinatorStatus>),
    Shutdown,
}

/// Cloneable handle used by the host (UI, lifecycle) to drive a coordinator.
///
/// Commands are processed in the order they are sent. The coordinator task
/// exits on [`CoordinatorHandle::shutdown`] or once every handle is dropped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<CoordinatorEvent>,
    status: watch::Receiver<CoordinatorStatus>,
}

impl CoordinatorHandle {
    pub(super) fn new(
        commands: mpsc::Sender<Command>,
        events: broadcast::Sender<CoordinatorEvent>,
        status: watch::Receiver<CoordinatorStatus>,
    ) -> Self {
        Self {
            commands,
            events,
            status,
        }
    }

    /// User wants updates: set intent and run the start sequence.
    pub async fn start(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Start).await
    }

    /// User no longer wants updates: clear intent and unsubscribe.
    pub async fn stop(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Stop).await
    }

    /// Host context became inactive: unsubscribe, keep intent and state.
    pub async fn pause(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Pause).await
    }

    /// Host context became active again.
    pub async fn resume(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Resume).await
    }

    /// Replace the update request.
    pub async fn reconfigure(&self, request: UpdateRequest) -> Result<(), CoordinatorError> {
        self.send(Command::Reconfigure(request)).await
    }

    /// Stop the coordinator task, tearing down any subscription.
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Shutdown).await
    }

    /// Status after every previously sent command has been processed.
    pub async fn status(&self) -> Result<CoordinatorStatus, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Status(reply_tx)).await?;
        reply_rx.await.map_err(|_| CoordinatorError::NoReply)
    }

    /// Latest published status, without a round trip.
    pub fn current_status(&self) -> CoordinatorStatus {
        self.status.borrow().clone()
    }

    /// Watch status changes.
    pub fn watch_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status.clone()
    }

    /// Subscribe to transitions and notices.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: Command) -> Result<(), CoordinatorError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoordinatorError::Closed)
    }
}
