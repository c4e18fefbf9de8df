//! The coordinator task.
//!
//! All state lives in one task. Commands from handles and results from the
//! permission and settings dialogs arrive as messages; dialogs run on their
//! own spawned tasks so the coordinator is never parked on them. The only
//! await inside the loop is subscription teardown.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use super::config::CoordinatorConfig;
use super::handle::{Command, CoordinatorHandle};
use super::state::{CoordinatorEvent, CoordinatorState, CoordinatorStatus, Notice};
use crate::fix::FixSink;
use crate::permission::{PermissionGate, PermissionOutcome, PermissionService};
use crate::request::UpdateRequest;
use crate::settings::{ResolutionResult, SettingsNegotiator, SettingsService, SettingsStatus};
use crate::subscription::{FixStream, UpdateSubscription};

/// Dialog results, tagged with the generation they were started in.
#[derive(Debug)]
enum Callback {
    Permission {
        generation: u64,
        outcome: PermissionOutcome,
    },
    Resolution {
        generation: u64,
        result: ResolutionResult,
    },
}

/// Sequences permission, settings and subscription for one consumer.
pub struct LocationCoordinator<P, S, F>
where
    P: PermissionService,
    S: SettingsService,
    F: FixStream,
{
    config: CoordinatorConfig,
    request: UpdateRequest,
    gate: Arc<PermissionGate<P>>,
    negotiator: Arc<SettingsNegotiator<S>>,
    subscription: UpdateSubscription<F>,

    state: CoordinatorState,
    /// The user wants updates. Set by start, cleared by stop only.
    intent: bool,
    /// Host context is active. Subscriptions only exist while true.
    foreground: bool,
    /// Incremented on every stop to invalidate outstanding dialogs.
    generation: u64,

    callbacks: mpsc::UnboundedSender<Callback>,
    events: broadcast::Sender<CoordinatorEvent>,
    status: watch::Sender<CoordinatorStatus>,
}

impl<P, S, F> LocationCoordinator<P, S, F>
where
    P: PermissionService,
    S: SettingsService,
    F: FixStream,
{
    /// Spawn a coordinator task and return its handle.
    ///
    /// The coordinator starts `Idle`, in the foreground, without intent.
    pub fn spawn(
        request: UpdateRequest,
        config: CoordinatorConfig,
        permissions: Arc<P>,
        settings: Arc<S>,
        stream: Arc<F>,
        sink: Arc<dyn FixSink>,
    ) -> (CoordinatorHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (callback_tx, callback_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(CoordinatorStatus::initial(request));

        let handle = CoordinatorHandle::new(command_tx, events_tx.clone(), status_rx);

        let coordinator = Self {
            config,
            request,
            gate: Arc::new(PermissionGate::new(permissions)),
            negotiator: Arc::new(SettingsNegotiator::new(settings)),
            subscription: UpdateSubscription::new(stream, sink),
            state: CoordinatorState::Idle,
            intent: false,
            foreground: true,
            generation: 0,
            callbacks: callback_tx,
            events: events_tx,
            status: status_tx,
        };

        let task = tokio::spawn(coordinator.run(command_rx, callback_rx));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut callbacks: mpsc::UnboundedReceiver<Callback>,
    ) {
        tracing::info!(
            request = %self.request,
            trust_accepted_resolution = self.config.trust_accepted_resolution,
            "Location coordinator started"
        );

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command).await.is_break() {
                        break;
                    }
                }
                Some(callback) = callbacks.recv() => self.handle_callback(callback),
            }
            self.publish_status();
        }

        self.subscription.end().await;
        self.publish_status();
        tracing::info!("Location coordinator stopped");
    }

    async fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop().await,
            Command::Pause => self.pause().await,
            Command::Resume => self.resume(),
            Command::Reconfigure(request) => self.reconfigure(request).await,
            Command::Status(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn start(&mut self) {
        self.intent = true;
        self.notify(Notice::UpdatesStarted);

        match self.state {
            state if state.is_attempt_in_progress() => {
                tracing::debug!(%state, "Start ignored, attempt already in progress");
            }
            CoordinatorState::Running => self.enter_running(),
            _ => self.begin_attempt(),
        }
    }

    async fn stop(&mut self) {
        self.intent = false;
        self.generation += 1;
        self.subscription.end().await;
        self.transition(CoordinatorState::Idle);
        self.notify(Notice::UpdatesStopped);
    }

    async fn pause(&mut self) {
        self.foreground = false;
        self.subscription.end().await;
        tracing::debug!(state = %self.state, intent = self.intent, "Coordinator paused");
    }

    fn resume(&mut self) {
        self.foreground = true;

        if !self.intent {
            tracing::debug!("Resumed without intent, nothing to do");
            return;
        }

        match self.state {
            state if state.is_attempt_in_progress() => {
                tracing::debug!(%state, "Dialog still outstanding on resume");
            }
            CoordinatorState::Running => self.enter_running(),
            CoordinatorState::SettingsBlocked => {
                tracing::debug!("Settings blocked, waiting for a new request or explicit start");
            }
            _ => self.begin_attempt(),
        }
    }

    async fn reconfigure(&mut self, request: UpdateRequest) {
        if request == self.request {
            tracing::debug!("Reconfigure with identical request ignored");
            return;
        }

        tracing::info!(old = %self.request, new = %request, "Update request replaced");
        self.request = request;

        match self.state {
            // The pending dialog's answer continues with the new request.
            state if state.is_attempt_in_progress() => {}
            CoordinatorState::Running => {
                self.subscription.end().await;
                self.transition(CoordinatorState::Idle);
                if self.foreground {
                    self.begin_attempt();
                }
            }
            _ => {
                self.transition(CoordinatorState::Idle);
                if self.intent && self.foreground {
                    self.begin_attempt();
                }
            }
        }
    }

    fn handle_callback(&mut self, callback: Callback) {
        match callback {
            Callback::Permission {
                generation,
                outcome,
            } => {
                if !self.is_current(generation, CoordinatorState::AwaitingPermission) {
                    tracing::debug!(
                        generation,
                        current_generation = self.generation,
                        state = %self.state,
                        %outcome,
                        "Discarding stale permission result"
                    );
                    return;
                }

                match outcome {
                    PermissionOutcome::Granted => self.check_settings(false),
                    PermissionOutcome::Denied => {
                        self.transition(CoordinatorState::PermissionDenied);
                        self.notify(Notice::PermissionDenied);
                    }
                }
            }
            Callback::Resolution { generation, result } => {
                if !self.is_current(generation, CoordinatorState::AwaitingResolution) {
                    tracing::debug!(
                        generation,
                        current_generation = self.generation,
                        state = %self.state,
                        %result,
                        "Discarding stale resolution result"
                    );
                    return;
                }

                match result {
                    ResolutionResult::Accepted if self.config.trust_accepted_resolution => {
                        self.enter_running()
                    }
                    ResolutionResult::Accepted => self.check_settings(true),
                    ResolutionResult::Rejected => {
                        self.transition(CoordinatorState::Idle);
                        self.notify(Notice::ResolutionRejected);
                    }
                    ResolutionResult::LaunchFailed(reason) => {
                        self.transition(CoordinatorState::Idle);
                        self.notify(Notice::ResolutionLaunchFailed(reason));
                    }
                }
            }
        }
    }

    /// Start a fresh attempt from the permission check.
    fn begin_attempt(&mut self) {
        self.transition(CoordinatorState::AwaitingPermission);

        match self.gate.check() {
            PermissionOutcome::Granted => self.check_settings(false),
            PermissionOutcome::Denied => {
                let show_rationale = self.gate.should_show_rationale();
                self.request_permission(show_rationale);
            }
        }
    }

    /// Check settings; `after_resolution` means the user just accepted a
    /// change, so anything short of satisfied blocks instead of prompting again.
    fn check_settings(&mut self, after_resolution: bool) {
        self.transition(CoordinatorState::AwaitingSettings);

        match self.negotiator.check(&self.request) {
            SettingsStatus::Satisfied => self.enter_running(),
            SettingsStatus::ResolvableUnsatisfied if !after_resolution => {
                self.transition(CoordinatorState::AwaitingResolution);
                self.request_resolution();
            }
            status => {
                if after_resolution {
                    tracing::warn!(%status, "Settings still unsatisfied after accepted resolution");
                }
                self.transition(CoordinatorState::SettingsBlocked);
                self.notify(Notice::SettingsBlocked);
            }
        }
    }

    /// Subscribe (when in the foreground) and mark the coordinator running.
    fn enter_running(&mut self) {
        if !self.foreground {
            tracing::debug!("Host inactive, subscription deferred until resume");
            self.transition(CoordinatorState::Running);
            return;
        }

        match self.subscription.begin(&self.request) {
            Ok(_) => self.transition(CoordinatorState::Running),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to subscribe to location updates");
                self.transition(CoordinatorState::Idle);
                self.notify(Notice::SubscriptionFailed(e.to_string()));
            }
        }
    }

    fn request_permission(&self, show_rationale: bool) {
        let gate = Arc::clone(&self.gate);
        let callbacks = self.callbacks.clone();
        let generation = self.generation;

        tracing::info!(show_rationale, generation, "Requesting location permission");
        tokio::spawn(async move {
            let outcome = gate.request(show_rationale).await;
            let _ = callbacks.send(Callback::Permission {
                generation,
                outcome,
            });
        });
    }

    fn request_resolution(&self) {
        let negotiator = Arc::clone(&self.negotiator);
        let callbacks = self.callbacks.clone();
        let generation = self.generation;

        tracing::info!(generation, "Requesting location settings resolution");
        tokio::spawn(async move {
            let result = negotiator.resolve().await;
            let _ = callbacks.send(Callback::Resolution { generation, result });
        });
    }

    fn is_current(&self, generation: u64, expected: CoordinatorState) -> bool {
        generation == self.generation && self.intent && self.state == expected
    }

    fn transition(&mut self, to: CoordinatorState) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        tracing::info!(%from, %to, generation = self.generation, "Coordinator state changed");
        let _ = self.events.send(CoordinatorEvent::Transition { from, to });
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "Coordinator notice");
        let _ = self.events.send(CoordinatorEvent::Notice(notice));
    }

    fn snapshot(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            state: self.state,
            intent: self.intent,
            foreground: self.foreground,
            subscription: self.subscription.handle(),
            generation: self.generation,
            request: self.request,
        }
    }

    fn publish_status(&self) {
        let snapshot = self.snapshot();
        self.status.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
