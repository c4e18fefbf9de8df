//! Simulated platform services for the `run` command.
//!
//! The permission dialog, settings dialog and fix provider are scripted from
//! command-line flags so every path through the coordinator can be exercised
//! from a terminal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use clap::ValueEnum;
use console::style;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use locupdates::fix::RawFix;
use locupdates::permission::{PermissionOutcome, PermissionService};
use locupdates::request::UpdateRequest;
use locupdates::settings::{
    ResolutionLaunchError, ResolutionOutcome, SettingsService, SettingsStatus,
};
use locupdates::subscription::{FixStream, FixStreamError, StreamRegistration};

/// How long a simulated dialog stays on screen before it is answered.
pub const DIALOG_DELAY: Duration = Duration::from_millis(750);

/// Starting point of the simulated track (Hamburg).
const ORIGIN: (f64, f64) = (53.5511, 9.9937);

/// Radius of the simulated track in degrees.
const TRACK_RADIUS_DEG: f64 = 0.01;

// ============================================================================
// Permission
// ============================================================================

/// Scripted behaviour of the permission service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermissionMode {
    /// Permission already held
    Granted,
    /// Not held; the dialog is suppressed and answers Denied at once
    Denied,
    /// Not held; the dialog grants it
    AskGrant,
    /// Not held; the dialog denies it
    AskDeny,
}

/// Permission service driven by [`PermissionMode`].
pub struct SimulatedPermissions {
    mode: PermissionMode,
    granted: AtomicBool,
    rationale: bool,
}

impl SimulatedPermissions {
    pub fn new(mode: PermissionMode, rationale: bool) -> Self {
        Self {
            mode,
            granted: AtomicBool::new(mode == PermissionMode::Granted),
            rationale,
        }
    }
}

impl PermissionService for SimulatedPermissions {
    fn query_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn should_show_rationale(&self) -> bool {
        self.rationale
    }

    async fn show_rationale(&self) {
        println!(
            "{} Location access lets the app show where you are.",
            style("[rationale]").cyan()
        );
        tokio::time::sleep(DIALOG_DELAY).await;
    }

    async fn request_permission(&self, rationale_shown: bool) -> PermissionOutcome {
        if self.mode == PermissionMode::Denied {
            println!(
                "{} Suppressed, the user chose not to be asked again",
                style("[dialog]").cyan()
            );
            return PermissionOutcome::Denied;
        }

        println!(
            "{} Allow location access?{}",
            style("[dialog]").cyan(),
            if rationale_shown { " (after rationale)" } else { "" }
        );
        tokio::time::sleep(DIALOG_DELAY).await;

        let outcome = PermissionOutcome::from_granted(self.mode == PermissionMode::AskGrant);
        if outcome.is_granted() {
            self.granted.store(true, Ordering::SeqCst);
        }
        println!("{} User answered: {}", style("[dialog]").cyan(), outcome);
        outcome
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Scripted device settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingsMode {
    /// Settings already satisfy the request
    Satisfied,
    /// Unsatisfied, but the user can fix them from a dialog
    Resolvable,
    /// Unsatisfied and nothing the user can do
    Hard,
}

/// Scripted answer of the settings resolution dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolutionMode {
    /// Accept and fix the settings
    Accept,
    /// Dismiss the dialog
    Reject,
    /// The dialog cannot be shown
    Fail,
}

/// Settings service driven by [`SettingsMode`] and [`ResolutionMode`].
pub struct SimulatedSettings {
    status: Mutex<SettingsStatus>,
    resolution: ResolutionMode,
}

impl SimulatedSettings {
    pub fn new(mode: SettingsMode, resolution: ResolutionMode) -> Self {
        let status = match mode {
            SettingsMode::Satisfied => SettingsStatus::Satisfied,
            SettingsMode::Resolvable => SettingsStatus::ResolvableUnsatisfied,
            SettingsMode::Hard => SettingsStatus::HardUnsatisfied,
        };
        Self {
            status: Mutex::new(status),
            resolution,
        }
    }

    fn set_status(&self, status: SettingsStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }
}

impl SettingsService for SimulatedSettings {
    fn check_settings(&self, request: &UpdateRequest) -> SettingsStatus {
        let status = self
            .status
            .lock()
            .map(|s| *s)
            .unwrap_or(SettingsStatus::HardUnsatisfied);
        tracing::debug!(%request, %status, "Simulated settings check");
        status
    }

    async fn request_resolution(&self) -> Result<ResolutionOutcome, ResolutionLaunchError> {
        if self.resolution == ResolutionMode::Fail {
            return Err(ResolutionLaunchError::new("no window to host the settings dialog"));
        }

        println!("{} Turn on high accuracy location?", style("[dialog]").cyan());
        tokio::time::sleep(DIALOG_DELAY).await;

        let outcome = match self.resolution {
            ResolutionMode::Accept => {
                self.set_status(SettingsStatus::Satisfied);
                ResolutionOutcome::Accepted
            }
            _ => ResolutionOutcome::Rejected,
        };
        println!("{} User answered: {:?}", style("[dialog]").cyan(), outcome);
        Ok(outcome)
    }
}

// ============================================================================
// Fix stream
// ============================================================================

struct Emitter {
    cancellation: CancellationToken,
    task: JoinHandle<u64>,
}

/// Fix provider that walks a small circle around a fixed origin.
///
/// Each registration gets its own emitter task ticking at the request's
/// interval.
#[derive(Default)]
pub struct SimulatedFixStream {
    emitters: Mutex<HashMap<StreamRegistration, Emitter>>,
    next_id: AtomicU64,
}

impl SimulatedFixStream {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FixStream for SimulatedFixStream {
    fn subscribe(
        &self,
        request: &UpdateRequest,
        fixes: mpsc::UnboundedSender<RawFix>,
    ) -> Result<StreamRegistration, FixStreamError> {
        let registration = StreamRegistration(self.next_id.fetch_add(1, Ordering::SeqCst));
        let cancellation = CancellationToken::new();
        let task = spawn_emitter(request.interval(), fixes, cancellation.clone());

        self.emitters
            .lock()
            .map_err(|_| FixStreamError::Unavailable)?
            .insert(registration, Emitter { cancellation, task });

        tracing::debug!(%registration, %request, "Simulated fix stream registered");
        Ok(registration)
    }

    async fn unsubscribe(&self, registration: StreamRegistration) {
        let emitter = self
            .emitters
            .lock()
            .ok()
            .and_then(|mut emitters| emitters.remove(&registration));

        if let Some(emitter) = emitter {
            emitter.cancellation.cancel();
            match emitter.task.await {
                Ok(emitted) => {
                    tracing::debug!(%registration, emitted, "Simulated fix stream unregistered")
                }
                Err(e) => tracing::warn!(%registration, error = %e, "Emitter task failed"),
            }
        }
    }
}

/// Spawn a task pushing one fix per tick until cancelled or the receiver drops.
fn spawn_emitter(
    interval: Duration,
    fixes: mpsc::UnboundedSender<RawFix>,
    cancellation: CancellationToken,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut step = 0u64;

        loop {
            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break,

                _ = ticker.tick() => {
                    let (latitude, longitude) = track_position(step);
                    if fixes.send(RawFix::new(latitude, longitude)).is_err() {
                        break;
                    }
                    step += 1;
                }
            }
        }

        step
    })
}

/// Position on the simulated circular track after `step` ticks.
fn track_position(step: u64) -> (f64, f64) {
    let angle = step as f64 * 0.2;
    (
        ORIGIN.0 + TRACK_RADIUS_DEG * angle.sin(),
        ORIGIN.1 + TRACK_RADIUS_DEG * angle.cos(),
    )
}
