//! Scripted collaborators for coordinator tests.
//!
//! Each mock records how it was driven so tests can assert on call counts,
//! and can hold its dialog open until the test releases it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Notify};

use locupdates::coordinator::{
    CoordinatorConfig, CoordinatorEvent, CoordinatorHandle, CoordinatorState, CoordinatorStatus,
    LocationCoordinator, Notice,
};
use locupdates::fix::{FixSink, LocationFix, RawFix};
use locupdates::permission::{PermissionOutcome, PermissionService};
use locupdates::request::UpdateRequest;
use locupdates::settings::{
    ResolutionLaunchError, ResolutionOutcome, SettingsService, SettingsStatus,
};
use locupdates::subscription::{FixStream, FixStreamError, StreamRegistration};

/// How long tests wait for an asynchronous transition.
pub const WAIT: Duration = Duration::from_secs(2);

// ============================================================================
// Permissions
// ============================================================================

pub struct MockPermissions {
    granted: AtomicBool,
    rationale: AtomicBool,
    answers: Mutex<VecDeque<PermissionOutcome>>,
    hold: Option<Arc<Notify>>,
    pub requests: AtomicUsize,
    pub rationales_shown: AtomicUsize,
}

impl MockPermissions {
    /// Permission already held; no dialog will be shown.
    pub fn granted() -> Arc<Self> {
        Self::build(true, Vec::new(), None)
    }

    /// Permission not held; each request answers with the next scripted outcome
    /// (Denied once the script runs out).
    pub fn answering(answers: Vec<PermissionOutcome>) -> Arc<Self> {
        Self::build(false, answers, None)
    }

    /// Like [`MockPermissions::answering`] but each dialog waits for `release`.
    pub fn held(answers: Vec<PermissionOutcome>, release: Arc<Notify>) -> Arc<Self> {
        Self::build(false, answers, Some(release))
    }

    fn build(
        granted: bool,
        answers: Vec<PermissionOutcome>,
        hold: Option<Arc<Notify>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(granted),
            rationale: AtomicBool::new(false),
            answers: Mutex::new(answers.into()),
            hold,
            requests: AtomicUsize::new(0),
            rationales_shown: AtomicUsize::new(0),
        })
    }

    pub fn set_rationale(&self, rationale: bool) {
        self.rationale.store(rationale, Ordering::SeqCst);
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn rationale_count(&self) -> usize {
        self.rationales_shown.load(Ordering::SeqCst)
    }
}

impl PermissionService for MockPermissions {
    fn query_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn should_show_rationale(&self) -> bool {
        self.rationale.load(Ordering::SeqCst)
    }

    async fn show_rationale(&self) {
        self.rationales_shown.fetch_add(1, Ordering::SeqCst);
    }

    async fn request_permission(&self, _rationale_shown: bool) -> PermissionOutcome {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.hold {
            release.notified().await;
        }
        let outcome = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PermissionOutcome::Denied);
        if outcome.is_granted() {
            self.granted.store(true, Ordering::SeqCst);
        }
        outcome
    }
}

// ============================================================================
// Settings
// ============================================================================

/// What the scripted resolution dialog does.
#[derive(Debug, Clone)]
pub enum ResolutionScript {
    /// Accept, and make the settings satisfied.
    Accept,
    /// Accept, but leave the settings unsatisfied.
    AcceptWithoutFixing,
    Reject,
    FailToLaunch,
}

pub struct MockSettings {
    status: Mutex<SettingsStatus>,
    resolutions: Mutex<VecDeque<ResolutionScript>>,
    hold: Option<Arc<Notify>>,
    pub checks: AtomicUsize,
    pub resolutions_requested: AtomicUsize,
}

impl MockSettings {
    pub fn satisfied() -> Arc<Self> {
        Self::build(SettingsStatus::Satisfied, Vec::new(), None)
    }

    pub fn hard_unsatisfied() -> Arc<Self> {
        Self::build(SettingsStatus::HardUnsatisfied, Vec::new(), None)
    }

    pub fn resolvable(scripts: Vec<ResolutionScript>) -> Arc<Self> {
        Self::build(SettingsStatus::ResolvableUnsatisfied, scripts, None)
    }

    pub fn resolvable_held(scripts: Vec<ResolutionScript>, release: Arc<Notify>) -> Arc<Self> {
        Self::build(SettingsStatus::ResolvableUnsatisfied, scripts, Some(release))
    }

    fn build(
        status: SettingsStatus,
        scripts: Vec<ResolutionScript>,
        hold: Option<Arc<Notify>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            resolutions: Mutex::new(scripts.into()),
            hold,
            checks: AtomicUsize::new(0),
            resolutions_requested: AtomicUsize::new(0),
        })
    }

    pub fn set_status(&self, status: SettingsStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn resolution_count(&self) -> usize {
        self.resolutions_requested.load(Ordering::SeqCst)
    }
}

impl SettingsService for MockSettings {
    fn check_settings(&self, _request: &UpdateRequest) -> SettingsStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap()
    }

    async fn request_resolution(&self) -> Result<ResolutionOutcome, ResolutionLaunchError> {
        self.resolutions_requested.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.hold {
            release.notified().await;
        }
        let script = self
            .resolutions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ResolutionScript::Reject);
        match script {
            ResolutionScript::Accept => {
                self.set_status(SettingsStatus::Satisfied);
                Ok(ResolutionOutcome::Accepted)
            }
            ResolutionScript::AcceptWithoutFixing => Ok(ResolutionOutcome::Accepted),
            ResolutionScript::Reject => Ok(ResolutionOutcome::Rejected),
            ResolutionScript::FailToLaunch => {
                Err(ResolutionLaunchError::new("host cannot show dialogs"))
            }
        }
    }
}

// ============================================================================
// Fix stream
// ============================================================================

#[derive(Default)]
pub struct MockStream {
    active: Mutex<Vec<(StreamRegistration, mpsc::UnboundedSender<RawFix>)>>,
    requests: Mutex<Vec<UpdateRequest>>,
    next: AtomicU64,
    max_active: AtomicUsize,
    refuse: AtomicBool,
    pub subscribes: AtomicUsize,
    pub unsubscribes: AtomicUsize,
}

impl MockStream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Highest number of simultaneous registrations ever seen.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Push a fix to every live registration.
    pub fn emit(&self, latitude: f64, longitude: f64) {
        for (_, tx) in self.active.lock().unwrap().iter() {
            let _ = tx.send(RawFix::new(latitude, longitude));
        }
    }
}

impl FixStream for MockStream {
    fn subscribe(
        &self,
        request: &UpdateRequest,
        fixes: mpsc::UnboundedSender<RawFix>,
    ) -> Result<StreamRegistration, FixStreamError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(FixStreamError::Unavailable);
        }
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(*request);

        let registration = StreamRegistration(self.next.fetch_add(1, Ordering::SeqCst));
        let mut active = self.active.lock().unwrap();
        active.push((registration, fixes));
        self.max_active.fetch_max(active.len(), Ordering::SeqCst);
        Ok(registration)
    }

    async fn unsubscribe(&self, registration: StreamRegistration) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        self.active
            .lock()
            .unwrap()
            .retain(|(r, _)| *r != registration);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub handle: CoordinatorHandle,
    pub events: broadcast::Receiver<CoordinatorEvent>,
    pub fixes: mpsc::UnboundedReceiver<LocationFix>,
    pub stream: Arc<MockStream>,
    pub task: tokio::task::JoinHandle<()>,
}

pub fn spawn(
    permissions: Arc<MockPermissions>,
    settings: Arc<MockSettings>,
) -> Harness {
    spawn_with(
        UpdateRequest::default(),
        CoordinatorConfig::default(),
        permissions,
        settings,
    )
}

pub fn spawn_with(
    request: UpdateRequest,
    config: CoordinatorConfig,
    permissions: Arc<MockPermissions>,
    settings: Arc<MockSettings>,
) -> Harness {
    let stream = MockStream::new();
    let (fix_tx, fix_rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn FixSink> = Arc::new(move |fix: LocationFix| {
        let _ = fix_tx.send(fix);
    });

    let (handle, task) = LocationCoordinator::spawn(
        request,
        config,
        permissions,
        settings,
        Arc::clone(&stream),
        sink,
    );
    let events = handle.subscribe_events();

    Harness {
        handle,
        events,
        fixes: fix_rx,
        stream,
        task,
    }
}

impl Harness {
    /// Wait until the published status reaches `state`.
    pub async fn wait_for_state(&self, state: CoordinatorState) -> CoordinatorStatus {
        let mut watch = self.handle.watch_status();
        let status = tokio::time::timeout(WAIT, watch.wait_for(|s| s.state == state))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {}", state))
            .expect("coordinator exited")
            .clone();
        status
    }

    /// Events observed since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<CoordinatorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Let spawned dialog tasks run and round-trip through the coordinator.
    pub async fn settle(&self) -> CoordinatorStatus {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        self.handle.status().await.expect("coordinator running")
    }

    pub async fn next_fix(&mut self) -> LocationFix {
        tokio::time::timeout(WAIT, self.fixes.recv())
            .await
            .expect("timed out waiting for fix")
            .expect("sink closed")
    }
}

/// State transitions contained in `events`.
pub fn transitions(events: &[CoordinatorEvent]) -> Vec<(CoordinatorState, CoordinatorState)> {
    events
        .iter()
        .filter_map(|event| match event {
            CoordinatorEvent::Transition { from, to } => Some((*from, *to)),
            CoordinatorEvent::Notice(_) => None,
        })
        .collect()
}

/// Notices contained in `events`.
pub fn notices(events: &[CoordinatorEvent]) -> Vec<Notice> {
    events
        .iter()
        .filter_map(|event| match event {
            CoordinatorEvent::Notice(notice) => Some(notice.clone()),
            CoordinatorEvent::Transition { .. } => None,
        })
        .collect()
}
