//! Location Coordinator
//!
//! Orchestrates the start sequence for periodic location updates:
//!
//! ```text
//! start ─▶ AwaitingPermission ──Granted──▶ AwaitingSettings ──Satisfied──▶ Running
//!               │                               │      │
//!             Denied                   Resolvable│      │Hard
//!               ▼                               ▼      ▼
//!         PermissionDenied            AwaitingResolution  SettingsBlocked
//!                                        │Accepted  │Rejected / launch failure
//!                                        ▼          ▼
//!                              AwaitingSettings    Idle (intent kept)
//! ```
//!
//! # Intent vs subscription
//!
//! The coordinator tracks the user's wish for updates (intent) separately
//! from whether a subscription exists. `pause` drops the subscription but
//! keeps intent and state; `resume` re-subscribes when `Running` and
//! retries the sequence from `Idle` or `PermissionDenied`. Only `stop`
//! clears intent.
//!
//! # Stale results
//!
//! Permission and settings dialogs cannot be dismissed programmatically.
//! Each is tagged with the generation current when it was opened; `stop`
//! bumps the generation so answers arriving afterwards are dropped.
//!
//! # Usage
//!
//! ```ignore
//! let (handle, task) = LocationCoordinator::spawn(
//!     UpdateRequest::default(),
//!     CoordinatorConfig::default(),
//!     permissions,
//!     settings,
//!     fix_stream,
//!     sink,
//! );
//!
//! handle.start().await?;
//! // lifecycle hooks
//! handle.pause().await?;
//! handle.resume().await?;
//! ```

mod actor;
mod config;
mod handle;
mod state;

pub use actor::LocationCoordinator;
pub use config::{CoordinatorConfig, DEFAULT_COMMAND_BUFFER, DEFAULT_EVENT_CAPACITY};
pub use handle::{CoordinatorError, CoordinatorHandle};
pub use state::{CoordinatorEvent, CoordinatorState, CoordinatorStatus, Notice};
