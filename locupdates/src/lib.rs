//! locupdates - periodic location updates with permission and settings negotiation
//!
//! This library decides *when* a client should be listening for location
//! fixes. It asks for the location permission, checks that device settings
//! can satisfy the requested accuracy and cadence, lets the user fix
//! settings that fall short, and keeps a single subscription to the fix
//! stream alive while the host is in the foreground.
//!
//! The permission dialog, settings dialog and fix provider are external
//! services reached through the [`permission::PermissionService`],
//! [`settings::SettingsService`] and [`subscription::FixStream`] traits.
//!
//! # High-Level API
//!
//! ```ignore
//! use locupdates::coordinator::{CoordinatorConfig, LocationCoordinator};
//! use locupdates::request::UpdateRequest;
//!
//! let (handle, _task) = LocationCoordinator::spawn(
//!     UpdateRequest::default(),
//!     CoordinatorConfig::default(),
//!     permissions,
//!     settings,
//!     fix_stream,
//!     sink,
//! );
//!
//! handle.start().await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod fix;
pub mod logging;
pub mod permission;
pub mod request;
pub mod settings;
pub mod subscription;

/// Version of the locupdates library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
