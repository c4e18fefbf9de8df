//! Runtime location permission.
//!
//! The [`PermissionService`] trait is the port onto the host's permission
//! system (the OS dialog is opaque to us). [`PermissionGate`] sits on top of
//! it and implements the check / rationale / request sequence the
//! coordinator runs before anything else.

mod gate;

pub use gate::{PermissionGate, PermissionOutcome, PermissionService};
