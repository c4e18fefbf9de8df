//! Device location settings.
//!
//! [`SettingsService`] is the port onto the host's settings check and its
//! resolution dialog. [`SettingsNegotiator`] decides whether the current
//! settings satisfy an [`UpdateRequest`](crate::request::UpdateRequest) and,
//! when they can be fixed, runs the resolution flow and interprets the result.

mod negotiator;

pub use negotiator::{
    ResolutionLaunchError, ResolutionOutcome, ResolutionResult, SettingsNegotiator,
    SettingsService, SettingsStatus,
};
