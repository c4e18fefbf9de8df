//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (get, set, list, path, init)
//! - [`run`] - Interactive coordinator session with simulated services

pub mod config;
pub mod run;
