//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use locupdates::config::ConfigFileError;
use locupdates::coordinator::CoordinatorError;
use locupdates::request::RequestError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid update request from flags or config
    Request(RequestError),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// The coordinator task went away
    Coordinator(CoordinatorError),
    /// Failed to read commands from stdin
    Input(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the configuration with: locupdates config show");
                eprintln!("Or recreate it with:          locupdates config init --force");
            }
            CliError::Request(RequestError::FastestExceedsInterval { .. }) => {
                eprintln!();
                eprintln!("The fastest interval must not exceed the update interval.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Request(e) => write!(f, "Invalid update request: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Coordinator(e) => write!(f, "Coordinator error: {}", e),
            CliError::Input(e) => write!(f, "Failed to read input: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Request(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Coordinator(e) => Some(e),
            CliError::Input(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<RequestError> for CliError {
    fn from(e: RequestError) -> Self {
        CliError::Request(e)
    }
}

impl From<CoordinatorError> for CliError {
    fn from(e: CoordinatorError) -> Self {
        CliError::Coordinator(e)
    }
}
