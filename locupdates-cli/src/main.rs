//! locupdates CLI - Command-line interface
//!
//! This binary drives the locupdates coordinator from a terminal, with
//! simulated permission, settings and fix provider services.

mod commands;
mod error;
mod runner;
mod simulated;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use locupdates::request::Priority;

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use simulated::{PermissionMode, ResolutionMode, SettingsMode};

#[derive(Parser)]
#[command(name = "locupdates")]
#[command(version, about = "Periodic location updates with permission and settings negotiation", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.locupdates/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive coordinator session
    Run {
        /// How the simulated permission service behaves
        #[arg(long, value_enum, default_value = "ask-grant")]
        permission: PermissionMode,

        /// State of the simulated device settings
        #[arg(long, value_enum, default_value = "satisfied")]
        settings: SettingsMode,

        /// How the simulated settings dialog is answered
        #[arg(long, value_enum, default_value = "accept")]
        resolution: ResolutionMode,

        /// Show a rationale before the permission dialog
        #[arg(long)]
        rationale: bool,

        /// Update interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Fastest update interval in milliseconds (overrides config)
        #[arg(long)]
        fastest_interval_ms: Option<u64>,

        /// Accuracy priority: high_accuracy, balanced, low_power, no_power
        #[arg(long)]
        priority: Option<Priority>,

        /// Issue `start` immediately instead of waiting for input
        #[arg(long = "start")]
        auto_start: bool,

        /// Enable debug logging, mirrored to stderr
        #[arg(long)]
        debug: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            permission,
            settings,
            resolution,
            rationale,
            interval_ms,
            fastest_interval_ms,
            priority,
            auto_start,
            debug,
        } => commands::run::run(RunArgs {
            config: cli.config,
            permission,
            settings,
            resolution,
            rationale,
            interval_ms,
            fastest_interval_ms,
            priority,
            auto_start,
            debug,
        }),
        Commands::Config { command } => commands::config::run(command, cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
