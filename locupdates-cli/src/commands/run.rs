//! Run command - drive a coordinator from the terminal.
//!
//! Reads one command per line from stdin and prints fixes, state changes
//! and notices as they happen. Platform services are simulated; see
//! [`crate::simulated`].

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use locupdates::config::ConfigFile;
use locupdates::coordinator::{
    CoordinatorEvent, CoordinatorHandle, CoordinatorStatus, LocationCoordinator, Notice,
};
use locupdates::fix::{FixSink, LocationFix};
use locupdates::request::{Priority, UpdateRequest};

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::simulated::{
    PermissionMode, ResolutionMode, SettingsMode, SimulatedFixStream, SimulatedPermissions,
    SimulatedSettings,
};

const STDIN_SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Arguments for the run command.
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub permission: PermissionMode,
    pub settings: SettingsMode,
    pub resolution: ResolutionMode,
    pub rationale: bool,
    pub interval_ms: Option<u64>,
    pub fastest_interval_ms: Option<u64>,
    pub priority: Option<Priority>,
    pub auto_start: bool,
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug)?;
    runner.log_startup("run");

    let request = resolve_request(&args, runner.config())?;
    let coordinator_config = runner.config().coordinator_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let result = runtime.block_on(async move {
        let sink: Arc<dyn FixSink> = Arc::new(|fix: LocationFix| {
            println!("{} {}", style("fix").green().bold(), fix);
        });

        let (handle, task) = LocationCoordinator::spawn(
            request,
            coordinator_config,
            Arc::new(SimulatedPermissions::new(args.permission, args.rationale)),
            Arc::new(SimulatedSettings::new(args.settings, args.resolution)),
            Arc::new(SimulatedFixStream::new()),
            sink,
        );

        print_banner(&request);
        if args.auto_start {
            handle.start().await?;
        }

        let result = console_loop(&handle).await;

        handle.shutdown().await.ok();
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Coordinator task ended abnormally");
        }
        result
    });

    // A pending stdin read sits on a blocking thread; don't wait for it.
    runtime.shutdown_timeout(STDIN_SHUTDOWN_GRACE);
    result
}

/// Combine CLI flags with the `[updates]` section; flags win.
fn resolve_request(args: &RunArgs, config: &ConfigFile) -> Result<UpdateRequest, CliError> {
    let interval_ms = args.interval_ms.unwrap_or(config.updates.interval_ms);
    let fastest_ms = args
        .fastest_interval_ms
        .unwrap_or(config.updates.fastest_interval_ms);
    let priority = args.priority.unwrap_or(config.updates.priority);

    Ok(UpdateRequest::from_millis(interval_ms, fastest_ms, priority)?)
}

async fn console_loop(handle: &CoordinatorHandle) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = handle.subscribe_events();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }

            line = lines.next_line() => {
                let Some(line) = line.map_err(CliError::Input)? else {
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => return Ok(()),
                    Ok(command) => execute(handle, command).await?,
                    Err(e) => println!("{} {}", style("?").red(), e),
                }
            }

            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "Event display lagged");
                }
                Err(RecvError::Closed) => return Ok(()),
            }
        }
    }
}

async fn execute(handle: &CoordinatorHandle, command: ConsoleCommand) -> Result<(), CliError> {
    match command {
        ConsoleCommand::Start => handle.start().await?,
        ConsoleCommand::Stop => handle.stop().await?,
        ConsoleCommand::Pause => handle.pause().await?,
        ConsoleCommand::Resume => handle.resume().await?,
        ConsoleCommand::Request(request) => handle.reconfigure(request).await?,
        ConsoleCommand::Status => print_status(&handle.status().await?),
        ConsoleCommand::Help => print_help(),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

// ============================================================================
// Console commands
// ============================================================================

/// A line typed at the console.
#[derive(Debug, Clone, PartialEq)]
enum ConsoleCommand {
    Start,
    Stop,
    Pause,
    Resume,
    Request(UpdateRequest),
    Status,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match verb.as_str() {
            "start" => ConsoleCommand::Start,
            "stop" => ConsoleCommand::Stop,
            "pause" | "background" => ConsoleCommand::Pause,
            "resume" | "foreground" => ConsoleCommand::Resume,
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            "request" => return parse_request(&rest).map(ConsoleCommand::Request),
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        };

        if !rest.is_empty() {
            return Err(format!("'{}' takes no arguments", verb));
        }
        Ok(command)
    }
}

/// `request <interval_ms> <fastest_ms> [priority]`
fn parse_request(args: &[&str]) -> Result<UpdateRequest, String> {
    const USAGE: &str = "usage: request <interval_ms> <fastest_ms> [priority]";

    let (interval, fastest, priority) = match args {
        [interval, fastest] => (interval, fastest, None),
        [interval, fastest, priority] => (interval, fastest, Some(priority)),
        _ => return Err(USAGE.to_string()),
    };

    let interval: u64 = interval.parse().map_err(|_| USAGE.to_string())?;
    let fastest: u64 = fastest.parse().map_err(|_| USAGE.to_string())?;
    let priority = match priority {
        Some(p) => p.parse().map_err(|e: locupdates::request::RequestError| e.to_string())?,
        None => Priority::default(),
    };

    UpdateRequest::from_millis(interval, fastest, priority).map_err(|e| e.to_string())
}

// ============================================================================
// Output
// ============================================================================

fn print_banner(request: &UpdateRequest) {
    println!(
        "{} v{} - requesting updates {}",
        style("locupdates").bold(),
        locupdates::VERSION,
        request
    );
    print_help();
}

fn print_help() {
    println!("Commands:");
    println!("  start                               Begin receiving updates");
    println!("  stop                                Stop receiving updates");
    println!("  pause | resume                      Simulate the app leaving/returning");
    println!("  request <ms> <fastest_ms> [prio]    Change the update request");
    println!("  status                              Show coordinator status");
    println!("  quit                                Exit");
}

fn print_event(event: &CoordinatorEvent) {
    match event {
        CoordinatorEvent::Transition { from, to } => {
            println!("{}", style(format!("state {} -> {}", from, to)).dim());
        }
        CoordinatorEvent::Notice(Notice::UpdatesStarted) => {
            println!("{}", style("--- new session ---").dim());
        }
        CoordinatorEvent::Notice(notice @ Notice::UpdatesStopped) => {
            println!("{} {}", style("info").blue(), notice);
        }
        CoordinatorEvent::Notice(notice) => {
            println!("{} {}", style("notice").yellow().bold(), notice);
        }
    }
}

fn print_status(status: &CoordinatorStatus) {
    let subscription = status
        .subscription
        .map(|handle| handle.to_string())
        .unwrap_or_else(|| "none".to_string());

    println!("Coordinator Status");
    println!("==================");
    println!("  State:         {}", style(status.state).bold());
    println!("  Intent:        {}", status.intent);
    println!("  Foreground:    {}", status.foreground);
    println!("  Subscription:  {}", subscription);
    println!("  Request:       {}", status.request);
    println!("  Generation:    {}", status.generation);
    println!(
        "  Checked at:    {}",
        chrono::Local::now().format("%H:%M:%S")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            permission: PermissionMode::Granted,
            settings: SettingsMode::Satisfied,
            resolution: ResolutionMode::Accept,
            rationale: false,
            interval_ms: None,
            fastest_interval_ms: None,
            priority: None,
            auto_start: false,
            debug: false,
        }
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Start));
        assert_eq!("  STOP ".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Stop));
        assert_eq!("background".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Pause));
        assert_eq!("resume".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Resume));
        assert_eq!("q".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_unknown_and_extra_arguments() {
        assert!("launch".parse::<ConsoleCommand>().is_err());
        assert!("start now".parse::<ConsoleCommand>().is_err());
    }

    #[test]
    fn test_parse_request_command() {
        let command: ConsoleCommand = "request 20000 10000 balanced".parse().unwrap();
        assert_eq!(
            command,
            ConsoleCommand::Request(
                UpdateRequest::from_millis(20_000, 10_000, Priority::Balanced).unwrap()
            )
        );

        let command: ConsoleCommand = "request 1000 500".parse().unwrap();
        assert_eq!(
            command,
            ConsoleCommand::Request(
                UpdateRequest::from_millis(1_000, 500, Priority::HighAccuracy).unwrap()
            )
        );
    }

    #[test]
    fn test_parse_request_validates() {
        assert!("request 1000".parse::<ConsoleCommand>().is_err());
        assert!("request 1000 2000".parse::<ConsoleCommand>().is_err());
        assert!("request 1000 500 turbo".parse::<ConsoleCommand>().is_err());
        assert!("request abc 500".parse::<ConsoleCommand>().is_err());
    }

    #[test]
    fn test_resolve_request_uses_config() {
        let config = ConfigFile::default();
        let request = resolve_request(&args(), &config).unwrap();
        assert_eq!(request, UpdateRequest::default());
    }

    #[test]
    fn test_resolve_request_flags_override_config() {
        let mut args = args();
        args.interval_ms = Some(30_000);
        args.priority = Some(Priority::LowPower);

        let request = resolve_request(&args, &ConfigFile::default()).unwrap();

        assert_eq!(request.interval().as_millis(), 30_000);
        assert_eq!(request.fastest_interval().as_millis(), 5_000);
        assert_eq!(request.priority(), Priority::LowPower);
    }

    #[test]
    fn test_resolve_request_rejects_inverted_intervals() {
        let mut args = args();
        args.fastest_interval_ms = Some(60_000);

        let result = resolve_request(&args, &ConfigFile::default());
        assert!(matches!(result, Err(CliError::Request(_))));
    }
}
