//! Replay command - drive the engine from a scenario file.
//!
//! Inputs are fed to a real engine whose simulator bridge only records
//! writes. By default the replay runs on a paused clock, so a scenario
//! spanning several minutes of simulator time finishes instantly while
//! keeping every delay exact.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use groundcrew::aircraft::CapabilityRegistry;
use groundcrew::config::{config_directory, ConfigFile};
use groundcrew::gsx::{RecordingBridge, VAR_MENU_CHOICE, VAR_MENU_OPEN};
use groundcrew::logging::{init_logging, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};
use groundcrew::orchestrator::{ControllerStatus, EngineEvent, EngineHandle};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::info;

use crate::error::CliError;
use crate::replay::{parse_scenario, ReplayStep};

/// Input is handed to the dispatcher before the next step reads state.
const SETTLE: Duration = Duration::from_millis(10);

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Scenario file to replay
    pub file: PathBuf,

    /// Configuration file (defaults to ~/.groundcrew/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Only write logs to the log file
    #[arg(long, short)]
    pub quiet: bool,

    /// Run on the wall clock instead of virtual time
    #[arg(long)]
    pub realtime: bool,

    /// Seconds to keep the engine running after the last step
    #[arg(long, default_value = "30")]
    pub tail: u64,
}

/// What a replay produced.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// Recorded writes as offset from start, variable and value.
    pub writes: Vec<(Duration, String, f64)>,
    pub events: Vec<(Duration, EngineEvent)>,
    /// Status snapshots taken at each `DUMP` step.
    pub dumps: Vec<(Duration, ControllerStatus)>,
    pub status: ControllerStatus,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let source = fs::read_to_string(&args.file).map_err(|error| CliError::ReadScenario {
        path: args.file.clone(),
        error,
    })?;
    let steps = parse_scenario(&source).map_err(|error| CliError::Scenario {
        path: args.file.clone(),
        error,
    })?;

    let config = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| config_directory().join(DEFAULT_LOG_DIR));
    let _logging_guard =
        init_logging(&log_dir, DEFAULT_LOG_FILE, !args.quiet).map_err(CliError::LoggingInit)?;

    info!(
        scenario = %args.file.display(),
        steps = steps.len(),
        realtime = args.realtime,
        "Starting replay"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(!args.realtime)
        .build()
        .map_err(CliError::Runtime)?;

    let report = runtime.block_on(replay(steps, &config, Duration::from_secs(args.tail)));

    print_report(&report);
    println!();
    println!("Log file: {}", log_dir.join(DEFAULT_LOG_FILE).display());

    Ok(())
}

/// Feed `steps` to a fresh engine and collect what it did.
pub async fn replay(steps: Vec<ReplayStep>, config: &ConfigFile, tail: Duration) -> ReplayReport {
    let bridge = Arc::new(RecordingBridge::new());
    let engine = EngineHandle::spawn(
        bridge.clone(),
        Arc::new(config.aircraft_store()),
        CapabilityRegistry::new(),
        config.orchestrator.clone(),
    );
    let start = Instant::now();

    let mut events_rx = engine.subscribe();
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        loop {
            match events_rx.recv().await {
                Ok(event) => events.push((start.elapsed(), event)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    });

    let mut dumps = Vec::new();
    for step in steps {
        match step {
            ReplayStep::Aircraft(frame) => {
                engine.aircraft_frame(frame);
            }
            ReplayStep::Addon(fields) => {
                engine.addon_frame(fields);
            }
            ReplayStep::Activate => {
                engine.toggle_activation();
            }
            ReplayStep::Reset => {
                engine.reset_session();
            }
            ReplayStep::ToggleMoved => {
                engine.toggle_moved_flag();
            }
            ReplayStep::Loaded(path) => {
                engine.aircraft_loaded(path);
            }
            ReplayStep::Variable { name, value } => {
                engine.activation_variable(name, value);
            }
            ReplayStep::Dump => {
                engine.dump_state();
                tokio::time::sleep(SETTLE).await;
                dumps.push((start.elapsed(), engine.status()));
            }
            ReplayStep::Wait(duration) => {
                tokio::time::sleep(duration).await;
            }
        }
    }

    tokio::time::sleep(tail.max(SETTLE)).await;

    let status = engine.status();
    engine.shutdown().await;
    let events = collector.await.unwrap_or_default();

    let writes = bridge
        .writes()
        .into_iter()
        .map(|w| (w.at.duration_since(start), w.variable, w.value))
        .collect();

    ReplayReport {
        writes,
        events,
        dumps,
        status,
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_report(report: &ReplayReport) {
    println!("Menu writes ({}):", report.writes.len());
    if report.writes.is_empty() {
        println!("  (none)");
    }
    for (offset, variable, value) in &report.writes {
        println!(
            "  {:>9.3}s  {:<24} {:>4}  {}",
            offset.as_secs_f64(),
            variable,
            value,
            describe_write(variable, *value)
        );
    }

    println!();
    println!("Engine events ({}):", report.events.len());
    for (offset, event) in &report.events {
        println!("  {:>9.3}s  {:?}", offset.as_secs_f64(), event);
    }

    for (offset, status) in &report.dumps {
        println!();
        println!("State at {:.3}s:", offset.as_secs_f64());
        print_status(status);
    }

    println!();
    println!("Final state:");
    print_status(&report.status);
}

fn print_status(status: &ControllerStatus) {
    let title = if status.aircraft_title.is_empty() {
        "(unknown)"
    } else {
        status.aircraft_title.as_str()
    };
    println!("  Aircraft:     {}", title);
    println!("  Activated:    {}", status.system_activated);
    println!("  Addon:        {}", if status.addon_running { "running" } else { "stopped" });
    println!("  Session:      {}", status.generation);
    println!(
        "  Movement:     engines_have_run={} aircraft_has_moved={}",
        status.movement.engines_have_run, status.movement.aircraft_has_moved
    );
    println!(
        "  Turnaround:   active={} pending={}",
        status.turnaround_active, status.turnaround_pending
    );
    for (kind, state) in status.states.iter() {
        let mut notes = Vec::new();
        if status.completed[kind] {
            notes.push("completed");
        }
        if status.in_flight[kind] {
            notes.push("in flight");
        }
        if status.conditions[kind] {
            notes.push("conditions met");
        }
        println!("  {:<12}  {:<14} {}", kind.name(), state.to_string(), notes.join(", "));
    }
}

fn describe_write(variable: &str, value: f64) -> String {
    match variable {
        VAR_MENU_OPEN if value == 0.0 => "close menu".to_string(),
        VAR_MENU_OPEN => "open menu".to_string(),
        VAR_MENU_CHOICE => format!("select option {}", value + 1.0),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundcrew::gsx::ServiceKind;

    const BOARDING_CALLABLE: &str = "\
ACTIVATE
ADDON,1,0,0,1,2,2,0,2,2
AIRCRAFT,0,1,0,1,0,0,
";

    #[test]
    fn test_describe_write() {
        assert_eq!(describe_write(VAR_MENU_OPEN, 0.0), "close menu");
        assert_eq!(describe_write(VAR_MENU_OPEN, 1.0), "open menu");
        assert_eq!(describe_write(VAR_MENU_CHOICE, 3.0), "select option 4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_requests_boarding() {
        let steps = parse_scenario(BOARDING_CALLABLE).unwrap();
        let report = replay(steps, &ConfigFile::default(), Duration::from_secs(20)).await;

        let values: Vec<(String, f64)> = report
            .writes
            .iter()
            .map(|(_, variable, value)| (variable.clone(), *value))
            .collect();
        assert_eq!(
            values,
            vec![
                (VAR_MENU_OPEN.to_string(), 0.0),
                (VAR_MENU_OPEN.to_string(), 1.0),
                (VAR_MENU_CHOICE.to_string(), 3.0),
                (VAR_MENU_CHOICE.to_string(), 0.0),
                (VAR_MENU_OPEN.to_string(), 0.0),
            ]
        );
        assert_eq!(report.writes[0].0, Duration::from_secs(1));
        assert!(report
            .events
            .iter()
            .any(|(_, e)| *e == EngineEvent::ServiceRequested(ServiceKind::Boarding)));
        assert!(report.status.system_activated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_departure_demo() {
        let steps = parse_scenario(include_str!("../../../demos/departure.replay")).unwrap();
        let report = replay(steps, &ConfigFile::default(), Duration::from_secs(30)).await;

        let requested: Vec<ServiceKind> = report
            .events
            .iter()
            .filter_map(|(_, e)| match e {
                EngineEvent::ServiceRequested(kind) => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            requested,
            vec![
                ServiceKind::Refueling,
                ServiceKind::Boarding,
                ServiceKind::Pushback
            ]
        );
        assert_eq!(report.dumps.len(), 2);
        assert_eq!(report.dumps[0].1.completed_services(), vec!["refueling"]);
        assert!(report.status.pushback_attempted);
        assert!(!report.status.completed[ServiceKind::Pushback]);
        assert_eq!(report.status.aircraft_title, "Sample Airliner");
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrival_demo() {
        let steps = parse_scenario(include_str!("../../../demos/arrival.replay")).unwrap();
        let report = replay(steps, &ConfigFile::default(), Duration::from_secs(30)).await;

        let requested: Vec<ServiceKind> = report
            .events
            .iter()
            .filter_map(|(_, e)| match e {
                EngineEvent::ServiceRequested(kind) => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(requested, vec![ServiceKind::Deboarding, ServiceKind::Refueling]);

        // Turnaround still pending at the first dump, active at the second
        assert!(report.dumps[0].1.turnaround_pending);
        assert!(report.dumps[1].1.turnaround_active);
        assert!(report.status.movement.engines_have_run);
        assert!(!report.status.movement.aircraft_has_moved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_without_activation_writes_nothing() {
        let steps = parse_scenario("ADDON,1,0,0,1,2,2,0,2,2\nAIRCRAFT,0,1,0,1,0,0\nDUMP").unwrap();
        let report = replay(steps, &ConfigFile::default(), Duration::from_secs(20)).await;

        assert!(report.writes.is_empty());
        assert_eq!(report.dumps.len(), 1);
        assert!(report.dumps[0].1.addon_running);
        assert!(!report.dumps[0].1.system_activated);
    }
}
