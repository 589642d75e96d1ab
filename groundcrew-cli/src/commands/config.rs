//! Configuration inspection command.
//!
//! Prints the effective configuration: the `[orchestrator]` tunables and
//! every `[aircraft:<title>]` section, with defaults filled in.

use std::path::PathBuf;

use clap::Args;
use groundcrew::config::{config_file_path, AircraftConfig, ConfigFile, OrchestratorSettings};

use crate::error::CliError;

/// Arguments for the config command.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration file to read (defaults to ~/.groundcrew/config.ini)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Run the config command.
pub fn run(args: ConfigArgs) -> Result<(), CliError> {
    let path = args.path.unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&path)?;

    if path.exists() {
        println!("# Configuration: {}", path.display());
    } else {
        println!("# Configuration: {} (not found, using defaults)", path.display());
    }
    println!();
    print!("{}", render(&config));

    Ok(())
}

/// Render the configuration in config.ini syntax.
fn render(config: &ConfigFile) -> String {
    let mut out = String::new();
    render_orchestrator(&mut out, &config.orchestrator);
    for (title, aircraft) in &config.aircraft {
        out.push('\n');
        render_aircraft(&mut out, title, aircraft);
    }
    out
}

fn render_orchestrator(out: &mut String, settings: &OrchestratorSettings) {
    out.push_str("[orchestrator]\n");
    push_kv(out, "trigger_cooldown_secs", settings.trigger_cooldown.as_secs());
    push_kv(out, "trigger_delay_ms", settings.trigger_delay.as_millis());
    push_kv(out, "menu_step_delay_ms", settings.menu_step_delay.as_millis());
    push_kv(
        out,
        "pushback_settle_delay_ms",
        settings.pushback_settle_delay.as_millis(),
    );
    push_kv(out, "door_poll_attempts", settings.door_poll_attempts);
    push_kv(out, "door_poll_interval_ms", settings.door_poll_interval.as_millis());
    push_kv(
        out,
        "boarding_door_close_delay_ms",
        settings.boarding_door_close_delay.as_millis(),
    );
    push_kv(
        out,
        "activation_debounce_ms",
        settings.activation_debounce.as_millis(),
    );
    push_kv(out, "movement_threshold_knots", settings.movement_threshold_knots);
    push_kv(
        out,
        "stationary_threshold_knots",
        settings.stationary_threshold_knots,
    );
}

fn render_aircraft(out: &mut String, title: &str, config: &AircraftConfig) {
    out.push_str(&format!("[aircraft:{}]\n", title));
    push_kv(out, "refuel_before_boarding", config.refuel_before_boarding);
    push_kv(out, "catering_on_new_flight", config.catering_on_new_flight);
    push_kv(out, "catering_on_turnaround", config.catering_on_turnaround);
    push_kv(
        out,
        "auto_call_turnaround_services",
        config.auto_call_turnaround_services,
    );
    push_kv(out, "turnaround_delay_secs", config.turnaround_delay_seconds);
    push_kv(out, "auto_close_doors", config.auto_close_doors);
    if let Some(variable) = &config.activation_variable {
        push_kv(out, "activation_variable", variable);
        push_kv(out, "activation_value", config.activation_value);
    }
}

fn push_kv(out: &mut String, key: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("{} = {}\n", key, value));
}
