//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.
//! Unknown keys are ignored so older binaries can read newer files.

use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::debug;

use super::aircraft::AircraftConfig;
use super::file::{ConfigFile, ConfigFileError};
use super::settings::OrchestratorSettings;

const ORCHESTRATOR_SECTION: &str = "orchestrator";
const AIRCRAFT_SECTION_PREFIX: &str = "aircraft:";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    for (name, section) in ini.iter() {
        let Some(name) = name else { continue };

        if name == ORCHESTRATOR_SECTION {
            parse_orchestrator(section, &mut config.orchestrator)?;
        } else if let Some(title) = name.strip_prefix(AIRCRAFT_SECTION_PREFIX) {
            let title = title.trim();
            if title.is_empty() {
                return Err(ConfigFileError::InvalidValue {
                    section: name.to_string(),
                    key: String::new(),
                    value: String::new(),
                    reason: "aircraft section needs a title".to_string(),
                });
            }
            let aircraft = parse_aircraft(name, section)?;
            config.aircraft.insert(title.to_string(), aircraft);
        } else {
            debug!(section = name, "Ignoring unknown config section");
        }
    }

    Ok(config)
}

fn parse_orchestrator(
    section: &Properties,
    settings: &mut OrchestratorSettings,
) -> Result<(), ConfigFileError> {
    let s = ORCHESTRATOR_SECTION;

    if let Some(v) = section.get("trigger_cooldown_secs") {
        settings.trigger_cooldown = Duration::from_secs(parse_value(s, "trigger_cooldown_secs", v)?);
    }
    if let Some(v) = section.get("trigger_delay_ms") {
        settings.trigger_delay = Duration::from_millis(parse_value(s, "trigger_delay_ms", v)?);
    }
    if let Some(v) = section.get("menu_step_delay_ms") {
        settings.menu_step_delay = Duration::from_millis(parse_value(s, "menu_step_delay_ms", v)?);
    }
    if let Some(v) = section.get("pushback_settle_delay_ms") {
        settings.pushback_settle_delay =
            Duration::from_millis(parse_value(s, "pushback_settle_delay_ms", v)?);
    }
    if let Some(v) = section.get("door_poll_attempts") {
        settings.door_poll_attempts = parse_value(s, "door_poll_attempts", v)?;
    }
    if let Some(v) = section.get("door_poll_interval_ms") {
        settings.door_poll_interval =
            Duration::from_millis(parse_value(s, "door_poll_interval_ms", v)?);
    }
    if let Some(v) = section.get("boarding_door_close_delay_ms") {
        settings.boarding_door_close_delay =
            Duration::from_millis(parse_value(s, "boarding_door_close_delay_ms", v)?);
    }
    if let Some(v) = section.get("activation_debounce_ms") {
        settings.activation_debounce =
            Duration::from_millis(parse_value(s, "activation_debounce_ms", v)?);
    }
    if let Some(v) = section.get("movement_threshold_knots") {
        settings.movement_threshold_knots = parse_knots(s, "movement_threshold_knots", v)?;
    }
    if let Some(v) = section.get("stationary_threshold_knots") {
        settings.stationary_threshold_knots = parse_knots(s, "stationary_threshold_knots", v)?;
    }

    Ok(())
}

fn parse_aircraft(name: &str, section: &Properties) -> Result<AircraftConfig, ConfigFileError> {
    let mut config = AircraftConfig::default();

    if let Some(v) = section.get("refuel_before_boarding") {
        config.refuel_before_boarding = parse_bool(name, "refuel_before_boarding", v)?;
    }
    if let Some(v) = section.get("catering_on_new_flight") {
        config.catering_on_new_flight = parse_bool(name, "catering_on_new_flight", v)?;
    }
    if let Some(v) = section.get("catering_on_turnaround") {
        config.catering_on_turnaround = parse_bool(name, "catering_on_turnaround", v)?;
    }
    if let Some(v) = section.get("auto_call_turnaround_services") {
        config.auto_call_turnaround_services =
            parse_bool(name, "auto_call_turnaround_services", v)?;
    }
    if let Some(v) = section.get("turnaround_delay_secs") {
        config.turnaround_delay_seconds = parse_value(name, "turnaround_delay_secs", v)?;
    }
    if let Some(v) = section.get("auto_close_doors") {
        config.auto_close_doors = parse_bool(name, "auto_close_doors", v)?;
    }
    if let Some(v) = section.get("activation_variable") {
        let v = v.trim();
        if !v.is_empty() {
            config.activation_variable = Some(v.to_string());
        }
    }
    if let Some(v) = section.get("activation_value") {
        let value: f64 = parse_value(name, "activation_value", v)?;
        if !value.is_finite() {
            return Err(invalid(name, "activation_value", v, "must be a finite number"));
        }
        config.activation_value = value;
    }

    Ok(config)
}

fn parse_value<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative number"))
}

fn parse_knots(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let knots: f64 = parse_value(section, key, value)?;
    if !knots.is_finite() || knots < 0.0 {
        return Err(invalid(section, key, value, "must be a non-negative speed in knots"));
    }
    Ok(knots)
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_orchestrator_overrides() {
        let config = parse(
            "[orchestrator]\n\
             trigger_cooldown_secs = 5\n\
             menu_step_delay_ms = 200\n\
             door_poll_attempts = 10\n\
             stationary_threshold_knots = 1.5\n",
        )
        .unwrap();

        let settings = config.orchestrator;
        assert_eq!(settings.trigger_cooldown, Duration::from_secs(5));
        assert_eq!(settings.menu_step_delay, Duration::from_millis(200));
        assert_eq!(settings.door_poll_attempts, 10);
        assert_eq!(settings.stationary_threshold_knots, 1.5);
        // Untouched keys keep defaults
        assert_eq!(settings.trigger_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_aircraft_sections() {
        let config = parse(
            "[aircraft:PMDG 777-300ER]\n\
             catering_on_turnaround = yes\n\
             turnaround_delay_secs = 60\n\
             activation_value = 2\n\
             \n\
             [aircraft:Fenix A320]\n\
             auto_close_doors = false\n",
        )
        .unwrap();

        assert_eq!(config.aircraft.len(), 2);
        let triple_seven = &config.aircraft["PMDG 777-300ER"];
        assert!(triple_seven.catering_on_turnaround);
        assert_eq!(triple_seven.turnaround_delay_seconds, 60);
        assert_eq!(triple_seven.activation_value, 2.0);
        assert!(triple_seven.refuel_before_boarding);

        assert!(!config.aircraft["Fenix A320"].auto_close_doors);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let err = parse("[aircraft:Test]\nauto_close_doors = maybe\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "aircraft:Test");
                assert_eq!(key, "auto_close_doors");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        assert!(parse("[orchestrator]\ntrigger_cooldown_secs = soon\n").is_err());
        assert!(parse("[orchestrator]\nmovement_threshold_knots = -3\n").is_err());
    }

    #[test]
    fn test_untitled_aircraft_section_is_rejected() {
        assert!(parse("[aircraft:]\nauto_close_doors = true\n").is_err());
    }
}
