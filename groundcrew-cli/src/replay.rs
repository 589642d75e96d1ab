//! Scenario file format for `groundcrew replay`.
//!
//! A scenario is a line-oriented script of engine inputs. Fields are comma
//! separated; blank lines and lines starting with `#` are ignored.
//!
//! ```text
//! # command   fields
//! AIRCRAFT    beacon,brake,engine,on_ground,ground_speed_kn,airspeed_kn,title
//! ADDON       running,menu_open,menu_choice,boarding,deboarding,pushback,progress,refueling,catering
//! ACTIVATE
//! RESET
//! MOVED
//! DUMP
//! LOADED      aircraft_path
//! VAR         name,value
//! WAIT        seconds
//! ```
//!
//! Boolean fields accept `0`/`1` and `true`/`false`. The aircraft title is the
//! remainder of the line and may contain commas.

use std::time::Duration;

use groundcrew::gsx::ADDON_FIELD_COUNT;
use groundcrew::telemetry::AircraftFrame;

/// One scenario instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayStep {
    Aircraft(AircraftFrame),
    Addon(Vec<f64>),
    Activate,
    Reset,
    ToggleMoved,
    Dump,
    Loaded(String),
    Variable { name: String, value: f64 },
    Wait(Duration),
}

/// Errors from parsing a scenario.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayParseError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: {command} expects {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Parse a whole scenario.
pub fn parse_scenario(source: &str) -> Result<Vec<ReplayStep>, ReplayParseError> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        if let Some(step) = parse_line(index + 1, raw)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

fn parse_line(line: usize, raw: &str) -> Result<Option<ReplayStep>, ReplayParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = match trimmed.split_once(',') {
        Some((command, rest)) => (command.trim(), rest),
        None => (trimmed, ""),
    };

    let step = match command.to_ascii_uppercase().as_str() {
        "ACTIVATE" => ReplayStep::Activate,
        "RESET" => ReplayStep::Reset,
        "MOVED" => ReplayStep::ToggleMoved,
        "DUMP" => ReplayStep::Dump,
        "AIRCRAFT" => ReplayStep::Aircraft(parse_aircraft(line, rest)?),
        "ADDON" => {
            let fields = split_fields(rest);
            expect_fields(line, "ADDON", ADDON_FIELD_COUNT, fields.len())?;
            let values = fields
                .iter()
                .map(|f| parse_number(line, "addon field", f))
                .collect::<Result<Vec<_>, _>>()?;
            ReplayStep::Addon(values)
        }
        "LOADED" => {
            let path = rest.trim();
            if path.is_empty() {
                return Err(ReplayParseError::FieldCount {
                    line,
                    command: "LOADED",
                    expected: 1,
                    found: 0,
                });
            }
            ReplayStep::Loaded(path.to_string())
        }
        "VAR" => {
            let fields = split_fields(rest);
            expect_fields(line, "VAR", 2, fields.len())?;
            ReplayStep::Variable {
                name: fields[0].to_string(),
                value: parse_number(line, "variable value", fields[1])?,
            }
        }
        "WAIT" => {
            let fields = split_fields(rest);
            expect_fields(line, "WAIT", 1, fields.len())?;
            let secs = parse_number(line, "wait seconds", fields[0])?;
            let duration = Duration::try_from_secs_f64(secs)
                .map_err(|_| invalid(line, "wait seconds", fields[0]))?;
            ReplayStep::Wait(duration)
        }
        _ => {
            return Err(ReplayParseError::UnknownCommand {
                line,
                command: command.to_string(),
            })
        }
    };

    Ok(Some(step))
}

fn parse_aircraft(line: usize, rest: &str) -> Result<AircraftFrame, ReplayParseError> {
    let fields: Vec<&str> = rest.splitn(7, ',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(ReplayParseError::FieldCount {
            line,
            command: "AIRCRAFT",
            expected: 7,
            found: fields.len(),
        });
    }

    Ok(AircraftFrame {
        beacon: parse_flag(line, "beacon", fields[0])?,
        parking_brake: parse_flag(line, "parking brake", fields[1])?,
        engine_running: parse_flag(line, "engine", fields[2])?,
        on_ground: parse_flag(line, "on ground", fields[3])?,
        ground_speed_knots: parse_number(line, "ground speed", fields[4])?,
        airspeed_knots: parse_number(line, "airspeed", fields[5])?,
        title: fields.get(6).map(|t| t.to_string()).unwrap_or_default(),
    })
}

fn split_fields(rest: &str) -> Vec<&str> {
    if rest.trim().is_empty() {
        return Vec::new();
    }
    rest.split(',').map(str::trim).collect()
}

fn expect_fields(
    line: usize,
    command: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), ReplayParseError> {
    if expected != found {
        return Err(ReplayParseError::FieldCount {
            line,
            command,
            expected,
            found,
        });
    }
    Ok(())
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<f64, ReplayParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(line, field, value))
}

fn parse_flag(line: usize, field: &'static str, value: &str) -> Result<bool, ReplayParseError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(invalid(line, field, value)),
    }
}

fn invalid(line: usize, field: &'static str, value: &str) -> ReplayParseError {
    ReplayParseError::InvalidField {
        line,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let source = "\
# Arrival at the gate
LOADED,SimObjects/Airplanes/Sample/aircraft.cfg
AIRCRAFT,0,1,0,1,0.0,0.0,Sample Airliner, Livery A
ADDON,1,0,0,2,1,2,0,2,2

activate
WAIT,2.5
VAR,L:DOOR_SWITCH,1
MOVED
DUMP
RESET
";
        let steps = parse_scenario(source).unwrap();
        assert_eq!(steps.len(), 9);
        assert_eq!(
            steps[0],
            ReplayStep::Loaded("SimObjects/Airplanes/Sample/aircraft.cfg".to_string())
        );
        match &steps[1] {
            ReplayStep::Aircraft(frame) => {
                assert!(frame.parking_brake);
                assert!(frame.on_ground);
                assert!(!frame.beacon);
                assert_eq!(frame.title, "Sample Airliner, Livery A");
            }
            other => panic!("expected aircraft frame, got {:?}", other),
        }
        assert_eq!(
            steps[2],
            ReplayStep::Addon(vec![1.0, 0.0, 0.0, 2.0, 1.0, 2.0, 0.0, 2.0, 2.0])
        );
        assert_eq!(steps[3], ReplayStep::Activate);
        assert_eq!(steps[4], ReplayStep::Wait(Duration::from_millis(2500)));
        assert_eq!(
            steps[5],
            ReplayStep::Variable {
                name: "L:DOOR_SWITCH".to_string(),
                value: 1.0
            }
        );
        assert_eq!(steps[6], ReplayStep::ToggleMoved);
        assert_eq!(steps[7], ReplayStep::Dump);
        assert_eq!(steps[8], ReplayStep::Reset);
    }

    #[test]
    fn test_aircraft_title_is_optional() {
        let steps = parse_scenario("AIRCRAFT,1,0,1,1,3.5,4.0").unwrap();
        match &steps[0] {
            ReplayStep::Aircraft(frame) => {
                assert!(frame.title.is_empty());
                assert_eq!(frame.ground_speed_knots, 3.5);
            }
            other => panic!("expected aircraft frame, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_reports_line() {
        let err = parse_scenario("ACTIVATE\nBOARD,1").unwrap_err();
        assert_eq!(
            err,
            ReplayParseError::UnknownCommand {
                line: 2,
                command: "BOARD".to_string()
            }
        );
    }

    #[test]
    fn test_addon_field_count() {
        let err = parse_scenario("ADDON,1,0,0").unwrap_err();
        assert!(matches!(
            err,
            ReplayParseError::FieldCount {
                line: 1,
                expected: 9,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_scenario("AIRCRAFT,yes,0,0,1,0,0").unwrap_err(),
            ReplayParseError::InvalidField { field: "beacon", .. }
        ));
        assert!(matches!(
            parse_scenario("WAIT,-1").unwrap_err(),
            ReplayParseError::InvalidField { .. }
        ));
        assert!(matches!(
            parse_scenario("WAIT,1e300").unwrap_err(),
            ReplayParseError::InvalidField {
                line: 1,
                field: "wait seconds",
                ..
            }
        ));
        assert!(matches!(
            parse_scenario("ACTIVATE\nWAIT,inf").unwrap_err(),
            ReplayParseError::InvalidField { line: 2, .. }
        ));
        assert!(matches!(
            parse_scenario("VAR,L:X,NaN").unwrap_err(),
            ReplayParseError::InvalidField { .. }
        ));
    }
}
