use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use tempfile::tempdir;

use super::headless::HeadlessReport;
use super::keys::{PlayerCommand, apply_command, command_for_key};
use super::runner::{build_source, prepare};
use crate::args::ReplayArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::replay::{PlaybackSpeed, ReplayConfig, ReplayController};
use crate::source::RecordedSource;
use crate::telemetry::{DriverInfo, SessionInfo};

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

fn session() -> SessionInfo {
    SessionInfo {
        session_key: 9472,
        session_name: "Race".to_owned(),
        start_ms: 10_000,
        end_ms: 610_000,
        total_laps: Some(52),
        drivers: vec![
            DriverInfo {
                driver_number: 63,
                name_acronym: "RUS".to_owned(),
                team_name: Some("Mercedes".to_owned()),
                team_colour: Some("27F4D2".to_owned()),
            },
            DriverInfo {
                driver_number: 81,
                name_acronym: "PIA".to_owned(),
                team_name: None,
                team_colour: None,
            },
        ],
    }
}

fn controller() -> AppResult<ReplayController> {
    let info = session();
    ReplayController::new(
        Arc::new(RecordedSource::new(info.clone())),
        info,
        ReplayConfig::default(),
    )
}

#[test]
fn keys_map_to_commands() -> AppResult<()> {
    let cases = [
        (key(KeyCode::Char(' '), KeyModifiers::NONE), Some(PlayerCommand::TogglePlay)),
        (key(KeyCode::Left, KeyModifiers::NONE), Some(PlayerCommand::StepBack)),
        (key(KeyCode::Right, KeyModifiers::NONE), Some(PlayerCommand::StepForward)),
        (key(KeyCode::Char('+'), KeyModifiers::NONE), Some(PlayerCommand::Faster)),
        (key(KeyCode::Char('F'), KeyModifiers::SHIFT), Some(PlayerCommand::PreviousFocus)),
        (key(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(PlayerCommand::Quit)),
        (key(KeyCode::Char('x'), KeyModifiers::CONTROL), None),
        (key(KeyCode::Char('z'), KeyModifiers::NONE), None),
    ];
    for (event, expected) in cases {
        if command_for_key(event) != expected {
            return Err(AppError::validation(format!("Unexpected mapping for {:?}", event)));
        }
    }
    let mut release = key(KeyCode::Char('q'), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    if command_for_key(release).is_some() {
        return Err(AppError::validation("Key releases must be ignored"));
    }
    Ok(())
}

#[test]
fn commands_drive_the_controller() -> AppResult<()> {
    let mut controller = controller()?;
    let step = Duration::from_secs(10);

    apply_command(&mut controller, PlayerCommand::StepForward, step);
    apply_command(&mut controller, PlayerCommand::StepForward, step);
    apply_command(&mut controller, PlayerCommand::StepBack, step);
    if controller.elapsed_ms() != 10_000 {
        return Err(AppError::validation("Unexpected position after steps"));
    }
    apply_command(&mut controller, PlayerCommand::SeekEnd, step);
    if controller.current_ms() != 610_000 {
        return Err(AppError::validation("Expected seek to session end"));
    }
    apply_command(&mut controller, PlayerCommand::Faster, step);
    apply_command(&mut controller, PlayerCommand::NextFocus, step);
    if controller.speed() != PlaybackSpeed::X2 || controller.focus() != Some(63) {
        return Err(AppError::validation("Unexpected speed or focus"));
    }
    apply_command(&mut controller, PlayerCommand::ClearFocus, step);
    if controller.focus().is_some() {
        return Err(AppError::validation("Expected focus cleared"));
    }
    if apply_command(&mut controller, PlayerCommand::Quit, step) {
        return Err(AppError::validation("Quit must stop the player"));
    }
    Ok(())
}

#[test]
fn build_source_requires_a_session() -> AppResult<()> {
    let args = ReplayArgs::try_parse_from(["paddock"])?;
    match build_source(&args) {
        Err(AppError::Validation(ValidationError::MissingSession)) => Ok(()),
        Err(err) => Err(err),
        Ok(_) => Err(AppError::validation("Expected missing session error")),
    }
}

#[test]
fn build_source_loads_recordings() -> AppResult<()> {
    let dir = tempdir()?;
    std::fs::write(
        dir.path().join("session.json"),
        serde_json::to_string(&session())?,
    )?;
    let path = dir.path().to_string_lossy().into_owned();
    let args = ReplayArgs::try_parse_from(["paddock", "--data-dir", path.as_str()])?;
    let (_, session_key) = build_source(&args)?;
    if session_key != 9472 {
        return Err(AppError::validation("Unexpected session key"));
    }
    Ok(())
}

#[test]
fn prepare_applies_start_speed_and_focus() -> AppResult<()> {
    let mut controller = controller()?;
    let args = ReplayArgs::try_parse_from([
        "paddock", "--start", "2m", "--speed", "50", "--focus", "81",
    ])?;
    prepare(&mut controller, &args);
    if controller.current_ms() != 130_000 {
        return Err(AppError::validation(format!(
            "Unexpected start {}",
            controller.current_ms()
        )));
    }
    if controller.speed() != PlaybackSpeed::X50 || controller.focus() != Some(81) {
        return Err(AppError::validation("Unexpected speed or focus"));
    }

    let report = serde_json::to_value(HeadlessReport::new(&controller))?;
    if report.get("elapsed_ms").and_then(serde_json::Value::as_u64) != Some(120_000) {
        return Err(AppError::validation("Unexpected elapsed_ms in report"));
    }
    if report.get("speed").and_then(serde_json::Value::as_u64) != Some(50) {
        return Err(AppError::validation("Speed should serialize as its multiplier"));
    }
    if report
        .get("snapshot")
        .and_then(|snapshot| snapshot.get("total_laps"))
        .and_then(serde_json::Value::as_u64)
        != Some(52)
    {
        return Err(AppError::validation("Missing total laps in report"));
    }
    Ok(())
}
