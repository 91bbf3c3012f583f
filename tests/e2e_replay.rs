mod support;

use std::sync::Arc;

use serde_json::Value;
use tempfile::tempdir;

use paddock::replay::{ReplayConfig, ReplayController};
use paddock::source::{DataSource, RecordedSource};

use support::{
    SESSION_END_MS, SESSION_KEY, SESSION_START_MS, run_paddock, spawn_api_server_or_skip,
    write_recording,
};

fn parse_report(output: &std::process::Output) -> Result<Value, String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("paddock failed: {}", stderr));
    }
    serde_json::from_slice(&output.stdout).map_err(|err| format!("parse report failed: {}", err))
}

fn car_x(report: &Value, driver_number: u64) -> Option<f64> {
    report["snapshot"]["cars"]
        .as_array()?
        .iter()
        .find(|car| car["driver_number"].as_u64() == Some(driver_number))
        .and_then(|car| car["x"].as_f64())
}

fn check_report(report: &Value) -> Result<(), String> {
    if report["session_key"].as_u64() != Some(u64::from(SESSION_KEY)) {
        return Err(format!("Unexpected session key: {}", report["session_key"]));
    }
    if report["elapsed_ms"].as_u64() != Some(90_500) {
        return Err(format!("Unexpected elapsed: {}", report["elapsed_ms"]));
    }
    let snapshot = &report["snapshot"];
    if snapshot["time_ms"].as_u64() != Some(SESSION_START_MS + 90_500) {
        return Err(format!("Unexpected snapshot time: {}", snapshot["time_ms"]));
    }
    if car_x(report, 1) != Some(0.0) || car_x(report, 44) != Some(500.0) {
        return Err(format!("Unexpected cars: {}", snapshot["cars"]));
    }
    if snapshot["current_lap"].as_u64() != Some(2) {
        return Err(format!("Unexpected lap: {}", snapshot["current_lap"]));
    }
    let messages = snapshot["race_control"]
        .as_array()
        .ok_or("Missing race control")?;
    if messages.len() != 1 || messages.first().map(|msg| &msg["message"]) != Some(&Value::from("GREEN LIGHT - PIT EXIT OPEN")) {
        return Err(format!("Unexpected race control: {}", snapshot["race_control"]));
    }
    let leader = snapshot["standings"]
        .as_array()
        .and_then(|rows| rows.first())
        .ok_or("Missing standings")?;
    if leader["driver_number"].as_u64() != Some(1) || leader["position"].as_u64() != Some(1) {
        return Err(format!("Unexpected leader: {}", leader));
    }
    Ok(())
}

#[test]
fn e2e_headless_from_recording() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    write_recording(dir.path())?;
    let data_dir = dir.path().to_string_lossy().into_owned();

    let output = run_paddock([
        "--data-dir",
        data_dir.as_str(),
        "--start",
        "90500ms",
        "--focus",
        "44",
        "--no-ui",
    ])?;
    let report = parse_report(&output)?;
    check_report(&report)?;

    if report["focus"].as_u64() != Some(44) {
        return Err(format!("Unexpected focus: {}", report["focus"]));
    }
    let focus = &report["snapshot"]["focus"];
    if focus["driver_number"].as_u64() != Some(44) || focus["speed"].as_f64() != Some(280.0) {
        return Err(format!("Unexpected focus telemetry: {}", focus));
    }
    Ok(())
}

#[test]
fn e2e_headless_from_api() -> Result<(), String> {
    let Some((url, _server)) = spawn_api_server_or_skip()? else {
        return Ok(());
    };
    let session_key = SESSION_KEY.to_string();

    let output = run_paddock([
        "--session-key",
        session_key.as_str(),
        "--base-url",
        url.as_str(),
        "--start",
        "90500ms",
        "--no-ui",
    ])?;
    let report = parse_report(&output)?;
    check_report(&report)?;

    if report["snapshot"]["total_laps"].as_u64() != Some(2) {
        return Err(format!("Unexpected total laps: {}", report["snapshot"]["total_laps"]));
    }
    if !report["snapshot"]["focus"].is_null() {
        return Err("Focus telemetry without a focused driver".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_missing_recording_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let data_dir = dir.path().to_string_lossy().into_owned();

    let output = run_paddock(["--data-dir", data_dir.as_str(), "--no-ui"])?;
    if output.status.success() {
        return Err("Expected failure without session.json".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_messages_only_grow_during_playback() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    write_recording(dir.path())?;
    let source: Arc<dyn DataSource> = Arc::new(
        RecordedSource::load_dir(dir.path()).map_err(|err| format!("load failed: {}", err))?,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;

    runtime.block_on(async move {
        let mut controller = ReplayController::load(source, SESSION_KEY, ReplayConfig::default())
            .await
            .map_err(|err| format!("load controller failed: {}", err))?;
        if controller.session().end_ms != SESSION_END_MS {
            return Err("Unexpected session end".to_owned());
        }

        controller.seek(SESSION_START_MS + 90_500);
        controller.settle().await;
        let early = controller.snapshot().race_control.clone();

        controller.seek(SESSION_START_MS + 1_900_000);
        controller.settle().await;
        let late = controller.snapshot().race_control.clone();

        if early.len() != 1 || late.len() != 2 {
            return Err(format!(
                "Unexpected message counts: {} then {}",
                early.len(),
                late.len()
            ));
        }
        if !late.starts_with(&early) {
            return Err("Earlier messages changed after seeking forward".to_owned());
        }

        controller.seek(SESSION_START_MS + 90_500);
        controller.settle().await;
        if controller.snapshot().race_control != early {
            return Err("Seeking back did not restore the earlier message log".to_owned());
        }
        Ok(())
    })
}
