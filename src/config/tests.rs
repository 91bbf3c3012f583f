use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::types::ConfigFile;
use super::{apply_config, load_config_file};
use crate::args::ReplayArgs;
use crate::error::{AppError, ConfigError};
use crate::replay::PlaybackSpeed;

fn parse_with_config(cli: &[&str], config: &ConfigFile) -> Result<ReplayArgs, String> {
    let matches = ReplayArgs::command()
        .try_get_matches_from(cli)
        .map_err(|err| format!("parse failed: {}", err))?;
    let mut args =
        ReplayArgs::from_arg_matches(&matches).map_err(|err| format!("args failed: {}", err))?;
    apply_config(&mut args, &matches, config).map_err(|err| format!("apply failed: {}", err))?;
    Ok(args)
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("paddock.toml");
    let content = r#"
session_key = 9158
speed = 10
start = "25m"
focus = 1
retention = 300
standings_scan_depth = 64
no_ui = true
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.session_key != Some(9158) || config.speed != Some(PlaybackSpeed::X10) {
        return Err("Unexpected session_key or speed".to_owned());
    }
    if config.standings_scan_depth != Some(64) || config.no_ui != Some(true) {
        return Err("Unexpected scan depth or no_ui".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("paddock.json");
    let content = r#"{
  "data_dir": "recordings/spa",
  "lookahead": "20s",
  "min_tick": "16ms"
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.data_dir != Some(PathBuf::from("recordings/spa")) {
        return Err("Unexpected data_dir".to_owned());
    }
    let args = parse_with_config(&["paddock"], &config)?;
    if args.lookahead != Duration::from_secs(20) || args.min_tick != Duration::from_millis(16) {
        return Err("Durations were not applied".to_owned());
    }
    Ok(())
}

#[test]
fn unknown_keys_and_extensions_are_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let unknown = dir.path().join("paddock.toml");
    std::fs::write(&unknown, "rpm = 100\n").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&unknown).is_ok() {
        return Err("Expected unknown key to fail".to_owned());
    }

    let yaml = dir.path().join("paddock.yaml");
    std::fs::write(&yaml, "speed: 2\n").map_err(|err| format!("write failed: {}", err))?;
    match load_config_file(&yaml) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected unsupported extension".to_owned()),
    }
}

#[test]
fn cli_values_override_config() -> Result<(), String> {
    let config = ConfigFile {
        speed: Some(PlaybackSpeed::X50),
        focus: Some(44),
        verbose: Some(true),
        ..ConfigFile::default()
    };
    let args = parse_with_config(&["paddock", "--speed", "2"], &config)?;
    if args.speed != PlaybackSpeed::X2 {
        return Err("CLI speed should win".to_owned());
    }
    if args.focus != Some(44) || !args.verbose {
        return Err("Config values should fill unset flags".to_owned());
    }
    Ok(())
}

#[test]
fn invalid_config_values_are_reported() -> Result<(), String> {
    let zero_depth = ConfigFile {
        standings_scan_depth: Some(0),
        ..ConfigFile::default()
    };
    if parse_with_config(&["paddock"], &zero_depth).is_ok() {
        return Err("Expected zero scan depth to fail".to_owned());
    }

    let bad_duration = ConfigFile {
        chunk: Some(super::types::DurationValue::Text("soon".to_owned())),
        ..ConfigFile::default()
    };
    match parse_with_config(&["paddock"], &bad_duration) {
        Err(message) if message.contains("chunk") => Ok(()),
        Err(message) => Err(format!("Unexpected error: {}", message)),
        Ok(_) => Err("Expected invalid chunk to fail".to_owned()),
    }
}
