use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::ReplayArgs;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Flags given on the command
/// line win over the file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ReplayArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "session_key")
        && let Some(session_key) = config.session_key
    {
        args.session_key = Some(session_key);
    }

    if !is_cli(matches, "data_dir")
        && let Some(path) = config.data_dir.clone()
    {
        args.data_dir = Some(path);
    }

    if !is_cli(matches, "base_url")
        && let Some(url) = config.base_url.clone()
    {
        args.base_url = url;
    }

    if !is_cli(matches, "speed")
        && let Some(speed) = config.speed
    {
        args.speed = speed;
    }

    if !is_cli(matches, "start")
        && let Some(start) = config.start.as_ref()
    {
        args.start = start
            .to_offset()
            .map_err(|err| invalid_field("start", err))?;
    }

    if !is_cli(matches, "focus")
        && let Some(focus) = config.focus
    {
        if focus == 0 {
            return Err(AppError::config(ConfigError::FieldMustBePositive {
                field: "focus",
            }));
        }
        args.focus = Some(focus);
    }

    apply_duration(matches, "step", config.step.as_ref(), &mut args.step)?;
    apply_duration(matches, "lookahead", config.lookahead.as_ref(), &mut args.lookahead)?;
    apply_duration(matches, "chunk", config.chunk.as_ref(), &mut args.chunk)?;
    apply_duration(
        matches,
        "focus_chunk",
        config.focus_chunk.as_ref(),
        &mut args.focus_chunk,
    )?;
    apply_duration(matches, "retention", config.retention.as_ref(), &mut args.retention)?;
    apply_duration(matches, "min_tick", config.min_tick.as_ref(), &mut args.min_tick)?;
    apply_duration(matches, "timeout", config.timeout.as_ref(), &mut args.timeout)?;

    if !is_cli(matches, "standings_scan_depth")
        && let Some(depth) = config.standings_scan_depth
    {
        if depth == 0 {
            return Err(AppError::config(ConfigError::FieldMustBePositive {
                field: "standings_scan_depth",
            }));
        }
        args.standings_scan_depth = depth;
    }

    if !is_cli(matches, "no_ui")
        && let Some(no_ui) = config.no_ui
    {
        args.no_ui = no_ui;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn apply_duration(
    matches: &ArgMatches,
    field: &'static str,
    value: Option<&DurationValue>,
    target: &mut Duration,
) -> AppResult<()> {
    if is_cli(matches, field) {
        return Ok(());
    }
    if let Some(value) = value {
        *target = value
            .to_duration()
            .map_err(|err| invalid_field(field, err))?;
    }
    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn invalid_field(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
