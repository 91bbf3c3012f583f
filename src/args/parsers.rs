use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};
use crate::replay::PlaybackSpeed;
use crate::telemetry::DriverNumber;

/// Parses `<digits><unit>` with `ms`, `s`, `m` or `h`; a bare number is
/// seconds. Zero is rejected.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let duration = parse_duration_inner(value)?;
    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }
    Ok(duration)
}

/// Like [`parse_duration_value`] but accepts zero, for offsets such as the
/// replay start.
pub(crate) fn parse_offset_value(value: &str) -> Result<Duration, ValidationError> {
    parse_duration_inner(value)
}

fn parse_duration_inner(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value
        .chars()
        .take_while(char::is_ascii_digit)
        .map(char::len_utf8)
        .sum::<usize>();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    match unit {
        "ms" => Ok(Duration::from_millis(number)),
        "s" => Ok(Duration::from_secs(number)),
        "m" => number
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(ValidationError::DurationOverflow),
        "h" => number
            .checked_mul(60)
            .and_then(|minutes| minutes.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or(ValidationError::DurationOverflow),
        _ => Err(ValidationError::InvalidDurationUnit {
            unit: unit.to_owned(),
        }),
    }
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::validation)
}

pub(crate) fn parse_offset_arg(s: &str) -> AppResult<Duration> {
    parse_offset_value(s).map_err(AppError::validation)
}

pub(crate) fn parse_speed(s: &str) -> AppResult<PlaybackSpeed> {
    s.parse::<PlaybackSpeed>().map_err(AppError::validation)
}

pub(crate) fn parse_driver_number(s: &str) -> AppResult<DriverNumber> {
    match s.trim().parse::<DriverNumber>() {
        Ok(number) if number > 0 => Ok(number),
        Ok(_) | Err(_) => Err(AppError::validation(ValidationError::InvalidDriverNumber {
            value: s.to_owned(),
        })),
    }
}

pub(crate) fn parse_positive_usize(s: &str) -> AppResult<usize> {
    match s.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) | Err(_) => Err(AppError::validation(ValidationError::ValueMustBePositive {
            value: s.to_owned(),
        })),
    }
}
