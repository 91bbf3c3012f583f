use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid playback speed '{value}'. Use 1, 2, 5, 10, 20, or 50.")]
    InvalidSpeed { value: String },
    #[error("Value '{value}' must be a positive integer.")]
    ValueMustBePositive { value: String },
    #[error("Invalid driver number '{value}'.")]
    InvalidDriverNumber { value: String },
    #[error("Missing session (set --session-key, --data-dir, or provide in config).")]
    MissingSession,
    #[error("Cannot combine --session-key with --data-dir.")]
    SessionKeyDataDirConflict,
    #[error("Session end {end_ms} is before session start {start_ms}.")]
    SessionBoundsInverted { start_ms: u64, end_ms: u64 },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
