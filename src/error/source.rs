use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to '{url}' failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to '{url}' returned status {status}.")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("Failed to decode response from '{url}': {source}")]
    DecodeFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Session {session_key} was not found.")]
    SessionNotFound { session_key: u32 },
    #[error("Session {session_key} is missing its {field}.")]
    SessionIncomplete {
        session_key: u32,
        field: &'static str,
    },
    #[error("Failed to read recording '{path}': {source}")]
    ReadRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse recording '{path}': {source}")]
    ParseRecording {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Recording directory '{path}' has no session.json.")]
    RecordingMissingSession { path: PathBuf },
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
