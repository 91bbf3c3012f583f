use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{DataSource, RangeQuery};
use crate::error::SourceError;
use crate::telemetry::{SessionInfo, StreamBatch, StreamKind, ingest_records};

/// File holding the session description inside a recording directory.
const SESSION_FILE: &str = "session.json";

/// In-memory source answering range queries from a recorded session.
///
/// A recording directory holds `session.json` (a serialized
/// [`SessionInfo`]) plus one `<endpoint>.json` array of raw records per
/// stream, e.g. `location.json`, `car_data.json`. Missing stream files read
/// as streams without data.
#[derive(Debug, Clone)]
pub struct RecordedSource {
    session: SessionInfo,
    streams: BTreeMap<StreamKind, StreamBatch>,
}

impl RecordedSource {
    #[must_use]
    pub const fn new(session: SessionInfo) -> Self {
        Self {
            session,
            streams: BTreeMap::new(),
        }
    }

    /// Sets the recorded samples for the batch's stream kind.
    #[must_use]
    pub fn with_batch(mut self, batch: StreamBatch) -> Self {
        self.streams.insert(batch.kind(), batch);
        self
    }

    #[must_use]
    pub const fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Loads a recording directory.
    ///
    /// # Errors
    ///
    /// Returns an error when `session.json` is missing or any present file
    /// cannot be read or parsed.
    pub fn load_dir(path: &Path) -> Result<Self, SourceError> {
        let session_path = path.join(SESSION_FILE);
        if !session_path.is_file() {
            return Err(SourceError::RecordingMissingSession {
                path: path.to_path_buf(),
            });
        }
        let session: SessionInfo = read_json(&session_path)?;
        let mut source = Self::new(session);
        for kind in StreamKind::ALL {
            let stream_path = path.join(format!("{}.json", kind.endpoint()));
            if !stream_path.is_file() {
                continue;
            }
            let records: Vec<Value> = read_json(&stream_path)?;
            let (batch, dropped) = ingest_records(kind, records);
            tracing::debug!(
                "Loaded {} {} sample(s) from {} ({} dropped).",
                batch.len(),
                kind,
                stream_path.display(),
                dropped
            );
            source = source.with_batch(batch);
        }
        Ok(source)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|err| SourceError::ReadRecording {
        path: PathBuf::from(path),
        source: err,
    })?;
    serde_json::from_str(&content).map_err(|err| SourceError::ParseRecording {
        path: PathBuf::from(path),
        source: err,
    })
}

#[async_trait]
impl DataSource for RecordedSource {
    async fn session_info(&self, session_key: u32) -> Result<SessionInfo, SourceError> {
        if session_key != self.session.session_key {
            return Err(SourceError::SessionNotFound { session_key });
        }
        Ok(self.session.clone())
    }

    async fn fetch_range(&self, query: &RangeQuery) -> Result<StreamBatch, SourceError> {
        Ok(self.streams.get(&query.kind).map_or_else(
            || StreamBatch::empty(query.kind),
            |batch| batch.select(query.start_ms, query.end_ms, query.driver_number),
        ))
    }
}
