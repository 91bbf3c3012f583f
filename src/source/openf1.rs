use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::traits::{DataSource, RangeQuery};
use crate::args::DEFAULT_USER_AGENT;
use crate::error::SourceError;
use crate::telemetry::{
    DriverInfo, DriverNumber, SessionInfo, StreamBatch, format_timestamp_ms, ingest_records,
    parse_timestamp_ms,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1/";

/// REST source speaking the OpenF1 query dialect
/// (`?session_key=…&date>=…&date<…&driver_number=…`).
#[derive(Debug, Clone)]
pub struct OpenF1Source {
    client: Client,
    base_url: Url,
}

impl OpenF1Source {
    /// Builds the HTTP client used for every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the client cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{}/", base_url)
        };
        let parsed = Url::parse(&normalized).map_err(|err| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source: err,
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| SourceError::BuildClientFailed { source: err })?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|err| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source: err,
            })
    }

    fn session_url(&self, path: &str, session_key: u32) -> Result<Url, SourceError> {
        let mut url = self.endpoint(path)?;
        url.set_query(Some(&format!("session_key={}", session_key)));
        Ok(url)
    }

    pub(crate) fn range_url(&self, query: &RangeQuery) -> Result<Url, SourceError> {
        let mut url = self.endpoint(query.kind.endpoint())?;
        let field = query.kind.date_field();
        let mut params = vec![format!("session_key={}", query.session_key)];
        if let Some(start) = format_timestamp_ms(query.start_ms) {
            params.push(format!("{}>={}", field, start));
        }
        if let Some(end) = format_timestamp_ms(query.end_ms) {
            params.push(format!("{}<{}", field, end));
        }
        if let Some(driver_number) = query.driver_number {
            params.push(format!("driver_number={}", driver_number));
        }
        url.set_query(Some(&params.join("&")));
        Ok(url)
    }

    async fn get_records(&self, url: Url) -> Result<Vec<Value>, SourceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| SourceError::RequestFailed {
                url: url.to_string(),
                source: err,
            })?;
        let status = response.status();
        // Ranges without data come back as 404 with a "No results found" body.
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|err| SourceError::DecodeFailed {
                url: url.to_string(),
                source: err,
            })
    }

    async fn total_laps(&self, session_key: u32) -> Option<u32> {
        let url = self.session_url("laps", session_key).ok()?;
        match self.get_records(url).await {
            Ok(records) => records
                .iter()
                .filter_map(|record| record.get("lap_number").and_then(Value::as_u64))
                .filter_map(|lap| u32::try_from(lap).ok())
                .max(),
            Err(err) => {
                tracing::warn!("Could not determine total laps: {}", err);
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct RawSession {
    session_name: Option<String>,
    date_start: Option<String>,
    date_end: Option<String>,
}

#[derive(Deserialize)]
struct RawDriver {
    driver_number: Option<DriverNumber>,
    name_acronym: Option<String>,
    team_name: Option<String>,
    team_colour: Option<String>,
}

impl RawDriver {
    fn into_driver(self) -> Option<DriverInfo> {
        let driver_number = self.driver_number?;
        Some(DriverInfo {
            driver_number,
            name_acronym: self
                .name_acronym
                .unwrap_or_else(|| driver_number.to_string()),
            team_name: self.team_name,
            team_colour: self.team_colour,
        })
    }
}

#[async_trait]
impl DataSource for OpenF1Source {
    async fn session_info(&self, session_key: u32) -> Result<SessionInfo, SourceError> {
        let sessions = self
            .get_records(self.session_url("sessions", session_key)?)
            .await?;
        let raw = sessions
            .into_iter()
            .find_map(|record| serde_json::from_value::<RawSession>(record).ok())
            .ok_or(SourceError::SessionNotFound { session_key })?;
        let start_ms = raw
            .date_start
            .as_deref()
            .and_then(parse_timestamp_ms)
            .ok_or(SourceError::SessionIncomplete {
                session_key,
                field: "date_start",
            })?;
        let end_ms = raw
            .date_end
            .as_deref()
            .and_then(parse_timestamp_ms)
            .ok_or(SourceError::SessionIncomplete {
                session_key,
                field: "date_end",
            })?;

        let mut drivers: Vec<DriverInfo> = self
            .get_records(self.session_url("drivers", session_key)?)
            .await?
            .into_iter()
            .filter_map(|record| serde_json::from_value::<RawDriver>(record).ok())
            .filter_map(RawDriver::into_driver)
            .collect();
        drivers.sort_by_key(|driver| driver.driver_number);
        drivers.dedup_by_key(|driver| driver.driver_number);

        let total_laps = self.total_laps(session_key).await;
        tracing::info!(
            "Loaded session {} with {} drivers.",
            session_key,
            drivers.len()
        );

        Ok(SessionInfo {
            session_key,
            session_name: raw.session_name.unwrap_or_else(|| "Session".to_owned()),
            start_ms,
            end_ms,
            total_laps,
            drivers,
        })
    }

    async fn fetch_range(&self, query: &RangeQuery) -> Result<StreamBatch, SourceError> {
        let records = self.get_records(self.range_url(query)?).await?;
        let (batch, _) = ingest_records(query.kind, records);
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::OpenF1Source;
    use crate::error::SourceError;
    use crate::source::RangeQuery;
    use crate::telemetry::StreamKind;

    #[test]
    fn range_url_carries_session_dates_and_driver() -> Result<(), SourceError> {
        let source = OpenF1Source::new("https://api.example.test/v1", Duration::from_secs(5))?;
        let url = source.range_url(&RangeQuery {
            session_key: 9161,
            kind: StreamKind::CarData,
            start_ms: 1_694_869_415_200,
            end_ms: 1_694_869_445_200,
            driver_number: Some(44),
        })?;
        assert_eq!(url.path(), "/v1/car_data");
        let query = url.query().unwrap_or_default();
        assert!(query.starts_with("session_key=9161&date"));
        assert!(query.contains("2023-09-16T13:03:35.200"));
        assert!(query.contains("2023-09-16T13:04:05.200"));
        assert!(query.ends_with("driver_number=44"));
        Ok(())
    }

    #[test]
    fn lap_ranges_filter_on_lap_start() -> Result<(), SourceError> {
        let source = OpenF1Source::new("https://api.example.test/v1/", Duration::from_secs(5))?;
        let url = source.range_url(&RangeQuery {
            session_key: 1,
            kind: StreamKind::Laps,
            start_ms: 0,
            end_ms: 1000,
            driver_number: None,
        })?;
        assert_eq!(url.path(), "/v1/laps");
        assert!(url.query().unwrap_or_default().contains("date_start"));
        assert!(!url.query().unwrap_or_default().contains("driver_number"));
        Ok(())
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OpenF1Source::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(SourceError::InvalidBaseUrl { .. })));
    }
}
