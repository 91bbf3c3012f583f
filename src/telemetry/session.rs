use serde::{Deserialize, Serialize};

use super::samples::DriverNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_number: DriverNumber,
    pub name_acronym: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_colour: Option<String>,
}

/// Fixed bounds and roster of the session being replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_key: u32,
    pub session_name: String,
    pub start_ms: u64,
    pub end_ms: u64,
    #[serde(default)]
    pub total_laps: Option<u32>,
    #[serde(default)]
    pub drivers: Vec<DriverInfo>,
}

impl SessionInfo {
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    #[must_use]
    pub fn driver(&self, driver_number: DriverNumber) -> Option<&DriverInfo> {
        self.drivers
            .iter()
            .find(|driver| driver.driver_number == driver_number)
    }

    #[must_use]
    pub fn acronym(&self, driver_number: DriverNumber) -> Option<&str> {
        self.driver(driver_number)
            .map(|driver| driver.name_acronym.as_str())
    }
}
