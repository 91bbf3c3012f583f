use serde::Serialize;

use crate::error::AppResult;
use crate::replay::{PlaybackSpeed, ReplayController, Snapshot};
use crate::telemetry::DriverNumber;

/// JSON document printed by `--no-ui`.
#[derive(Debug, Serialize)]
pub(crate) struct HeadlessReport<'ctl> {
    pub session_key: u32,
    pub session_name: &'ctl str,
    pub elapsed_ms: u64,
    pub speed: PlaybackSpeed,
    pub focus: Option<DriverNumber>,
    pub snapshot: &'ctl Snapshot,
}

impl<'ctl> HeadlessReport<'ctl> {
    pub(crate) fn new(controller: &'ctl ReplayController) -> Self {
        Self {
            session_key: controller.session().session_key,
            session_name: &controller.session().session_name,
            elapsed_ms: controller.elapsed_ms(),
            speed: controller.speed(),
            focus: controller.focus(),
            snapshot: controller.snapshot(),
        }
    }
}

/// Waits for the initial fetches around the play head and prints the
/// snapshot as JSON.
pub(crate) async fn run_headless(mut controller: ReplayController) -> AppResult<()> {
    controller.settle().await;
    let report = HeadlessReport::new(&controller);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
