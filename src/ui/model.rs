use std::time::Duration;

use crate::replay::{PlaybackSpeed, ReplayController};
use crate::telemetry::{CarDataSample, Gap, SessionInfo, WeatherSample};

/// Race control messages kept on screen.
const MESSAGE_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FocusLine {
    pub label: String,
    pub telemetry: Option<CarDataSample>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub position: Option<u32>,
    pub label: String,
    pub gap_to_leader: Option<String>,
    pub interval: Option<String>,
}

/// Everything one frame of the player shows, detached from the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiData {
    pub session_name: String,
    pub elapsed: Duration,
    pub duration: Duration,
    pub playing: bool,
    pub speed: PlaybackSpeed,
    pub current_lap: Option<u32>,
    pub total_laps: Option<u32>,
    pub buffered_ahead: Duration,
    pub fetching: bool,
    pub cars_on_track: usize,
    pub focus: Option<FocusLine>,
    pub standings: Vec<StandingRow>,
    pub weather: Option<WeatherSample>,
    pub messages: Vec<String>,
    pub radio_clips: usize,
    pub no_color: bool,
}

impl UiData {
    #[must_use]
    pub fn from_controller(controller: &ReplayController, no_color: bool) -> Self {
        let session = controller.session();
        let snapshot = controller.snapshot();
        let now_ms = controller.current_ms();
        let buffered_ahead = controller.buffers().shared_window().lookahead_ms(now_ms);

        let focus = controller.focus().map(|driver_number| FocusLine {
            label: driver_label(session, driver_number),
            telemetry: snapshot.focus.clone(),
        });
        let standings = snapshot
            .standings
            .iter()
            .map(|standing| StandingRow {
                position: standing.position,
                label: driver_label(session, standing.driver_number),
                gap_to_leader: standing.gap_to_leader.as_ref().map(format_gap),
                interval: standing.interval.as_ref().map(format_gap),
            })
            .collect();
        let skip = snapshot.race_control.len().saturating_sub(MESSAGE_LINES);
        let messages = snapshot
            .race_control
            .iter()
            .skip(skip)
            .map(|message| {
                format!(
                    "[{}] {}",
                    format_clock(Duration::from_millis(
                        message.timestamp_ms.saturating_sub(session.start_ms)
                    )),
                    message.message
                )
            })
            .collect();

        Self {
            session_name: session.session_name.clone(),
            elapsed: Duration::from_millis(controller.elapsed_ms()),
            duration: Duration::from_millis(session.duration_ms()),
            playing: controller.is_playing(),
            speed: controller.speed(),
            current_lap: snapshot.current_lap,
            total_laps: snapshot.total_laps,
            buffered_ahead: Duration::from_millis(buffered_ahead),
            fetching: controller.has_pending_fetches(),
            cars_on_track: snapshot.cars.len(),
            focus,
            standings,
            weather: snapshot.weather.clone(),
            messages,
            radio_clips: snapshot.team_radio.len(),
            no_color,
        }
    }
}

fn driver_label(session: &SessionInfo, driver_number: u32) -> String {
    session
        .acronym(driver_number)
        .map_or_else(|| format!("#{}", driver_number), str::to_owned)
}

pub(crate) fn format_gap(gap: &Gap) -> String {
    match gap {
        Gap::Seconds(seconds) => format!("+{:.3}", seconds),
        Gap::Text(text) => text.clone(),
    }
}

/// `h:mm:ss`, or `mm:ss` below an hour.
pub(crate) fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
