use ratatui::{
    prelude::text,
    text::Span,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::model::{UiData, format_clock};

use super::theme::{
    ACCENT_FETCH_RGB, ACCENT_FLAG_RGB, ACCENT_FOCUS_RGB, ACCENT_PAUSED_RGB, ACCENT_PLAYING_RGB,
    PANEL_TEXT_RGB, emphasis, muted_style, panel_block_style, panel_border_style, rgb, style_color,
};

pub(super) const KEY_HELP: &str =
    "space play/pause  <-/-> step  home/end  +/- speed  f/F focus  n no focus  q quit";

fn panel_block(title: String, no_color: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(panel_block_style(no_color))
        .border_style(panel_border_style(no_color))
}

pub(super) fn header_lines(data: &UiData) -> Vec<text::Line<'static>> {
    let no_color = data.no_color;
    let (state, state_rgb) = if data.playing {
        ("PLAYING", ACCENT_PLAYING_RGB)
    } else {
        ("PAUSED", ACCENT_PAUSED_RGB)
    };
    let mut lines = vec![
        text::Line::from(vec![
            Span::styled(state, emphasis(no_color, rgb(state_rgb))),
            Span::from(format!(" {}   ", data.speed)),
            Span::from(format!(
                "{} / {}   ",
                format_clock(data.elapsed),
                format_clock(data.duration)
            )),
            Span::styled(
                format_lap(data.current_lap, data.total_laps),
                emphasis(no_color, rgb(PANEL_TEXT_RGB)),
            ),
        ]),
        text::Line::from(vec![
            Span::from(format!("Buffered: +{}s", data.buffered_ahead.as_secs())),
            Span::styled(
                if data.fetching { " (fetching)" } else { "" },
                style_color(no_color, rgb(ACCENT_FETCH_RGB)),
            ),
            Span::from(format!(
                "   Cars on track: {}   Radio clips: {}",
                data.cars_on_track, data.radio_clips
            )),
        ]),
    ];
    if let Some(weather) = data.weather.as_ref() {
        lines.push(text::Line::from(Span::styled(
            format!(
                "Weather: air {:.1}C  track {:.1}C  humidity {:.0}%  wind {:.1} m/s  {}",
                weather.air_temperature,
                weather.track_temperature,
                weather.humidity,
                weather.wind_speed,
                if weather.rainfall > 0.0 { "rain" } else { "dry" }
            ),
            muted_style(no_color),
        )));
    }
    lines
}

pub(super) fn header_panel(data: &UiData) -> Paragraph<'static> {
    let title = if data.session_name.is_empty() {
        "paddock".to_owned()
    } else {
        format!("paddock - {}", data.session_name)
    };
    Paragraph::new(header_lines(data)).block(panel_block(title, data.no_color))
}

pub(super) fn focus_line(data: &UiData) -> text::Line<'static> {
    let no_color = data.no_color;
    let Some(focus) = data.focus.as_ref() else {
        return text::Line::from(Span::styled(
            "none (press f to follow a driver)",
            muted_style(no_color),
        ));
    };
    let label = Span::styled(focus.label.clone(), emphasis(no_color, rgb(ACCENT_FOCUS_RGB)));
    match focus.telemetry.as_ref() {
        Some(car) => text::Line::from(vec![
            label,
            Span::from(format!(
                "  {:.0} km/h  gear {}  {:.0} rpm  throttle {:.0}%  brake {:.0}%  DRS {}",
                car.speed,
                car.gear,
                car.rpm,
                car.throttle,
                car.brake,
                if car.drs >= 10 { "open" } else { "closed" }
            )),
        ]),
        None => text::Line::from(vec![
            label,
            Span::styled("  <no telemetry>", muted_style(no_color)),
        ]),
    }
}

pub(super) fn focus_panel(data: &UiData) -> Paragraph<'static> {
    Paragraph::new(focus_line(data)).block(panel_block("Focus".to_owned(), data.no_color))
}

pub(super) fn standings_lines(data: &UiData) -> Vec<text::Line<'static>> {
    if data.standings.is_empty() {
        return vec![text::Line::from(Span::styled(
            "<no data>",
            muted_style(data.no_color),
        ))];
    }
    data.standings
        .iter()
        .map(|row| {
            let position = row
                .position
                .map_or_else(|| " -".to_owned(), |position| format!("{:>2}", position));
            text::Line::from(format!(
                "P{}  {:<4} {:>10} {:>10}",
                position,
                row.label,
                row.gap_to_leader.as_deref().unwrap_or(""),
                row.interval.as_deref().unwrap_or("")
            ))
        })
        .collect()
}

pub(super) fn standings_panel(data: &UiData) -> Paragraph<'static> {
    Paragraph::new(standings_lines(data))
        .block(panel_block("Standings".to_owned(), data.no_color))
}

pub(super) fn message_lines(data: &UiData) -> Vec<text::Line<'static>> {
    if data.messages.is_empty() {
        return vec![text::Line::from(Span::styled(
            "<none>",
            muted_style(data.no_color),
        ))];
    }
    data.messages
        .iter()
        .map(|message| {
            text::Line::from(Span::styled(
                message.clone(),
                style_color(data.no_color, rgb(ACCENT_FLAG_RGB)),
            ))
        })
        .collect()
}

pub(super) fn messages_panel(data: &UiData) -> Paragraph<'static> {
    Paragraph::new(message_lines(data))
        .block(panel_block("Race control".to_owned(), data.no_color))
        .wrap(Wrap { trim: true })
}

pub(super) fn key_help_line(data: &UiData) -> text::Line<'static> {
    text::Line::from(Span::styled(KEY_HELP, muted_style(data.no_color)))
}

pub(super) fn format_lap(current: Option<u32>, total: Option<u32>) -> String {
    match (current, total) {
        (Some(current), Some(total)) => format!("Lap {}/{}", current, total),
        (Some(current), None) => format!("Lap {}", current),
        (None, Some(total)) => format!("Lap -/{}", total),
        (None, None) => "Lap -".to_owned(),
    }
}
