use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::{Backend, Frame},
    widgets::{Block, Paragraph},
};

use crate::ui::model::UiData;

use super::panels::{focus_panel, header_panel, key_help_line, messages_panel, standings_panel};
use super::theme::{
    BODY_MIN_HEIGHT, FOCUS_HEIGHT, FOOTER_HEIGHT, HEADER_HEIGHT, MESSAGES_WIDTH_PCT,
    STANDINGS_WIDTH_PCT, UI_MARGIN, app_background_style,
};

pub fn draw_frame<B: Backend>(f: &mut Frame<'_, B>, data: &UiData) {
    let size = f.size();
    f.render_widget(
        Block::default().style(app_background_style(data.no_color)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(UI_MARGIN)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(FOCUS_HEIGHT),
            Constraint::Min(BODY_MIN_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(size);

    let (header_chunk, focus_chunk, body_chunk, footer_chunk) = match chunks.as_ref() {
        [a, b, c, d] => (a, b, c, d),
        _ => return,
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(STANDINGS_WIDTH_PCT),
            Constraint::Percentage(MESSAGES_WIDTH_PCT),
        ])
        .split(*body_chunk);
    let (standings_chunk, messages_chunk) = match body.as_ref() {
        [a, b] => (a, b),
        _ => return,
    };

    f.render_widget(header_panel(data), *header_chunk);
    f.render_widget(focus_panel(data), *focus_chunk);
    f.render_widget(standings_panel(data), *standings_chunk);
    f.render_widget(messages_panel(data), *messages_chunk);
    f.render_widget(Paragraph::new(key_help_line(data)), *footer_chunk);
}
