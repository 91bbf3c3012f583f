use ratatui::style::{Color, Modifier, Style};

pub(super) const UI_MARGIN: u16 = 0;
pub(super) const HEADER_HEIGHT: u16 = 5;
pub(super) const FOCUS_HEIGHT: u16 = 3;
pub(super) const FOOTER_HEIGHT: u16 = 1;
pub(super) const BODY_MIN_HEIGHT: u16 = 6;
pub(super) const STANDINGS_WIDTH_PCT: u16 = 45;
pub(super) const MESSAGES_WIDTH_PCT: u16 = 55;

pub(super) const PANEL_BG_RGB: (u8, u8, u8) = (0x0a, 0x0a, 0x0a);
pub(super) const PANEL_BORDER_RGB: (u8, u8, u8) = (0xe5, 0xe7, 0xeb);
pub(super) const PANEL_TEXT_RGB: (u8, u8, u8) = (0xff, 0xff, 0xff);
pub(super) const PANEL_MUTED_RGB: (u8, u8, u8) = (0x9c, 0xa3, 0xaf);
pub(super) const ACCENT_PLAYING_RGB: (u8, u8, u8) = (0x22, 0xc5, 0x5e);
pub(super) const ACCENT_PAUSED_RGB: (u8, u8, u8) = (0xf5, 0x9e, 0x0b);
pub(super) const ACCENT_FETCH_RGB: (u8, u8, u8) = (0x38, 0xbd, 0xf8);
pub(super) const ACCENT_FOCUS_RGB: (u8, u8, u8) = (0xc0, 0x84, 0xfc);
pub(super) const ACCENT_FLAG_RGB: (u8, u8, u8) = (0xef, 0x44, 0x44);

pub(super) const fn rgb(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub(super) fn style_color(no_color: bool, color: Color) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().fg(color)
    }
}

pub(super) fn emphasis(no_color: bool, color: Color) -> Style {
    style_color(no_color, color).add_modifier(Modifier::BOLD)
}

pub(super) fn muted_style(no_color: bool) -> Style {
    style_color(no_color, rgb(PANEL_MUTED_RGB))
}

pub(super) fn app_background_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().bg(rgb(PANEL_BG_RGB))
    }
}

pub(super) fn panel_block_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default()
            .bg(rgb(PANEL_BG_RGB))
            .fg(rgb(PANEL_TEXT_RGB))
    }
}

pub(super) fn panel_border_style(no_color: bool) -> Style {
    style_color(no_color, rgb(PANEL_BORDER_RGB))
}
