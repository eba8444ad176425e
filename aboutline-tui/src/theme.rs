//! Theme system for dark/light modes

use aboutline_core::config::ThemeVariant;
use ratatui::style::{Color, Modifier, Style};

/// Theme definition
#[derive(Clone, Debug)]
pub struct Theme {
    pub base: Style,
    pub heading_line: Style,
    pub line_number: Style,
    pub cursor_line_bg: Color,
    pub selection: Style,
    pub outline_border: Color,
    pub outline_active: Style,
    pub outline_current: Style,
    pub outline_empty: Style,
    pub prompt: Style,
    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
}

impl Theme {
    /// Create a theme for the given variant
    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            base: Style::default().fg(Color::White),
            heading_line: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            line_number: Style::default().fg(Color::DarkGray),
            cursor_line_bg: Color::Rgb(40, 40, 40), // Subtle dark gray
            selection: Style::default().bg(Color::Rgb(60, 60, 100)),
            outline_border: Color::DarkGray,
            outline_active: Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            outline_current: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            outline_empty: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            prompt: Style::default().fg(Color::Yellow),
            status_bar_fg: Color::Black,
            status_bar_bg: Color::LightCyan,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            base: Style::default().fg(Color::Black),
            heading_line: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            line_number: Style::default().fg(Color::Gray),
            cursor_line_bg: Color::Rgb(230, 230, 230),
            selection: Style::default().bg(Color::Rgb(200, 210, 250)),
            outline_border: Color::Gray,
            outline_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            outline_current: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            outline_empty: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            prompt: Style::default().fg(Color::Magenta),
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
        }
    }
}
