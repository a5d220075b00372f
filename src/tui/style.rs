//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub const HEADER_BG: Color = Color::Blue;
    pub const HEADER_FG: Color = Color::White;

    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const LABEL: Color = Color::Cyan;
    pub const BORDER: Color = Color::DarkGray;

    pub const UNKNOWN: Color = Color::Yellow;
    pub const CRITICAL: Color = Color::Red;

    pub const DECOR_ON: Color = Color::Magenta;
    pub const DECOR_OFF: Color = Color::DarkGray;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().fg(Theme::LABEL)
    }

    pub fn value() -> Style {
        Style::default().fg(Theme::FG)
    }

    /// Values that could not be read.
    pub fn unknown() -> Style {
        Style::default().fg(Theme::UNKNOWN)
    }

    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn border() -> Style {
        Style::default().fg(Theme::BORDER)
    }

    pub fn banner() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::CRITICAL)
            .add_modifier(Modifier::BOLD)
    }

    pub fn decor(revealed: bool) -> Style {
        if revealed {
            Style::default().fg(Theme::DECOR_ON)
        } else {
            Style::default().fg(Theme::DECOR_OFF)
        }
    }
}
