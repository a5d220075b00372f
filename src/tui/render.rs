//! Main rendering logic for the viewer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{AppState, PopupState};
use super::style::Styles;
use super::widgets::{render_decor, render_header, render_quit_confirm, render_sections};

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let banner_height = u16::from(state.unavailable.is_some());

    let chunks = Layout::vertical([
        Constraint::Length(1),             // Header
        Constraint::Length(banner_height), // Unavailable banner
        Constraint::Length(1),             // Décor strip
        Constraint::Min(8),                // Sections
        Constraint::Length(1),             // Key help
    ])
    .split(area);

    render_header(frame, chunks[0], state);

    if let Some(reason) = &state.unavailable {
        let banner = Paragraph::new(format!(" metrics unavailable: {} ", reason))
            .style(Styles::banner());
        frame.render_widget(banner, chunks[1]);
    }

    render_decor(frame, chunks[2], &state.revealed);
    render_sections(frame, chunks[3], state.panel.as_ref());

    let help = Line::from(vec![
        Span::styled(" q", Styles::label()),
        Span::styled(" quit  ", Styles::dim()),
        Span::styled("+", Styles::label()),
        Span::styled(" slower  ", Styles::dim()),
        Span::styled("-", Styles::label()),
        Span::styled(" faster", Styles::dim()),
    ]);
    frame.render_widget(Paragraph::new(help), chunks[4]);

    if state.popup == PopupState::QuitConfirm {
        render_quit_confirm(frame, area);
    }
}
