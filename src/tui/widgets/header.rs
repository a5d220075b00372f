//! Header bar: clock, client, interval and loop state.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;

use crate::tui::state::AppState;
use crate::tui::style::Styles;

pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::horizontal([
        Constraint::Length(21), // Time
        Constraint::Length(12), // Name
        Constraint::Min(16),    // Client
        Constraint::Length(18), // Interval
        Constraint::Length(12), // State
    ])
    .split(area);

    let time = state
        .updated_at
        .unwrap_or_else(Local::now)
        .format(" %Y-%m-%d %H:%M:%S")
        .to_string();
    frame.render_widget(Paragraph::new(time).style(Styles::header()), chunks[0]);
    frame.render_widget(
        Paragraph::new(" HOSTPANEL ").style(Styles::header()),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(format!(" client: {}", state.client)).style(Styles::header()),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(format!(" every {} ms", state.interval.as_millis())).style(Styles::header()),
        chunks[3],
    );
    frame.render_widget(
        Paragraph::new(format!(" {} ", state.loop_state.as_str().to_uppercase()))
            .style(Styles::header()),
        chunks[4],
    );
}
