use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::style::Styles;

/// Renders the décor strip. Cells light up as the reveal job reaches them.
pub fn render_decor(frame: &mut Frame, area: Rect, revealed: &[bool]) {
    let spans: Vec<Span> = revealed
        .iter()
        .map(|on| Span::styled(if *on { "██" } else { "░░" }, Styles::decor(*on)))
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
