//! The four panel sections in a 2×2 grid.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::fmt::UNKNOWN;
use crate::model::{PanelModel, Section};
use crate::tui::style::Styles;

pub fn render_sections(frame: &mut Frame, area: Rect, panel: Option<&PanelModel>) {
    let Some(panel) = panel else {
        let waiting = Paragraph::new("waiting for first sample...")
            .style(Styles::dim())
            .alignment(Alignment::Center);
        frame.render_widget(waiting, area);
        return;
    };

    let rows =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (section, cell) in panel.sections.iter().zip(cells) {
        render_section(frame, cell, section);
    }
}

fn render_section(frame: &mut Frame, area: Rect, section: &Section) {
    let block = Block::default()
        .title(Span::styled(format!(" {} ", section.title), Styles::title()))
        .borders(Borders::ALL)
        .border_style(Styles::border());
    let lines: Vec<Line> = section.lines.iter().map(|l| styled_line(l)).collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Splits `"Label: value"` so the label and unknown values stand out.
fn styled_line(line: &str) -> Line<'_> {
    match line.split_once(": ") {
        Some((label, value)) => {
            let value_style = if value.contains(UNKNOWN) {
                Styles::unknown()
            } else {
                Styles::value()
            };
            Line::from(vec![
                Span::styled(format!("{}: ", label), Styles::label()),
                Span::styled(value, value_style),
            ])
        }
        None => Line::from(Span::styled(line, Styles::value())),
    }
}
