use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};
use crate::app::App;
use crate::ui::format;

/// Volume gauge and water-quality badge.
pub(super) fn render_readouts(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Volume "))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(format::volume_ratio(&app.state))
        .label(format::volume(&app.state))
        .render(chunks[0], buf);

    let quality_color = if app.state.bad_water_quality { Color::Red } else { Color::Green };
    Paragraph::new(format::water_quality(&app.state))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(quality_color))
                .title(" Water "),
        )
        .style(Style::default().fg(quality_color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}
