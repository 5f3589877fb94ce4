use ratatui::{
    layout::Alignment,
    prelude::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::UiComponent;

impl UiComponent {
    pub fn status(status: &str, is_error: bool) -> Paragraph {
        let color = if is_error { Color::Red } else { Color::Yellow };
        Paragraph::new(status)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(" Status ")
            )
            .style(Style::default().fg(color))
            .alignment(Alignment::Left)
    }
}
