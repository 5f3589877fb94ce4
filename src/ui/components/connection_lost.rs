use ratatui::{
    layout::Alignment,
    prelude::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::UiComponent;

impl UiComponent {
    /// Blocking notice shown once the broker connection is gone.
    pub fn connection_lost(reason: &str) -> Paragraph<'static> {
        Paragraph::new(format!("Connection lost\n\n{}\n\nPress q to quit", reason))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Broker "),
            )
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
    }
}
