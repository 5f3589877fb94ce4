use ratatui::{
    layout::Alignment,
    prelude::{Color, Modifier, Style},
    widgets::Paragraph,
};

use super::UiComponent;

impl UiComponent {
    pub fn toggle(is_on: bool, label: &str) -> Paragraph<'static> {
        let (color, visual) = if is_on {
            (Color::Green, "[ ────── ● ]")
        } else {
            (Color::Red, "[ ● ────── ]")
        };

        Paragraph::new(format!("{}  {}", visual, label))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
    }
}
