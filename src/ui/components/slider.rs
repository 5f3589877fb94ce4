use ratatui::{
    prelude::{Color, Line, Span, Style},
    widgets::Paragraph,
};

use super::UiComponent;
use crate::ui::style::dim_unless_focused;

impl UiComponent {
    /// One-line range slider: `label ━━━━●──────── value`.
    pub fn slider(label: &str, ratio: f64, value: &str, is_focused: bool, width: u16) -> Paragraph<'static> {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

        let fixed = label.chars().count() + value.chars().count() + 3;
        let track = (width as usize).saturating_sub(fixed).max(3);
        let filled = ((track - 1) as f64 * ratio).round() as usize;
        let empty = track - 1 - filled;

        let color = if is_focused { Color::Cyan } else { Color::Gray };
        let style = dim_unless_focused(is_focused, Style::default().fg(color));

        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", label), style),
            Span::styled("━".repeat(filled), Style::default().fg(Color::Blue)),
            Span::styled("●", style),
            Span::styled("─".repeat(empty), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {}", value), style),
        ]))
    }
}
