pub mod components;
pub mod format;
pub mod screens;
pub mod style;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Clear, Widget},
};
use crate::app::App;
use crate::ui::components::UiComponent;
use crate::ui::screens::panel::render_panel;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_panel(self, area, buf);

        if let Some(reason) = &self.connection_lost {
            let popup = centered_rect(50, 40, area);
            Clear.render(popup, buf);
            UiComponent::connection_lost(reason).render(popup, buf);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
