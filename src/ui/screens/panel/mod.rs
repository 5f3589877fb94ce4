use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Stylize},
    widgets::{Block, BorderType, Paragraph, Widget},
};
use crate::app::App;
use crate::state::PipeName;
use crate::ui::components::UiComponent;

mod footer;
mod pipe_card;

const HELP: &str = "Tab/b/s pipe  ↑↓ field  ←→ adjust  Enter toggle  e type value  q quit";

pub fn render_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(9),    // pipes
            Constraint::Length(3), // readouts
            Constraint::Length(3), // status
            Constraint::Length(1), // help
        ])
        .split(area);

    let title = Paragraph::new("🛁 Smart Bathtub")
        .block(Block::bordered().border_type(BorderType::Rounded))
        .fg(Color::Green)
        .alignment(Alignment::Center);
    title.render(main_layout[0], buf);

    let pipes_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[1]);

    pipe_card::render_pipe_card(app, PipeName::Bath, pipes_layout[0], buf);
    pipe_card::render_pipe_card(app, PipeName::Shower, pipes_layout[1], buf);

    footer::render_readouts(app, main_layout[2], buf);

    let (status, is_error) = status_text(app);
    UiComponent::status(&status, is_error).render(main_layout[3], buf);

    let help = match &app.entry {
        Some(entry) => format!(
            "{} {} = {}▏  Enter send  Esc cancel",
            app.focus.pipe, app.focus.field, entry
        ),
        None => HELP.to_string(),
    };
    UiComponent::help(&help).render(main_layout[4], buf);
}

fn status_text(app: &App) -> (String, bool) {
    if let Some(error) = &app.status.last_error {
        return (format!("⚠ {}", error), true);
    }

    let sent = app.status.last_command.as_deref().unwrap_or("-");
    let received = app.status.last_inbound.as_deref().unwrap_or("-");
    (format!("sent {}   received {}", sent, received), false)
}
