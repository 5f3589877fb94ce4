use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};
use crate::app::App;
use crate::dispatch::PipeProperty;
use crate::state::PipeName;
use crate::ui::components::UiComponent;
use crate::ui::format;

pub(super) fn render_pipe_card(app: &App, pipe: PipeName, area: Rect, buf: &mut Buffer) {
    let state = app.state.pipe(pipe);
    let is_selected = app.focus.pipe == pipe && app.connection_lost.is_none();

    let status_color = if state.is_on { Color::Green } else { Color::Red };
    let border_color = if is_selected { Color::White } else { status_color };

    let block = Block::default()
        .title(format!(" {} ", pipe.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // debit slider
            Constraint::Length(1),
            Constraint::Length(1), // toggle
            Constraint::Length(1),
            Constraint::Length(1), // temperature slider
            Constraint::Min(0),
        ])
        .split(inner);

    let debit_range = PipeProperty::Debit.range(pipe);
    let debit_focused = is_selected && app.focus.field == PipeProperty::Debit;
    UiComponent::slider(
        "Flow",
        debit_range.ratio(state.debit_or_zero()),
        &format::debit_percent(pipe, state),
        debit_focused,
        chunks[0].width,
    )
    .render(chunks[0], buf);

    UiComponent::toggle(state.is_on, format::on_off(state)).render(chunks[2], buf);

    let temperature_range = PipeProperty::Temperature.range(pipe);
    let temperature_focused = is_selected && app.focus.field == PipeProperty::Temperature;
    UiComponent::slider(
        "Temp",
        temperature_range.ratio(state.temperature_or_default()),
        &format::temperature(state),
        temperature_focused,
        chunks[4].width,
    )
    .render(chunks[4], buf);
}
