use color_eyre::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use std::sync::Arc;

use crate::dispatch::{Dispatcher, PipeCommand, PipeProperty};
use crate::log_info;
use crate::state::{ApplicationState, PipeName};
use crate::util::io::broker::CONNECTION_LOST_EVENT;
use crate::util::io::bus::{app_event_topic, BusMessage, BusReceiver, MessageBus};
use crate::util::io::event::{AppEvent, Event, EventHandler};

/// Which slider the keyboard is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub pipe: PipeName,
    pub field: PipeProperty,
}

impl Default for Focus {
    fn default() -> Self {
        Self {
            pipe: PipeName::Bath,
            field: PipeProperty::Debit,
        }
    }
}

/// Footer status: what went out last, what came in last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLine {
    pub last_command: Option<String>,
    pub last_inbound: Option<String>,
    pub last_error: Option<String>,
}

/// Application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    pub focus: Focus,
    /// Raw text typed for the focused slider, while direct entry is open.
    pub entry: Option<String>,
    /// Snapshot rendered on the last draw.
    pub state: Arc<ApplicationState>,
    pub status: StatusLine,
    /// Set once the broker connection is gone; the panel is then read-only.
    pub connection_lost: Option<String>,

    pub dispatcher: Dispatcher,
    /// Device reports on the subscribed topic
    pub inbound: BusReceiver,
    pub connection_events: BusReceiver,
    /// Event handler.
    pub events: EventHandler,
}

impl App {
    pub fn new(dispatcher: Dispatcher, bus: &MessageBus, topic: &str, events: EventHandler) -> Self {
        let inbound = bus.subscribe(topic);
        let connection_events = bus.subscribe(app_event_topic(CONNECTION_LOST_EVENT));
        let state = dispatcher.store().get();

        Self {
            running: true,
            focus: Focus::default(),
            entry: None,
            state,
            status: StatusLine::default(),
            connection_lost: None,
            dispatcher,
            inbound,
            connection_events,
            events,
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                self.state = self.dispatcher.store().get();
                terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
                needs_redraw = false;
            }

            // One message at a time: local intent and device reports never overlap
            tokio::select! {
                event = self.events.next() => {
                    match event? {
                        Event::Tick => {}
                        Event::Crossterm(crossterm::event::Event::Key(key_event)) => {
                            self.handle_key_events(key_event);
                        }
                        Event::Crossterm(crossterm::event::Event::Resize(_, _)) => needs_redraw = true,
                        Event::Crossterm(_) => {}
                        Event::App(app_event) => {
                            self.handle_app_event(app_event);
                            needs_redraw = true;
                        }
                    }
                }
                Some(message) = self.inbound.recv() => {
                    self.handle_bus_message(message);
                    needs_redraw = true;
                }
                Some(message) = self.connection_events.recv() => {
                    self.handle_connection_lost(message);
                    needs_redraw = true;
                }
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }

        if key_event.code == KeyCode::Char('c') && key_event.modifiers == KeyModifiers::CONTROL {
            self.events.send(AppEvent::Quit);
            return;
        }

        if self.connection_lost.is_some() {
            if matches!(key_event.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
                self.events.send(AppEvent::Quit);
            }
            return;
        }

        if self.entry.is_some() {
            match key_event.code {
                KeyCode::Enter => self.events.send(AppEvent::SubmitEntry),
                KeyCode::Esc => self.events.send(AppEvent::CancelEntry),
                KeyCode::Backspace => self.events.send(AppEvent::EntryBackspace),
                KeyCode::Char(ch) => self.events.send(AppEvent::EntryInput(ch)),
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Tab | KeyCode::BackTab => self.events.send(AppEvent::SwitchPipe),
            KeyCode::Char('b') => self.events.send(AppEvent::SelectPipe(PipeName::Bath)),
            KeyCode::Char('s') => self.events.send(AppEvent::SelectPipe(PipeName::Shower)),
            KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
                self.events.send(AppEvent::SwitchField)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => self.events.send(AppEvent::Nudge(-1)),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => self.events.send(AppEvent::Nudge(1)),
            KeyCode::PageDown => self.events.send(AppEvent::Nudge(-5)),
            KeyCode::PageUp => self.events.send(AppEvent::Nudge(5)),
            KeyCode::Enter | KeyCode::Char(' ') => self.events.send(AppEvent::TogglePipe),
            KeyCode::Char('e') => self.events.send(AppEvent::BeginEntry),
            _ => {}
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => self.quit(),
            AppEvent::SelectPipe(pipe) => self.focus.pipe = pipe,
            AppEvent::SwitchPipe => self.focus.pipe = self.focus.pipe.other(),
            AppEvent::SwitchField => self.focus.field = self.focus.field.other(),
            AppEvent::TogglePipe => {
                let result = self.dispatcher.toggle_pipe(self.focus.pipe);
                self.record_command(result);
            }
            AppEvent::Nudge(steps) => self.nudge(steps),
            AppEvent::BeginEntry => self.entry = Some(String::new()),
            AppEvent::EntryInput(ch) => {
                if let Some(entry) = &mut self.entry {
                    entry.push(ch);
                }
            }
            AppEvent::EntryBackspace => {
                if let Some(entry) = &mut self.entry {
                    entry.pop();
                }
            }
            AppEvent::CancelEntry => self.entry = None,
            AppEvent::SubmitEntry => {
                if let Some(raw) = self.entry.take() {
                    let Focus { pipe, field } = self.focus;
                    let result = self.dispatcher.set_pipe_property(pipe, field, &raw);
                    self.record_command(result);
                }
            }
        }
        self.state = self.dispatcher.store().get();
    }

    /// Moves the focused slider by whole steps, clamped to its range, and
    /// dispatches the slider's value string.
    fn nudge(&mut self, steps: i32) {
        let Focus { pipe, field } = self.focus;
        let range = field.range(pipe);
        let current = self.dispatcher.store().get();
        let pipe_state = current.pipe(pipe);

        let value = match field {
            PipeProperty::Debit => pipe_state.debit_or_zero(),
            PipeProperty::Temperature => pipe_state.temperature_or_default(),
        };
        let value = if value.is_nan() { range.min } else { value };
        let next = range.clamp(value + steps as f64 * range.step);

        let raw = range.format(next);
        let result = self.dispatcher.set_pipe_property(pipe, field, &raw);
        self.record_command(result);
    }

    fn record_command(&mut self, result: crate::error::Result<PipeCommand>) {
        match result {
            Ok(command) => {
                self.status.last_command = Some(command.to_string());
                self.status.last_error = None;
            }
            Err(e) => self.status.last_error = Some(e.to_string()),
        }
    }

    pub fn handle_bus_message(&mut self, message: BusMessage) {
        if let Ok(inbound) = self.dispatcher.apply_message(&message.payload) {
            self.status.last_inbound = Some(message.payload.trim().to_string());
            log_info!("Applied {} from {}", inbound.kind(), message.source);
        }
        self.state = self.dispatcher.store().get();
    }

    pub fn handle_connection_lost(&mut self, message: BusMessage) {
        self.connection_lost = Some(message.payload);
        self.entry = None;
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DebitPolicy;
    use crate::state::{PipeState, StateStore};
    use crate::util::io::broker::ConnectionManager;

    fn app() -> (App, MessageBus, BusReceiver) {
        let bus = MessageBus::new();
        let outbound = bus.subscribe("commands");
        let manager = ConnectionManager::local(bus.clone());
        let dispatcher = Dispatcher::new(
            StateStore::default(),
            manager.publisher(),
            "commands".to_string(),
            DebitPolicy::DeriveOnOff,
        );
        let app = App::new(dispatcher, &bus, "screen", EventHandler::detached());
        (app, bus, outbound)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn drain(app: &mut App) {
        while let Ok(Event::App(event)) =
            tokio::time::timeout(std::time::Duration::from_millis(20), app.events.next())
                .await
                .unwrap_or_else(|_| Err(color_eyre::eyre::eyre!("idle")))
        {
            app.handle_app_event(event);
        }
    }

    #[tokio::test]
    async fn test_toggle_key_sends_command() {
        let (mut app, _bus, mut outbound) = app();

        app.handle_key_events(key(KeyCode::Enter));
        drain(&mut app).await;

        assert_eq!(outbound.recv().await.unwrap().payload, "setPipe/bath/on/0.025");
        assert!(app.state.bath.is_on);
        assert_eq!(app.status.last_command.as_deref(), Some("setPipe/bath/on/0.025"));
    }

    #[tokio::test]
    async fn test_nudge_moves_slider_by_step() {
        let (mut app, _bus, mut outbound) = app();

        app.handle_key_events(key(KeyCode::Char('s')));
        app.handle_key_events(key(KeyCode::Right));
        app.handle_key_events(key(KeyCode::Right));
        drain(&mut app).await;

        assert_eq!(app.state.shower.debit, Some(0.02));
        assert!(app.state.shower.is_on);
        assert_eq!(outbound.recv().await.unwrap().payload, "setPipe/shower/on/0.01/20");
        assert_eq!(outbound.recv().await.unwrap().payload, "setPipe/shower/on/0.02/20");
    }

    #[tokio::test]
    async fn test_nudge_is_clamped_to_range() {
        let (mut app, _bus, _outbound) = app();

        app.handle_app_event(AppEvent::SwitchField);
        app.handle_app_event(AppEvent::Nudge(100));

        assert_eq!(app.state.bath.temperature, Some(50.0));

        app.handle_app_event(AppEvent::Nudge(-100));
        assert_eq!(app.state.bath.temperature, Some(5.0));
    }

    #[tokio::test]
    async fn test_direct_entry_passes_raw_text() {
        let (mut app, _bus, mut outbound) = app();

        app.handle_key_events(key(KeyCode::Down));
        app.handle_key_events(key(KeyCode::Char('e')));
        drain(&mut app).await;
        for ch in "hot".chars() {
            app.handle_key_events(key(KeyCode::Char(ch)));
        }
        app.handle_key_events(key(KeyCode::Enter));
        drain(&mut app).await;

        assert!(app.entry.is_none());
        assert!(app.state.bath.temperature.unwrap().is_nan());
        assert_eq!(outbound.recv().await.unwrap().payload, "setPipe/bath/off");
    }

    #[tokio::test]
    async fn test_inbound_bus_message_updates_state() {
        let (mut app, bus, _outbound) = app();
        let mut inbound = bus.subscribe("probe");
        bus.publish(BusMessage::new("probe".to_string(), "pipe/bath/on/0.2/33".to_string(), "mqtt".to_string()))
            .unwrap();

        app.handle_bus_message(inbound.recv().await.unwrap());

        assert_eq!(
            app.state.bath,
            PipeState { is_on: true, debit: Some(0.2), temperature: Some(33.0) }
        );
        assert_eq!(app.status.last_inbound.as_deref(), Some("pipe/bath/on/0.2/33"));
    }

    #[tokio::test]
    async fn test_unknown_inbound_leaves_status_alone() {
        let (mut app, _bus, _outbound) = app();

        app.handle_bus_message(BusMessage::new("screen".to_string(), "foo/bar".to_string(), "mqtt".to_string()));

        assert_eq!(app.status, StatusLine::default());
        assert_eq!(*app.state, ApplicationState::default());
    }

    #[tokio::test]
    async fn test_connection_lost_only_allows_quit() {
        let (mut app, _bus, _outbound) = app();
        app.handle_connection_lost(BusMessage::new(
            "app.event.connection_lost".to_string(),
            "eof".to_string(),
            "smartbath_panel".to_string(),
        ));

        app.handle_key_events(key(KeyCode::Enter));
        drain(&mut app).await;

        assert!(!app.running);
        assert_eq!(*app.state, ApplicationState::default());
    }
}
