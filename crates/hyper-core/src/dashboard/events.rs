use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};

use crate::render::{InputEvent, KeyCode, KeyEvent, KeyModifiers, SurfaceError};

/// One step of the dashboard loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Input(InputEvent),
    Resize(u16, u16),
    /// Nothing arrived before the timeout
    Tick,
    /// The source is exhausted; the dashboard exits
    Closed,
}

/// Where the dashboard reads events from.
pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    fn next_event(&mut self, timeout: Duration) -> Result<SourceEvent, SurfaceError>;
}

/// Replays a fixed list of events, then reports [`SourceEvent::Closed`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    events: VecDeque<SourceEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = SourceEvent>) -> Self {
        Self { events: events.into_iter().collect() }
    }

    /// Keys typed in order
    pub fn keys(text: &str) -> Self {
        Self::new(text.chars().map(|c| SourceEvent::Input(InputEvent::char(c))))
    }

    pub fn push(&mut self, event: SourceEvent) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, _timeout: Duration) -> Result<SourceEvent, SurfaceError> {
        Ok(self.events.pop_front().unwrap_or(SourceEvent::Closed))
    }
}

/// Reads the real terminal through crossterm.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl TerminalEvents {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for TerminalEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<SourceEvent, SurfaceError> {
        if !event::poll(timeout)? {
            return Ok(SourceEvent::Tick);
        }
        let next = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                map_key(key).map(SourceEvent::Input).unwrap_or(SourceEvent::Tick)
            }
            Event::Resize(width, height) => SourceEvent::Resize(width, height),
            Event::Paste(text) => SourceEvent::Input(InputEvent::Paste(text)),
            _ => SourceEvent::Tick,
        };
        Ok(next)
    }
}

/// Translate a crossterm key. Keys with no counterpart map to `None`.
pub fn map_key(key: event::KeyEvent) -> Option<InputEvent> {
    use crossterm::event::KeyCode as Ct;

    let code = match key.code {
        Ct::Char(c) => KeyCode::Char(c),
        Ct::Enter => KeyCode::Enter,
        Ct::Esc => KeyCode::Esc,
        Ct::Backspace => KeyCode::Backspace,
        Ct::Tab => KeyCode::Tab,
        Ct::BackTab => KeyCode::BackTab,
        Ct::Up => KeyCode::Up,
        Ct::Down => KeyCode::Down,
        Ct::Left => KeyCode::Left,
        Ct::Right => KeyCode::Right,
        Ct::Home => KeyCode::Home,
        Ct::End => KeyCode::End,
        Ct::PageUp => KeyCode::PageUp,
        Ct::PageDown => KeyCode::PageDown,
        Ct::Delete => KeyCode::Delete,
        Ct::Insert => KeyCode::Insert,
        Ct::F(n) => KeyCode::F(n),
        _ => return None,
    };

    let mut modifiers = KeyModifiers::empty();
    if key.modifiers.contains(event::KeyModifiers::SHIFT) {
        modifiers |= KeyModifiers::SHIFT;
    }
    if key.modifiers.contains(event::KeyModifiers::CONTROL) {
        modifiers |= KeyModifiers::CONTROL;
    }
    if key.modifiers.contains(event::KeyModifiers::ALT) {
        modifiers |= KeyModifiers::ALT;
    }
    Some(InputEvent::Key(KeyEvent { code, modifiers }))
}
