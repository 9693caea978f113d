#[cfg(any(test, feature = "test-helpers"))]
use std::collections::VecDeque;
use std::time::Duration;

#[cfg(any(test, feature = "test-helpers"))]
use anyhow::bail;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Where the UI loops get their input from.
///
/// The real implementation reads the terminal; tests replay a script.
pub trait EventSource {
    /// Wait for the next event. With a timeout, `Ok(None)` means it elapsed
    /// before anything arrived.
    fn next_event(&mut self, timeout: Option<Duration>) -> Result<Option<Event>>;
}

/// Terminal input via `crossterm::event`.
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Option<Duration>) -> Result<Option<Event>> {
        match timeout {
            None => Ok(Some(event::read()?)),
            Some(timeout) => {
                if event::poll(timeout)? {
                    Ok(Some(event::read()?))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
/// Replays a fixed sequence of events, ignoring timeouts.
/// Running past the end is an error so a stuck loop cannot spin forever.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Queue one key press per character.
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.push(key_event(KeyCode::Char(c)));
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl EventSource for ScriptedEvents {
    fn next_event(&mut self, _timeout: Option<Duration>) -> Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => bail!("event script exhausted"),
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub fn key_event(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Key presses only; release and repeat reports are ignored.
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
}

/// Ctrl+C.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_replays_in_order_then_fails() {
        let mut events = ScriptedEvents::default();
        events.type_text("ab");
        let first = events.next_event(None).unwrap();
        assert_eq!(first, Some(key_event(KeyCode::Char('a'))));
        let second = events.next_event(Some(Duration::from_secs(1))).unwrap();
        assert_eq!(second, Some(key_event(KeyCode::Char('b'))));
        assert!(events.next_event(None).is_err());
    }

    #[test]
    fn ctrl_c_is_interrupt() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_interrupt(&key));
        assert!(!is_interrupt(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
