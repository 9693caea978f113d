use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(5);

/// Single-slot transient message on the bottom row.
///
/// Showing a new message replaces the old one and restarts the timer, so
/// only the most recent message ever clears the line.
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: Option<String>,
    deadline: Option<Instant>,
    ttl: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_TTL)
    }
}

impl StatusLine {
    pub fn new(ttl: Duration) -> Self {
        Self {
            message: None,
            deadline: None,
            ttl,
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    /// A ttl too large to represent as a deadline keeps the message up
    /// until the next one replaces it.
    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some(message.into());
        self.deadline = now.checked_add(self.ttl);
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Time left before the current message clears, `None` if there is
    /// nothing to clear.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Clear the message once its deadline has passed. Returns whether
    /// anything was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.message = None;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(msg) = &self.message else {
            return;
        };
        let bar = Paragraph::new(format!(" {msg}"))
            .style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(bar, area);
    }
}
