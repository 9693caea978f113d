use std::collections::BTreeMap;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::event::{is_interrupt, is_press, EventSource};

/// Submitted values keyed by field label.
pub type FormValues = BTreeMap<String, String>;

const HINT: &str = "Enter=Submit  Esc=Cancel  Tab=Next";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
    pub masked: bool,
    /// Display cells for the input box.
    pub width: u16,
}

impl Field {
    pub fn new(label: impl Into<String>, width: u16) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            masked: false,
            width: width.max(1),
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// What the input box shows: `*` per char when masked, and only as
    /// many trailing chars as fit in `width` cells so the cursor end stays
    /// visible.
    pub fn display_text(&self) -> String {
        if self.masked {
            let stars = self.value.chars().count().min(self.width as usize);
            return "*".repeat(stars);
        }
        let mut used = 0;
        let mut start = self.value.len();
        for (idx, c) in self.value.char_indices().rev() {
            let w = c.width().unwrap_or(0);
            if used + w > self.width as usize {
                break;
            }
            used += w;
            start = idx;
        }
        self.value[start..].to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Pending,
    Submitted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult {
    Submitted(FormValues),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Form {
    title: String,
    fields: Vec<Field>,
    active: usize,
}

impl Form {
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            fields,
            active: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.label.clone(), f.value.clone()))
            .collect()
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if is_interrupt(&key) {
            return FormOutcome::Cancelled;
        }
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Enter => return FormOutcome::Submitted,
            KeyCode::Tab | KeyCode::Right => self.focus_next(),
            KeyCode::BackTab | KeyCode::Left => self.focus_prev(),
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.active) {
                    field.value.pop();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if let Some(field) = self.fields.get_mut(self.active) {
                    field.value.push(c);
                }
            }
            _ => {}
        }
        FormOutcome::Pending
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label_col = self
            .fields
            .iter()
            .map(|f| f.label.chars().count() as u16 + 1)
            .max()
            .unwrap_or(0)
            + 4;

        let title_area = Rect::new(area.x, area.y, area.width, area.height.min(1));
        frame.render_widget(
            Paragraph::new(format!(" {} ", self.title))
                .style(Style::default().fg(Color::White).bg(Color::Blue).bold()),
            title_area,
        );

        let mut cursor = None;
        for (i, field) in self.fields.iter().enumerate() {
            let y = area.y + 2 + i as u16 * 2;
            if y >= area.bottom() {
                break;
            }
            let label_area = Rect::new(area.x + 2, y, label_col, 1).intersection(area);
            frame.render_widget(
                Paragraph::new(format!("{}:", field.label)).style(Style::default().fg(Color::Green)),
                label_area,
            );

            let box_area = Rect::new(area.x + 2 + label_col, y, field.width, 1).intersection(area);
            let is_active = i == self.active;
            let style = if is_active {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            let text = field.display_text();
            if is_active {
                let x = box_area.x + (text.width() as u16).min(box_area.width.saturating_sub(1));
                cursor = Some((x, y));
            }
            frame.render_widget(Paragraph::new(text).style(style), box_area);
        }

        let hint_y = area.y + 3 + self.fields.len() as u16 * 2;
        if hint_y < area.bottom() {
            frame.render_widget(
                Paragraph::new(HINT).style(Style::default().fg(Color::Yellow)),
                Rect::new(area.x + 2, hint_y, area.width.saturating_sub(2), 1).intersection(area),
            );
        }
        if let Some(pos) = cursor {
            frame.set_cursor_position(pos);
        }
    }
}

/// Run `form` modally until it is submitted or cancelled.
pub fn run_form<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    mut form: Form,
) -> Result<FormResult> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            form.render(frame, area)
        })?;
        let Some(event) = events.next_event(None)? else {
            continue;
        };
        // Resize just falls through to the redraw.
        if let Event::Key(key) = event {
            if !is_press(&key) {
                continue;
            }
            match form.handle_key(key) {
                FormOutcome::Pending => {}
                FormOutcome::Submitted => return Ok(FormResult::Submitted(form.values())),
                FormOutcome::Cancelled => return Ok(FormResult::Cancelled),
            }
        }
    }
}
