use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use vault_core::{ApiKey, KeyStatus, PageRequest, Secret};

/// A row type the list can show.
pub trait Record {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Extra spans shown after the name.
    fn detail(&self) -> Vec<Span<'_>> {
        Vec::new()
    }
}

impl Record for Secret {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Vec<Span<'_>> {
        if self.category.is_empty() {
            return Vec::new();
        }
        vec![Span::styled(
            format!("  ({})", self.category),
            Style::default().fg(Color::DarkGray),
        )]
    }
}

impl Record for ApiKey {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Vec<Span<'_>> {
        let color = match self.status {
            KeyStatus::Active => Color::Green,
            KeyStatus::Revoked => Color::Red,
            KeyStatus::Unknown => Color::DarkGray,
        };
        vec![Span::styled(
            format!("  [{}]", self.status),
            Style::default().fg(color),
        )]
    }
}

/// One page of records with a highlighted row.
#[derive(Debug)]
pub struct RecordList<T> {
    title: &'static str,
    empty_label: &'static str,
    records: Vec<T>,
    page: PageRequest,
    list_state: ListState,
    notice: Option<String>,
}

impl<T: Record> RecordList<T> {
    pub fn new(title: &'static str, empty_label: &'static str, page: PageRequest) -> Self {
        Self {
            title,
            empty_label,
            records: Vec::new(),
            page,
            list_state: ListState::default(),
            notice: None,
        }
    }

    /// Swap in freshly loaded rows, keeping the highlight where it was when
    /// that row still exists.
    pub fn replace(&mut self, records: Vec<T>) {
        self.records = records;
        let selected = match (self.records.len(), self.list_state.selected()) {
            (0, _) => None,
            (len, Some(idx)) => Some(idx.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Move to another page. Rows stay until the caller reloads.
    pub fn set_page(&mut self, page: PageRequest) {
        self.page = page;
        self.list_state.select(None);
    }

    /// A full page suggests there may be more after it.
    pub fn has_next_page(&self) -> bool {
        self.records.len() as u32 >= self.page.limit
    }

    pub fn selected(&self) -> Option<&T> {
        self.records.get(self.list_state.selected()?)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Pinned above the rows until the list is left.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Row text as displayed, numbered across pages. An empty page shows
    /// the placeholder as its only row.
    pub fn rows(&self) -> Vec<String> {
        if self.records.is_empty() {
            return vec![self.empty_label.to_string()];
        }
        let offset = self.page.offset();
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}", offset + i + 1, r.name()))
            .collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.list_state.select(Some(0)),
            KeyCode::Char('G') | KeyCode::End => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, subtitle: &str, hint: &str) {
        let notice_height = if self.notice.is_some() { 2 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(notice_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        if let Some(notice) = &self.notice {
            frame.render_widget(
                Paragraph::new(notice.as_str())
                    .style(Style::default().fg(Color::Yellow).bold())
                    .wrap(Wrap { trim: true }),
                chunks[0],
            );
        }

        let mut title = format!(" {} · page {} ", self.title, self.page.page);
        if !subtitle.is_empty() {
            title.push_str(&format!("· {subtitle} "));
        }
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let items: Vec<ListItem> = if self.records.is_empty() {
            vec![ListItem::new(Line::styled(
                self.empty_label,
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            let offset = self.page.offset();
            self.records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let mut spans = vec![Span::raw(format!("{}. {}", offset + i + 1, record.name()))];
                    spans.extend(record.detail());
                    ListItem::new(Line::from(spans))
                })
                .collect()
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, chunks[1], &mut state);

        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn secret(name: &str) -> Secret {
        Secret {
            id: format!("id-{name}"),
            name: name.into(),
            category: String::new(),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn empty_page_shows_single_placeholder_row() {
        let list: RecordList<Secret> = RecordList::new("Secrets", "(no secrets)", PageRequest::first(20));
        assert_eq!(list.rows(), ["(no secrets)"]);
        assert!(list.selected().is_none());
    }

    #[test]
    fn rows_are_numbered_across_pages() {
        let mut list = RecordList::new("Secrets", "(no secrets)", PageRequest::new(2, 2));
        list.replace(vec![secret("a"), secret("b")]);
        assert_eq!(list.rows(), ["3. a", "4. b"]);
        assert!(list.has_next_page());
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut list = RecordList::new("Secrets", "(no secrets)", PageRequest::first(20));
        list.replace(vec![secret("a"), secret("b"), secret("c")]);
        list.handle_key(key(KeyCode::Up));
        assert_eq!(list.selected().map(|s| s.name.as_str()), Some("a"));
        list.handle_key(key(KeyCode::Char('G')));
        list.handle_key(key(KeyCode::Down));
        assert_eq!(list.selected().map(|s| s.name.as_str()), Some("c"));
        list.handle_key(key(KeyCode::Char('k')));
        assert_eq!(list.selected().map(|s| s.name.as_str()), Some("b"));
        assert!(!list.has_next_page());
    }

    #[test]
    fn replace_clamps_selection() {
        let mut list = RecordList::new("Secrets", "(no secrets)", PageRequest::first(20));
        list.replace(vec![secret("a"), secret("b")]);
        list.handle_key(key(KeyCode::Char('j')));
        list.replace(vec![secret("a")]);
        assert_eq!(list.selected().map(|s| s.name.as_str()), Some("a"));
        list.replace(Vec::new());
        assert!(list.selected().is_none());
    }

    #[test]
    fn render_shows_placeholder_and_notice() {
        let mut list: RecordList<ApiKey> =
            RecordList::new("API Keys", "(no api keys)", PageRequest::first(20));
        list.set_notice("New key ci: sk_123");
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                list.render(f, area, "all", "Esc back")
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("(no api keys)"));
        assert!(text.contains("sk_123"));
        assert!(text.contains("API Keys"));
    }
}
