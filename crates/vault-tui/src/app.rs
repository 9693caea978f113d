use std::mem;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{debug, info, warn};
use vault_core::page::DEFAULT_PAGE_SIZE;
use vault_core::{
    ApiKey, Credential, Credentials, KeyStatus, KeyStatusFilter, PageRequest, Secret, SecretInput,
    Session,
};
use vault_service::{BlockingHttpService, ServiceError};

use crate::components::record_list::{Record, RecordList};
use crate::event::{is_interrupt, is_press, EventSource};
use crate::form::{run_form, Field, Form, FormResult, FormValues};
use crate::menu::{self, compute_menu, Availability, MenuAction, MenuItem};
use crate::status::StatusLine;

const NO_SECRETS: &str = "(no secrets)";
const NO_API_KEYS: &str = "(no api keys)";

const API_KEY: &str = "API Key";
const EMAIL: &str = "Email";
const PASSWORD: &str = "Password";
const MASTER_PASSWORD: &str = "MasterPassword";
const NAME: &str = "Name";
const VALUE: &str = "Value";
const CATEGORY: &str = "Category";
const DESCRIPTION: &str = "Description";

const SECRETS_HINT: &str =
    "[n] new  [u] update  [d] delete  [ ] page  [r] reload  [Esc] back  [q] quit";
const API_KEYS_HINT: &str =
    "[n] create  [x] revoke  [f] filter  [ ] page  [r] reload  [Esc] back  [q] quit";

const HELP: &[&str] = &[
    "Secrets Vault CLI - Help",
    "",
    "Navigation:",
    "  Up/Down or j/k   move between menu items",
    "  Enter            select the focused item",
    "",
    "Shortcuts:",
    "  L   login with an API key",
    "  S   sign up with email and password",
    "  E   login with email and password",
    "  A   manage API keys",
    "  H   show this help",
    "  Q   quit",
    "",
    "Lists:",
    "  [ and ] change page, r reloads, Esc goes back",
    "  Secrets: n new, u update, d delete",
    "  API keys: n create, x revoke, f cycle status filter",
    "",
    "Press any key to return to the main menu",
];

/// The screen currently on display. Forms are not listed here; they run as
/// modal sub-loops on top of whatever view started them.
#[derive(Debug)]
pub enum View {
    Menu,
    Help,
    /// An action was refused because it needs a session.
    DisabledWarning { label: &'static str },
    Secrets {
        list: RecordList<Secret>,
        confirm_delete: bool,
    },
    ApiKeys {
        list: RecordList<ApiKey>,
        filter: KeyStatusFilter,
        confirm_revoke: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    service: BlockingHttpService,
    session: Session,
    view: View,
    /// Main menu focus, kept while other views are open.
    focus: usize,
    status: StatusLine,
    page_size: u32,
}

impl App {
    pub fn new(service: BlockingHttpService) -> Self {
        Self {
            service,
            session: Session::new(),
            view: View::Menu,
            focus: 0,
            status: StatusLine::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_status_ttl(mut self, ttl: Duration) -> Self {
        self.status = StatusLine::new(ttl);
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.message()
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        compute_menu(&self.session)
    }

    fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    /// Drive the UI until the user quits.
    pub fn run<B: Backend, E: EventSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        loop {
            self.prepare();
            terminal.draw(|frame| self.render(frame))?;

            let event = events.next_event(self.status.remaining(Instant::now()))?;
            self.status.expire(Instant::now());
            let Some(event) = event else {
                continue;
            };
            if self.handle_event(event, terminal, events)? == Flow::Quit {
                info!("quit requested");
                return Ok(());
            }
        }
    }

    /// Per-iteration bookkeeping: keep the menu focus valid for the current
    /// session and look up the identity once a credential exists.
    pub fn prepare(&mut self) {
        let items = self.menu();
        self.focus = menu::settle(&items, self.focus);

        if self.session.needs_identity() {
            let email = match self.service.current_identity(&self.session) {
                Ok(email) => Some(email),
                Err(e) => {
                    warn!("could not resolve identity: {e}");
                    None
                }
            };
            self.session.resolve_identity(email);
        }
    }

    pub fn handle_event<B: Backend, E: EventSource>(
        &mut self,
        event: Event,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        match event {
            Event::Key(key) if is_press(&key) => self.handle_key(key, terminal, events),
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                if matches!(self.view, View::Help | View::DisabledWarning { .. }) {
                    self.view = View::Menu;
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Continue),
        }
    }

    fn handle_key<B: Backend, E: EventSource>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        if is_interrupt(&key) {
            return Ok(Flow::Quit);
        }
        match self.view {
            View::Menu => self.handle_menu_key(key, terminal, events),
            View::Help | View::DisabledWarning { .. } => {
                self.view = View::Menu;
                Ok(Flow::Continue)
            }
            View::Secrets { .. } => self.handle_secrets_key(key, terminal, events),
            View::ApiKeys { .. } => self.handle_api_keys_key(key, terminal, events),
        }
    }

    fn handle_menu_key<B: Backend, E: EventSource>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        let items = self.menu();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.focus = menu::move_prev(&items, self.focus),
            KeyCode::Down | KeyCode::Char('j') => self.focus = menu::move_next(&items, self.focus),
            KeyCode::Enter => return self.activate(&items, terminal, events),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(Flow::Quit),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                return self.dispatch(MenuAction::Login, terminal, events)
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                return self.dispatch(MenuAction::Signup, terminal, events)
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                return self.dispatch(MenuAction::PasswordLogin, terminal, events)
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                return self.dispatch(MenuAction::ApiKeys, terminal, events)
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                return self.dispatch(MenuAction::Help, terminal, events)
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn activate<B: Backend, E: EventSource>(
        &mut self,
        items: &[MenuItem],
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        let Some(item) = items.get(self.focus) else {
            return Ok(Flow::Continue);
        };
        if !item.selectable {
            self.show_disabled(item.label);
            return Ok(Flow::Continue);
        }
        self.perform(item.action, terminal, events)
    }

    /// Shortcut entry point: same availability rules as the menu.
    fn dispatch<B: Backend, E: EventSource>(
        &mut self,
        action: MenuAction,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        match action.availability(&self.session) {
            Availability::Available => self.perform(action, terminal, events),
            Availability::RequiresLogin => {
                self.show_disabled(action.label());
                Ok(Flow::Continue)
            }
            Availability::AlreadyLoggedIn => {
                debug!(action = action.label(), "ignored while logged in");
                Ok(Flow::Continue)
            }
        }
    }

    fn show_disabled(&mut self, label: &'static str) {
        debug!(label, "disabled item activated");
        self.view = View::DisabledWarning { label };
    }

    fn perform<B: Backend, E: EventSource>(
        &mut self,
        action: MenuAction,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        debug!(action = action.label(), "menu action");
        match action {
            MenuAction::Login => self.api_key_login(terminal, events)?,
            MenuAction::Signup => self.signup(terminal, events)?,
            MenuAction::PasswordLogin => self.password_login(terminal, events)?,
            MenuAction::Secrets => {
                self.open_secrets();
            }
            MenuAction::ApiKeys => self.open_api_keys(),
            MenuAction::Help => self.view = View::Help,
            MenuAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    // -- Authentication --

    fn api_key_login<B: Backend, E: EventSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let form = Form::new("Login with API Key", vec![Field::new(API_KEY, 68)]);
        let result = run_form(terminal, events, form)?;
        self.view = View::Menu;
        let FormResult::Submitted(values) = result else {
            return Ok(());
        };
        let key = field(&values, API_KEY);
        let key = key.trim();
        if key.is_empty() {
            self.status.show("API key required");
            return Ok(());
        }
        self.login_with_api_key(key);
        Ok(())
    }

    /// Validate `key` and adopt it as the session credential on success.
    /// A rejected key leaves the session untouched.
    pub fn login_with_api_key(&mut self, key: &str) {
        match self.service.validate_key(&mut self.session, key) {
            Ok(email) => {
                info!("logged in with api key");
                self.status.show(format!("Login successful: {email}"));
            }
            Err(e) => {
                warn!("api key login failed: {e}");
                self.status.show(format!("Login failed: {e}"));
            }
        }
        self.view = View::Menu;
    }

    fn signup<B: Backend, E: EventSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let Some(credentials) = self.ask_credentials("Signup", terminal, events)? else {
            return Ok(());
        };
        match self.service.signup(&credentials) {
            Ok(token) => {
                info!("signed up");
                self.session.establish(Credential::Token(token.token), None);
                if self.open_secrets() {
                    self.status.show("Signup successful");
                }
            }
            Err(e) => {
                warn!("signup failed: {e}");
                self.status.show(format!("Signup failed: {e}"));
            }
        }
        Ok(())
    }

    fn password_login<B: Backend, E: EventSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let Some(credentials) = self.ask_credentials("Login", terminal, events)? else {
            return Ok(());
        };
        match self.service.login(&credentials) {
            Ok(token) => {
                info!("logged in with password");
                self.session.establish(Credential::Token(token.token), None);
                if self.open_secrets() {
                    self.status.show("Login successful");
                }
            }
            Err(e) => {
                warn!("password login failed: {e}");
                self.status.show(format!("Login failed: {e}"));
            }
        }
        Ok(())
    }

    fn ask_credentials<B: Backend, E: EventSource>(
        &mut self,
        title: &str,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Option<Credentials>> {
        let form = Form::new(
            title,
            vec![
                Field::new(EMAIL, 40),
                Field::new(PASSWORD, 40).masked(),
                Field::new(MASTER_PASSWORD, 40).masked(),
            ],
        );
        let result = run_form(terminal, events, form)?;
        self.view = View::Menu;
        Ok(match result {
            FormResult::Submitted(values) => Some(Credentials {
                email: field(&values, EMAIL).trim().to_string(),
                password: field(&values, PASSWORD),
                master_password: field(&values, MASTER_PASSWORD),
            }),
            FormResult::Cancelled => None,
        })
    }

    // -- Secrets --

    /// Open the first page of secrets. Returns whether it loaded.
    fn open_secrets(&mut self) -> bool {
        let mut list = RecordList::new("Secrets", NO_SECRETS, self.first_page());
        let loaded = self.load_secrets(&mut list);
        self.view = View::Secrets {
            list,
            confirm_delete: false,
        };
        loaded
    }

    /// Refill `list` and report the outcome on the status line.
    fn load_secrets(&mut self, list: &mut RecordList<Secret>) -> bool {
        match self.refresh_secrets(list) {
            Ok(()) => {
                self.status.show("Loaded secrets");
                true
            }
            Err(e) => {
                self.status.show(format!("Failed to load secrets: {e}"));
                false
            }
        }
    }

    /// On failure the list is left empty so it shows its placeholder.
    fn refresh_secrets(&self, list: &mut RecordList<Secret>) -> Result<(), ServiceError> {
        match self.service.list_secrets(&self.session, list.page()) {
            Ok(secrets) => {
                debug!(count = secrets.len(), page = list.page().page, "loaded secrets");
                list.replace(secrets);
                Ok(())
            }
            Err(e) => {
                warn!("failed to load secrets: {e}");
                list.replace(Vec::new());
                Err(e)
            }
        }
    }

    fn handle_secrets_key<B: Backend, E: EventSource>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        let View::Secrets {
            mut list,
            confirm_delete,
        } = mem::replace(&mut self.view, View::Menu)
        else {
            return Ok(Flow::Continue);
        };

        if confirm_delete {
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                if let Some(secret) = list.selected().cloned() {
                    self.delete_secret(&mut list, &secret);
                }
            }
            self.view = View::Secrets {
                list,
                confirm_delete: false,
            };
            return Ok(Flow::Continue);
        }

        let mut flow = Flow::Continue;
        let mut confirm_delete = false;
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => return Ok(Flow::Continue),
            KeyCode::Char('q') => flow = Flow::Quit,
            KeyCode::Char(']') => {
                if list.has_next_page() {
                    list.set_page(list.page().next());
                    self.load_secrets(&mut list);
                } else {
                    self.status.show("No more secrets");
                }
            }
            KeyCode::Char('[') => {
                if list.page().page > 1 {
                    list.set_page(list.page().prev());
                    self.load_secrets(&mut list);
                }
            }
            KeyCode::Char('r') => {
                self.load_secrets(&mut list);
            }
            KeyCode::Char('n') => self.create_secret(&mut list, terminal, events)?,
            KeyCode::Char('u') => {
                if let Some(secret) = list.selected().cloned() {
                    self.update_secret(&mut list, &secret, terminal, events)?;
                }
            }
            KeyCode::Char('d') => confirm_delete = list.selected().is_some(),
            _ => list.handle_key(key),
        }
        self.view = View::Secrets {
            list,
            confirm_delete,
        };
        Ok(flow)
    }

    fn create_secret<B: Backend, E: EventSource>(
        &mut self,
        list: &mut RecordList<Secret>,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let form = Form::new("New Secret", secret_fields(None));
        let FormResult::Submitted(values) = run_form(terminal, events, form)? else {
            return Ok(());
        };
        let (input, master_password) = secret_input(&values);
        if input.name.trim().is_empty() {
            self.status.show("Name required");
            return Ok(());
        }
        match self
            .service
            .create_secret(&self.session, &input, &master_password)
        {
            Ok(()) => {
                info!(name = %input.name, "secret created");
                self.status.show(format!("Created secret {}", input.name));
                self.reload_after_change(list);
            }
            Err(e) => {
                warn!("create secret failed: {e}");
                self.status.show(format!("Create failed: {e}"));
            }
        }
        Ok(())
    }

    fn update_secret<B: Backend, E: EventSource>(
        &mut self,
        list: &mut RecordList<Secret>,
        secret: &Secret,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let form = Form::new(
            format!("Update Secret {}", secret.name),
            secret_fields(Some(secret)),
        );
        let FormResult::Submitted(values) = run_form(terminal, events, form)? else {
            return Ok(());
        };
        let (input, master_password) = secret_input(&values);
        match self
            .service
            .update_secret(&self.session, secret.id(), &input, &master_password)
        {
            Ok(()) => {
                info!(id = secret.id(), "secret updated");
                self.status.show(format!("Updated secret {}", input.name));
                self.reload_after_change(list);
            }
            Err(e) => {
                warn!("update secret failed: {e}");
                self.status.show(format!("Update failed: {e}"));
            }
        }
        Ok(())
    }

    fn delete_secret(&mut self, list: &mut RecordList<Secret>, secret: &Secret) {
        match self.service.delete_secret(&self.session, secret.id()) {
            Ok(()) => {
                info!(id = secret.id(), "secret deleted");
                self.status.show(format!("Deleted secret {}", secret.name));
                self.reload_after_change(list);
            }
            Err(e) => {
                warn!("delete secret failed: {e}");
                self.status.show(format!("Delete failed: {e}"));
            }
        }
    }

    /// Reload after a mutation, keeping the mutation's own status message
    /// unless the reload fails.
    fn reload_after_change(&mut self, list: &mut RecordList<Secret>) {
        if let Err(e) = self.refresh_secrets(list) {
            self.status.show(format!("Failed to load secrets: {e}"));
        }
    }

    // -- API keys --

    fn open_api_keys(&mut self) {
        let filter = KeyStatusFilter::All;
        let mut list = RecordList::new("API Keys", NO_API_KEYS, self.first_page());
        self.load_api_keys(&mut list, filter);
        self.view = View::ApiKeys {
            list,
            filter,
            confirm_revoke: false,
        };
    }

    fn load_api_keys(&mut self, list: &mut RecordList<ApiKey>, filter: KeyStatusFilter) -> bool {
        match self.refresh_api_keys(list, filter) {
            Ok(()) => {
                self.status.show("Loaded api keys");
                true
            }
            Err(e) => {
                self.status.show(format!("Failed to load api keys: {e}"));
                false
            }
        }
    }

    fn refresh_api_keys(
        &self,
        list: &mut RecordList<ApiKey>,
        filter: KeyStatusFilter,
    ) -> Result<(), ServiceError> {
        match self
            .service
            .list_api_keys(&self.session, list.page(), filter)
        {
            Ok(keys) => {
                debug!(count = keys.len(), filter = filter.display_name(), "loaded api keys");
                list.replace(keys);
                Ok(())
            }
            Err(e) => {
                warn!("failed to load api keys: {e}");
                list.replace(Vec::new());
                Err(e)
            }
        }
    }

    fn handle_api_keys_key<B: Backend, E: EventSource>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<Flow> {
        let View::ApiKeys {
            mut list,
            mut filter,
            confirm_revoke,
        } = mem::replace(&mut self.view, View::Menu)
        else {
            return Ok(Flow::Continue);
        };

        if confirm_revoke {
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                if let Some(api_key) = list.selected().cloned() {
                    self.revoke_api_key(&mut list, filter, &api_key);
                }
            }
            self.view = View::ApiKeys {
                list,
                filter,
                confirm_revoke: false,
            };
            return Ok(Flow::Continue);
        }

        let mut flow = Flow::Continue;
        let mut confirm_revoke = false;
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => return Ok(Flow::Continue),
            KeyCode::Char('q') => flow = Flow::Quit,
            KeyCode::Char(']') => {
                if list.has_next_page() {
                    list.set_page(list.page().next());
                    self.load_api_keys(&mut list, filter);
                } else {
                    self.status.show("No more api keys");
                }
            }
            KeyCode::Char('[') => {
                if list.page().page > 1 {
                    list.set_page(list.page().prev());
                    self.load_api_keys(&mut list, filter);
                }
            }
            KeyCode::Char('r') => {
                self.load_api_keys(&mut list, filter);
            }
            KeyCode::Char('f') => {
                filter = filter.cycle();
                list.set_page(self.first_page());
                self.load_api_keys(&mut list, filter);
            }
            KeyCode::Char('n') => self.create_api_key(&mut list, filter, terminal, events)?,
            KeyCode::Char('x') => match list.selected() {
                Some(api_key) if api_key.status == KeyStatus::Revoked => {
                    self.status.show(format!("{} is already revoked", api_key.name));
                }
                Some(_) => confirm_revoke = true,
                None => {}
            },
            _ => list.handle_key(key),
        }
        self.view = View::ApiKeys {
            list,
            filter,
            confirm_revoke,
        };
        Ok(flow)
    }

    fn create_api_key<B: Backend, E: EventSource>(
        &mut self,
        list: &mut RecordList<ApiKey>,
        filter: KeyStatusFilter,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        let form = Form::new("New API Key", vec![Field::new(NAME, 40)]);
        let FormResult::Submitted(values) = run_form(terminal, events, form)? else {
            return Ok(());
        };
        let name = field(&values, NAME).trim().to_string();
        if name.is_empty() {
            self.status.show("Name required");
            return Ok(());
        }
        match self.service.create_api_key(&self.session, &name) {
            Ok(created) => {
                info!(name = %name, "api key created");
                match created.key {
                    Some(key) => list.set_notice(format!(
                        "New key {name}: {key}  (copy it now, it will not be shown again)"
                    )),
                    None => list.set_notice(format!("Created API key {name}")),
                }
                self.status.show(format!("Created API key {name}"));
                if let Err(e) = self.refresh_api_keys(list, filter) {
                    self.status.show(format!("Failed to load api keys: {e}"));
                }
            }
            Err(e) => {
                warn!("create api key failed: {e}");
                self.status.show(format!("Create failed: {e}"));
            }
        }
        Ok(())
    }

    fn revoke_api_key(
        &mut self,
        list: &mut RecordList<ApiKey>,
        filter: KeyStatusFilter,
        api_key: &ApiKey,
    ) {
        match self.service.revoke_api_key(&self.session, api_key.id()) {
            Ok(()) => {
                info!(id = api_key.id(), "api key revoked");
                self.status.show(format!("Revoked API key {}", api_key.name));
                if let Err(e) = self.refresh_api_keys(list, filter) {
                    self.status.show(format!("Failed to load api keys: {e}"));
                }
            }
            Err(e) => {
                warn!("revoke api key failed: {e}");
                self.status.show(format!("Revoke failed: {e}"));
            }
        }
    }

    // -- Rendering --

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());
        let main = chunks[0];

        match &self.view {
            View::Menu => self.render_menu(frame, main),
            View::Help => render_help(frame, main),
            View::DisabledWarning { label } => {
                self.render_menu(frame, main);
                render_disabled_warning(frame, main, label);
            }
            View::Secrets {
                list,
                confirm_delete,
            } => {
                let hint = match (confirm_delete, list.selected()) {
                    (true, Some(secret)) => format!(
                        "Delete '{}'? [y] confirm, any other key cancels",
                        secret.name
                    ),
                    _ => SECRETS_HINT.to_string(),
                };
                list.render(frame, main, "", &hint);
            }
            View::ApiKeys {
                list,
                filter,
                confirm_revoke,
            } => {
                let hint = match (confirm_revoke, list.selected()) {
                    (true, Some(api_key)) => format!(
                        "Revoke '{}'? [y] confirm, any other key cancels",
                        api_key.name
                    ),
                    _ => API_KEYS_HINT.to_string(),
                };
                let subtitle = format!("filter: {}", filter.display_name());
                list.render(frame, main, &subtitle, &hint);
            }
        }

        self.status.render(frame, chunks[1]);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        menu::render_menu(frame, area, &self.menu(), self.focus, &self.session);
    }
}

fn field(values: &FormValues, label: &str) -> String {
    values.get(label).cloned().unwrap_or_default()
}

fn secret_fields(existing: Option<&Secret>) -> Vec<Field> {
    let (name, category, description) = match existing {
        Some(s) => (s.name.as_str(), s.category.as_str(), s.description.as_str()),
        None => ("", "", ""),
    };
    vec![
        Field::new(NAME, 40).with_value(name),
        Field::new(VALUE, 40).masked(),
        Field::new(CATEGORY, 40).with_value(category),
        Field::new(DESCRIPTION, 60).with_value(description),
        Field::new(MASTER_PASSWORD, 40).masked(),
    ]
}

fn secret_input(values: &FormValues) -> (SecretInput, String) {
    let input = SecretInput {
        name: field(values, NAME).trim().to_string(),
        value: field(values, VALUE),
        category: field(values, CATEGORY).trim().to_string(),
        description: field(values, DESCRIPTION).trim().to_string(),
    };
    (input, field(values, MASTER_PASSWORD))
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = HELP.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let height = HELP.len() as u16 + 2;
    let popup = centered_box(width, height, area);

    let lines: Vec<Line> = HELP
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                Line::styled(*l, Style::default().fg(Color::Cyan).bold())
            } else {
                Line::raw(*l)
            }
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_disabled_warning(frame: &mut Frame, area: Rect, label: &str) {
    if area.height < 3 {
        return;
    }
    let row = Rect::new(area.x, area.bottom() - 2, area.width, 1);
    let text = format!("Hold on — {label} requires login with an API key.");
    frame.render_widget(Clear, row);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red).bold()),
        row,
    );
}

/// A `width` x `height` box centred in `area`, shrunk to fit.
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
