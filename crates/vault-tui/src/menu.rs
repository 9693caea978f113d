use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use vault_core::Session;

/// Wide banner, used when the terminal has room for it.
const LOGO: [&str; 5] = [
    r"                                       __",
    r"   ________  _______  __________  ____/ /",
    r"  / ___/ _ \/ ___/ / / / ___/ _ \/ __  / ",
    r" (__  )  __/ /__/ /_/ / /  /  __/ /_/ /  ",
    r"/____/\___/\___/\__,_/_/   \___/\__,_/   ",
];
const COMPACT_TITLE: &str = "Secrets Vault";
const TAGLINE: &str = "the best way to store your secrets instead of forgetting them.";

/// Columns the wide banner needs beyond its own width.
const LOGO_MARGIN: u16 = 16;
/// Space between an item's marker and its label.
const MARKER_GAP: usize = 2;
/// Extra padding inside each button on both sides.
const BUTTON_PAD: usize = 3;

/// Everything the menu (or a shortcut key) can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Login,
    Signup,
    PasswordLogin,
    Secrets,
    ApiKeys,
    Help,
    Quit,
}

/// Whether an action can run for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Needs a session first; triggers the disabled warning.
    RequiresLogin,
    /// Only meaningful before login; silently ignored afterwards.
    AlreadyLoggedIn,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Login => "Login",
            MenuAction::Signup => "Signup",
            MenuAction::PasswordLogin => "Password Login",
            MenuAction::Secrets => "Secrets",
            MenuAction::ApiKeys => "API Keys",
            MenuAction::Help => "Help",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn availability(self, session: &Session) -> Availability {
        let authenticated = session.is_authenticated();
        match self {
            MenuAction::Login | MenuAction::Signup | MenuAction::PasswordLogin if authenticated => {
                Availability::AlreadyLoggedIn
            }
            MenuAction::Secrets | MenuAction::ApiKeys if !authenticated => {
                Availability::RequiresLogin
            }
            _ => Availability::Available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
    pub selectable: bool,
}

/// The main menu for a session. Pure; call it again whenever the session
/// may have changed.
pub fn compute_menu(session: &Session) -> Vec<MenuItem> {
    let actions: &[MenuAction] = if session.is_authenticated() {
        &[MenuAction::Secrets, MenuAction::Help, MenuAction::Quit]
    } else {
        &[
            MenuAction::Login,
            MenuAction::Secrets,
            MenuAction::Help,
            MenuAction::Quit,
        ]
    };
    actions
        .iter()
        .map(|&action| MenuItem {
            label: action.label(),
            action,
            selectable: action.availability(session) == Availability::Available,
        })
        .collect()
}

/// Next selectable index after `current`, wrapping. Returns `current` when
/// nothing is selectable and 0 for an empty menu.
pub fn move_next(items: &[MenuItem], current: usize) -> usize {
    step(items, current, true)
}

/// Previous selectable index before `current`, wrapping.
pub fn move_prev(items: &[MenuItem], current: usize) -> usize {
    step(items, current, false)
}

fn step(items: &[MenuItem], current: usize, forward: bool) -> usize {
    let len = items.len();
    if len == 0 {
        return 0;
    }
    let start = current % len;
    for offset in 1..=len {
        let idx = if forward {
            (start + offset) % len
        } else {
            (start + len - offset % len) % len
        };
        if items[idx].selectable {
            return idx;
        }
    }
    current
}

/// Bring a focus index back onto a selectable item after the item set
/// changed underneath it.
pub fn settle(items: &[MenuItem], focus: usize) -> usize {
    if items.is_empty() {
        return 0;
    }
    let focus = if focus >= items.len() { 0 } else { focus };
    if items[focus].selectable {
        focus
    } else {
        move_next(items, focus)
    }
}

pub fn render_menu(
    frame: &mut Frame,
    area: Rect,
    items: &[MenuItem],
    focus: usize,
    session: &Session,
) {
    let logo_width = LOGO.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let title: Vec<Line> = if area.width >= logo_width + LOGO_MARGIN {
        LOGO.iter()
            .map(|l| Line::styled(*l, Style::default().fg(Color::Cyan).bold()))
            .collect()
    } else {
        vec![Line::styled(COMPACT_TITLE, Style::default().fg(Color::Cyan).bold())]
    };

    let label_width = items.iter().map(|i| i.label.chars().count()).max().unwrap_or(0);
    let button_width = label_width + 2 * (MARKER_GAP + BUTTON_PAD) + 2;

    let mut lines = title;
    lines.push(Line::default());
    lines.push(Line::styled(TAGLINE, Style::default().fg(Color::Gray)));
    lines.push(Line::default());
    for (i, item) in items.iter().enumerate() {
        lines.push(item_line(item, i == focus, button_width));
    }
    lines.push(Line::default());
    lines.push(footer_line());
    lines.push(session_line(session));

    let height = (lines.len() as u16).min(area.height);
    let top = area.y + (area.height - height) / 2;
    let card = Rect::new(area.x, top, area.width, height);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), card);
}

fn item_line(item: &MenuItem, focused: bool, width: usize) -> Line<'static> {
    let (left, right) = match (focused, item.selectable) {
        (true, true) => ('▶', '◀'),
        (_, false) => ('!', '!'),
        (false, true) => (' ', ' '),
    };
    let inner = width.saturating_sub(2 + 2 * MARKER_GAP);
    let label: String = item.label.chars().take(inner).collect();
    let pad = inner - label.chars().count();
    let (pad_l, pad_r) = (pad / 2, pad - pad / 2);
    let gap = " ".repeat(MARKER_GAP);
    let text = format!(
        "{left}{gap}{}{label}{}{gap}{right}",
        " ".repeat(pad_l),
        " ".repeat(pad_r)
    );

    let style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else if !item.selectable {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    Line::styled(text, style)
}

fn footer_line() -> Line<'static> {
    let key = Style::default().fg(Color::Yellow).bold();
    let sep = Span::styled(" ・ ", Style::default().fg(Color::DarkGray));
    Line::from(vec![
        Span::styled("[↑↓]", key),
        Span::raw(" move"),
        sep.clone(),
        Span::styled("[↵]", key),
        Span::raw(" select"),
        sep.clone(),
        Span::styled("[h]", key),
        Span::raw(" help"),
        sep,
        Span::styled("[q]", key),
        Span::raw(" quit"),
    ])
}

fn session_line(session: &Session) -> Line<'static> {
    if !session.is_authenticated() {
        return Line::styled(
            "You are not logged in. Press 'L' to login with an API key.",
            Style::default().fg(Color::Red).bold(),
        );
    }
    match session.email() {
        Some(email) => Line::styled(
            format!("Logged in: {email}"),
            Style::default().fg(Color::Green),
        ),
        None => Line::styled("Logged in", Style::default().fg(Color::Green)),
    }
}
