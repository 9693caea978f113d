use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;
use vault_service::BlockingHttpService;
use vault_tui::app::App;
use vault_tui::config::Config;
use vault_tui::event::CrosstermEvents;

fn main() -> Result<()> {
    let config = Config::parse();
    if let Some(path) = &config.log_file {
        init_logging(path)?;
    }
    info!("vault starting");
    info!("server: {}", config.server_url);

    let service = BlockingHttpService::with_timeouts(&config.server_url, config.service_timeouts())
        .context("failed to start the async runtime")?;
    service.spawn_health_probe();

    let mut app = App::new(service)
        .with_page_size(config.page_size)
        .with_status_ttl(config.status_ttl());
    if let Some(key) = config.startup_api_key() {
        app.login_with_api_key(key);
    }

    run_tui(app)
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("failed to enter the alternate screen");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("failed to initialise the terminal");
        }
    };

    let result = app.run(&mut terminal, &mut CrosstermEvents);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}
