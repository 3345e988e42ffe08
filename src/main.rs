use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::path::PathBuf;
use std::{io, time::Duration};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod app;
mod app_event;
mod codec;
mod config;
mod editor;
mod highlight;
mod models;
mod store;
mod ui;

use app::App;
use config::ConfigManager;

/// Terminal editor for zhost host entries.
#[derive(Debug, Parser)]
#[command(name = "zhost", version, about)]
struct Cli {
    /// Base URL of the zhost server, overrides `server_url` in the config file
    #[arg(long)]
    server: Option<String>,

    /// Directory holding zhost.toml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = match &cli.config_dir {
        Some(dir) => ConfigManager::with_dir(dir)?,
        None => ConfigManager::new()?,
    };
    let mut config = config_manager.load_config()?;
    if let Some(server) = cli.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }

    // Setup logging
    let log_dir = cli
        .log_dir
        .unwrap_or_else(|| PathBuf::from(&config.log_dir));
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    }

    let log_file = log_dir.join(format!(
        "zhost_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file).context("Failed to create log file")?;

    fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(EnvFilter::from_default_env().add_directive("zhost=debug".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    debug!(
        "Starting zhost, config dir {}, log file {}",
        config_manager.config_dir().display(),
        log_file.display()
    );

    let mut app = App::new(config, config_manager.get_config_path().to_path_buf())?;
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Exited with error: {:#}", err);
        eprintln!("Error: {:#}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw::<B>(f, app))?;

        app.process_events();

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Err(e) = app.on_key(key) {
                        app.set_status(app_event::Notice::error(format!("{}", e)));
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
