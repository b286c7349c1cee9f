//! LiveSitter - RTSP to HLS viewer with draggable overlays
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! livesitter
//!
//! # CLI mode (for automation)
//! livesitter start rtsp://camera.local/cam1 --play
//! livesitter overlay show alice --json
//! ```

use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use livesitter::api::Backend;
use livesitter::app::{App, AppEvent, Task};
use livesitter::cli::{Cli, Command, ExitCode, Output};
use livesitter::commands::{self, Context};
use livesitter::config::Config;
use livesitter::stream::PlaybackAdapter;
use livesitter::ui;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    };

    if cli.is_cli_mode() {
        init_cli_logging(&config);
        let exit_code = run_cli(cli, config).await;
        std::process::exit(exit_code.into());
    } else {
        init_tui_logging(&config);
        run_tui(config, cli.api_base.as_deref()).await
    }
}

// =============================================================================
// Logging
// =============================================================================

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()))
}

/// CLI mode logs to stderr; stdout carries command output
fn init_cli_logging(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// TUI mode logs to a file so the screen stays intact
fn init_tui_logging(config: &Config) {
    let Some(path) = Config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

// =============================================================================
// CLI Mode
// =============================================================================

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: Config) -> ExitCode {
    let output = Output::new(&cli);
    let ctx = Context::new(config, cli.api_base.as_deref());

    match cli.command {
        Some(Command::Start(cmd)) => commands::start_cmd(cmd, &ctx, &output).await,

        Some(Command::Play(cmd)) => commands::play_cmd(cmd, &ctx, &output).await,

        Some(Command::Overlay(cmd)) => commands::overlay_cmd(cmd, &ctx, &output).await,

        None => {
            // Handled by the is_cli_mode check
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: Config, api_base: Option<&str>) -> Result<()> {
    let backend = Backend::new(config.api_base(api_base));
    let mut adapter = config.playback_adapter(None);
    info!("tui started");

    let mut terminal = init_terminal().context("failed to initialize terminal")?;
    let mut app = App::new();

    let result = run_event_loop(&mut terminal, &mut app, &backend, &mut adapter).await;

    // Always restore terminal and stop playback, even on error
    adapter.detach().await;
    restore_terminal(&mut terminal)?;
    info!("tui stopped");

    result
}

/// Main event loop - handles input, runs tasks, reconciles playback, renders
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    backend: &Backend,
    adapter: &mut PlaybackAdapter,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut bound: Option<String> = None;

    while app.running {
        terminal.draw(|frame| {
            app.resize(frame.area());
            ui::render_ui(frame, app);
        })?;

        if event::poll(TICK_RATE)? {
            let task = match event::read()? {
                // Only handle key press events (ignore releases on Windows)
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                    None
                }
                _ => None,
            };
            if let Some(task) = task {
                spawn_task(task, backend.clone(), tx.clone());
            }
        }

        // Apply completed background work in arrival order
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        reconcile_playback(app, adapter, &mut bound).await;
    }

    Ok(())
}

fn spawn_task(task: Task, backend: Backend, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let event = task.run(&backend).await;
        // Receiver gone means the UI is shutting down
        let _ = tx.send(event);
    });
}

/// Keep the player bound to the current endpoint.
///
/// Runs only when the endpoint changes, so a missing player is reported once.
async fn reconcile_playback(app: &App, adapter: &mut PlaybackAdapter, bound: &mut Option<String>) {
    let endpoint = app.form.endpoint.as_deref();
    if endpoint == bound.as_deref() {
        return;
    }
    *bound = endpoint.map(str::to_string);

    match endpoint {
        Some(endpoint) => {
            if let Err(e) = adapter.attach(endpoint).await {
                warn!(endpoint, error = %e, "playback failed");
            }
        }
        None => adapter.detach().await,
    }
}
