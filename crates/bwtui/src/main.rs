mod app;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use bwtui_core::{config, logging, ui::Theme};
use bwtui_vault::backend::BwCli;
use bwtui_vault::model::Session;
use bwtui_vault::{VaultSettings, VaultTool};

use app::App;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bitwarden CLI executable (overrides config)
    #[arg(long, value_name = "PATH")]
    bw: Option<PathBuf>,

    /// Existing session key; skips the unlock prompt
    #[arg(long, env = "BW_SESSION", hide_env_values = true)]
    session: Option<String>,

    /// Log level for the log file (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::Config::load(args.config.as_deref())?;

    let data_dir = config::data_dir()?;
    let log_path = logging::init_logging(&data_dir, args.log_level.as_deref())?;
    tracing::info!("Starting bwtui, logging to {}", log_path.display());

    let bw_path = args.bw.unwrap_or_else(|| config.bw_path.clone());
    let backend = Arc::new(BwCli::new(bw_path));
    let settings = VaultSettings {
        theme: Theme::from_config(&config.theme),
        status_lifetime: config.status_lifetime(),
        clipboard_clear_after: config.clipboard_clear_after(),
    };
    let mut vault = VaultTool::new(backend, settings).context("Failed to start vault worker")?;

    if let Some(session) = args.session.and_then(Session::new) {
        vault.resume(session);
    }

    let mut app = App::new(vault);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    report_exit(result, &log_path)
}

/// Log a failed run and pass it on so the process exits non-zero.
fn report_exit(result: Result<()>, log_path: &Path) -> Result<()> {
    if let Err(err) = &result {
        tracing::error!("Exiting on error: {err:?}");
        eprintln!("See {} for details", log_path.display());
    }
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll with timeout so finished backend calls are picked up promptly
        if event::poll(TICK_RATE)? {
            let ev = event::read()?;
            app.handle_event(ev);
        }

        app.tick();
    }
}
