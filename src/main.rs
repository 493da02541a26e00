use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::{Context, Result};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs, io, path::PathBuf};
use tracing::info;

use planner::app::App;
use planner::config::Config;
use planner::{ui, KanbanBoard, TaskStore};

/// Task board with highest / medium / lowest priority lanes.
#[derive(Debug, Parser)]
#[command(name = "planner", version)]
struct Cli {
    /// Path to config.json (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planner")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // The terminal belongs to the UI, so logs go to a file.
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("planner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Leaves raw mode before the default hook prints the panic message.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!("Loaded config: {:?}", config);

    // Terminal setup
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(KanbanBoard::new(TaskStore::new()), config);
    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor()?;

    info!("Exiting with {} tasks on the board", app.board.store().total());
    result.context("Terminal error")
}
