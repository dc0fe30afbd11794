//! Presence Panel Entry Point
//!
//! Usage:
//!   panel-tui [OPTIONS]
//!
//! Options:
//!   -o, --origin <URL>      Event source origin (default: http://127.0.0.1:5000)
//!   -c, --config <FILE>     Configuration file
//!   -a, --asset-dir <DIR>   Sprite directory
//!   --log-file <FILE>       Log file
//!
//! Logging goes to a file; use `RUST_LOG=debug` for more detail.

use std::io::{self, IsTerminal};
use std::panic;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use panel_core::{default_config_path, load_config, ConfigOverrides};
use panel_tui::{logging, App, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    if let Some(log_path) = args.log_file.clone().or_else(logging::default_log_path) {
        logging::init(&log_path)?;
    }

    // Configuration errors are reported before the terminal is taken over
    let config_path = args.config.clone().or_else(default_config_path);
    let config = load_config(
        config_path.as_deref(),
        ConfigOverrides::from_env(),
        args.overrides(),
    )
    .context("Failed to load configuration")?;

    info!(
        endpoint = %config.endpoint,
        config_file = ?config.config_file_path,
        "Starting presence panel"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: panel-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::connect(&config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Presence panel stopped");

    // Propagate any errors
    result
}
