mod app;
mod buffer;
mod config;
mod error;
mod filter;
mod highlight;
mod input;
mod layout;
mod logging;
mod render;
mod sources;
mod theme;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use app::AppState;
use buffer::{BufferRegistry, LineBuffer};
use config::{CliOverrides, Config};
use error::LogwallError;
use sources::{file::FileSource, manager::IngestManager};

/// Follow several log files at once in a paged 2x2 grid
#[derive(Parser, Debug)]
#[command(name = "logwall", version, about)]
struct Args {
    /// Log files to follow. Defaults to the usual system logs that exist.
    files: Vec<PathBuf>,

    /// Lines kept in memory per file
    #[arg(long)]
    max_lines: Option<usize>,

    /// Panel refresh interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Where "save bookmarks" writes
    #[arg(long)]
    bookmarks: Option<PathBuf>,

    /// Color theme (default, kawaii, cyber, dracula, monochrome)
    #[arg(long)]
    theme: Option<String>,

    /// Diagnostics log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file (default: <config dir>/logwall/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            max_lines: self.max_lines,
            tick_ms: self.tick_ms,
            bookmark_path: self.bookmarks.clone(),
            theme: self.theme.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref(), &args.overrides())?;

    if let Some(log_path) = config.log_path() {
        if let Err(e) = logging::init(&log_path) {
            eprintln!("Warning: diagnostics log disabled: {}", e);
        }
    }

    let files = if args.files.is_empty() {
        println!("No files specified, using default system logs...");
        config::existing_default_logs()
    } else {
        args.files.clone()
    };

    // Missing files are skipped, not fatal, as long as one source remains
    let mut opened = Vec::new();
    for path in &files {
        match FileSource::open(path, config.max_lines) {
            Ok(source) => opened.push(source),
            Err(e) => {
                warn!(error = %e, "skipping source");
                eprintln!("Warning: {}", e);
            }
        }
    }
    if opened.is_empty() {
        return Err(LogwallError::NoSources.into());
    }

    let mut ingest = IngestManager::new();
    let mut buffers = Vec::with_capacity(opened.len());
    for source in opened {
        let buffer = Arc::new(LineBuffer::new(
            source.path().display().to_string(),
            config.max_lines,
        ));
        ingest.add_source(Arc::clone(&buffer), Box::new(source)).await;
        buffers.push(buffer);
    }
    info!(sources = ingest.source_count(), capacity = config.max_lines, "following");

    let mut state = AppState::new(&config, BufferRegistry::new(buffers));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_event_loop(&mut terminal, &mut state, config.tick).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    ingest.shutdown();
    info!("shutting down");
    result
}

async fn run_event_loop<'a>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState<'a>,
    tick: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        if state.needs_relayout {
            terminal.clear()?;
            state.needs_relayout = false;
        }

        terminal.draw(|frame| {
            ui::draw(frame, state);
        })?;

        let page_size = ui::panel_page_size(terminal.size()?.height);

        tokio::select! {
            _ = ticker.tick() => {
                state.tick();
            }

            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                // Poll for events with no blocking
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        // Only handle key press events (not release)
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            input::handle_key(state, key, page_size);
                        }
                        Event::Resize(_, _) => {
                            state.needs_relayout = true;
                        }
                        _ => {}
                    }
                }
            }
        }

        // Check if we should quit
        if state.should_quit {
            break;
        }
    }

    Ok(())
}
