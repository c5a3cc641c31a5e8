use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ember::app::Session;
use ember::config::Config;
use ember::input::KeyDispatcher;
use ember::view::{self, Viewport};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ember")]
#[command(about = "A small terminal text editor", long_about = None)]
#[command(version)]
struct Args {
    /// Files to open
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file for editor diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: &Path) -> AnyhowResult<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ember=debug")))
        .init();
    Ok(())
}

/// Editor loop: draw, read one event, feed it to the prompt or the session
fn run(terminal: &mut DefaultTerminal, session: &mut Session) -> AnyhowResult<()> {
    let mut viewport = Viewport::default();
    let mut keys = KeyDispatcher::new();

    while !session.should_quit() {
        terminal.draw(|frame| view::render(frame, session, keys.prompt(), &mut viewport))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                keys.handle_key(key, session);
            }
        }
    }
    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("ember.log"));
    init_tracing(&log_file)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    tracing::info!("Starting ember with {} file argument(s)", args.files.len());

    let mut session = Session::with_local_io(config);
    for path in &args.files {
        // A full registry is already reported on the status line
        if session.open_file(path).is_err() {
            break;
        }
    }
    if session.registry().is_empty() {
        session.new_untitled()?;
    }

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut session);
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!("Editor loop failed: {:#}", e);
    }
    result
}
