use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod clock;
mod config;
mod db;
mod error;
mod models;
mod services;
mod tui;

use app::App;
use clock::{Clock, SystemClock};
use config::Config;
use db::{CreatorRegistry, DailyStatusTracker, KeyValueStore, SqliteStore};
use error::Result;
use tui::{draw, handle_key_event};

enum Command {
    Run,
    Headless(Headless),
}

/// One-shot commands that work on storage and exit without the TUI.
enum Headless {
    Export(PathBuf),
    Import(PathBuf),
    Reset,
}

fn parse_args(args: &[String]) -> Command {
    let headless = match args.get(1).map(String::as_str) {
        Some("--export") if args.len() >= 3 => Headless::Export(PathBuf::from(&args[2])),
        Some("--import") if args.len() >= 3 => Headless::Import(PathBuf::from(&args[2])),
        Some("--reset") => Headless::Reset,
        _ => return Command::Run,
    };
    Command::Headless(headless)
}

/// Runs without the foreground checks the TUI does on startup, so exporting
/// or importing never triggers the daily reset.
fn run_headless(
    command: Headless,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
) -> Result<String> {
    let registry = CreatorRegistry::new(store.clone());

    match command {
        Headless::Export(path) => {
            std::fs::write(&path, registry.export_all()?)
                .with_context(|| format!("writing {:?}", path))?;
            Ok(format!("Exported creators to {:?}", path))
        }
        Headless::Import(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {:?}", path))?;
            let count = registry.import_all(&json)?;
            Ok(format!("Imported {} creators from {:?}", count, path))
        }
        Headless::Reset => {
            let tracker = DailyStatusTracker::new(store, clock);
            let active = registry.list_active()?;
            tracker.reset_all(&active)?;
            Ok(format!(
                "Cleared today's checklist for {} creators",
                active.len()
            ))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load()?;

    if let Command::Headless(command) = parse_args(&args) {
        let store = Rc::new(SqliteStore::open(&config.db_path)?);
        println!("{}", run_headless(command, store, Rc::new(SystemClock))?);
        return Ok(());
    }

    let mut app = App::new(&config)?;
    if config.refresh_on_start {
        app.refresh_profiles();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Apply finished profile lookups
        app.poll_lookup_results()?;

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                // Back from the browser
                Event::FocusGained => app.on_foreground()?,
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = handle_key_event(key, app.key_context()) {
                        if app.handle_action(action)? {
                            return Ok(());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert!(matches!(parse_args(&args(&["nc"])), Command::Run));
        assert!(matches!(parse_args(&args(&["nc", "--export"])), Command::Run));
        assert!(matches!(
            parse_args(&args(&["nc", "--reset"])),
            Command::Headless(Headless::Reset)
        ));
        assert!(matches!(
            parse_args(&args(&["nc", "--import", "in.json"])),
            Command::Headless(Headless::Import(_))
        ));
    }

    #[test]
    fn test_export_leaves_reset_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creators.json");
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let clock: Rc<dyn Clock> = Rc::new(FixedClock::at(2024, 1, 11, 6, 0, 0));
        let registry = CreatorRegistry::new(store.clone());
        registry.add("alice", "Alice").unwrap();

        run_headless(Headless::Export(path.clone()), store.clone(), clock.clone()).unwrap();

        let tracker = DailyStatusTracker::new(store, clock.clone());
        assert_eq!(tracker.last_reset_at().unwrap(), None);

        let other: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let message = run_headless(Headless::Import(path), other.clone(), clock).unwrap();
        assert!(message.starts_with("Imported 1 creators"));
        assert_eq!(
            CreatorRegistry::new(other).list_all().unwrap(),
            registry.list_all().unwrap()
        );
    }

    #[test]
    fn test_import_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let clock: Rc<dyn Clock> = Rc::new(FixedClock::at(2024, 1, 11, 6, 0, 0));

        let result = run_headless(Headless::Import(dir.path().join("none.json")), store, clock);
        assert!(result.is_err());
    }
}
