//! aboutline TUI - terminal host for the outline
//!
//! This crate contains all ratatui/crossterm integration:
//! - App state: open documents, active document, event bus
//! - Event loop and input handling
//! - Rendering (document, outline pane, status bar)
//! - File watching (optional feature)

pub mod app;
pub mod event;
pub mod input;
pub mod terminal;
pub mod theme;
pub mod ui;

#[cfg(feature = "watch")]
pub mod watcher;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use std::time::Duration;

// Re-export main types
pub use app::App;
pub use event::{DocId, WorkspaceEvent};

/// Run the TUI application
pub fn run(mut app: App) -> Result<()> {
    let mut terminal = terminal::init().context("Failed to initialize terminal")?;

    let result = run_loop(&mut terminal, &mut app);

    // Always restore terminal, even if run_loop fails
    terminal::restore().context("Failed to restore terminal")?;

    result
}

fn run_loop(terminal: &mut terminal::Tui, app: &mut App) -> Result<()> {
    loop {
        let viewport_height = terminal.size()?.height.saturating_sub(ui::CHROME_HEIGHT) as usize;
        app.set_viewport_height(viewport_height);

        // Recompute before drawing so the outline is never a frame behind
        app.pump_events();

        terminal
            .draw(|frame| ui::draw(frame, app))
            .context("Failed to draw frame")?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(100)).context("Failed to poll events")? {
            if let Event::Key(key) = crossterm::event::read().context("Failed to read event")? {
                // Only handle key press events, ignore release
                if key.kind == KeyEventKind::Press {
                    if input::handle_input(app, key, viewport_height)? == input::Action::Quit {
                        break;
                    }
                }
            }
        }

        #[cfg(feature = "watch")]
        app.check_watchers();
    }

    Ok(())
}
