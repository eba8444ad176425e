//! Keyboard input handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Mode};

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Handle a key press
pub fn handle_input(app: &mut App, key: KeyEvent, viewport_height: usize) -> Result<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Ok(Action::Quit);
    }

    if let Mode::InsertHeading(ref mut label) = app.mode {
        match key.code {
            KeyCode::Enter => {
                let label = std::mem::take(label);
                app.mode = Mode::Normal;
                app.insert_heading(&label);
            }
            KeyCode::Esc => app.mode = Mode::Normal,
            KeyCode::Backspace => {
                label.pop();
            }
            KeyCode::Char(c) => label.push(c),
            _ => {}
        }
        return Ok(Action::Continue);
    }

    app.clear_status_message();

    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return Ok(Action::Quit);
        }
        KeyCode::Tab => app.toggle_outline_focus(),
        KeyCode::Char('o') => app.toggle_outline(),
        KeyCode::Char(']') => app.next_document(),
        KeyCode::Char('[') => app.prev_document(),
        KeyCode::Char('x') => app.close_document(),
        KeyCode::Char('m') if app.can_insert_heading() => {
            app.mode = Mode::InsertHeading(String::new());
        }
        KeyCode::Char('m') if app.active.is_some() => {
            app.set_error_message("Headings come from a custom pattern, no marker to insert");
        }
        KeyCode::Char('r') => {
            if let Err(e) = app.reload_document() {
                app.set_error_message(format!("Reload failed: {}", e));
            }
        }
        KeyCode::Enter if app.outline_focus => {
            app.activate_selected();
            app.outline_focus = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.outline_focus {
                app.outline_move_down();
            } else {
                app.move_cursor_down(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.outline_focus {
                app.outline_move_up();
            } else {
                app.move_cursor_up(1);
            }
        }
        KeyCode::PageDown => app.move_cursor_down(viewport_height.max(1)),
        KeyCode::PageUp => app.move_cursor_up(viewport_height.max(1)),
        KeyCode::Char('g') | KeyCode::Home => app.move_cursor_up(usize::MAX),
        KeyCode::Char('G') | KeyCode::End => app.move_cursor_down(usize::MAX),
        _ => {}
    }

    Ok(Action::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aboutline_core::{Config, Document};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app_with(text: &str) -> App {
        App::new(Config::default(), vec![Document::from_text("mem.rs", text)]).unwrap()
    }

    #[test]
    fn test_quit_keys() -> Result<()> {
        let mut app = app_with("");
        assert_eq!(handle_input(&mut app, key(KeyCode::Char('q')), 10)?, Action::Quit);
        assert!(app.should_quit);

        let mut app = app_with("");
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handle_input(&mut app, ctrl_c, 10)?, Action::Quit);
        Ok(())
    }

    #[test]
    fn test_insert_heading_disabled_with_custom_pattern() -> Result<()> {
        let mut config = Config::default();
        config.outline.pattern = Some(r"(?m)^=== (.*) ===$".to_string());
        let doc = Document::from_text("mem.txt", "=== Part ===\nbody\n");
        let mut app = App::new(config, vec![doc])?;
        assert!(!app.can_insert_heading());

        handle_input(&mut app, key(KeyCode::Char('m')), 10)?;
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.status_message.is_some());

        app.insert_heading("Ignored");
        app.pump_events();
        assert_eq!(app.active_document().unwrap().line_text(0), "=== Part ===");
        assert_eq!(app.outline_items.len(), 1);
        Ok(())
    }

    #[test]
    fn test_insert_heading_prompt() -> Result<()> {
        let mut app = app_with("code\n");
        handle_input(&mut app, key(KeyCode::Char('m')), 10)?;
        for c in "Newx".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)), 10)?;
        }
        handle_input(&mut app, key(KeyCode::Backspace), 10)?;
        assert_eq!(app.mode, Mode::InsertHeading("New".to_string()));

        handle_input(&mut app, key(KeyCode::Enter), 10)?;
        assert_eq!(app.mode, Mode::Normal);

        app.pump_events();
        assert_eq!(app.outline_items.len(), 1);
        assert_eq!(app.outline_items[0].label, "New");
        Ok(())
    }

    #[test]
    fn test_escape_cancels_prompt() -> Result<()> {
        let mut app = app_with("code\n");
        handle_input(&mut app, key(KeyCode::Char('m')), 10)?;
        handle_input(&mut app, key(KeyCode::Char('z')), 10)?;
        handle_input(&mut app, key(KeyCode::Esc), 10)?;
        assert_eq!(app.mode, Mode::Normal);

        app.pump_events();
        assert!(app.outline_items.is_empty());
        Ok(())
    }

    #[test]
    fn test_outline_focus_and_activate() -> Result<()> {
        let text: String = (0..40).map(|i| format!("line {}\n", i)).collect::<String>() + "// # Deep\n";
        let mut app = app_with(&text);
        app.set_viewport_height(10);

        handle_input(&mut app, key(KeyCode::Tab), 10)?;
        assert!(app.outline_focus);
        handle_input(&mut app, key(KeyCode::Enter), 10)?;
        assert!(!app.outline_focus);

        let view = app.active_view_state().unwrap();
        assert_eq!(view.cursor_line, 40);
        assert_eq!(view.scroll_line, 35);
        Ok(())
    }

    #[test]
    fn test_movement_keys() -> Result<()> {
        let mut app = app_with("a\nb\nc\n");
        handle_input(&mut app, key(KeyCode::Char('j')), 10)?;
        handle_input(&mut app, key(KeyCode::Down), 10)?;
        assert_eq!(app.active_view_state().unwrap().cursor_line, 2);
        handle_input(&mut app, key(KeyCode::Char('k')), 10)?;
        assert_eq!(app.active_view_state().unwrap().cursor_line, 1);
        handle_input(&mut app, key(KeyCode::Char('G')), 10)?;
        assert_eq!(app.active_view_state().unwrap().cursor_line, 3);
        handle_input(&mut app, key(KeyCode::Char('g')), 10)?;
        assert_eq!(app.active_view_state().unwrap().cursor_line, 0);
        Ok(())
    }
}
