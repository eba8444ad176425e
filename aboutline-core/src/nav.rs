//! Navigation commands attached to outline items

use log::{debug, warn};
use std::collections::HashMap;

use crate::selection::LineRange;

/// Identifier of the command that jumps to a heading
pub const GOTO_RANGE: &str = "aboutline.gotoRange";

/// A command invocation carried by an outline item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub id: String,
    pub title: String,
    pub argument: LineRange,
}

impl Command {
    /// Command that selects and reveals `range`
    pub fn goto_range(range: LineRange) -> Self {
        Self {
            id: GOTO_RANGE.to_string(),
            title: String::new(),
            argument: range,
        }
    }
}

/// A view onto the active document that can select and scroll
pub trait EditorView {
    fn set_selection(&mut self, range: LineRange);
    fn reveal_range(&mut self, range: &LineRange);
}

/// Hosts that may or may not currently show a document
pub trait ActiveView {
    fn active_view(&mut self) -> Option<&mut dyn EditorView>;
}

/// Select `range` in the view and scroll it into sight. No view, no-op.
pub fn goto_range(view: Option<&mut dyn EditorView>, range: &LineRange) {
    match view {
        Some(view) => {
            view.set_selection(*range);
            view.reveal_range(range);
        }
        None => debug!("goto_range with no active view, ignoring"),
    }
}

type Handler<C> = Box<dyn Fn(&mut C, &LineRange)>;

/// Command id to handler map, invoked with a host context
pub struct CommandRegistry<C> {
    handlers: HashMap<String, Handler<C>>,
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, replacing any previous one under the same id
    pub fn register<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(&mut C, &LineRange) + 'static,
    {
        let id = id.into();
        if self.handlers.insert(id.clone(), Box::new(handler)).is_some() {
            debug!("Replaced handler for command {}", id);
        }
    }

    #[cfg(test)]
    fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Run the handler for `command`. Returns false for unknown ids.
    pub fn execute(&self, ctx: &mut C, command: &Command) -> bool {
        match self.handlers.get(&command.id) {
            Some(handler) => {
                handler(ctx, &command.argument);
                true
            }
            None => {
                warn!("Unknown command: {}", command.id);
                false
            }
        }
    }
}

impl<C: ActiveView + 'static> CommandRegistry<C> {
    /// Registry with [`GOTO_RANGE`] wired to the host's active view
    pub fn with_navigation() -> Self {
        let mut registry = Self::new();
        registry.register(GOTO_RANGE, |ctx: &mut C, range| {
            goto_range(ctx.active_view(), range)
        });
        registry
    }
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Position;

    #[derive(Default)]
    struct RecordingView {
        selection: Option<LineRange>,
        revealed: Vec<LineRange>,
    }

    impl EditorView for RecordingView {
        fn set_selection(&mut self, range: LineRange) {
            self.selection = Some(range);
        }

        fn reveal_range(&mut self, range: &LineRange) {
            self.revealed.push(*range);
        }
    }

    #[derive(Default)]
    struct Host {
        view: Option<RecordingView>,
    }

    impl ActiveView for Host {
        fn active_view(&mut self) -> Option<&mut dyn EditorView> {
            self.view.as_mut().map(|v| v as &mut dyn EditorView)
        }
    }

    #[test]
    fn test_goto_range_selects_and_reveals() {
        let mut view = RecordingView::default();
        let range = LineRange::whole_line(4, 10);
        goto_range(Some(&mut view), &range);
        assert_eq!(view.selection, Some(range));
        assert_eq!(view.revealed, vec![range]);
    }

    #[test]
    fn test_goto_range_without_view_is_noop() {
        goto_range(None, &LineRange::whole_line(0, 0));
    }

    #[test]
    fn test_registry_dispatches_goto_range() {
        let registry = CommandRegistry::<Host>::with_navigation();
        let mut host = Host {
            view: Some(RecordingView::default()),
        };
        let range = LineRange::new(Position::new(2, 0), Position::new(2, 8));

        assert!(registry.execute(&mut host, &Command::goto_range(range)));
        let view = host.view.as_ref().unwrap();
        assert_eq!(view.selection, Some(range));
    }

    #[test]
    fn test_registry_without_active_view() {
        let registry = CommandRegistry::<Host>::with_navigation();
        let mut host = Host::default();
        assert!(registry.execute(&mut host, &Command::goto_range(LineRange::default())));
        assert!(host.view.is_none());
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let registry = CommandRegistry::<Host>::with_navigation();
        let mut host = Host::default();
        let command = Command {
            id: "aboutline.missing".to_string(),
            title: String::new(),
            argument: LineRange::default(),
        };
        assert!(!registry.execute(&mut host, &command));
    }

    #[test]
    fn test_register_replaces_handler() {
        let mut registry = CommandRegistry::<Vec<usize>>::new();
        registry.register("lines", |lines: &mut Vec<usize>, range| lines.push(range.start.line));
        registry.register("lines", |lines: &mut Vec<usize>, range| lines.push(range.end.line * 10));
        assert!(registry.contains("lines"));

        let mut lines = Vec::new();
        let command = Command {
            id: "lines".to_string(),
            title: String::new(),
            argument: LineRange::whole_line(3, 1),
        };
        registry.execute(&mut lines, &command);
        assert_eq!(lines, vec![30]);
    }
}
