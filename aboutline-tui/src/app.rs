//! Application state
//!
//! `App` plays the host for the outline store: it owns the open documents,
//! decides which one is active, and posts [`WorkspaceEvent`]s on a bus.
//! `pump_events` drains the bus and recomputes the outline, and the store's
//! notification marks the rendered outline items stale.

use aboutline_core::{
    ActiveView, CommandRegistry, Config, Document, EditorView, LineRange, OutlineItem,
    OutlineStore, Subscription, TextDocument,
};
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::cell::Cell;
use std::rc::Rc;

use crate::event::{DocId, WorkspaceEvent};
use crate::theme::Theme;

#[cfg(feature = "watch")]
use crate::watcher::WorkspaceWatcher;

/// Per-document view state
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub cursor_line: usize,
    pub scroll_line: usize,
    pub selection: Option<LineRange>,
    pub viewport_height: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            viewport_height: 1,
            ..Default::default()
        }
    }

    /// Scroll just enough to keep the cursor visible
    fn follow_cursor(&mut self) {
        let height = self.viewport_height.max(1);
        if self.cursor_line < self.scroll_line {
            self.scroll_line = self.cursor_line;
        } else if self.cursor_line >= self.scroll_line + height {
            self.scroll_line = self.cursor_line + 1 - height;
        }
    }
}

impl EditorView for ViewState {
    fn set_selection(&mut self, range: LineRange) {
        self.cursor_line = range.start.line;
        self.selection = Some(range);
    }

    fn reveal_range(&mut self, range: &LineRange) {
        let height = self.viewport_height.max(1);
        let (first, last) = range.lines();
        let visible = first >= self.scroll_line && last < self.scroll_line + height;
        if !visible {
            // Center the range when it is off-screen
            self.scroll_line = first.saturating_sub(height / 2);
        }
    }
}

/// An open document and its view
pub struct OpenDocument {
    pub id: DocId,
    pub doc: Document,
    pub view: ViewState,
}

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing the label of a new heading
    InsertHeading(String),
}

/// Main application state
pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub docs: Vec<OpenDocument>,
    pub active: Option<DocId>,
    pub store: OutlineStore,
    pub outline_items: Vec<OutlineItem>,
    pub outline_selected: usize,
    pub outline_focus: bool,
    pub show_outline: bool,
    pub mode: Mode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    commands: Rc<CommandRegistry<App>>,
    outline_stale: Rc<Cell<bool>>,
    _outline_subscription: Subscription,
    events_tx: Sender<WorkspaceEvent>,
    events_rx: Receiver<WorkspaceEvent>,
    next_doc_id: u64,
    #[cfg(feature = "watch")]
    pub watcher: Option<WorkspaceWatcher>,
}

impl App {
    /// Create the app with `docs` open and the first one active
    pub fn new(config: Config, docs: Vec<Document>) -> Result<Self> {
        let pattern = config
            .outline
            .heading_pattern()
            .context("Failed to build heading pattern")?;
        let store = OutlineStore::new(pattern);

        let outline_stale = Rc::new(Cell::new(true));
        let stale = Rc::clone(&outline_stale);
        let subscription = store.subscribe(move || stale.set(true));

        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        #[cfg(feature = "watch")]
        let watcher = if config.watch.enabled {
            match WorkspaceWatcher::new() {
                Ok(w) => Some(w),
                Err(e) => {
                    log::warn!("File watching disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut app = Self {
            theme: Theme::for_variant(config.theme),
            show_outline: config.outline.visible,
            config,
            docs: Vec::new(),
            active: None,
            store,
            outline_items: Vec::new(),
            outline_selected: 0,
            outline_focus: false,
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            commands: Rc::new(CommandRegistry::with_navigation()),
            outline_stale,
            _outline_subscription: subscription,
            events_tx,
            events_rx,
            next_doc_id: 0,
            #[cfg(feature = "watch")]
            watcher,
        };

        for doc in docs {
            app.add_document(doc);
        }
        app.active = app.docs.first().map(|d| d.id);

        // Scan whatever is already active before any event arrives
        app.store
            .attach(app.active_document().map(|d| d as &dyn TextDocument));
        app.refresh_outline();

        Ok(app)
    }

    fn add_document(&mut self, doc: Document) -> DocId {
        let id = DocId(self.next_doc_id);
        self.next_doc_id += 1;

        #[cfg(feature = "watch")]
        if let Some(watcher) = self.watcher.as_mut() {
            if doc.path.is_file() {
                if let Err(e) = watcher.watch(id, &doc.path) {
                    log::warn!("Not watching {}: {:#}", doc.path.display(), e);
                }
            }
        }

        // New views inherit the current viewport until the next frame
        let mut view = ViewState::new();
        if let Some(first) = self.docs.first() {
            view.viewport_height = first.view.viewport_height;
        }

        self.docs.push(OpenDocument { id, doc, view });
        id
    }

    fn index_of(&self, id: DocId) -> Option<usize> {
        self.docs.iter().position(|d| d.id == id)
    }

    fn find(&self, id: DocId) -> Option<&OpenDocument> {
        self.docs.iter().find(|d| d.id == id)
    }

    fn active_entry(&self) -> Option<&OpenDocument> {
        self.active.and_then(|id| self.find(id))
    }

    fn active_entry_mut(&mut self) -> Option<&mut OpenDocument> {
        let id = self.active?;
        self.docs.iter_mut().find(|d| d.id == id)
    }

    /// The active document, if any
    pub fn active_document(&self) -> Option<&Document> {
        self.active_entry().map(|d| &d.doc)
    }

    /// View state of the active document
    pub fn active_view_state(&self) -> Option<&ViewState> {
        self.active_entry().map(|d| &d.view)
    }

    /// Position of the active document among open ones (0-based)
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.index_of(id))
    }

    fn post(&self, event: WorkspaceEvent) {
        // Both ends live in self, so the channel cannot be disconnected
        let _ = self.events_tx.send(event);
    }

    fn set_active(&mut self, id: Option<DocId>) {
        if self.active != id {
            self.active = id;
            self.outline_selected = 0;
            if let Some(doc) = self.active_document() {
                log::info!("Active document: {}", doc.path.display());
            } else {
                log::info!("No active document");
            }
        }
        self.post(WorkspaceEvent::ActiveDocumentChanged(id));
    }

    /// Open another document and make it active
    pub fn open_document(&mut self, doc: Document) -> DocId {
        let id = self.add_document(doc);
        self.set_active(Some(id));
        id
    }

    /// Activate the next open document, wrapping around
    pub fn next_document(&mut self) {
        self.cycle_document(1);
    }

    /// Activate the previous open document, wrapping around
    pub fn prev_document(&mut self) {
        self.cycle_document(self.docs.len().saturating_sub(1));
    }

    fn cycle_document(&mut self, step: usize) {
        if self.docs.is_empty() {
            return;
        }
        let current = self.active_index().unwrap_or(0);
        let next = (current + step) % self.docs.len();
        self.set_active(Some(self.docs[next].id));
    }

    /// Close the active document; its neighbour (or nothing) becomes active
    pub fn close_document(&mut self) {
        let Some(index) = self.active_index() else {
            return;
        };
        let closed = self.docs.remove(index);

        #[cfg(feature = "watch")]
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.unwatch(closed.id);
        }
        log::info!("Closed {}", closed.doc.path.display());

        let next = if self.docs.is_empty() {
            None
        } else {
            Some(self.docs[index.min(self.docs.len() - 1)].id)
        };
        self.set_active(next);
    }

    /// Headings can only be typed in when they are found by the literal marker
    pub fn can_insert_heading(&self) -> bool {
        self.active.is_some() && self.config.outline.pattern.is_none()
    }

    /// Insert a heading line above the cursor of the active document
    pub fn insert_heading(&mut self, label: &str) {
        if self.config.outline.pattern.is_some() {
            self.set_error_message("Headings come from a custom pattern, no marker to insert");
            return;
        }
        let marker = self.config.outline.marker.clone();
        let Some(entry) = self.active_entry_mut() else {
            return;
        };
        let line = entry.view.cursor_line;
        entry.doc.insert_line(line, &format!("{}{}", marker, label));
        let id = entry.id;
        self.post(WorkspaceEvent::DocumentChanged(id));
    }

    /// Reload the active document from disk
    pub fn reload_document(&mut self) -> Result<()> {
        let Some(id) = self.active else {
            return Ok(());
        };
        self.reload(id)
    }

    fn reload(&mut self, id: DocId) -> Result<()> {
        let Some(entry) = self.docs.iter_mut().find(|d| d.id == id) else {
            return Ok(());
        };
        entry.doc.reload()?;
        let last_line = entry.doc.line_count().saturating_sub(1);
        entry.view.cursor_line = entry.view.cursor_line.min(last_line);
        entry.view.selection = None;
        log::info!("Reloaded {}", entry.doc.path.display());
        self.post(WorkspaceEvent::DocumentChanged(id));
        Ok(())
    }

    /// Drain pending workspace events into outline recomputes
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                WorkspaceEvent::DocumentChanged(id) => {
                    // Only the tracked document feeds the outline
                    if self.active == Some(id) {
                        let doc = self.find(id).map(|d| &d.doc as &dyn TextDocument);
                        self.store.recompute(doc);
                    }
                }
                WorkspaceEvent::ActiveDocumentChanged(id) => {
                    let doc = id
                        .and_then(|id| self.find(id))
                        .map(|d| &d.doc as &dyn TextDocument);
                    self.store.recompute(doc);
                }
            }
        }

        if self.outline_stale.get() {
            self.refresh_outline();
        }
    }

    /// Re-read the store after a notification
    fn refresh_outline(&mut self) {
        self.outline_items = self.store.children().iter().map(|h| h.to_item()).collect();
        self.outline_selected = self
            .outline_selected
            .min(self.outline_items.len().saturating_sub(1));
        self.outline_stale.set(false);
    }

    /// Reload or mark dirty any document changed on disk
    #[cfg(feature = "watch")]
    pub fn check_watchers(&mut self) {
        let debounce = self.config.watch.debounce_ms;
        let changed = match self.watcher.as_mut() {
            Some(watcher) => watcher.poll_changed(debounce),
            None => return,
        };

        for id in changed {
            if self.config.watch.auto_reload {
                if let Err(e) = self.reload(id) {
                    log::warn!("Failed to reload document {}: {:#}", id, e);
                    self.set_error_message(format!("Reload failed: {}", e));
                }
            } else if let Some(entry) = self.docs.iter_mut().find(|d| d.id == id) {
                entry.doc.dirty_on_disk = true;
            }
        }
    }

    /// Dispatch the command of the selected outline item
    pub fn activate_selected(&mut self) {
        let Some(item) = self.outline_items.get(self.outline_selected).cloned() else {
            return;
        };
        let commands = Rc::clone(&self.commands);
        commands.execute(self, &item.command);
    }

    /// Index of the heading containing the cursor
    pub fn current_heading_index(&self) -> Option<usize> {
        let cursor = self.active_view_state()?.cursor_line;
        self.outline_items
            .iter()
            .rposition(|item| item.command.argument.start.line <= cursor)
    }

    pub fn move_cursor_down(&mut self, n: usize) {
        if let Some(entry) = self.active_entry_mut() {
            let last_line = entry.doc.line_count().saturating_sub(1);
            entry.view.cursor_line = entry.view.cursor_line.saturating_add(n).min(last_line);
            entry.view.selection = None;
            entry.view.follow_cursor();
        }
    }

    pub fn move_cursor_up(&mut self, n: usize) {
        if let Some(entry) = self.active_entry_mut() {
            entry.view.cursor_line = entry.view.cursor_line.saturating_sub(n);
            entry.view.selection = None;
            entry.view.follow_cursor();
        }
    }

    pub fn outline_move_down(&mut self) {
        if self.outline_selected + 1 < self.outline_items.len() {
            self.outline_selected += 1;
        }
    }

    pub fn outline_move_up(&mut self) {
        self.outline_selected = self.outline_selected.saturating_sub(1);
    }

    pub fn toggle_outline(&mut self) {
        self.show_outline = !self.show_outline;
        if !self.show_outline {
            self.outline_focus = false;
        }
    }

    pub fn toggle_outline_focus(&mut self) {
        if self.show_outline {
            self.outline_focus = !self.outline_focus;
            if self.outline_focus {
                self.outline_selected = self.current_heading_index().unwrap_or(0);
            }
        }
    }

    /// Update the document viewport height (rows available for text)
    pub fn set_viewport_height(&mut self, height: usize) {
        for entry in &mut self.docs {
            entry.view.viewport_height = height.max(1);
        }
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl ActiveView for App {
    fn active_view(&mut self) -> Option<&mut dyn EditorView> {
        self.active_entry_mut()
            .map(|entry| &mut entry.view as &mut dyn EditorView)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aboutline_core::Position;

    fn test_app(texts: &[&str]) -> App {
        let docs = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document::from_text(format!("doc{}.rs", i), text))
            .collect();
        App::new(Config::default(), docs).unwrap()
    }

    #[test]
    fn test_view_state_reveal_centers_offscreen_range() {
        let mut view = ViewState::new();
        view.viewport_height = 10;
        view.reveal_range(&LineRange::whole_line(50, 3));
        assert_eq!(view.scroll_line, 45);

        // Already visible, no scroll
        view.reveal_range(&LineRange::whole_line(47, 3));
        assert_eq!(view.scroll_line, 45);
    }

    #[test]
    fn test_view_state_set_selection_moves_cursor() {
        let mut view = ViewState::new();
        let range = LineRange::new(Position::new(8, 0), Position::new(8, 4));
        view.set_selection(range);
        assert_eq!(view.cursor_line, 8);
        assert_eq!(view.selection, Some(range));
    }

    #[test]
    fn test_follow_cursor() {
        let mut view = ViewState::new();
        view.viewport_height = 5;
        view.cursor_line = 7;
        view.follow_cursor();
        assert_eq!(view.scroll_line, 3);
        view.cursor_line = 1;
        view.follow_cursor();
        assert_eq!(view.scroll_line, 1);
    }

    #[test]
    fn test_initial_outline_from_active_document() {
        let app = test_app(&["// # Intro\nsome code\n// # Usage\n", "// # Other\n"]);
        let labels: Vec<&str> = app.outline_items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Intro", "Usage"]);
        assert_eq!(app.store.generation(), 1);
    }

    #[test]
    fn test_no_documents_means_empty_outline() {
        let app = test_app(&[]);
        assert!(app.outline_items.is_empty());
        assert!(app.active.is_none());
        assert_eq!(app.store.generation(), 0);
    }

    #[test]
    fn test_bad_marker_is_error() {
        let mut config = Config::default();
        config.outline.marker = String::new();
        assert!(App::new(config, Vec::new()).is_err());
    }

    #[test]
    fn test_edit_of_background_document_is_ignored() {
        let mut app = test_app(&["// # A\n", "// # B\n"]);
        let background = app.docs[1].id;
        let before = app.store.generation();

        app.post(WorkspaceEvent::DocumentChanged(background));
        app.pump_events();

        assert_eq!(app.store.generation(), before);
        assert_eq!(app.outline_items[0].label, "A");
    }

    #[test]
    fn test_current_heading_index() {
        let mut app = test_app(&["// # A\nx\n// # B\ny\n"]);
        assert_eq!(app.current_heading_index(), Some(0));
        app.move_cursor_down(3);
        assert_eq!(app.current_heading_index(), Some(1));
    }

    #[test]
    fn test_cursor_clamped_to_document() {
        let mut app = test_app(&["a\nb\n"]);
        app.move_cursor_down(100);
        assert_eq!(app.active_view_state().unwrap().cursor_line, 2);
        app.move_cursor_up(100);
        assert_eq!(app.active_view_state().unwrap().cursor_line, 0);
    }
}
