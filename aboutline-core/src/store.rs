//! Outline store and change notification
//!
//! The store owns the outline of whichever document is currently relevant.
//! Hosts call [`OutlineStore::recompute`] when that document is edited or
//! when the active document changes; every recompute replaces the outline
//! wholesale and then notifies each subscriber exactly once.
//!
//! Everything runs on one thread. Listeners are called after the store has
//! released its internal borrows, so they may read [`OutlineStore::children`]
//! or (un)subscribe while being notified.

use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::doc::TextDocument;
use crate::extract::HeadingPattern;
use crate::nav::Command;
use crate::selection::LineRange;

/// A heading and the line it sits on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingRecord {
    pub text: String,
    pub location: LineRange,
}

impl HeadingRecord {
    /// Plain display value: label plus the command that jumps to the heading
    pub fn to_item(&self) -> OutlineItem {
        OutlineItem {
            label: self.text.clone(),
            command: Command::goto_range(self.location),
        }
    }
}

/// What a display renders for one heading
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineItem {
    pub label: String,
    pub command: Command,
}

/// Immutable snapshot of the current headings, in document order
pub type Outline = Rc<[HeadingRecord]>;

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Handle returned by [`OutlineStore::subscribe`].
///
/// Delivery stops when the handle is dropped or unsubscribed.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Holds the current outline and notifies subscribers when it changes
pub struct OutlineStore {
    pattern: HeadingPattern,
    current: RefCell<Outline>,
    generation: Cell<u64>,
    listeners: Rc<RefCell<Listeners>>,
}

impl OutlineStore {
    /// Create an empty store scanning with `pattern`
    pub fn new(pattern: HeadingPattern) -> Self {
        Self {
            pattern,
            current: RefCell::new(Rc::from(Vec::new())),
            generation: Cell::new(0),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    /// Initial sync with the host: scan the active document if there is one
    pub fn attach(&self, active: Option<&dyn TextDocument>) {
        if let Some(document) = active {
            self.recompute(Some(document));
        }
    }

    /// Rebuild the outline from `document` (empty when `None`) and notify
    pub fn recompute(&self, document: Option<&dyn TextDocument>) {
        let headings = match document {
            Some(document) => self.scan(document),
            None => Vec::new(),
        };
        let count = headings.len();

        *self.current.borrow_mut() = Rc::from(headings);
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        debug!("Outline recomputed: {} headings (generation {})", count, generation);

        self.notify();
    }

    /// Current outline. The same snapshot is returned until the next recompute.
    pub fn children(&self) -> Outline {
        Rc::clone(&self.current.borrow())
    }

    /// Number of completed recomputes
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Register a callback fired after every recompute
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));

        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    fn scan(&self, document: &dyn TextDocument) -> Vec<HeadingRecord> {
        let text = document.text();
        self.pattern
            .extract(&text)
            .into_iter()
            .filter_map(|heading| {
                let line = document
                    .offset_to_line(heading.match_offset)
                    .unwrap_or(heading.line_index);
                match document.line_at(line) {
                    Some(location) => Some(HeadingRecord {
                        text: heading.label,
                        location,
                    }),
                    None => {
                        debug!("Skipping heading {:?}: line {} not found", heading.label, line);
                        None
                    }
                }
            })
            .collect()
    }

    fn notify(&self) {
        // Snapshot so listeners can touch the store while being called
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener();
        }
    }
}

impl Default for OutlineStore {
    fn default() -> Self {
        Self::new(HeadingPattern::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Document;
    use crate::selection::Position;

    fn counter(store: &OutlineStore) -> (Rc<Cell<usize>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let subscription = store.subscribe(move || seen.set(seen.get() + 1));
        (count, subscription)
    }

    fn texts_and_lines(outline: &Outline) -> Vec<(String, usize)> {
        outline
            .iter()
            .map(|h| (h.text.clone(), h.location.start.line))
            .collect()
    }

    #[test]
    fn test_starts_empty() {
        let store = OutlineStore::default();
        assert!(store.children().is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_recompute_with_document() {
        let store = OutlineStore::default();
        let doc = Document::from_text("mem", "// # Intro\nsome code\n// # Usage\n");
        store.recompute(Some(&doc));

        let outline = store.children();
        assert_eq!(
            texts_and_lines(&outline),
            vec![("Intro".to_string(), 0), ("Usage".to_string(), 2)]
        );
    }

    #[test]
    fn test_location_is_full_line() {
        let store = OutlineStore::default();
        let doc = Document::from_text("mem", "code\n    x(); // # Call site\r\nmore\n");
        store.recompute(Some(&doc));

        let outline = store.children();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].location.start, Position::new(1, 0));
        assert_eq!(outline[0].location.end, Position::new(1, 23));
    }

    #[test]
    fn test_no_headings() {
        let store = OutlineStore::default();
        store.recompute(Some(&Document::from_text("mem", "no headings here")));
        assert!(store.children().is_empty());
    }

    #[test]
    fn test_recompute_none_empties_and_notifies_once() {
        let store = OutlineStore::default();
        let (count, _sub) = counter(&store);

        store.recompute(Some(&Document::from_text("mem", "// # A\n")));
        assert_eq!(store.children().len(), 1);
        assert_eq!(count.get(), 1);

        store.recompute(None);
        assert!(store.children().is_empty());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_every_recompute_notifies_all_listeners() {
        let store = OutlineStore::default();
        let (first, _a) = counter(&store);
        let (second, _b) = counter(&store);
        let doc = Document::from_text("mem", "nothing");

        store.recompute(Some(&doc));
        store.recompute(Some(&doc));
        store.recompute(None);

        assert_eq!(first.get(), 3);
        assert_eq!(second.get(), 3);
        assert_eq!(store.generation(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = OutlineStore::default();
        let (kept, _kept_sub) = counter(&store);
        let (dropped, dropped_sub) = counter(&store);
        assert_eq!(store.listener_count(), 2);

        store.recompute(None);
        dropped_sub.unsubscribe();
        store.recompute(None);

        assert_eq!(kept.get(), 2);
        assert_eq!(dropped.get(), 1);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_children_is_stable_until_recompute() {
        let store = OutlineStore::default();
        let doc = Document::from_text("mem", "// # A\n");
        store.recompute(Some(&doc));

        let first = store.children();
        let second = store.children();
        assert!(Rc::ptr_eq(&first, &second));

        store.recompute(Some(&doc));
        let third = store.children();
        assert!(!Rc::ptr_eq(&first, &third));
        // Old snapshot is untouched by the replacement
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_listener_can_read_store_during_notification() {
        let store = Rc::new(OutlineStore::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let weak = Rc::downgrade(&store);
        let sink = Rc::clone(&seen);
        let _sub = store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                sink.borrow_mut().push(store.children().len());
            }
        });

        store.recompute(Some(&Document::from_text("mem", "// # A\n// # B\n")));
        store.recompute(None);
        assert_eq!(*seen.borrow(), vec![2, 0]);
    }

    #[test]
    fn test_attach_scans_active_document_only() {
        let store = OutlineStore::default();
        let (count, _sub) = counter(&store);

        store.attach(None);
        assert_eq!(count.get(), 0);

        store.attach(Some(&Document::from_text("mem", "// # Open\n")));
        assert_eq!(count.get(), 1);
        assert_eq!(store.children()[0].text, "Open");
    }

    #[test]
    fn test_edit_then_recompute_replaces_outline() {
        let store = OutlineStore::default();
        let mut doc = Document::from_text("mem", "// # First\nbody\n");
        store.recompute(Some(&doc));

        doc.insert_line(1, "// # Second");
        store.recompute(Some(&doc));

        assert_eq!(
            texts_and_lines(&store.children()),
            vec![("First".to_string(), 0), ("Second".to_string(), 1)]
        );
    }

    #[test]
    fn test_to_item_carries_goto_command() {
        let record = HeadingRecord {
            text: "Usage".to_string(),
            location: LineRange::whole_line(2, 10),
        };
        let item = record.to_item();
        assert_eq!(item.label, "Usage");
        assert_eq!(item.command.id, crate::nav::GOTO_RANGE);
        assert_eq!(item.command.argument, record.location);
    }

    #[test]
    fn test_unresolvable_lines_are_skipped() {
        struct Shrunk;

        impl TextDocument for Shrunk {
            fn text(&self) -> std::borrow::Cow<'_, str> {
                "// # A\n// # B\n".into()
            }

            fn line_at(&self, line_index: usize) -> Option<LineRange> {
                (line_index == 0).then(|| LineRange::whole_line(0, 6))
            }

            fn offset_to_line(&self, _char_offset: usize) -> Option<usize> {
                None
            }
        }

        let store = OutlineStore::default();
        store.recompute(Some(&Shrunk));
        let outline = store.children();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "A");
    }

    #[test]
    fn test_custom_pattern() {
        let store = OutlineStore::new(HeadingPattern::new("-- # ").unwrap());
        store.recompute(Some(&Document::from_text("mem", "-- # Sql\n// # Rust\n")));
        let outline = store.children();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Sql");
    }
}
