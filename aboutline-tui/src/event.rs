//! Workspace events that drive outline recomputes

use std::fmt;

/// Stable identifier of an open document, unaffected by closing others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(pub u64);

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events posted on the app's bus and drained by `App::pump_events`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Text of a document changed (edit or reload)
    DocumentChanged(DocId),
    /// A different document (or none) became active
    ActiveDocumentChanged(Option<DocId>),
}
