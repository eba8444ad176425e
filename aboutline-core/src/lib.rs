//! aboutline core - outline extraction and change notification
//!
//! This crate contains the editor-independent logic:
//! - Heading extraction from marker comments
//! - Outline store with subscribe/notify
//! - Rope-backed document model
//! - Navigation commands for outline items
//! - Configuration management

pub mod config;
pub mod doc;
pub mod extract;
pub mod nav;
pub mod selection;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use doc::{Document, TextDocument};
pub use extract::{extract_headings, HeadingMatch, HeadingPattern};
pub use nav::{ActiveView, Command, CommandRegistry, EditorView, GOTO_RANGE};
pub use selection::{LineRange, Position};
pub use store::{HeadingRecord, Outline, OutlineItem, OutlineStore, Subscription};
