//! Document model with Rope-based text storage

use anyhow::{Context, Result};
use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::selection::LineRange;

/// Text access the outline store needs from a document.
///
/// Line indices and character offsets are zero-based. Lookups outside the
/// document return `None` instead of panicking.
pub trait TextDocument {
    /// Full current text of the document
    fn text(&self) -> Cow<'_, str>;

    /// Boundary range of the given line, excluding its terminator
    fn line_at(&self, line_index: usize) -> Option<LineRange>;

    /// Index of the line containing the given character offset
    fn offset_to_line(&self, char_offset: usize) -> Option<usize>;
}

/// An open text document
#[derive(Clone)]
pub struct Document {
    pub path: PathBuf,
    pub rope: Rope,
    pub loaded_mtime: Option<SystemTime>,
    pub disk_mtime: Option<SystemTime>,
    pub dirty_on_disk: bool,
    pub rev: u64,
}

impl Document {
    /// Load a document from a file path
    pub fn load(path: &Path) -> Result<Self> {
        // Canonicalize so watcher events can be matched against the path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let content = fs::read_to_string(&abs_path)
            .with_context(|| format!("Failed to read file: {}", abs_path.display()))?;

        let mtime = fs::metadata(&abs_path).ok().and_then(|m| m.modified().ok());

        Ok(Self {
            path: abs_path,
            rope: Rope::from_str(&content),
            loaded_mtime: mtime,
            disk_mtime: mtime,
            dirty_on_disk: false,
            rev: 1,
        })
    }

    /// Create an in-memory document that is not backed by a file
    pub fn from_text(name: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: name.into(),
            rope: Rope::from_str(text),
            loaded_mtime: None,
            disk_mtime: None,
            dirty_on_disk: false,
            rev: 1,
        }
    }

    /// Reload the document from disk
    pub fn reload(&mut self) -> Result<()> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to reload file: {}", self.path.display()))?;

        self.rope = Rope::from_str(&content);

        let mtime = fs::metadata(&self.path).ok().and_then(|m| m.modified().ok());
        self.loaded_mtime = mtime;
        self.disk_mtime = mtime;
        self.dirty_on_disk = false;
        self.rev += 1;

        Ok(())
    }

    /// Insert a line of text before `line_idx`, appending when past the end
    pub fn insert_line(&mut self, line_idx: usize, text: &str) {
        let line_count = self.rope.len_lines();
        if line_idx < line_count {
            let char_idx = self.rope.line_to_char(line_idx);
            self.rope.insert(char_idx, &format!("{}\n", text));
        } else {
            let len = self.rope.len_chars();
            let needs_break = len > 0 && self.rope.char(len - 1) != '\n';
            let inserted = if needs_break {
                format!("\n{}", text)
            } else {
                text.to_string()
            };
            self.rope.insert(len, &inserted);
        }
        self.rev += 1;
    }

    /// Get the number of lines in the document
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of a single line without its terminator
    pub fn line_text(&self, line_idx: usize) -> String {
        if line_idx >= self.line_count() {
            return String::new();
        }
        let line = self.rope.line(line_idx);
        let content_len = content_len(line);
        line.slice(..content_len).to_string()
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl TextDocument for Document {
    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(self.rope.to_string())
    }

    fn line_at(&self, line_index: usize) -> Option<LineRange> {
        if line_index >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_index);
        Some(LineRange::whole_line(line_index, content_len(line)))
    }

    fn offset_to_line(&self, char_offset: usize) -> Option<usize> {
        if char_offset > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.char_to_line(char_offset))
    }
}

/// Number of chars in a line slice, not counting LF, CR or CRLF at the end
fn content_len(line: RopeSlice) -> usize {
    let mut len = line.len_chars();
    if len > 0 && line.char(len - 1) == '\n' {
        len -= 1;
    }
    if len > 0 && line.char(len - 1) == '\r' {
        len -= 1;
    }
    len
}
