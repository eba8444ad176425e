//! Heading extraction from marker comments
//!
//! A heading is any line containing the marker (by default `// # `)
//! followed by a label running to the end of the line. The marker may be
//! preceded by arbitrary content, so trailing comments count too.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Marker that introduces a heading label
pub const DEFAULT_MARKER: &str = "// # ";

/// A single heading found by a scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Captured label, verbatim (may be empty)
    pub label: String,
    /// Zero-based line containing the start of the match
    pub line_index: usize,
    /// Character offset of the start of the match
    pub match_offset: usize,
}

/// Compiled heading pattern
#[derive(Clone, Debug)]
pub struct HeadingPattern {
    regex: Regex,
}

impl HeadingPattern {
    /// Build a pattern matching lines that contain `marker` followed by a label
    pub fn new(marker: &str) -> Result<Self> {
        if marker.is_empty() {
            bail!("Heading marker must not be empty");
        }
        // m: ^/$ bind to lines, R: \r\n and \r also terminate lines.
        // The lazy prefix makes the first marker on a line start the label.
        let source = format!(r"(?mR)^.*?{}(.*)$", regex::escape(marker));
        Self::from_regex(&source)
    }

    /// Build a pattern from a raw regular expression.
    ///
    /// The expression must have at least one capture group; group 1 is the
    /// label. Multiline mode is not implied, callers should add `(?m)`.
    pub fn from_regex(source: &str) -> Result<Self> {
        let regex = Regex::new(source)
            .with_context(|| format!("Invalid heading pattern: {}", source))?;
        if regex.captures_len() < 2 {
            bail!("Heading pattern has no capture group for the label: {}", source);
        }
        Ok(Self { regex })
    }

    /// Scan `text` top to bottom and return every heading in document order
    pub fn extract(&self, text: &str) -> Vec<HeadingMatch> {
        let mut headings = Vec::new();

        // Running totals up to `scanned`, so offsets stay linear in text size
        let mut scanned = 0;
        let mut char_offset = 0;
        let mut line_index = 0;

        // captures_iter owns its cursor, nothing carries over between scans
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let skipped = &text[scanned..whole.start()];
            char_offset += skipped.chars().count();
            line_index += count_line_breaks(skipped);
            scanned = whole.start();

            let label = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            headings.push(HeadingMatch {
                label,
                line_index,
                match_offset: char_offset,
            });
        }

        headings
    }
}

impl Default for HeadingPattern {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER).expect("default heading marker compiles")
    }
}

/// Extract headings using the default marker
pub fn extract_headings(text: &str) -> Vec<HeadingMatch> {
    static DEFAULT: OnceLock<HeadingPattern> = OnceLock::new();
    DEFAULT.get_or_init(HeadingPattern::default).extract(text)
}

/// Count LF, CR and CRLF terminators
fn count_line_breaks(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut count = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\n' => count += 1,
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => count += 1,
            _ => {}
        }
    }
    count
}
