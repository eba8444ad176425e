//! Positions and line ranges within a document

/// A zero-based (line, character) position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A range between two positions, end exclusive on the character axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: Position,
    pub end: Position,
}

impl LineRange {
    pub fn new(start: Position, end: Position) -> Self {
        // Normalize so start <= end regardless of argument order
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// The full extent of a single line with `len` characters
    pub fn whole_line(line: usize, len: usize) -> Self {
        Self {
            start: Position::new(line, 0),
            end: Position::new(line, len),
        }
    }

    /// Get the covered lines as (min, max) inclusive
    pub fn lines(&self) -> (usize, usize) {
        (self.start.line, self.end.line)
    }

    /// Whether the range covers the given line
    pub fn contains_line(&self, line: usize) -> bool {
        let (first, last) = self.lines();
        (first..=last).contains(&line)
    }
}
