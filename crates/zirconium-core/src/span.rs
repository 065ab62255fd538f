//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, nodes and errors occur in source
//! code, and [`LineIndex`] to turn raw byte offsets back into line/column
//! pairs for host diagnostics.

use std::fmt;

/// A half-open byte range `[start, end)` into the source, plus the line and
/// column where it begins.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character (0-indexed).
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
    /// Line number of `start` (1-indexed).
    pub line: u32,
    /// Column number of `start` (1-indexed, byte-based).
    pub col: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(start: u32, end: u32, line: u32, col: u32) -> Self {
        Self {
            start,
            end,
            line,
            col,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(offset: u32, line: u32, col: u32) -> Self {
        Self::new(offset, offset, line, col)
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Merge two spans into one covering both.
    ///
    /// The line and column are taken from whichever span starts first.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            col: first.col,
        }
    }

    /// Slice the covered text out of `source`, if the range is valid.
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A resolved line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Maps byte offsets to line/column positions.
///
/// Built once per source string; lookups are a binary search over the
/// recorded line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Index the line starts of `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve a byte offset. Offsets past the end clamp to the end of input.
    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        Position {
            line: line as u32 + 1,
            col: offset - self.line_starts[line] + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(4, 14, 1, 5);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());

        let empty = Span::point(4, 1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(40, 45, 3, 15);
        assert_eq!(format!("{}", span), "3:15");
    }

    #[test]
    fn span_merge_keeps_earliest_start() {
        let foo = Span::new(4, 7, 1, 5);
        let bar = Span::new(9, 12, 1, 10);

        let merged = foo.merge(bar);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 12);
        assert_eq!(merged.col, 5);

        let reversed = bar.merge(foo);
        assert_eq!(reversed, merged);
    }

    #[test]
    fn span_merge_across_lines() {
        let first = Span::new(0, 3, 1, 1);
        let second = Span::new(10, 14, 3, 2);
        let merged = first.merge(second);

        assert_eq!(merged.line, 1);
        assert_eq!(merged.len(), 14);
    }

    #[test]
    fn span_text() {
        let source = "print hello";
        let span = Span::new(6, 11, 1, 7);
        assert_eq!(span.text(source), Some("hello"));
        assert_eq!(Span::new(6, 40, 1, 7).text(source), None);
    }

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(0), Position { line: 1, col: 1 });
        assert_eq!(index.position(1), Position { line: 1, col: 2 });
        assert_eq!(index.position(3), Position { line: 2, col: 1 });
        assert_eq!(index.position(6), Position { line: 3, col: 1 });
        assert_eq!(index.position(8), Position { line: 4, col: 2 });
    }

    #[test]
    fn line_index_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.position(99), Position { line: 1, col: 3 });
    }
}
