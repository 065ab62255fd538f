/// A saved stream position, restored with [`TextStream::set_ptr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPtr {
    offset: u32,
    line: u32,
    column: u32,
}

impl StreamPtr {
    /// Byte offset of the saved position.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Line of the saved position (1-indexed).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column of the saved position (1-indexed).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// A cursor over source text that tracks position.
///
/// Provides low-level character access with peek/next semantics and
/// save/restore of the position for backtracking lookahead.
pub struct TextStream<'src> {
    /// The source text being scanned.
    source: &'src str,
    /// Current byte offset from start of source.
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, byte-based).
    column: u32,
}

impl<'src> TextStream<'src> {
    /// Create a new stream at the start of the source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the full source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current byte offset from start of source.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Current line number (1-indexed).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-indexed, byte-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    fn rest(&self) -> &'src str {
        &self.source[self.offset as usize..]
    }

    /// Whether any input remains.
    #[inline]
    pub fn has_next(&self) -> bool {
        (self.offset as usize) < self.source.len()
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        let rest = self.rest();
        match rest.as_bytes().first() {
            Some(&b) if b < 128 => Some(b as char),
            Some(_) => rest.chars().next(),
            None => None,
        }
    }

    /// Peek at the character `n` positions ahead (0 = current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Check if the current character satisfies a predicate.
    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Check if the upcoming text matches the given string.
    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume the current character and advance.
    ///
    /// Returns the consumed character, or `None` at end of input.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        let len = ch.len_utf8() as u32;
        self.offset += len;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len;
        }
        Some(ch)
    }

    /// Consume up to `n` characters, returning the consumed slice.
    pub fn next_n(&mut self, n: usize) -> &'src str {
        let start = self.offset;
        for _ in 0..n {
            if self.next().is_none() {
                break;
            }
        }
        self.slice_from(start)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches.
    ///
    /// Returns the consumed slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.next();
        }
        self.slice_from(start)
    }

    /// Get a slice of source from a starting offset to current position.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }

    /// Save the current position.
    #[inline]
    pub fn get_ptr(&self) -> StreamPtr {
        StreamPtr {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Restore a position previously returned by [`get_ptr`](Self::get_ptr).
    #[inline]
    pub fn set_ptr(&mut self, ptr: StreamPtr) {
        self.offset = ptr.offset;
        self.line = ptr.line;
        self.column = ptr.column;
    }

    /// Rewind to the start of input.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.line = 1;
        self.column = 1;
    }
}

/// Check if a character can start an identifier.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
