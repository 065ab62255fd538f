//! Main lexer implementation for Zirconium.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s on demand.
//! It dispatches on the first character of each token, and reclassifies bare
//! words by looking back at the previously emitted token.
//!
//! The lexer never fails: malformed input becomes flagged tokens (an
//! unterminated string, a lone `$`) and the parser decides how to react.

use bumpalo::Bump;
use zirconium_core::Span;

use super::grammar::{lookup_keyword, lookup_punct, match_operator};
use super::text_stream::{StreamPtr, TextStream, is_ident_continue, is_ident_start};
use super::token::{Keyword, Token, TokenFlags, TokenKind, TokenPayload};

/// Lexer configuration supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct LexerOptions {
    /// Emit whitespace and comment tokens so the token stream covers every
    /// byte of the input.
    pub syntax_highlighter: bool,
    /// Enable experimental contextual classification, such as flagging
    /// registered command names.
    pub experimental_syntax_highlighter: bool,
    /// Command names recognised by the experimental classification.
    pub command_names: Vec<String>,
}

/// Lexer for Zirconium source code.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token text is allocated (persists).
pub struct Lexer<'src, 'ast> {
    /// Low-level character stream.
    stream: TextStream<'src>,
    /// Arena for allocating token text.
    arena: &'ast Bump,
    /// Mode switches.
    options: LexerOptions,
    /// A token scanned by [`peek`](Self::peek) but not yet consumed.
    peeked: Option<Token<'ast>>,
    /// Every significant (non-trivia) token scanned so far.
    history: Vec<Token<'ast>>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a lexer with default options.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self::with_options(source, arena, LexerOptions::default())
    }

    /// Create a lexer with explicit options.
    pub fn with_options(source: &'src str, arena: &'ast Bump, options: LexerOptions) -> Self {
        let mut stream = TextStream::new(source);
        if stream.check_str("\u{FEFF}") {
            stream.next();
        }
        Self {
            stream,
            arena,
            options,
            peeked: None,
            history: Vec::new(),
        }
    }

    /// The source being lexed.
    pub fn source(&self) -> &'src str {
        self.stream.source()
    }

    /// The active options.
    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// Consume and return the next token.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn next_token(&mut self) -> Token<'ast> {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan_token(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Token<'ast> {
        match self.peeked {
            Some(token) => token,
            None => {
                let token = self.scan_token();
                self.peeked = Some(token);
                token
            }
        }
    }

    /// Look `offset` tokens past the next one (`0` is the same as
    /// [`peek`](Self::peek)).
    ///
    /// The stream position and token history are restored afterwards, so
    /// lookahead never changes what later calls produce.
    pub fn peek_next(&mut self, offset: usize) -> Token<'ast> {
        let mut token = self.peek();
        if offset == 0 {
            return token;
        }

        let saved_ptr = self.stream.get_ptr();
        let saved_history = self.history.len();
        for _ in 0..offset {
            if token.kind == TokenKind::Eof {
                break;
            }
            token = self.scan_token();
        }
        self.stream.set_ptr(saved_ptr);
        self.history.truncate(saved_history);
        token
    }

    /// The `n`th most recent significant token (`0` is the latest scanned).
    pub fn previous(&self, n: usize) -> Option<&Token<'ast>> {
        self.history.iter().rev().nth(n)
    }

    /// Lex the remaining input into a vector, excluding the end marker.
    pub fn tokenize(mut self) -> Vec<Token<'ast>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.kind == TokenKind::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        let token = self.scan_raw();
        if !token.is_trivia() {
            self.history.push(token);
        }
        token
    }

    fn scan_raw(&mut self) -> Token<'ast> {
        if !self.options.syntax_highlighter {
            self.skip_trivia();
        }

        let start = self.stream.get_ptr();
        let Some(ch) = self.stream.peek() else {
            return self.make_token(TokenKind::Eof, start);
        };

        match ch {
            '\n' | ';' => {
                self.stream.next();
                self.make_token(TokenKind::EndOfStatement, start)
            }
            ' ' | '\t' | '\r' => {
                self.stream.eat_while(is_blank);
                self.make_token(TokenKind::Whitespace, start)
            }
            '#' => {
                self.stream.eat_while(|c| c != '\n');
                self.make_token(TokenKind::Comment, start)
            }
            '"' | '\'' => self.scan_string(ch, start),
            '$' => self.scan_variable(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            c if is_ident_start(c) => self.scan_word(start),
            '-' if self.stream.check_str("--") => self.scan_option(start),
            _ => self.scan_symbol(ch, start),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.stream.eat_while(is_blank);
            if self.stream.peek() == Some('#') {
                self.stream.eat_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    fn span_from(&self, start: StreamPtr) -> Span {
        Span::new(start.offset(), self.stream.offset(), start.line(), start.column())
    }

    /// Create a token from `start` to the current position.
    fn make_token(&self, kind: TokenKind, start: StreamPtr) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.stream.slice_from(start.offset()));
        Token::new(kind, lexeme, self.span_from(start))
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    fn scan_string(&mut self, quote: char, start: StreamPtr) -> Token<'ast> {
        self.stream.next();

        let mut fragment = String::new();
        let mut values: Vec<&'ast str> = Vec::new();
        let mut variables: Vec<&'ast str> = Vec::new();
        let mut terminated = false;

        while let Some(c) = self.stream.next() {
            match c {
                c if c == quote => {
                    terminated = true;
                    break;
                }
                '\\' => match self.stream.next() {
                    Some('n') => fragment.push('\n'),
                    Some('t') => fragment.push('\t'),
                    Some('r') => fragment.push('\r'),
                    Some(other) => fragment.push(other),
                    None => break,
                },
                '$' if self.stream.check(is_ident_continue) => {
                    values.push(self.arena.alloc_str(&fragment));
                    fragment.clear();
                    let name = self.stream.eat_while(is_ident_continue);
                    variables.push(self.arena.alloc_str(name));
                }
                other => fragment.push(other),
            }
        }

        let mut token = if variables.is_empty() {
            let mut token = self.make_token(TokenKind::String, start);
            token.value = self.arena.alloc_str(&fragment);
            token
        } else {
            values.push(self.arena.alloc_str(&fragment));
            let mut token = self.make_token(TokenKind::InterpolatedString, start);
            token.flags |= TokenFlags::INTERPOLATED;
            token.value = "";
            token.payload = TokenPayload::Interpolation {
                values: self.arena.alloc_slice_copy(&values),
                variables: self.arena.alloc_slice_copy(&variables),
            };
            token
        };

        if !terminated {
            token.flags |= TokenFlags::UNTERMINATED;
        }
        token
    }

    // =========================================
    // Scanning: Words, variables, numbers, options
    // =========================================

    /// Read `.segment` continuations after a name.
    fn scan_property_chain(&mut self) -> Vec<&'ast str> {
        let mut properties = Vec::new();
        while self.stream.peek() == Some('.') && self.stream.peek_nth(1).is_some_and(is_ident_continue) {
            self.stream.next();
            let segment: &'ast str = self.arena.alloc_str(self.stream.eat_while(is_ident_continue));
            properties.push(segment);
        }
        properties
    }

    fn name_token(&mut self, name: &'src str, start: StreamPtr, properties: Vec<&'ast str>) -> Token<'ast> {
        let mut token = if properties.is_empty() {
            self.make_token(TokenKind::Identifier, start)
        } else {
            let mut token = self.make_token(TokenKind::PropertyAccess, start);
            token.payload = TokenPayload::Properties(self.arena.alloc_slice_copy(&properties));
            token
        };
        token.value = self.arena.alloc_str(name);
        token
    }

    fn scan_word(&mut self, start: StreamPtr) -> Token<'ast> {
        let word = self.stream.eat_while(is_ident_continue);
        let properties = self.scan_property_chain();

        if properties.is_empty() {
            if let Some(keyword) = lookup_keyword(word) {
                return self.make_token(TokenKind::Keyword(keyword), start);
            }
            if word == "true" || word == "false" {
                return self.make_token(TokenKind::Boolean, start);
            }
        }

        let mut token = self.name_token(word, start, properties);
        token.flags |= self.classify_word(word);
        token
    }

    /// Flags for a bare word, based on the previously emitted token.
    fn classify_word(&self, word: &str) -> TokenFlags {
        let mut flags = TokenFlags::empty();
        match self.history.last().map(|t| t.kind) {
            Some(TokenKind::Keyword(Keyword::Function)) => flags |= TokenFlags::FUNCTION_NAME,
            Some(TokenKind::Keyword(Keyword::Let | Keyword::Const)) => {
                flags |= TokenFlags::VARIABLE_DECLARATION
            }
            _ => {}
        }
        if self.options.experimental_syntax_highlighter && self.options.command_names.iter().any(|c| c == word) {
            flags |= TokenFlags::COMMAND_NAME;
        }
        flags
    }

    fn scan_variable(&mut self, start: StreamPtr) -> Token<'ast> {
        self.stream.next();
        if !self.stream.check(is_ident_continue) {
            let mut token = self.make_token(TokenKind::Error, start);
            token.flags |= TokenFlags::INVALID;
            return token;
        }

        let name = self.stream.eat_while(is_ident_continue);
        let properties = self.scan_property_chain();
        let mut token = self.name_token(name, start, properties);
        token.flags |= TokenFlags::VARIABLE;
        token
    }

    fn scan_number(&mut self, start: StreamPtr) -> Token<'ast> {
        self.stream.eat_while(|c| c.is_ascii_digit());
        if self.stream.peek() == Some('.') && self.stream.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.stream.next();
            self.stream.eat_while(|c| c.is_ascii_digit());
        }
        self.make_token(TokenKind::Number, start)
    }

    fn scan_option(&mut self, start: StreamPtr) -> Token<'ast> {
        self.stream.next_n(2);
        if !self.stream.check(is_ident_start) {
            let mut token = self.make_token(TokenKind::Error, start);
            token.flags |= TokenFlags::INVALID;
            return token;
        }

        let name = self.stream.eat_while(|c| is_ident_continue(c) || c == '-');
        let mut token = self.make_token(TokenKind::Option, start);
        token.value = self.arena.alloc_str(name);
        token
    }

    // =========================================
    // Scanning: Operators and punctuation
    // =========================================

    fn scan_symbol(&mut self, ch: char, start: StreamPtr) -> Token<'ast> {
        let rest = &self.stream.source()[self.stream.offset() as usize..];
        if let Some((op, len)) = match_operator(rest) {
            self.stream.next_n(len);
            return self.make_token(TokenKind::Operator(op), start);
        }

        self.stream.next();
        match lookup_punct(ch) {
            Some(punct) => self.make_token(TokenKind::Special(punct), start),
            None => {
                let mut token = self.make_token(TokenKind::Error, start);
                token.flags |= TokenFlags::INVALID;
                token
            }
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
