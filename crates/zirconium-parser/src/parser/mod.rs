//! Parser infrastructure for Zirconium.
//!
//! Provides the main [`Parser`] struct with token navigation, the call-mode
//! and function-name stacks, and the error helpers shared by the expression
//! and statement parsers.
//!
//! Tokens are pulled lazily from the [`Lexer`], which keeps one token of
//! pushback and supports restoring multi-token lookahead.

mod expr_parser;
mod options;
mod stmt_parser;

pub use options::{Feature, ParserMode, ParserOptions};

use bumpalo::Bump;
use zirconium_core::{NodeId, ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::{NodeFactory, NodeFlags, NodeMeta, SourceFile};
use crate::lexer::{Keyword, Lexer, LexerOptions, Operator, Punct, Token, TokenKind};

/// Deepest block or expression nesting accepted.
pub const MAX_NESTING: u32 = 512;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// The main parser for Zirconium source code.
///
/// The `'src` lifetime is the source text, which only needs to live while
/// parsing. The `'ast` lifetime is the arena holding nodes and token text.
pub struct Parser<'src, 'ast> {
    /// Token source.
    pub(super) lexer: Lexer<'src, 'ast>,
    /// Node builder.
    pub(super) factory: NodeFactory<'ast>,
    /// Language version and mode switches.
    pub(super) options: ParserOptions,
    /// Accumulated parse errors.
    pub(super) errors: ParseErrors,
    /// Non-fatal diagnostics.
    pub(super) warnings: ParseErrors,
    /// Strict/command call modes; the innermost is last.
    pub(super) call_modes: Vec<ParserMode>,
    /// Names of the functions being parsed; the innermost is last.
    pub(super) functions: Vec<&'ast str>,
    /// The most recently consumed token.
    pub(super) previous: Option<Token<'ast>>,
    /// Current block and expression nesting.
    pub(super) depth: u32,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Create a parser over `source`.
    pub fn new(source: &'src str, arena: &'ast Bump, options: ParserOptions) -> Self {
        Self::with_lexer_options(source, arena, options, LexerOptions::default())
    }

    /// Create a parser with explicit lexer options.
    ///
    /// Highlighter mode is always disabled for parsing.
    pub fn with_lexer_options(
        source: &'src str,
        arena: &'ast Bump,
        options: ParserOptions,
        mut lexer_options: LexerOptions,
    ) -> Self {
        lexer_options.syntax_highlighter = false;
        Self {
            lexer: Lexer::with_options(source, arena, lexer_options),
            factory: NodeFactory::new(arena),
            call_modes: vec![options.mode],
            options,
            errors: ParseErrors::new(),
            warnings: ParseErrors::new(),
            functions: Vec::new(),
            previous: None,
            depth: 0,
        }
    }

    /// Parse `source`, returning every collected error if any were recorded.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_or_throw(
        source: &'src str,
        arena: &'ast Bump,
        options: ParserOptions,
    ) -> Result<&'ast SourceFile<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena, options);
        let result = parser.parse_source_file();
        match result {
            Ok(file) if parser.errors.is_empty() => Ok(file),
            _ => Err(parser.take_errors()),
        }
    }

    /// Parse `source`, degrading to an empty file when anything fails.
    ///
    /// The aggregated errors are logged.
    pub fn parse(source: &'src str, arena: &'ast Bump, options: ParserOptions) -> &'ast SourceFile<'ast> {
        match Self::parse_or_throw(source, arena, options) {
            Ok(file) => file,
            Err(errors) => {
                log::error!("failed to parse script: {}", errors);
                NodeFactory::new(arena).source_file(&[], Span::default())
            }
        }
    }

    /// The active options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &ParseErrors {
        &self.errors
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &ParseErrors {
        &self.warnings
    }

    /// Take the errors, leaving an empty error collection.
    pub fn take_errors(&mut self) -> ParseErrors {
        std::mem::take(&mut self.errors)
    }

    /// Number of nodes built so far.
    pub fn node_count(&self) -> usize {
        self.factory.node_count()
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    pub(super) fn peek(&mut self) -> Token<'ast> {
        self.lexer.peek()
    }

    /// Peek ahead `n` tokens without consuming (`0` is the current token).
    pub(super) fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        self.lexer.peek_next(n)
    }

    /// Get the current token and advance to the next.
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = self.lexer.next_token();
        self.previous = Some(token);
        token
    }

    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn check_special(&mut self, punct: Punct) -> bool {
        self.check(TokenKind::Special(punct))
    }

    pub(super) fn check_operator(&mut self, op: Operator) -> bool {
        self.check(TokenKind::Operator(op))
    }

    pub(super) fn check_keyword(&mut self, keyword: Keyword) -> bool {
        self.check(TokenKind::Keyword(keyword))
    }

    pub(super) fn is_eof(&mut self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// If the current token matches, consume and return it.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expect the current token to be `kind`, consuming it.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = self.peek();
        let error_kind = if token.kind == TokenKind::Eof {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken
        };
        Err(self.throw_error(error_kind, token.span, format!("expected {}, found {}", kind, token.kind)))
    }

    /// Skip newline and `;` tokens. Returns whether any were skipped.
    pub(super) fn skip_statement_ends(&mut self) -> bool {
        let mut skipped = false;
        while self.eat(TokenKind::EndOfStatement).is_some() {
            skipped = true;
        }
        skipped
    }

    /// Whether `next` starts exactly where `token` ends.
    pub(super) fn adjacent(token: &Token<'_>, next: &Token<'_>) -> bool {
        token.span.end == next.span.start
    }

    /// Span of the last consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.previous.map(|t| t.span).unwrap_or_default()
    }

    // ========================================================================
    // Context stacks
    // ========================================================================

    /// Whether calls in the current context must be parenthesized.
    pub(super) fn is_strict(&self) -> bool {
        self.call_modes.last().copied().unwrap_or(self.options.mode) == ParserMode::Strict
    }

    pub(super) fn push_call_mode(&mut self, mode: ParserMode) {
        self.call_modes.push(mode);
    }

    pub(super) fn pop_call_mode(&mut self) {
        if self.call_modes.len() > 1 {
            self.call_modes.pop();
        }
    }

    /// Run `f` one nesting level deeper.
    ///
    /// Input nested past [`MAX_NESTING`] is a `NestingTooDeep` error. The
    /// native stack grows on demand below that limit.
    pub(super) fn nested<T>(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.throw_error(
                ParseErrorKind::NestingTooDeep,
                span,
                format!("nesting exceeds {} levels", MAX_NESTING),
            ));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || f(self));
        self.depth -= 1;
        result
    }

    /// Whether a function body is being parsed.
    pub(super) fn in_function(&self) -> bool {
        !self.functions.is_empty()
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Flag `meta` as erroneous and record a diagnostic, then carry on.
    pub(super) fn error_node(&mut self, meta: &NodeMeta, kind: ParseErrorKind, message: impl Into<String>) {
        meta.add_flags(NodeFlags::ERROR);
        self.errors
            .push(ParseError::new(kind, meta.span, message).with_node(meta.id));
    }

    /// Record a diagnostic at `span` without unwinding.
    pub(super) fn error(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError::new(kind, span, message));
    }

    /// Record a diagnostic and return it for the caller to raise.
    pub(super) fn throw_error(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) -> ParseError {
        let error = ParseError::new(kind, span, message);
        self.errors.push(error.clone());
        error
    }

    /// Flag `meta`, record a diagnostic against it and return it for the
    /// caller to raise.
    pub(super) fn throw_node_error(
        &mut self,
        meta: &NodeMeta,
        kind: ParseErrorKind,
        message: impl Into<String>,
    ) -> ParseError {
        meta.add_flags(NodeFlags::ERROR);
        let error = ParseError::new(kind, meta.span, message).with_node(meta.id);
        self.errors.push(error.clone());
        error
    }

    /// Record a non-fatal diagnostic.
    pub(super) fn warn(&mut self, kind: ParseErrorKind, span: Span, node: NodeId, message: impl Into<String>) {
        self.warnings
            .push(ParseError::new(kind, span, message).with_node(node));
    }

    /// Error for a token that cannot appear here.
    pub(super) fn unexpected(&mut self, token: Token<'ast>) -> ParseError {
        match token.kind {
            TokenKind::Eof => self.throw_error(ParseErrorKind::UnexpectedEof, token.span, "unexpected end of input"),
            kind => self.throw_error(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("unexpected {}", kind),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_throw_collects_errors() {
        let arena = Bump::new();
        let errors = Parser::parse_or_throw("print )", &arena, ParserOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn parse_degrades_to_empty_file() {
        let arena = Bump::new();
        let file = Parser::parse("if {", &arena, ParserOptions::default());
        assert!(file.statements.is_empty());
    }

    #[test]
    fn runaway_nesting_is_an_error() {
        let arena = Bump::new();
        let parens = format!("x = {}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let errors = Parser::parse_or_throw(&parens, &arena, ParserOptions::default()).unwrap_err();
        assert!(errors.contains(ParseErrorKind::NestingTooDeep));

        let blocks = "{\n".repeat(10_000);
        let errors = Parser::parse_or_throw(&blocks, &arena, ParserOptions::default()).unwrap_err();
        assert!(errors.contains(ParseErrorKind::NestingTooDeep));

        let negations = format!("x = {}1", "- ".repeat(100_000));
        let errors = Parser::parse_or_throw(&negations, &arena, ParserOptions::default()).unwrap_err();
        assert!(errors.contains(ParseErrorKind::NestingTooDeep));
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let arena = Bump::new();
        let depth = (MAX_NESTING / 2) as usize;
        let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(Parser::parse_or_throw(&source, &arena, ParserOptions::default()).is_ok());
    }

    #[test]
    fn lookahead_does_not_consume() {
        let arena = Bump::new();
        let mut parser = Parser::new("a b c", &arena, ParserOptions::default());
        assert_eq!(parser.peek_nth(2).lexeme, "c");
        assert_eq!(parser.advance().lexeme, "a");
        assert_eq!(parser.peek().lexeme, "b");
    }

    #[test]
    fn call_mode_stack_keeps_base() {
        let arena = Bump::new();
        let mut parser = Parser::new("", &arena, ParserOptions::default());
        assert!(!parser.is_strict());
        parser.push_call_mode(ParserMode::Strict);
        assert!(parser.is_strict());
        parser.pop_call_mode();
        parser.pop_call_mode();
        assert!(!parser.is_strict());
    }

    #[test]
    fn expect_reports_found_token() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena, ParserOptions::default());
        let err = parser.expect(TokenKind::Special(Punct::LeftParen)).unwrap_err();
        assert_eq!(err.message, "expected '(', found identifier");
        assert!(parser.has_errors());
    }
}
