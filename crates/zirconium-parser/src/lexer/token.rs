//! Token types and definitions for the Zirconium lexer.

use std::fmt;

use bitflags::bitflags;
use zirconium_core::Span;

/// A token from the source code.
///
/// The `'ast` lifetime refers to the arena where the lexeme and decoded
/// value strings are allocated, so the source string may be freed once
/// lexing completes.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// Lexical anomalies and contextual classification.
    pub flags: TokenFlags,
    /// The raw source text of this token.
    pub lexeme: &'ast str,
    /// The decoded value: unescaped string text, a variable name without
    /// its `$`, an option name without its `--`, or the lexeme itself.
    pub value: &'ast str,
    /// Extra structured data for property chains and interpolated strings.
    pub payload: TokenPayload<'ast>,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    /// Create a new token whose value is its lexeme.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self {
            kind,
            flags: TokenFlags::empty(),
            lexeme,
            value: lexeme,
            payload: TokenPayload::None,
            span,
        }
    }

    /// Whether this token is the given operator.
    #[inline]
    pub fn is_operator(&self, op: Operator) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    /// Whether this token is the given punctuation.
    #[inline]
    pub fn is_special(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Special(punct)
    }

    /// Whether this token is the given keyword.
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Whether this token ends a statement (newline, `;` or end of input).
    #[inline]
    pub fn is_statement_end(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfStatement | TokenKind::Eof)
    }

    /// Whether this token carries layout only.
    #[inline]
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// The ordered `.name` segments of a property access token.
    pub fn properties(&self) -> &'ast [&'ast str] {
        match self.payload {
            TokenPayload::Properties(props) => props,
            _ => &[],
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)?;
        if !self.flags.is_empty() {
            write!(f, "[{:?}]", self.flags)?;
        }
        Ok(())
    }
}

/// Structured data carried by some token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TokenPayload<'ast> {
    #[default]
    None,
    /// Segments after the base name of a `PropertyAccess` token.
    Properties(&'ast [&'ast str]),
    /// Literal fragments and the variable names between them.
    ///
    /// `values` always has exactly one more entry than `variables`:
    /// `values[i]` is followed by `variables[i]` when it exists.
    Interpolation {
        values: &'ast [&'ast str],
        variables: &'ast [&'ast str],
    },
}

bitflags! {
    /// Flags attached to tokens by the lexer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenFlags: u16 {
        /// A string literal that ran to the end of input.
        const UNTERMINATED = 1 << 0;
        /// An identifier written with a `$` prefix.
        const VARIABLE = 1 << 1;
        /// The word following `function`.
        const FUNCTION_NAME = 1 << 2;
        /// The word following `let` or `const`.
        const VARIABLE_DECLARATION = 1 << 3;
        /// A string containing `$name` interpolation.
        const INTERPOLATED = 1 << 4;
        /// A word matching a registered command name.
        const COMMAND_NAME = 1 << 5;
        /// A malformed prefix such as a lone `$` or `--`.
        const INVALID = 1 << 6;
    }
}

/// All token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A bare word or `$name` variable.
    Identifier,
    /// A plain quoted string.
    String,
    /// A quoted string containing `$name` markers.
    InterpolatedString,
    /// A numeric literal.
    Number,
    /// `true` or `false`.
    Boolean,
    /// An operator.
    Operator(Operator),
    /// Punctuation.
    Special(Punct),
    /// A reserved word.
    Keyword(Keyword),
    /// A `--name` option.
    Option,
    /// A newline or `;`.
    EndOfStatement,
    /// A run of spaces or tabs (highlighter mode only).
    Whitespace,
    /// A `#` comment (highlighter mode only).
    Comment,
    /// A name followed by `.segment` chains, folded into one token.
    PropertyAccess,
    /// Input the lexer could not classify.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in diagnostics.
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::InterpolatedString => "interpolated string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Operator(op) => op.as_str(),
            TokenKind::Special(p) => p.as_str(),
            TokenKind::Keyword(k) => k.as_str(),
            TokenKind::Option => "option",
            TokenKind::EndOfStatement => "end of statement",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::PropertyAccess => "property access",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Operator(_) | TokenKind::Special(_) | TokenKind::Keyword(_) => {
                write!(f, "'{}'", self.description())
            }
            _ => write!(f, "{}", self.description()),
        }
    }
}

/// Operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,
}

impl Operator {
    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Assign => "=",
            Operator::EqualEqual => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::AndAnd => "&&",
            Operator::OrOr => "||",
            Operator::Bang => "!",
        }
    }
}

/// Punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Dot,
}

impl Punct {
    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::LeftParen => "(",
            Punct::RightParen => ")",
            Punct::LeftBrace => "{",
            Punct::RightBrace => "}",
            Punct::LeftBracket => "[",
            Punct::RightBracket => "]",
            Punct::Comma => ",",
            Punct::Colon => ":",
            Punct::Dot => ".",
        }
    }

    /// Whether this punctuation closes a bracketed list.
    pub fn is_closing(&self) -> bool {
        matches!(self, Punct::RightParen | Punct::RightBrace | Punct::RightBracket)
    }
}

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    For,
    In,
    Function,
    Return,
    Let,
    Const,
    Enum,
    Export,
}

impl Keyword {
    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::Let => "let",
            Keyword::Const => "const",
            Keyword::Enum => "enum",
            Keyword::Export => "export",
        }
    }
}
