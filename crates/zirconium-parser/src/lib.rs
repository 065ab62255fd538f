//! Zirconium parser crate.
//!
//! This crate provides the front end of the Zirconium scripting language:
//! - Lexical analysis over a [`lexer::TextStream`]
//! - The arena-allocated abstract syntax tree, its factory and visitor
//! - The parser, with command-style and strict call modes
//! - The binder, which collects declarations per scope
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use zirconium_parser::ast::Stmt;
//! use zirconium_parser::{ParserOptions, parse_or_throw};
//!
//! let arena = Bump::new();
//! let file = parse_or_throw("$x = 10\nprint $x", &arena, ParserOptions::default()).unwrap();
//! assert_eq!(file.statements.len(), 2);
//! assert!(matches!(file.statements[0], Stmt::Variable(_)));
//! ```

pub mod ast;
pub mod binder;
pub mod lexer;
mod parser;

pub use parser::{Feature, MAX_NESTING, Parser, ParserMode, ParserOptions};
pub use zirconium_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use ast::SourceFile;
use bumpalo::Bump;

/// Parse `source`, returning every recorded error on failure.
pub fn parse_or_throw<'src, 'ast>(
    source: &'src str,
    arena: &'ast Bump,
    options: ParserOptions,
) -> Result<&'ast SourceFile<'ast>, ParseErrors> {
    Parser::parse_or_throw(source, arena, options)
}

/// Parse `source`; on failure the errors are logged and an empty file is
/// returned.
pub fn parse<'src, 'ast>(source: &'src str, arena: &'ast Bump, options: ParserOptions) -> &'ast SourceFile<'ast> {
    Parser::parse(source, arena, options)
}
