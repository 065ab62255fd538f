//! Lexical analysis for Zirconium.

mod grammar;
mod lexer;
mod text_stream;
mod token;

pub use grammar::{is_reserved, is_right_associative, lookup_keyword, precedence};
pub use lexer::{Lexer, LexerOptions};
pub use text_stream::{StreamPtr, TextStream, is_ident_continue, is_ident_start};
pub use token::{Keyword, Operator, Punct, Token, TokenFlags, TokenKind, TokenPayload};
