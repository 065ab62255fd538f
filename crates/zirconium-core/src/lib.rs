//! Core types shared across the Zirconium crates.
//!
//! - [`Span`], [`Position`] and [`LineIndex`] for source locations
//! - [`NodeId`] for AST node identity
//! - The error hierarchy rooted at [`ZirconiumError`]

mod error;
mod ids;
mod span;

pub use error::{
    CompileError, DecodeError, ParseError, ParseErrorKind, ParseErrors, RuntimeError, RuntimeErrorKind,
    VmError, ZirconiumError,
};
pub use ids::NodeId;
pub use span::{LineIndex, Position, Span};
