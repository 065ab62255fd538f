//! Abstract Syntax Tree (AST) for Zirconium.
//!
//! All nodes are allocated in a `bumpalo` arena and referenced with the
//! `'ast` lifetime. Nodes are immutable once built apart from their
//! [`NodeFlags`], which only ever gain bits.

mod expr;
mod factory;
mod node;
mod ops;
mod parent;
mod printer;
mod stmt;
mod visitor;

pub use expr::*;
pub use factory::NodeFactory;
pub use node::{Node, NodeFlags, NodeKind, NodeMeta};
pub use ops::{BinaryOp, UnaryOp};
pub use parent::ParentMap;
pub use printer::{format_number, print_expression, print_source_file};
pub use stmt::*;
pub use visitor::*;
