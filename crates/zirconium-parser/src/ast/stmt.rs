//! Statement AST nodes for Zirconium.
//!
//! Statements are newline or `;` terminated. Blocks are `{ ... }` and
//! `if` bodies may also be written inline after a `:`.

use zirconium_core::{NodeId, Span};

use super::expr::{Expr, Identifier, InvalidNode};
use super::node::{NodeFlags, NodeKind, NodeMeta};

/// The root of a parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile<'ast> {
    pub meta: NodeMeta,
    pub statements: &'ast [Stmt<'ast>],
}

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `{ ... }`
    Block(&'ast Block<'ast>),
    /// An expression evaluated for effect
    Expression(&'ast ExpressionStatement<'ast>),
    /// `x = 1`, `let x = 1`, `const x = 1`
    Variable(&'ast VariableStatement<'ast>),
    /// `if cond { } else { }`
    If(&'ast IfStatement<'ast>),
    /// `for (x in items) { }`
    ForIn(&'ast ForInStatement<'ast>),
    /// `function name(a, b) { }`
    Function(&'ast FunctionDeclaration<'ast>),
    /// `return expr`
    Return(&'ast ReturnStatement<'ast>),
    /// `enum Name { A, B }`
    Enum(&'ast EnumDeclaration<'ast>),
    /// Placeholder for input that produced a diagnostic
    Invalid(&'ast InvalidNode<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Metadata of the wrapped node.
    pub fn meta(&self) -> &'ast NodeMeta {
        match *self {
            Self::Block(s) => &s.meta,
            Self::Expression(s) => &s.meta,
            Self::Variable(s) => &s.meta,
            Self::If(s) => &s.meta,
            Self::ForIn(s) => &s.meta,
            Self::Function(s) => &s.meta,
            Self::Return(s) => &s.meta,
            Self::Enum(s) => &s.meta,
            Self::Invalid(s) => &s.meta,
        }
    }

    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        self.meta().span
    }

    /// Get the id of this statement.
    pub fn id(&self) -> NodeId {
        self.meta().id
    }

    /// The node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Block(_) => NodeKind::Block,
            Self::Expression(_) => NodeKind::ExpressionStatement,
            Self::Variable(_) => NodeKind::VariableStatement,
            Self::If(_) => NodeKind::IfStatement,
            Self::ForIn(_) => NodeKind::ForInStatement,
            Self::Function(_) => NodeKind::FunctionDeclaration,
            Self::Return(_) => NodeKind::ReturnStatement,
            Self::Enum(_) => NodeKind::EnumDeclaration,
            Self::Invalid(_) => NodeKind::Invalid,
        }
    }
}

/// `{ statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'ast> {
    pub meta: NodeMeta,
    pub statements: &'ast [Stmt<'ast>],
}

/// An expression in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement<'ast> {
    pub meta: NodeMeta,
    pub expression: Expr<'ast>,
}

/// A variable assignment or declaration.
///
/// `let`, `const` and `export` are recorded as flags on both the statement
/// and its declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStatement<'ast> {
    pub meta: NodeMeta,
    pub declaration: &'ast VariableDeclaration<'ast>,
}

impl VariableStatement<'_> {
    /// Whether this is a `const` declaration.
    pub fn is_const(&self) -> bool {
        self.meta.flags().contains(NodeFlags::CONST)
    }

    /// Whether this introduces a new binding in the current scope.
    pub fn is_declaration(&self) -> bool {
        self.meta.flags().intersects(NodeFlags::LET | NodeFlags::CONST)
    }
}

/// `name = initializer`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast Identifier<'ast>,
    pub initializer: Expr<'ast>,
}

/// `if condition then_statement [else else_statement]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement<'ast> {
    pub meta: NodeMeta,
    pub condition: Expr<'ast>,
    pub then_statement: Stmt<'ast>,
    pub else_statement: Option<Stmt<'ast>>,
}

/// `for (initializer in expression) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement<'ast> {
    pub meta: NodeMeta,
    pub initializer: &'ast Identifier<'ast>,
    pub expression: Expr<'ast>,
    pub body: &'ast Block<'ast>,
}

/// A named function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast Identifier<'ast>,
    pub parameters: &'ast [&'ast Parameter<'ast>],
    pub body: &'ast Block<'ast>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast Identifier<'ast>,
}

/// `return [expression]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement<'ast> {
    pub meta: NodeMeta,
    pub expression: Option<Expr<'ast>>,
}

/// `enum Name { A, B }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast Identifier<'ast>,
    pub items: &'ast [&'ast EnumItemExpression<'ast>],
}

/// One member of an enum, numbered from zero in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumItemExpression<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast Identifier<'ast>,
    pub index: u32,
}
