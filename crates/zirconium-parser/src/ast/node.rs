//! Shared node metadata and the generic [`Node`] view used for tree walks.

use std::cell::Cell;
use std::fmt;

use bitflags::bitflags;
use zirconium_core::{NodeId, Span};

use super::expr::*;
use super::stmt::*;

bitflags! {
    /// Per-node flags.
    ///
    /// Flags are the only part of a node that may change after construction,
    /// and only by OR-ing more bits in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u16 {
        /// A diagnostic was attached to this node.
        const ERROR = 1 << 0;
        /// Declared with `let`.
        const LET = 1 << 1;
        /// Declared with `const`.
        const CONST = 1 << 2;
        /// Prefixed with `export`.
        const EXPORT = 1 << 3;
        /// An identifier written with a `$` prefix.
        const VARIABLE = 1 << 4;
        /// A string literal that ran to the end of input.
        const UNTERMINATED = 1 << 5;
    }
}

/// Identity, location and flags carried by every node.
#[derive(Clone, PartialEq)]
pub struct NodeMeta {
    /// Unique id within one parse.
    pub id: NodeId,
    /// Source range covered by the node.
    pub span: Span,
    flags: Cell<NodeFlags>,
}

impl NodeMeta {
    /// Create metadata with the given flags.
    pub fn new(id: NodeId, span: Span, flags: NodeFlags) -> Self {
        Self {
            id,
            span,
            flags: Cell::new(flags),
        }
    }

    /// Current flags.
    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.flags.get()
    }

    /// OR additional flags into the node.
    #[inline]
    pub fn add_flags(&self, flags: NodeFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    /// Whether a diagnostic was attached to this node.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.flags().contains(NodeFlags::ERROR)
    }
}

impl fmt::Debug for NodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.id, self.span)?;
        let flags = self.flags();
        if !flags.is_empty() {
            write!(f, "{:?}", flags)?;
        }
        Ok(())
    }
}

/// Discriminant of every node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    Block,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    IfStatement,
    ForInStatement,
    FunctionDeclaration,
    Parameter,
    ReturnStatement,
    EnumDeclaration,
    EnumItemExpression,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    InterpolatedString,
    Identifier,
    PropertyAccessExpression,
    ArrayIndexExpression,
    ElementAccessExpression,
    BinaryExpression,
    UnaryExpression,
    CallExpression,
    SimpleCallExpression,
    FunctionExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    ArrayLiteralExpression,
    OptionExpression,
    OptionKey,
    ParenthesizedExpression,
    Invalid,
}

/// A borrowed view of any node, for generic traversal.
#[derive(Debug, Clone, Copy)]
pub enum Node<'ast> {
    SourceFile(&'ast SourceFile<'ast>),
    Stmt(Stmt<'ast>),
    Expr(Expr<'ast>),
    VariableDeclaration(&'ast VariableDeclaration<'ast>),
    Parameter(&'ast Parameter<'ast>),
    PropertyAssignment(&'ast PropertyAssignment<'ast>),
    EnumItem(&'ast EnumItemExpression<'ast>),
}

impl<'ast> Node<'ast> {
    /// The node's metadata.
    pub fn meta(&self) -> &'ast NodeMeta {
        match *self {
            Node::SourceFile(n) => &n.meta,
            Node::Stmt(s) => s.meta(),
            Node::Expr(e) => e.meta(),
            Node::VariableDeclaration(n) => &n.meta,
            Node::Parameter(n) => &n.meta,
            Node::PropertyAssignment(n) => &n.meta,
            Node::EnumItem(n) => &n.meta,
        }
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.meta().id
    }

    /// The node's source range.
    pub fn span(&self) -> Span {
        self.meta().span
    }

    /// The node's shape.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::SourceFile(_) => NodeKind::SourceFile,
            Node::Stmt(s) => s.kind(),
            Node::Expr(e) => e.kind(),
            Node::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::PropertyAssignment(_) => NodeKind::PropertyAssignment,
            Node::EnumItem(_) => NodeKind::EnumItemExpression,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'ast>> {
        let mut out = Vec::new();
        match *self {
            Node::SourceFile(file) => out.extend(file.statements.iter().map(|s| Node::Stmt(*s))),
            Node::Stmt(stmt) => stmt_children(stmt, &mut out),
            Node::Expr(expr) => expr_children(expr, &mut out),
            Node::VariableDeclaration(decl) => {
                out.push(Node::Expr(Expr::Identifier(decl.name)));
                out.push(Node::Expr(decl.initializer));
            }
            Node::Parameter(param) => out.push(Node::Expr(Expr::Identifier(param.name))),
            Node::PropertyAssignment(prop) => out.push(Node::Expr(prop.initializer)),
            Node::EnumItem(item) => out.push(Node::Expr(Expr::Identifier(item.name))),
        }
        out
    }
}

fn stmt_children<'ast>(stmt: Stmt<'ast>, out: &mut Vec<Node<'ast>>) {
    match stmt {
        Stmt::Block(block) => out.extend(block.statements.iter().map(|s| Node::Stmt(*s))),
        Stmt::Expression(s) => out.push(Node::Expr(s.expression)),
        Stmt::Variable(s) => out.push(Node::VariableDeclaration(s.declaration)),
        Stmt::If(s) => {
            out.push(Node::Expr(s.condition));
            out.push(Node::Stmt(s.then_statement));
            if let Some(else_statement) = s.else_statement {
                out.push(Node::Stmt(else_statement));
            }
        }
        Stmt::ForIn(s) => {
            out.push(Node::Expr(Expr::Identifier(s.initializer)));
            out.push(Node::Expr(s.expression));
            out.push(Node::Stmt(Stmt::Block(s.body)));
        }
        Stmt::Function(f) => {
            out.push(Node::Expr(Expr::Identifier(f.name)));
            out.extend(f.parameters.iter().map(|p| Node::Parameter(*p)));
            out.push(Node::Stmt(Stmt::Block(f.body)));
        }
        Stmt::Return(s) => out.extend(s.expression.map(Node::Expr)),
        Stmt::Enum(e) => {
            out.push(Node::Expr(Expr::Identifier(e.name)));
            out.extend(e.items.iter().map(|i| Node::EnumItem(*i)));
        }
        Stmt::Invalid(_) => {}
    }
}

fn expr_children<'ast>(expr: Expr<'ast>, out: &mut Vec<Node<'ast>>) {
    match expr {
        Expr::String(_) | Expr::Number(_) | Expr::Boolean(_) | Expr::Identifier(_) | Expr::OptionKey(_) => {}
        Expr::Invalid(_) => {}
        Expr::Interpolated(s) => out.extend(s.parts.iter().map(|p| Node::Expr(p.as_expr()))),
        Expr::PropertyAccess(p) => {
            out.push(Node::Expr(p.expression));
            out.push(Node::Expr(Expr::Identifier(p.name)));
        }
        Expr::ArrayIndex(a) => out.push(Node::Expr(a.expression)),
        Expr::ElementAccess(e) => {
            out.push(Node::Expr(e.expression));
            out.push(Node::Expr(e.argument));
        }
        Expr::Binary(b) => {
            out.push(Node::Expr(b.left));
            out.push(Node::Expr(b.right));
        }
        Expr::Unary(u) => out.push(Node::Expr(u.operand)),
        Expr::Call(c) => {
            out.push(Node::Expr(c.callee));
            out.extend(c.arguments.iter().map(|a| Node::Expr(*a)));
        }
        Expr::SimpleCall(c) => {
            out.push(Node::Expr(c.callee));
            out.extend(c.arguments.iter().map(|a| Node::Expr(*a)));
        }
        Expr::Function(f) => {
            out.extend(f.parameters.iter().map(|p| Node::Parameter(*p)));
            out.push(Node::Stmt(Stmt::Block(f.body)));
        }
        Expr::Object(o) => out.extend(o.properties.iter().map(|p| Node::PropertyAssignment(*p))),
        Expr::Array(a) => out.extend(a.elements.iter().map(|e| Node::Expr(*e))),
        Expr::Option(o) => {
            out.push(Node::Expr(Expr::OptionKey(o.option)));
            out.push(Node::Expr(o.expression));
        }
        Expr::Parenthesized(p) => out.push(Node::Expr(p.expression)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accumulate() {
        let meta = NodeMeta::new(NodeId(1), Span::default(), NodeFlags::LET);
        assert!(!meta.has_error());
        meta.add_flags(NodeFlags::ERROR);
        assert!(meta.has_error());
        assert!(meta.flags().contains(NodeFlags::LET));
    }

    #[test]
    fn meta_debug_shows_flags() {
        let meta = NodeMeta::new(NodeId(3), Span::new(0, 1, 1, 1), NodeFlags::CONST);
        let debug = format!("{:?}", meta);
        assert!(debug.starts_with("#3@1:1"));
        assert!(debug.contains("CONST"));
    }
}
