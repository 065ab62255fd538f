//! Expression AST nodes for Zirconium.
//!
//! Provides nodes for:
//! - Literals (strings, numbers, booleans, interpolated strings)
//! - Names and accessors (identifiers, `.name`, `.0`, `[expr]`)
//! - Operators (binary, unary)
//! - Calls, in strict `f(a, b)` and command `f a b` form
//! - Aggregates (object and array literals, function expressions)
//! - Command options (`--name`, `--name value`)
//!
//! # Expression Precedence
//!
//! Binary operators are parsed by precedence climbing with these levels:
//! 1. Assignment (=) - right associative
//! 2. Logical OR (||)
//! 3. Logical AND (&&)
//! 4. Equality (==, !=)
//! 5. Relational (<, <=, >, >=)
//! 6. Additive (+, -)
//! 7. Multiplicative (*, /, %)
//!
//! Prefix `!` and `-` bind tighter, and postfix call, index and member
//! access bind tightest.

use zirconium_core::{NodeId, Span};

use super::node::{NodeKind, NodeMeta};
use super::ops::{BinaryOp, UnaryOp};
use super::stmt::{Block, Parameter};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// `"text"` or a bare word in command position
    String(&'ast StringLiteral<'ast>),
    /// `42`, `3.5`
    Number(&'ast NumberLiteral<'ast>),
    /// `true`, `false`
    Boolean(&'ast BooleanLiteral),
    /// `"hello $name"`
    Interpolated(&'ast InterpolatedString<'ast>),
    /// `$name` or `name`
    Identifier(&'ast Identifier<'ast>),
    /// `expr.name`
    PropertyAccess(&'ast PropertyAccessExpression<'ast>),
    /// `expr.0`
    ArrayIndex(&'ast ArrayIndexExpression<'ast>),
    /// `expr[arg]`
    ElementAccess(&'ast ElementAccessExpression<'ast>),
    /// `left op right`
    Binary(&'ast BinaryExpression<'ast>),
    /// `op operand`
    Unary(&'ast UnaryExpression<'ast>),
    /// `callee(a, b)`
    Call(&'ast CallExpression<'ast>),
    /// `callee a b`
    SimpleCall(&'ast SimpleCallExpression<'ast>),
    /// `function(a) { ... }`
    Function(&'ast FunctionExpression<'ast>),
    /// `{key: value}`
    Object(&'ast ObjectLiteralExpression<'ast>),
    /// `[a, b]`
    Array(&'ast ArrayLiteralExpression<'ast>),
    /// `--name value`
    Option(&'ast OptionExpression<'ast>),
    /// `--name`
    OptionKey(&'ast OptionKey<'ast>),
    /// `(expr)`
    Parenthesized(&'ast ParenthesizedExpression<'ast>),
    /// Placeholder for input that produced a diagnostic
    Invalid(&'ast InvalidNode<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Metadata of the wrapped node.
    pub fn meta(&self) -> &'ast NodeMeta {
        match *self {
            Self::String(e) => &e.meta,
            Self::Number(e) => &e.meta,
            Self::Boolean(e) => &e.meta,
            Self::Interpolated(e) => &e.meta,
            Self::Identifier(e) => &e.meta,
            Self::PropertyAccess(e) => &e.meta,
            Self::ArrayIndex(e) => &e.meta,
            Self::ElementAccess(e) => &e.meta,
            Self::Binary(e) => &e.meta,
            Self::Unary(e) => &e.meta,
            Self::Call(e) => &e.meta,
            Self::SimpleCall(e) => &e.meta,
            Self::Function(e) => &e.meta,
            Self::Object(e) => &e.meta,
            Self::Array(e) => &e.meta,
            Self::Option(e) => &e.meta,
            Self::OptionKey(e) => &e.meta,
            Self::Parenthesized(e) => &e.meta,
            Self::Invalid(e) => &e.meta,
        }
    }

    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        self.meta().span
    }

    /// Get the id of this expression.
    pub fn id(&self) -> NodeId {
        self.meta().id
    }

    /// The node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::String(_) => NodeKind::StringLiteral,
            Self::Number(_) => NodeKind::NumberLiteral,
            Self::Boolean(_) => NodeKind::BooleanLiteral,
            Self::Interpolated(_) => NodeKind::InterpolatedString,
            Self::Identifier(_) => NodeKind::Identifier,
            Self::PropertyAccess(_) => NodeKind::PropertyAccessExpression,
            Self::ArrayIndex(_) => NodeKind::ArrayIndexExpression,
            Self::ElementAccess(_) => NodeKind::ElementAccessExpression,
            Self::Binary(_) => NodeKind::BinaryExpression,
            Self::Unary(_) => NodeKind::UnaryExpression,
            Self::Call(_) => NodeKind::CallExpression,
            Self::SimpleCall(_) => NodeKind::SimpleCallExpression,
            Self::Function(_) => NodeKind::FunctionExpression,
            Self::Object(_) => NodeKind::ObjectLiteralExpression,
            Self::Array(_) => NodeKind::ArrayLiteralExpression,
            Self::Option(_) => NodeKind::OptionExpression,
            Self::OptionKey(_) => NodeKind::OptionKey,
            Self::Parenthesized(_) => NodeKind::ParenthesizedExpression,
            Self::Invalid(_) => NodeKind::Invalid,
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assignment_target(&self) -> bool {
        matches!(self, Self::Identifier(_) | Self::PropertyAccess(_))
    }

    /// Whether this expression may be invoked.
    pub fn is_callee(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::PropertyAccess(_)
                | Self::ArrayIndex(_)
                | Self::ElementAccess(_)
                | Self::Call(_)
                | Self::Parenthesized(_)
        )
    }

    /// Strip one level of parentheses.
    pub fn unparenthesized(self) -> Expr<'ast> {
        match self {
            Self::Parenthesized(p) => p.expression,
            other => other,
        }
    }
}

/// A string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral<'ast> {
    pub meta: NodeMeta,
    /// Decoded text.
    pub text: &'ast str,
}

/// A numeric literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral<'ast> {
    pub meta: NodeMeta,
    pub value: f64,
    /// Source spelling.
    pub raw: &'ast str,
}

/// A boolean literal.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub meta: NodeMeta,
    pub value: bool,
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolatedPart<'ast> {
    Text(&'ast StringLiteral<'ast>),
    Variable(&'ast Identifier<'ast>),
}

impl<'ast> InterpolatedPart<'ast> {
    /// View the part as an expression.
    pub fn as_expr(&self) -> Expr<'ast> {
        match *self {
            InterpolatedPart::Text(s) => Expr::String(s),
            InterpolatedPart::Variable(v) => Expr::Identifier(v),
        }
    }
}

/// A string with `$name` substitutions.
///
/// Parts alternate text and variable, starting and ending with text.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedString<'ast> {
    pub meta: NodeMeta,
    pub parts: &'ast [InterpolatedPart<'ast>],
}

/// A name reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier<'ast> {
    pub meta: NodeMeta,
    /// The name without any `$` prefix.
    pub name: &'ast str,
}

/// `expression.name`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessExpression<'ast> {
    pub meta: NodeMeta,
    pub expression: Expr<'ast>,
    pub name: &'ast Identifier<'ast>,
}

/// `expression.0`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndexExpression<'ast> {
    pub meta: NodeMeta,
    pub expression: Expr<'ast>,
    pub index: u32,
}

/// `expression[argument]`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAccessExpression<'ast> {
    pub meta: NodeMeta,
    pub expression: Expr<'ast>,
    pub argument: Expr<'ast>,
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression<'ast> {
    pub meta: NodeMeta,
    pub left: Expr<'ast>,
    pub op: BinaryOp,
    pub right: Expr<'ast>,
}

/// A prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression<'ast> {
    pub meta: NodeMeta,
    pub op: UnaryOp,
    pub operand: Expr<'ast>,
}

/// A call with parenthesized, comma-separated arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression<'ast> {
    pub meta: NodeMeta,
    pub callee: Expr<'ast>,
    pub arguments: &'ast [Expr<'ast>],
}

/// A command-style call with whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCallExpression<'ast> {
    pub meta: NodeMeta,
    pub callee: Expr<'ast>,
    pub arguments: &'ast [Expr<'ast>],
}

/// An anonymous function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression<'ast> {
    pub meta: NodeMeta,
    pub parameters: &'ast [&'ast Parameter<'ast>],
    pub body: &'ast Block<'ast>,
}

/// `{a: 1, b: 2}`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteralExpression<'ast> {
    pub meta: NodeMeta,
    pub properties: &'ast [&'ast PropertyAssignment<'ast>],
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAssignment<'ast> {
    pub meta: NodeMeta,
    pub name: &'ast str,
    pub initializer: Expr<'ast>,
}

/// `[a, b, c]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteralExpression<'ast> {
    pub meta: NodeMeta,
    pub elements: &'ast [Expr<'ast>],
}

/// A `--name` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionKey<'ast> {
    pub meta: NodeMeta,
    /// The option name without `--`.
    pub name: &'ast str,
}

/// A `--name value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionExpression<'ast> {
    pub meta: NodeMeta,
    pub option: &'ast OptionKey<'ast>,
    pub expression: Expr<'ast>,
}

/// `(expression)`
#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpression<'ast> {
    pub meta: NodeMeta,
    pub expression: Expr<'ast>,
}

/// Source the parser could not make sense of.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidNode<'ast> {
    pub meta: NodeMeta,
    pub text: &'ast str,
}
