//! Node construction.
//!
//! [`NodeFactory`] is the only way the parser builds nodes. It hands out
//! sequential [`NodeId`]s and derives each composite node's span from its
//! children, so callers only pass spans for leaves and delimiters.

use std::cell::Cell;

use bumpalo::Bump;
use zirconium_core::{NodeId, Span};

use super::expr::*;
use super::node::{NodeFlags, NodeMeta};
use super::ops::{BinaryOp, UnaryOp};
use super::stmt::*;

/// Arena-backed node builder.
pub struct NodeFactory<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
}

impl<'ast> NodeFactory<'ast> {
    /// Create a factory allocating into `arena`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
        }
    }

    /// The backing arena.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.next_id.get() as usize
    }

    fn meta(&self, span: Span, flags: NodeFlags) -> NodeMeta {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeMeta::new(NodeId(id), span, flags)
    }

    fn slice<T: Copy>(&self, items: &[T]) -> &'ast [T] {
        self.arena.alloc_slice_copy(items)
    }

    // =========================================
    // Literals and names
    // =========================================

    pub fn string_literal(&self, text: &'ast str, span: Span) -> &'ast StringLiteral<'ast> {
        self.arena.alloc(StringLiteral {
            meta: self.meta(span, NodeFlags::empty()),
            text,
        })
    }

    pub fn number_literal(&self, value: f64, raw: &'ast str, span: Span) -> &'ast NumberLiteral<'ast> {
        self.arena.alloc(NumberLiteral {
            meta: self.meta(span, NodeFlags::empty()),
            value,
            raw,
        })
    }

    pub fn boolean_literal(&self, value: bool, span: Span) -> &'ast BooleanLiteral {
        self.arena.alloc(BooleanLiteral {
            meta: self.meta(span, NodeFlags::empty()),
            value,
        })
    }

    pub fn interpolated_string(&self, parts: &[InterpolatedPart<'ast>], span: Span) -> &'ast InterpolatedString<'ast> {
        self.arena.alloc(InterpolatedString {
            meta: self.meta(span, NodeFlags::empty()),
            parts: self.slice(parts),
        })
    }

    pub fn identifier(&self, name: &'ast str, span: Span, flags: NodeFlags) -> &'ast Identifier<'ast> {
        self.arena.alloc(Identifier {
            meta: self.meta(span, flags),
            name,
        })
    }

    pub fn invalid(&self, text: &'ast str, span: Span) -> &'ast InvalidNode<'ast> {
        self.arena.alloc(InvalidNode {
            meta: self.meta(span, NodeFlags::ERROR),
            text,
        })
    }

    // =========================================
    // Accessors and operators
    // =========================================

    pub fn property_access(&self, expression: Expr<'ast>, name: &'ast Identifier<'ast>) -> Expr<'ast> {
        let span = expression.span().merge(name.meta.span);
        Expr::PropertyAccess(self.arena.alloc(PropertyAccessExpression {
            meta: self.meta(span, NodeFlags::empty()),
            expression,
            name,
        }))
    }

    pub fn array_index(&self, expression: Expr<'ast>, index: u32, index_span: Span) -> Expr<'ast> {
        let span = expression.span().merge(index_span);
        Expr::ArrayIndex(self.arena.alloc(ArrayIndexExpression {
            meta: self.meta(span, NodeFlags::empty()),
            expression,
            index,
        }))
    }

    pub fn element_access(&self, expression: Expr<'ast>, argument: Expr<'ast>, close: Span) -> Expr<'ast> {
        let span = expression.span().merge(close);
        Expr::ElementAccess(self.arena.alloc(ElementAccessExpression {
            meta: self.meta(span, NodeFlags::empty()),
            expression,
            argument,
        }))
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        let span = left.span().merge(right.span());
        Expr::Binary(self.arena.alloc(BinaryExpression {
            meta: self.meta(span, NodeFlags::empty()),
            left,
            op,
            right,
        }))
    }

    pub fn unary(&self, op: UnaryOp, op_span: Span, operand: Expr<'ast>) -> Expr<'ast> {
        let span = op_span.merge(operand.span());
        Expr::Unary(self.arena.alloc(UnaryExpression {
            meta: self.meta(span, NodeFlags::empty()),
            op,
            operand,
        }))
    }

    // =========================================
    // Calls and aggregates
    // =========================================

    pub fn call(&self, callee: Expr<'ast>, arguments: &[Expr<'ast>], close: Span) -> Expr<'ast> {
        let span = callee.span().merge(close);
        Expr::Call(self.arena.alloc(CallExpression {
            meta: self.meta(span, NodeFlags::empty()),
            callee,
            arguments: self.slice(arguments),
        }))
    }

    pub fn simple_call(&self, callee: Expr<'ast>, arguments: &[Expr<'ast>]) -> Expr<'ast> {
        let span = match arguments.last() {
            Some(last) => callee.span().merge(last.span()),
            None => callee.span(),
        };
        Expr::SimpleCall(self.arena.alloc(SimpleCallExpression {
            meta: self.meta(span, NodeFlags::empty()),
            callee,
            arguments: self.slice(arguments),
        }))
    }

    pub fn function_expression(
        &self,
        keyword: Span,
        parameters: &[&'ast Parameter<'ast>],
        body: &'ast Block<'ast>,
    ) -> Expr<'ast> {
        let span = keyword.merge(body.meta.span);
        Expr::Function(self.arena.alloc(FunctionExpression {
            meta: self.meta(span, NodeFlags::empty()),
            parameters: self.slice(parameters),
            body,
        }))
    }

    pub fn object_literal(&self, properties: &[&'ast PropertyAssignment<'ast>], span: Span) -> Expr<'ast> {
        Expr::Object(self.arena.alloc(ObjectLiteralExpression {
            meta: self.meta(span, NodeFlags::empty()),
            properties: self.slice(properties),
        }))
    }

    pub fn property_assignment(
        &self,
        name: &'ast str,
        name_span: Span,
        initializer: Expr<'ast>,
    ) -> &'ast PropertyAssignment<'ast> {
        let span = name_span.merge(initializer.span());
        self.arena.alloc(PropertyAssignment {
            meta: self.meta(span, NodeFlags::empty()),
            name,
            initializer,
        })
    }

    pub fn array_literal(&self, elements: &[Expr<'ast>], span: Span) -> Expr<'ast> {
        Expr::Array(self.arena.alloc(ArrayLiteralExpression {
            meta: self.meta(span, NodeFlags::empty()),
            elements: self.slice(elements),
        }))
    }

    pub fn option_key(&self, name: &'ast str, span: Span) -> &'ast OptionKey<'ast> {
        self.arena.alloc(OptionKey {
            meta: self.meta(span, NodeFlags::empty()),
            name,
        })
    }

    pub fn option_expression(&self, option: &'ast OptionKey<'ast>, expression: Expr<'ast>) -> Expr<'ast> {
        let span = option.meta.span.merge(expression.span());
        Expr::Option(self.arena.alloc(OptionExpression {
            meta: self.meta(span, NodeFlags::empty()),
            option,
            expression,
        }))
    }

    pub fn parenthesized(&self, expression: Expr<'ast>, span: Span) -> Expr<'ast> {
        Expr::Parenthesized(self.arena.alloc(ParenthesizedExpression {
            meta: self.meta(span, NodeFlags::empty()),
            expression,
        }))
    }

    // =========================================
    // Statements
    // =========================================

    pub fn source_file(&self, statements: &[Stmt<'ast>], span: Span) -> &'ast SourceFile<'ast> {
        self.arena.alloc(SourceFile {
            meta: self.meta(span, NodeFlags::empty()),
            statements: self.slice(statements),
        })
    }

    pub fn block(&self, statements: &[Stmt<'ast>], span: Span) -> &'ast Block<'ast> {
        self.arena.alloc(Block {
            meta: self.meta(span, NodeFlags::empty()),
            statements: self.slice(statements),
        })
    }

    pub fn expression_statement(&self, expression: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expression(self.arena.alloc(ExpressionStatement {
            meta: self.meta(expression.span(), NodeFlags::empty()),
            expression,
        }))
    }

    /// Build a variable statement and its declaration, both carrying `flags`.
    pub fn variable_statement(
        &self,
        start: Span,
        name: &'ast Identifier<'ast>,
        initializer: Expr<'ast>,
        flags: NodeFlags,
    ) -> &'ast VariableStatement<'ast> {
        let declaration = self.arena.alloc(VariableDeclaration {
            meta: self.meta(name.meta.span.merge(initializer.span()), flags),
            name,
            initializer,
        });
        self.arena.alloc(VariableStatement {
            meta: self.meta(start.merge(initializer.span()), flags),
            declaration,
        })
    }

    pub fn if_statement(
        &self,
        keyword: Span,
        condition: Expr<'ast>,
        then_statement: Stmt<'ast>,
        else_statement: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let end = else_statement.unwrap_or(then_statement).span();
        Stmt::If(self.arena.alloc(IfStatement {
            meta: self.meta(keyword.merge(end), NodeFlags::empty()),
            condition,
            then_statement,
            else_statement,
        }))
    }

    pub fn for_in_statement(
        &self,
        keyword: Span,
        initializer: &'ast Identifier<'ast>,
        expression: Expr<'ast>,
        body: &'ast Block<'ast>,
    ) -> Stmt<'ast> {
        Stmt::ForIn(self.arena.alloc(ForInStatement {
            meta: self.meta(keyword.merge(body.meta.span), NodeFlags::empty()),
            initializer,
            expression,
            body,
        }))
    }

    pub fn function_declaration(
        &self,
        keyword: Span,
        name: &'ast Identifier<'ast>,
        parameters: &[&'ast Parameter<'ast>],
        body: &'ast Block<'ast>,
    ) -> &'ast FunctionDeclaration<'ast> {
        self.arena.alloc(FunctionDeclaration {
            meta: self.meta(keyword.merge(body.meta.span), NodeFlags::empty()),
            name,
            parameters: self.slice(parameters),
            body,
        })
    }

    pub fn parameter(&self, name: &'ast Identifier<'ast>) -> &'ast Parameter<'ast> {
        self.arena.alloc(Parameter {
            meta: self.meta(name.meta.span, NodeFlags::empty()),
            name,
        })
    }

    pub fn return_statement(&self, keyword: Span, expression: Option<Expr<'ast>>) -> &'ast ReturnStatement<'ast> {
        let span = match expression {
            Some(expr) => keyword.merge(expr.span()),
            None => keyword,
        };
        self.arena.alloc(ReturnStatement {
            meta: self.meta(span, NodeFlags::empty()),
            expression,
        })
    }

    pub fn enum_declaration(
        &self,
        name: &'ast Identifier<'ast>,
        items: &[&'ast EnumItemExpression<'ast>],
        span: Span,
    ) -> &'ast EnumDeclaration<'ast> {
        self.arena.alloc(EnumDeclaration {
            meta: self.meta(span, NodeFlags::empty()),
            name,
            items: self.slice(items),
        })
    }

    pub fn enum_item(&self, name: &'ast Identifier<'ast>, index: u32) -> &'ast EnumItemExpression<'ast> {
        self.arena.alloc(EnumItemExpression {
            meta: self.meta(name.meta.span, NodeFlags::empty()),
            name,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let a = factory.identifier("a", Span::new(0, 1, 1, 1), NodeFlags::empty());
        let b = factory.identifier("b", Span::new(4, 5, 1, 5), NodeFlags::empty());
        assert_eq!(a.meta.id, NodeId(0));
        assert_eq!(b.meta.id, NodeId(1));
        assert_eq!(factory.node_count(), 2);
    }

    #[test]
    fn binary_span_covers_operands() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let left = Expr::Number(factory.number_literal(1.0, "1", Span::new(0, 1, 1, 1)));
        let right = Expr::Number(factory.number_literal(2.0, "2", Span::new(4, 5, 1, 5)));
        let sum = factory.binary(left, BinaryOp::Add, right);
        assert_eq!(sum.span().start, 0);
        assert_eq!(sum.span().end, 5);
    }

    #[test]
    fn simple_call_span_without_arguments() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let callee = Expr::Identifier(factory.identifier("ls", Span::new(2, 4, 1, 3), NodeFlags::empty()));
        let call = factory.simple_call(callee, &[]);
        assert_eq!(call.span(), callee.span());
    }

    #[test]
    fn variable_statement_flags_on_both_nodes() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let name = factory.identifier("x", Span::new(6, 7, 1, 7), NodeFlags::empty());
        let value = Expr::Boolean(factory.boolean_literal(true, Span::new(10, 14, 1, 11)));
        let stmt = factory.variable_statement(Span::new(0, 5, 1, 1), name, value, NodeFlags::CONST);
        assert!(stmt.is_const());
        assert!(stmt.declaration.meta.flags().contains(NodeFlags::CONST));
        assert_eq!(stmt.meta.span.end, 14);
    }
}
