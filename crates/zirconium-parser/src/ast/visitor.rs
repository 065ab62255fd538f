//! Visitor pattern for traversing the AST.
//!
//! This module provides a `Visitor` trait and corresponding `walk_*` functions
//! that enable traversal and analysis of Zirconium AST nodes.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use zirconium_parser::ast::{FunctionDeclaration, Visitor, walk_function_declaration};
//! use zirconium_parser::{ParserOptions, parse};
//!
//! struct FunctionCounter {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for FunctionCounter {
//!     fn visit_function_declaration(&mut self, func: &'ast FunctionDeclaration<'ast>) {
//!         self.count += 1;
//!         walk_function_declaration(self, func);
//!     }
//! }
//!
//! let arena = Bump::new();
//! let file = parse("function a() {}\nfunction b() {}", &arena, ParserOptions::default());
//! let mut counter = FunctionCounter { count: 0 };
//! counter.visit_source_file(file);
//! assert_eq!(counter.count, 2);
//! ```

use super::expr::*;
use super::stmt::*;

/// Visitor trait for traversing AST nodes.
///
/// The default implementations call the corresponding `walk_*` function to
/// continue traversal. Override any `visit_*` method to customize behavior
/// for specific node types.
pub trait Visitor<'ast>: Sized {
    // === Statements ===

    /// Visit the root node.
    fn visit_source_file(&mut self, file: &'ast SourceFile<'ast>) {
        walk_source_file(self, file);
    }

    /// Visit any statement.
    fn visit_stmt(&mut self, stmt: Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &'ast Block<'ast>) {
        walk_block(self, block);
    }

    fn visit_variable_statement(&mut self, stmt: &'ast VariableStatement<'ast>) {
        walk_variable_statement(self, stmt);
    }

    fn visit_if_statement(&mut self, stmt: &'ast IfStatement<'ast>) {
        walk_if_statement(self, stmt);
    }

    fn visit_for_in_statement(&mut self, stmt: &'ast ForInStatement<'ast>) {
        walk_for_in_statement(self, stmt);
    }

    fn visit_function_declaration(&mut self, func: &'ast FunctionDeclaration<'ast>) {
        walk_function_declaration(self, func);
    }

    fn visit_parameter(&mut self, param: &'ast Parameter<'ast>) {
        self.visit_identifier(param.name);
    }

    fn visit_return_statement(&mut self, stmt: &'ast ReturnStatement<'ast>) {
        if let Some(expr) = stmt.expression {
            self.visit_expr(expr);
        }
    }

    fn visit_enum_declaration(&mut self, decl: &'ast EnumDeclaration<'ast>) {
        walk_enum_declaration(self, decl);
    }

    // === Expressions ===

    /// Visit any expression.
    fn visit_expr(&mut self, expr: Expr<'ast>) {
        walk_expr(self, expr);
    }

    fn visit_identifier(&mut self, _ident: &'ast Identifier<'ast>) {}

    fn visit_call(&mut self, call: &'ast CallExpression<'ast>) {
        self.visit_expr(call.callee);
        for arg in call.arguments {
            self.visit_expr(*arg);
        }
    }

    fn visit_simple_call(&mut self, call: &'ast SimpleCallExpression<'ast>) {
        self.visit_expr(call.callee);
        for arg in call.arguments {
            self.visit_expr(*arg);
        }
    }

    fn visit_function_expression(&mut self, func: &'ast FunctionExpression<'ast>) {
        walk_function_expression(self, func);
    }
}

// ============================================================================
// Walk Functions - Statements
// ============================================================================

pub fn walk_source_file<'ast, V: Visitor<'ast>>(visitor: &mut V, file: &'ast SourceFile<'ast>) {
    for stmt in file.statements {
        visitor.visit_stmt(*stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: Stmt<'ast>) {
    match stmt {
        Stmt::Block(block) => visitor.visit_block(block),
        Stmt::Expression(s) => visitor.visit_expr(s.expression),
        Stmt::Variable(s) => visitor.visit_variable_statement(s),
        Stmt::If(s) => visitor.visit_if_statement(s),
        Stmt::ForIn(s) => visitor.visit_for_in_statement(s),
        Stmt::Function(f) => visitor.visit_function_declaration(f),
        Stmt::Return(s) => visitor.visit_return_statement(s),
        Stmt::Enum(e) => visitor.visit_enum_declaration(e),
        Stmt::Invalid(_) => {}
    }
}

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast Block<'ast>) {
    for stmt in block.statements {
        visitor.visit_stmt(*stmt);
    }
}

pub fn walk_variable_statement<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast VariableStatement<'ast>) {
    visitor.visit_expr(stmt.declaration.initializer);
    visitor.visit_identifier(stmt.declaration.name);
}

pub fn walk_if_statement<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast IfStatement<'ast>) {
    visitor.visit_expr(stmt.condition);
    visitor.visit_stmt(stmt.then_statement);
    if let Some(else_stmt) = stmt.else_statement {
        visitor.visit_stmt(else_stmt);
    }
}

pub fn walk_for_in_statement<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast ForInStatement<'ast>) {
    visitor.visit_expr(stmt.expression);
    visitor.visit_identifier(stmt.initializer);
    visitor.visit_block(stmt.body);
}

pub fn walk_function_declaration<'ast, V: Visitor<'ast>>(visitor: &mut V, func: &'ast FunctionDeclaration<'ast>) {
    visitor.visit_identifier(func.name);
    for param in func.parameters {
        visitor.visit_parameter(param);
    }
    visitor.visit_block(func.body);
}

pub fn walk_enum_declaration<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast EnumDeclaration<'ast>) {
    visitor.visit_identifier(decl.name);
    for item in decl.items {
        visitor.visit_identifier(item.name);
    }
}

// ============================================================================
// Walk Functions - Expressions
// ============================================================================

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: Expr<'ast>) {
    match expr {
        Expr::String(_) | Expr::Number(_) | Expr::Boolean(_) | Expr::OptionKey(_) | Expr::Invalid(_) => {}
        Expr::Interpolated(s) => {
            for part in s.parts {
                if let InterpolatedPart::Variable(ident) = *part {
                    visitor.visit_identifier(ident);
                }
            }
        }
        Expr::Identifier(ident) => visitor.visit_identifier(ident),
        Expr::PropertyAccess(p) => visitor.visit_expr(p.expression),
        Expr::ArrayIndex(a) => visitor.visit_expr(a.expression),
        Expr::ElementAccess(e) => {
            visitor.visit_expr(e.expression);
            visitor.visit_expr(e.argument);
        }
        Expr::Binary(b) => {
            visitor.visit_expr(b.left);
            visitor.visit_expr(b.right);
        }
        Expr::Unary(u) => visitor.visit_expr(u.operand),
        Expr::Call(c) => visitor.visit_call(c),
        Expr::SimpleCall(c) => visitor.visit_simple_call(c),
        Expr::Function(f) => visitor.visit_function_expression(f),
        Expr::Object(o) => {
            for prop in o.properties {
                visitor.visit_expr(prop.initializer);
            }
        }
        Expr::Array(a) => {
            for element in a.elements {
                visitor.visit_expr(*element);
            }
        }
        Expr::Option(o) => visitor.visit_expr(o.expression),
        Expr::Parenthesized(p) => visitor.visit_expr(p.expression),
    }
}

pub fn walk_function_expression<'ast, V: Visitor<'ast>>(visitor: &mut V, func: &'ast FunctionExpression<'ast>) {
    for param in func.parameters {
        visitor.visit_parameter(param);
    }
    visitor.visit_block(func.body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParserOptions, parse};
    use bumpalo::Bump;

    #[derive(Default)]
    struct Names {
        seen: Vec<String>,
    }

    impl<'ast> Visitor<'ast> for Names {
        fn visit_identifier(&mut self, ident: &'ast Identifier<'ast>) {
            self.seen.push(ident.name.to_string());
        }
    }

    #[test]
    fn visits_identifiers_in_order() {
        let arena = Bump::new();
        let file = parse("$x = $y + 1\nprint \"hi $z\"", &arena, ParserOptions::default());
        let mut names = Names::default();
        names.visit_source_file(file);
        assert_eq!(names.seen, vec!["y", "x", "print", "z"]);
    }

    #[test]
    fn visits_into_function_bodies() {
        let arena = Bump::new();
        let source = "function f(a) {\n  if $a { return $b }\n}";
        let file = parse(source, &arena, ParserOptions::default());
        let mut names = Names::default();
        names.visit_source_file(file);
        assert_eq!(names.seen, vec!["f", "a", "a", "b"]);
    }
}
