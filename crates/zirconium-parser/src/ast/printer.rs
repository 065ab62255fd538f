//! Source pretty-printer.
//!
//! Output re-parses to a structurally identical tree: same node kinds in the
//! same order with the same literal values. Layout is normalised to one
//! statement per line and two-space indentation.

use super::expr::*;
use super::node::NodeFlags;
use super::stmt::*;
use crate::lexer::{is_ident_continue, is_ident_start, is_reserved};

/// Render a whole file.
pub fn print_source_file(file: &SourceFile<'_>) -> String {
    let mut printer = Printer::default();
    printer.statements(file.statements);
    printer.out
}

/// Render a single expression in strict context.
pub fn print_expression(expr: Expr<'_>) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn statements(&mut self, statements: &[Stmt<'_>]) {
        for (i, stmt) in statements.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.stmt(*stmt);
        }
    }

    fn block(&mut self, block: &Block<'_>) {
        self.out.push('{');
        self.indent += 1;
        for stmt in block.statements {
            self.newline();
            self.stmt(*stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: Stmt<'_>) {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::Expression(s) => match s.expression {
                Expr::SimpleCall(call) => self.simple_call(call),
                other => self.expr(other),
            },
            Stmt::Variable(s) => self.variable(s),
            Stmt::If(s) => self.if_statement(s),
            Stmt::ForIn(s) => {
                self.out.push_str("for (");
                self.out.push_str(s.initializer.name);
                self.out.push_str(" in ");
                self.expr(s.expression);
                self.out.push_str(") ");
                self.block(s.body);
            }
            Stmt::Function(f) => {
                self.export_prefix(f.meta.flags());
                self.out.push_str("function ");
                self.out.push_str(f.name.name);
                self.parameters(f.parameters);
                self.out.push(' ');
                self.block(f.body);
            }
            Stmt::Return(s) => {
                self.out.push_str("return");
                if let Some(expr) = s.expression {
                    self.out.push(' ');
                    self.expr(expr);
                }
            }
            Stmt::Enum(e) => {
                self.export_prefix(e.meta.flags());
                self.out.push_str("enum ");
                self.out.push_str(e.name.name);
                self.out.push_str(" {");
                for (i, item) in e.items.iter().enumerate() {
                    self.out.push_str(if i == 0 { " " } else { ", " });
                    self.out.push_str(item.name.name);
                }
                self.out.push_str(" }");
            }
            Stmt::Invalid(_) => {}
        }
    }

    fn export_prefix(&mut self, flags: NodeFlags) {
        if flags.contains(NodeFlags::EXPORT) {
            self.out.push_str("export ");
        }
    }

    fn variable(&mut self, stmt: &VariableStatement<'_>) {
        let flags = stmt.meta.flags();
        self.export_prefix(flags);
        if flags.contains(NodeFlags::CONST) {
            self.out.push_str("const ");
        } else if flags.contains(NodeFlags::LET) {
            self.out.push_str("let ");
        }
        self.out.push_str(stmt.declaration.name.name);
        self.out.push_str(" = ");
        self.expr(stmt.declaration.initializer);
    }

    fn if_statement(&mut self, stmt: &IfStatement<'_>) {
        self.out.push_str("if ");
        self.expr(stmt.condition);
        self.branch(stmt.then_statement);
        if let Some(else_stmt) = stmt.else_statement {
            self.out.push_str(" else");
            match else_stmt {
                Stmt::If(nested) => {
                    self.out.push(' ');
                    self.if_statement(nested);
                }
                other => self.branch(other),
            }
        }
    }

    fn branch(&mut self, stmt: Stmt<'_>) {
        match stmt {
            Stmt::Block(block) => {
                self.out.push(' ');
                self.block(block);
            }
            other => {
                self.out.push_str(": ");
                self.stmt(other);
            }
        }
    }

    fn parameters(&mut self, parameters: &[&Parameter<'_>]) {
        self.out.push('(');
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(param.name.name);
        }
        self.out.push(')');
    }

    fn identifier(&mut self, ident: &Identifier<'_>) {
        if ident.meta.flags().contains(NodeFlags::VARIABLE) {
            self.out.push('$');
        }
        self.out.push_str(ident.name);
    }

    fn simple_call(&mut self, call: &SimpleCallExpression<'_>) {
        self.expr(call.callee);
        for arg in call.arguments {
            self.out.push(' ');
            self.expr(*arg);
        }
    }

    fn list(&mut self, items: &[Expr<'_>]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(*item);
        }
    }

    fn expr(&mut self, expr: Expr<'_>) {
        match expr {
            Expr::String(s) => self.quoted(s.text),
            Expr::Number(n) => self.out.push_str(&format_number(n.value)),
            Expr::Boolean(b) => self.out.push_str(if b.value { "true" } else { "false" }),
            Expr::Interpolated(s) => {
                self.out.push('"');
                for part in s.parts {
                    match part {
                        InterpolatedPart::Text(text) => self.out.push_str(&escape(text.text)),
                        InterpolatedPart::Variable(var) => {
                            self.out.push('$');
                            self.out.push_str(var.name);
                        }
                    }
                }
                self.out.push('"');
            }
            Expr::Identifier(ident) => self.identifier(ident),
            Expr::PropertyAccess(p) => {
                self.expr(p.expression);
                self.out.push('.');
                self.out.push_str(p.name.name);
            }
            Expr::ArrayIndex(a) => {
                self.expr(a.expression);
                self.out.push('.');
                self.out.push_str(&a.index.to_string());
            }
            Expr::ElementAccess(e) => {
                self.expr(e.expression);
                self.out.push('[');
                self.expr(e.argument);
                self.out.push(']');
            }
            Expr::Binary(b) => {
                self.expr(b.left);
                self.out.push(' ');
                self.out.push_str(b.op.as_str());
                self.out.push(' ');
                self.expr(b.right);
            }
            Expr::Unary(u) => {
                self.out.push_str(u.op.as_str());
                if matches!(u.operand, Expr::Unary(_)) {
                    self.out.push(' ');
                }
                self.expr(u.operand);
            }
            Expr::Call(c) => {
                self.expr(c.callee);
                self.out.push('(');
                self.list(c.arguments);
                self.out.push(')');
            }
            Expr::SimpleCall(c) => self.simple_call(c),
            Expr::Function(f) => {
                self.out.push_str("function");
                self.parameters(f.parameters);
                self.out.push(' ');
                self.block(f.body);
            }
            Expr::Object(o) => {
                self.out.push('{');
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    if is_plain_word(prop.name) {
                        self.out.push_str(prop.name);
                    } else {
                        self.quoted(prop.name);
                    }
                    self.out.push_str(": ");
                    self.expr(prop.initializer);
                }
                self.out.push('}');
            }
            Expr::Array(a) => {
                self.out.push('[');
                self.list(a.elements);
                self.out.push(']');
            }
            Expr::Option(o) => {
                self.out.push_str("--");
                self.out.push_str(o.option.name);
                self.out.push(' ');
                self.expr(o.expression);
            }
            Expr::OptionKey(k) => {
                self.out.push_str("--");
                self.out.push_str(k.name);
            }
            Expr::Parenthesized(p) => {
                self.out.push('(');
                self.expr(p.expression);
                self.out.push(')');
            }
            Expr::Invalid(_) => {}
        }
    }

    fn quoted(&mut self, text: &str) {
        self.out.push('"');
        self.out.push_str(&escape(text));
        self.out.push('"');
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn is_plain_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue) && !is_reserved(text)
}

/// Format a number the way scripts see it: integral values without a
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
