//! Expression lowering.
//!
//! Every compiled expression leaves exactly one value on the stack.

use zirconium_core::{CompileError, Span};
use zirconium_parser::ast::{BinaryExpression, BinaryOp, Expr, UnaryOp};

use super::{Compiler, Result};
use crate::bytecode::{Constant, OpCode};

impl<'ast> Compiler<'ast> {
    pub(super) fn compile_expr(&mut self, expr: Expr<'ast>) -> Result<()> {
        match expr {
            Expr::String(s) => self.emitter.emit_constant(Constant::String(s.text.to_string())),
            Expr::Number(n) => self.emitter.emit_constant(Constant::Number(n.value)),
            Expr::Boolean(b) => self.emitter.emit_constant(Constant::Boolean(b.value)),
            Expr::Identifier(ident) => self.emitter.emit_named(OpCode::GetGlobal, ident.name),
            Expr::PropertyAccess(p) => {
                self.compile_expr(p.expression)?;
                self.emitter.emit_named(OpCode::GetProperty, p.name.name);
            }
            Expr::ArrayIndex(a) => {
                self.compile_expr(a.expression)?;
                self.emitter.emit_with(OpCode::GetIndex, &[a.index]);
            }
            Expr::ElementAccess(e) => {
                self.compile_expr(e.expression)?;
                match e.argument.unparenthesized() {
                    Expr::Number(n) if n.value >= 0.0 && n.value.fract() == 0.0 && n.value <= u32::MAX as f64 => {
                        self.emitter.emit_with(OpCode::GetIndex, &[n.value as u32]);
                    }
                    Expr::String(s) => self.emitter.emit_named(OpCode::GetProperty, s.text),
                    _ => return Err(Self::unsupported("computed element access", e.meta.span)),
                }
            }
            Expr::Binary(b) => self.compile_binary(b)?,
            Expr::Unary(u) => match (u.op, u.operand.unparenthesized()) {
                (UnaryOp::Neg, Expr::Number(n)) => self.emitter.emit_constant(Constant::Number(-n.value)),
                _ => return Err(Self::unsupported("unary expression", u.meta.span)),
            },
            Expr::Call(c) => self.compile_call(c.callee, c.arguments, c.meta.span)?,
            Expr::SimpleCall(c) => self.compile_call(c.callee, c.arguments, c.meta.span)?,
            Expr::Object(o) => {
                for prop in o.properties {
                    self.emitter.emit_constant(Constant::String(prop.name.to_string()));
                    self.compile_expr(prop.initializer)?;
                }
                let count = Self::operand(o.properties.len(), o.meta.span)?;
                self.emitter.emit_with(OpCode::NewObject, &[count]);
            }
            Expr::Array(a) => {
                for element in a.elements {
                    self.compile_expr(*element)?;
                }
                let count = Self::operand(a.elements.len(), a.meta.span)?;
                self.emitter.emit_with(OpCode::NewArray, &[count]);
            }
            Expr::Parenthesized(p) => self.compile_expr(p.expression)?,
            Expr::Interpolated(s) => return Err(Self::unsupported("interpolated string", s.meta.span)),
            Expr::Function(f) => return Err(Self::unsupported("function expression", f.meta.span)),
            Expr::Option(o) => return Err(Self::unsupported("command option", o.meta.span)),
            Expr::OptionKey(k) => return Err(Self::unsupported("command option", k.meta.span)),
            Expr::Invalid(node) => return Err(Self::unsupported("invalid expression", node.meta.span)),
        }
        Ok(())
    }

    fn compile_binary(&mut self, b: &'ast BinaryExpression<'ast>) -> Result<()> {
        let op = match b.op {
            BinaryOp::Assign => return self.compile_assignment(b),
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Sub,
            BinaryOp::Mul => OpCode::Mul,
            BinaryOp::Div => OpCode::Div,
            other => return Err(Self::unsupported(other.as_str(), b.meta.span)),
        };
        self.compile_expr(b.left)?;
        self.compile_expr(b.right)?;
        self.emitter.emit(op);
        Ok(())
    }

    /// Store, then reload so the assignment has a value.
    fn compile_assignment(&mut self, b: &'ast BinaryExpression<'ast>) -> Result<()> {
        let Expr::Identifier(target) = b.left else {
            return Err(Self::unsupported("property assignment", b.meta.span));
        };
        self.compile_expr(b.right)?;
        self.emitter.emit_named(OpCode::SetUpvalue, target.name);
        self.emitter.emit_named(OpCode::GetGlobal, target.name);
        Ok(())
    }

    fn compile_call(&mut self, callee: Expr<'ast>, arguments: &'ast [Expr<'ast>], span: Span) -> Result<()> {
        let Expr::Identifier(name) = callee.unparenthesized() else {
            return Err(CompileError::InvalidCallTarget { span });
        };

        for arg in arguments {
            self.compile_expr(*arg)?;
        }

        let mut argc = arguments.len();
        if let Some(&params) = self.functions.get(name.name) {
            if argc > params {
                return Err(Self::unsupported("extra arguments to a script function", span));
            }
            for _ in argc..params {
                self.emitter.emit(OpCode::LoadNone);
            }
            argc = params;
        }

        let argc = Self::operand(argc, span)?;
        self.emitter.emit_call(name.name, argc);
        Ok(())
    }
}
