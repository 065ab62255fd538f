//! Statement lowering.

use zirconium_parser::ast::{Block, FunctionDeclaration, IfStatement, ReturnStatement, Stmt};

use super::{Compiler, Result};
use crate::bytecode::OpCode;

impl<'ast> Compiler<'ast> {
    pub(super) fn compile_stmt(&mut self, stmt: Stmt<'ast>) -> Result<()> {
        self.emitter.set_line(stmt.span().line);
        match stmt {
            Stmt::Block(block) => self.compile_block(block),
            Stmt::Expression(s) => self.compile_expr(s.expression),
            Stmt::Variable(s) => {
                self.compile_expr(s.declaration.initializer)?;
                self.emitter
                    .emit_named(OpCode::SetUpvalue, s.declaration.name.name);
                Ok(())
            }
            Stmt::If(s) => self.compile_if(s),
            Stmt::Function(func) => self.compile_function(func),
            Stmt::Return(s) => self.compile_return(s),
            Stmt::ForIn(s) => Err(Self::unsupported("for-in loop", s.meta.span)),
            Stmt::Enum(e) => Err(Self::unsupported("enum declaration", e.meta.span)),
            Stmt::Invalid(node) => Err(Self::unsupported("invalid statement", node.meta.span)),
        }
    }

    /// Blocks share the enclosing variable namespace in bytecode.
    fn compile_block(&mut self, block: &'ast Block<'ast>) -> Result<()> {
        for stmt in block.statements {
            self.compile_stmt(*stmt)?;
        }
        Ok(())
    }

    /// `cond; JMPIFK then; else; JMPK end; then: body; end:`
    fn compile_if(&mut self, stmt: &'ast IfStatement<'ast>) -> Result<()> {
        let then_label = self.emitter.new_label("then");
        let end_label = self.emitter.new_label("endif");

        self.compile_expr(stmt.condition)?;
        self.emitter.emit_jump(OpCode::JmpIfK, &then_label);
        if let Some(else_stmt) = stmt.else_statement {
            self.compile_stmt(else_stmt)?;
        }
        self.emitter.emit_jump(OpCode::JmpK, &end_label);

        self.emitter.mark_label(&then_label);
        self.compile_stmt(stmt.then_statement)?;
        self.emitter.mark_label(&end_label);
        Ok(())
    }

    /// `JMPK skip; name: SETUPVALUE params (reversed); body; RET 0; skip:`
    fn compile_function(&mut self, func: &'ast FunctionDeclaration<'ast>) -> Result<()> {
        let skip_label = self.emitter.new_label("skip");
        self.emitter.emit_jump(OpCode::JmpK, &skip_label);
        self.emitter.mark_label(func.name.name);

        self.function_depth += 1;
        for param in func.parameters.iter().rev() {
            self.emitter.emit_named(OpCode::SetUpvalue, param.name.name);
        }
        let body = self.compile_block(func.body);
        self.function_depth -= 1;
        body?;

        self.emitter.emit_with(OpCode::Ret, &[0]);
        self.emitter.mark_label(&skip_label);
        Ok(())
    }

    fn compile_return(&mut self, stmt: &'ast ReturnStatement<'ast>) -> Result<()> {
        if self.function_depth == 0 {
            return Err(Self::unsupported("return outside a function", stmt.meta.span));
        }
        match stmt.expression {
            Some(expr) => {
                self.compile_expr(expr)?;
                self.emitter.emit_with(OpCode::Ret, &[1]);
            }
            None => self.emitter.emit_with(OpCode::Ret, &[0]),
        }
        Ok(())
    }
}
