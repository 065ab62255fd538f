//! AST to bytecode lowering.
//!
//! The [`Compiler`] walks a [`SourceFile`] and emits one [`ZrChunk`]. Script
//! functions are emitted inline behind a jump and bound to a label carrying
//! the function's name, so `CALLK name` resolves them the same way it
//! resolves host natives.
//!
//! Calls to script functions are padded with `LOADNONE` up to the declared
//! parameter count, which is collected before lowering starts.

mod expr;
mod stmt;

use rustc_hash::FxHashMap;
use zirconium_core::{CompileError, Span};
use zirconium_parser::ast::{FunctionDeclaration, SourceFile, Visitor, walk_function_declaration};

use crate::bytecode::ZrChunk;
use crate::emit::ChunkEmitter;

type Result<T> = std::result::Result<T, CompileError>;

/// Compile `file` to a chunk.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile<'ast>(file: &'ast SourceFile<'ast>) -> Result<ZrChunk> {
    let mut compiler = Compiler::new();
    compiler.compile_source_file(file)?;
    Ok(compiler.finish())
}

/// Lowers statements and expressions into a [`ChunkEmitter`].
pub struct Compiler<'ast> {
    emitter: ChunkEmitter,
    /// Parameter counts of script functions by name.
    functions: FxHashMap<&'ast str, usize>,
    /// Nesting depth of function bodies being compiled.
    function_depth: usize,
}

impl Default for Compiler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Compiler<'ast> {
    pub fn new() -> Self {
        Self {
            emitter: ChunkEmitter::new(),
            functions: FxHashMap::default(),
            function_depth: 0,
        }
    }

    /// Compile every statement of `file`.
    pub fn compile_source_file(&mut self, file: &'ast SourceFile<'ast>) -> Result<()> {
        let mut collector = FunctionCollector {
            functions: &mut self.functions,
        };
        collector.visit_source_file(file);

        for stmt in file.statements {
            self.compile_stmt(*stmt)?;
        }
        Ok(())
    }

    pub fn finish(self) -> ZrChunk {
        self.emitter.finish()
    }

    fn unsupported(construct: &'static str, span: Span) -> CompileError {
        CompileError::Unsupported { construct, span }
    }

    fn operand(value: usize, span: Span) -> Result<u32> {
        u32::try_from(value).map_err(|_| CompileError::OperandOverflow { value, span })
    }
}

/// Records the parameter count of every function declaration.
struct FunctionCollector<'a, 'ast> {
    functions: &'a mut FxHashMap<&'ast str, usize>,
}

impl<'ast> Visitor<'ast> for FunctionCollector<'_, 'ast> {
    fn visit_function_declaration(&mut self, func: &'ast FunctionDeclaration<'ast>) {
        self.functions.insert(func.name.name, func.parameters.len());
        walk_function_declaration(self, func);
    }
}
