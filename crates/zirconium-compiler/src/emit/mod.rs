//! Bytecode emitter for the Zirconium compiler.
//!
//! The [`ChunkEmitter`] wraps a [`ZrChunk`] and provides the operations the
//! compiler needs: constant loads, named jumps and calls, and label binding.
//!
//! # Example
//!
//! ```
//! use zirconium_compiler::bytecode::{Constant, OpCode};
//! use zirconium_compiler::emit::ChunkEmitter;
//!
//! let mut emitter = ChunkEmitter::new();
//! emitter.set_line(1);
//! emitter.emit_constant(Constant::Number(2.0));
//! emitter.emit_constant(Constant::Number(3.0));
//! emitter.emit(OpCode::Add);
//!
//! let chunk = emitter.finish();
//! chunk.assert_opcodes(&[OpCode::LoadK, OpCode::LoadK, OpCode::Add]);
//! ```

mod labels;

pub use labels::LabelAllocator;

use crate::bytecode::{Constant, OpCode, ZrChunk};

/// Emits bytecode instructions into a single chunk.
pub struct ChunkEmitter {
    /// The chunk being built
    chunk: ZrChunk,

    /// Generated label names
    labels: LabelAllocator,

    /// Current source line for debug info
    current_line: u32,
}

impl Default for ChunkEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkEmitter {
    pub fn new() -> Self {
        Self {
            chunk: ZrChunk::new(),
            labels: LabelAllocator::new(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        self.emit_with(op, &[]);
    }

    /// Emit an opcode followed by its operands.
    pub fn emit_with(&mut self, op: OpCode, operands: &[u32]) {
        debug_assert_eq!(operands.len(), op.arity(), "operand count for {}", op.name());
        self.chunk.write_op(op, self.current_line);
        for &operand in operands {
            self.chunk.write_operand(operand, self.current_line);
        }
    }

    /// Add a constant to the pool without emitting anything.
    pub fn add_constant(&mut self, constant: Constant) -> u32 {
        self.chunk.constants_mut().add(constant)
    }

    /// Emit `LOADK` for `constant`.
    pub fn emit_constant(&mut self, constant: Constant) {
        let index = self.add_constant(constant);
        self.emit_with(OpCode::LoadK, &[index]);
    }

    /// Emit an instruction whose single operand names something.
    pub fn emit_named(&mut self, op: OpCode, name: &str) {
        let index = self.add_constant(Constant::String(name.to_string()));
        self.emit_with(op, &[index]);
    }

    // ==========================================================================
    // Control Flow
    // ==========================================================================

    /// A fresh generated label name.
    pub fn new_label(&mut self, prefix: &str) -> String {
        self.labels.fresh(prefix)
    }

    /// Bind `name` to the next instruction.
    pub fn mark_label(&mut self, name: &str) {
        self.chunk.add_label(name);
    }

    /// Emit `JMPK` or `JMPIFK` to `label`.
    pub fn emit_jump(&mut self, op: OpCode, label: &str) {
        debug_assert!(matches!(op, OpCode::JmpK | OpCode::JmpIfK));
        self.emit_named(op, label);
    }

    /// Emit `CALLK name argc`.
    pub fn emit_call(&mut self, name: &str, argc: u32) {
        let index = self.add_constant(Constant::String(name.to_string()));
        self.emit_with(OpCode::CallK, &[index, argc]);
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Number of words emitted so far.
    pub fn len(&self) -> usize {
        self.chunk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }

    /// Finish and return the chunk.
    pub fn finish(self) -> ZrChunk {
        self.chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_shared() {
        let mut emitter = ChunkEmitter::new();
        emitter.emit_constant(Constant::Number(1.0));
        emitter.emit_constant(Constant::Number(1.0));
        let chunk = emitter.finish();
        assert_eq!(chunk.constants().len(), 1);
        assert_eq!(chunk.instructions(), &[0, 0, 0, 0]);
    }

    #[test]
    fn call_has_name_and_argc() {
        let mut emitter = ChunkEmitter::new();
        emitter.emit_call("print", 2);
        let chunk = emitter.finish();
        assert_eq!(chunk.instructions(), &[OpCode::CallK.word(), 0, 2]);
        assert_eq!(chunk.string_constant(0), Some("print"));
    }

    #[test]
    fn labels_bind_to_next_instruction() {
        let mut emitter = ChunkEmitter::new();
        let end = emitter.new_label("end");
        emitter.emit_jump(OpCode::JmpK, &end);
        emitter.emit(OpCode::LoadNone);
        emitter.mark_label(&end);
        let chunk = emitter.finish();
        assert_eq!(chunk.label_index("@end0"), Some(3));
    }

    #[test]
    fn lines_are_recorded() {
        let mut emitter = ChunkEmitter::new();
        emitter.set_line(7);
        emitter.emit(OpCode::LoadNone);
        assert_eq!(emitter.current_line(), 7);
        assert_eq!(emitter.finish().line_at(0), Some(7));
    }
}
