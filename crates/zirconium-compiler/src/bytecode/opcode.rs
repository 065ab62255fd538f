//! Bytecode operation codes.
//!
//! Instructions are a flat stream of `u32` words: the opcode word followed by
//! exactly [`OpCode::arity`] operand words.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The VM is a stack machine. Jumps and calls name their target through a
/// string constant which is looked up in the chunk's label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    /// Push `constants[k]`.
    /// Operand: constant index
    LoadK = 0,
    /// Pop b, pop a, push a + b.
    Add,
    /// Pop b, pop a, push a - b.
    Sub,
    /// Pop b, pop a, push a * b.
    Mul,
    /// Pop b, pop a, push a / b.
    Div,
    /// Call the function named by a string constant.
    /// Operands: constant index of the name, argument count
    CallK,
    /// Leave the current call frame.
    /// Operand: number of return values on the stack (0 or 1)
    Ret,
    /// Jump to the label named by a string constant.
    /// Operand: constant index of the label
    JmpK,
    /// Pop a condition and jump to the label if it is truthy.
    /// Operand: constant index of the label
    JmpIfK,
    /// Push the variable named by a string constant.
    /// Operand: constant index of the name
    GetGlobal,
    /// Pop a value and store it in the named variable.
    /// Operand: constant index of the name
    SetUpvalue,
    /// Pop a value and push its named property.
    /// Operand: constant index of the property name
    GetProperty,
    /// Pop a value and push the element at a fixed index.
    /// Operand: the index
    GetIndex,
    /// Pop `n` key/value pairs and push an object.
    /// Operand: pair count
    NewObject,
    /// Pop `n` values and push an array.
    /// Operand: element count
    NewArray,
    /// Push `undefined`.
    LoadNone,
}

impl OpCode {
    /// Decode an instruction word.
    pub fn from_word(word: u32) -> Option<Self> {
        u8::try_from(word).ok().and_then(|b| OpCode::try_from(b).ok())
    }

    /// The instruction word for this opcode.
    pub fn word(self) -> u32 {
        u8::from(self) as u32
    }

    /// Number of operand words following the opcode.
    pub fn arity(&self) -> usize {
        match self {
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::LoadNone => 0,
            OpCode::CallK => 2,
            OpCode::LoadK
            | OpCode::Ret
            | OpCode::JmpK
            | OpCode::JmpIfK
            | OpCode::GetGlobal
            | OpCode::SetUpvalue
            | OpCode::GetProperty
            | OpCode::GetIndex
            | OpCode::NewObject
            | OpCode::NewArray => 1,
        }
    }

    /// Whether the first operand is a constant index.
    pub fn takes_constant(&self) -> bool {
        matches!(
            self,
            OpCode::LoadK
                | OpCode::CallK
                | OpCode::JmpK
                | OpCode::JmpIfK
                | OpCode::GetGlobal
                | OpCode::SetUpvalue
                | OpCode::GetProperty
        )
    }

    /// Get the opcode name for disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::LoadK => "LOADK",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::CallK => "CALLK",
            OpCode::Ret => "RET",
            OpCode::JmpK => "JMPK",
            OpCode::JmpIfK => "JMPIFK",
            OpCode::GetGlobal => "GETGLOBAL",
            OpCode::SetUpvalue => "SETUPVALUE",
            OpCode::GetProperty => "GETPROPERTY",
            OpCode::GetIndex => "GETINDEX",
            OpCode::NewObject => "NEWOBJECT",
            OpCode::NewArray => "NEWARRAY",
            OpCode::LoadNone => "LOADNONE",
        }
    }
}
