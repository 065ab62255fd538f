//! Bytecode types for the Zirconium compiler.
//!
//! This module contains the core bytecode types:
//!
//! - [`OpCode`] - The instruction set for the VM
//! - [`ZrChunk`] - A compiled program with its label table
//! - [`Constant`] and [`ConstantPool`] - Deduplicated operand storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::ZrChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
