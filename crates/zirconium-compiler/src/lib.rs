//! Zirconium bytecode compiler.
//!
//! Lowers a parsed [`SourceFile`](zirconium_parser::ast::SourceFile) into a
//! [`ZrChunk`]: a flat stream of `u32` words with a deduplicated constant
//! pool and a table of named labels. Chunks can be written to and read back
//! from the `Zrc` binary format with [`ZrBytecodeWriter`] and
//! [`ZrBytecodeReader`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use zirconium_compiler::{OpCode, compile};
//! use zirconium_parser::{ParserOptions, parse_or_throw};
//!
//! let arena = Bump::new();
//! let file = parse_or_throw("$x = 10\nprint $x", &arena, ParserOptions::default()).unwrap();
//! let chunk = compile(file).unwrap();
//! chunk.assert_opcodes(&[OpCode::LoadK, OpCode::SetUpvalue, OpCode::GetGlobal, OpCode::CallK]);
//! ```

pub mod bytecode;
pub mod compiler;
pub mod emit;
pub mod zrc;

pub use bytecode::{Constant, ConstantPool, OpCode, ZrChunk};
pub use compiler::{Compiler, compile};
pub use zrc::{ZrBytecodeReader, ZrBytecodeWriter};
