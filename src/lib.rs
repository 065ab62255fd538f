//! Zirconium: a small command-style scripting language.
//!
//! Source text goes through the [`parser`] into an arena-allocated AST, which
//! either runs directly on the tree-walking [`Runtime`] or is lowered by the
//! [`compiler`] into a [`ZrChunk`] for the stack [`Vm`].
//!
//! ```
//! use zirconium::Script;
//!
//! let output = Script::new("$hp = 10\nprint \"hp: $hp\"").execute().unwrap();
//! assert_eq!(output, vec!["hp: 10"]);
//! ```
//!
//! Embedding the runtime directly:
//!
//! ```
//! use bumpalo::Bump;
//! use zirconium::parser::{ParserOptions, parse_or_throw};
//! use zirconium::stdlib::{self, Output};
//! use zirconium::{Runtime, ZrValue};
//!
//! let arena = Bump::new();
//! let file = parse_or_throw("level = 3\nprint $level", &arena, ParserOptions::default()).unwrap();
//!
//! let output = Output::new();
//! let mut runtime = Runtime::default();
//! stdlib::install(&mut runtime, &output);
//! runtime.execute(file).unwrap();
//!
//! assert_eq!(runtime.global("level"), Some(&ZrValue::Number(3.0)));
//! assert_eq!(output.lines(), vec!["3"]);
//! ```

pub mod runtime;
pub mod script;
pub mod stdlib;
pub mod vm;

pub use zirconium_compiler as compiler;
pub use zirconium_parser as parser;

pub use zirconium_compiler::{ZrBytecodeReader, ZrBytecodeWriter, ZrChunk};
pub use zirconium_core::{
    CompileError, DecodeError, LineIndex, ParseError, ParseErrorKind, ParseErrors, Position, RuntimeError,
    RuntimeErrorKind, Span, VmError, ZirconiumError,
};

pub use runtime::{
    CallContext, NativeError, NativeFn, Runtime, RuntimeOptions, UndefinedPolicy, ZrLocalStack, ZrUserdata, ZrValue,
};
pub use script::{Script, ScriptError};
pub use vm::{Vm, VmOptions};
