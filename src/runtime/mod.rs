//! The dynamic value model and the tree-walking interpreter.
//!
//! ## Key Types
//!
//! - [`ZrValue`]: runtime values shared with the VM
//! - [`ZrLocalStack`]: lexical scopes with globals in frame 0
//! - [`Runtime`]: evaluates a parsed [`SourceFile`](zirconium_parser::ast::SourceFile)
//! - [`NativeFn`] and [`CallContext`]: host functions and their arguments

mod enums;
mod function;
mod interpreter;
mod local_stack;
pub mod ops;
mod options;
mod range;
mod userdata;
mod value;

pub use enums::{ZrEnum, ZrEnumItem};
pub use function::{CallContext, FunctionId, NativeError, NativeFn, UserFunction, ZrFunction};
pub use interpreter::Runtime;
pub use local_stack::ZrLocalStack;
pub use options::{RuntimeOptions, UndefinedPolicy};
pub use range::{ZrRange, ZrRangeIter};
pub use userdata::ZrUserdata;
pub use value::{ZrArray, ZrObject, ZrValue};
