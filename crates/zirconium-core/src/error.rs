//! Unified error types for Zirconium.
//!
//! Every phase of the pipeline reports through one of these types:
//!
//! ```text
//! ZirconiumError (top-level wrapper)
//! ├── ParseErrors    - every diagnostic recorded by one parse
//! ├── CompileError   - AST constructs the bytecode path cannot lower
//! ├── RuntimeError   - tree-walking interpreter failures
//! ├── VmError        - bytecode execution failures (internal or script-level)
//! └── DecodeError    - malformed `Zrc` binary input
//! ```
//!
//! Parse and runtime errors carry a stable `kind` code plus a message and an
//! optional source span, so a host can surface the first error's location
//! directly to the user.

use std::fmt;

use thiserror::Error;

use crate::{NodeId, Span};

// ============================================================================
// Parse Errors
// ============================================================================

/// Stable codes for parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A token appeared where the grammar does not allow it.
    UnexpectedToken,
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    /// An identifier was required.
    IdentifierExpected,
    /// The target or value of an assignment is not assignable.
    InvalidVariableAssignment,
    /// A string literal runs to the end of input.
    UnterminatedStringLiteral,
    /// A function declaration is missing its name.
    FunctionIdentifierExpected,
    /// A reserved word was used as a name, or a gated keyword was used.
    ReservedKeyword,
    /// A property access chain is malformed or has an invalid target.
    InvalidPropertyAccess,
    /// `return` appeared outside of any function body.
    ReturnOutsideFunction,
    /// A `{ ... }` block was required.
    ExpectedBlock,
    /// A specific keyword was required.
    KeywordExpected,
    /// The construct is recognised but not supported by this configuration.
    NotImplemented,
    /// Blocks or expressions nest deeper than the parser allows.
    NestingTooDeep,
}

impl ParseErrorKind {
    /// Whether this is one of the "unexpected input" codes.
    pub fn is_unexpected(self) -> bool {
        matches!(self, ParseErrorKind::UnexpectedToken | ParseErrorKind::UnexpectedEof)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseErrorKind::*;
        let msg = match self {
            UnexpectedToken => "unexpected token",
            UnexpectedEof => "unexpected end of input",
            IdentifierExpected => "identifier expected",
            InvalidVariableAssignment => "invalid variable assignment",
            UnterminatedStringLiteral => "unterminated string literal",
            FunctionIdentifierExpected => "function identifier expected",
            ReservedKeyword => "reserved keyword",
            InvalidPropertyAccess => "invalid property access",
            ReturnOutsideFunction => "return outside of function",
            ExpectedBlock => "expected block",
            KeywordExpected => "keyword expected",
            NotImplemented => "not implemented",
            NestingTooDeep => "nesting too deep",
        };
        write!(f, "{}", msg)
    }
}

/// A parse error with location and diagnostic information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
    /// The node the error was attached to, if any.
    pub node: Option<NodeId>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
            node: None,
        }
    }

    /// Attach the offending node.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Format the error with source context for display.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!("Error at {}:{}: {}\n", self.span.line, self.span.col, self.kind);

        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        if let Some(line_text) = source.lines().nth((self.span.line as usize).saturating_sub(1)) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", self.span.line, line_text));

            let indent = " ".repeat((self.span.col as usize).saturating_sub(1));
            let pointer = if self.span.len() <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len() - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        output
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Every diagnostic recorded during one parse, in source order of discovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first recorded error.
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// Whether any recorded error has the given code.
    pub fn contains(&self, kind: ParseErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ParseError> for ParseErrors {
    fn from_iter<T: IntoIterator<Item = ParseError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors"),
            1 => write!(f, "{}", self.errors[0]),
            n => {
                write!(f, "{} errors:", n)?;
                for (i, error) in self.errors.iter().enumerate() {
                    write!(f, "\n  {}: {}", i + 1, error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compile Errors
// ============================================================================

/// Errors raised while lowering an AST to bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The construct has no bytecode lowering.
    #[error("cannot compile {construct} at {span}")]
    Unsupported {
        /// Human-readable name of the construct.
        construct: &'static str,
        /// Where it appeared.
        span: Span,
    },

    /// A call target that is not a plain name.
    #[error("call target at {span} must be a function name")]
    InvalidCallTarget {
        /// Where the call appeared.
        span: Span,
    },

    /// More operands than an instruction word can address.
    #[error("operand {value} out of range at {span}")]
    OperandOverflow {
        /// The operand that did not fit.
        value: usize,
        /// Where it was produced.
        span: Span,
    },
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Stable codes for interpreter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorKind {
    /// An expression produced no value where one was required.
    NodeValueError,
    /// An expression could not be evaluated.
    EvaluationError,
    /// Scope nesting exceeded the configured ceiling.
    StackOverflow,
    /// `for ... in` over a value that cannot be iterated.
    InvalidForInExpression,
    /// An identifier resolved to nothing.
    UndefinedVariable,
    /// A call target is not a function.
    NotCallable,
    /// An operator was applied to operand types it does not support.
    InvalidOperands,
    /// A `const` binding was assigned again.
    ConstReassignment,
    /// A host native function reported a failure.
    NativeError,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RuntimeErrorKind::*;
        let msg = match self {
            NodeValueError => "node value error",
            EvaluationError => "evaluation error",
            StackOverflow => "stack overflow",
            InvalidForInExpression => "invalid for-in expression",
            UndefinedVariable => "undefined variable",
            NotCallable => "not callable",
            InvalidOperands => "invalid operands",
            ConstReassignment => "constant reassignment",
            NativeError => "native error",
        };
        write!(f, "{}", msg)
    }
}

/// A runtime error raised by the interpreter.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct RuntimeError {
    /// The category of this error.
    pub kind: RuntimeErrorKind,
    /// A detailed error message.
    pub message: String,
    /// Source location of the node being evaluated.
    pub span: Option<Span>,
}

impl RuntimeError {
    /// Create a new runtime error.
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

// ============================================================================
// VM Errors
// ============================================================================

/// Errors raised by the bytecode VM.
///
/// The internal variants indicate a code generation bug rather than a
/// problem with the script, see [`VmError::is_internal`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    /// An instruction popped more values than the stack held.
    #[error("internal: stack underflow at ip {ip}")]
    StackUnderflow {
        /// Instruction pointer of the failing instruction.
        ip: usize,
    },

    /// A jump or call named a label the chunk does not define.
    #[error("internal: unresolved label '{label}'")]
    UnresolvedLabel {
        /// The missing label name.
        label: String,
    },

    /// A word that does not decode to an opcode.
    #[error("internal: invalid opcode {word} at ip {ip}")]
    InvalidOpcode {
        /// The raw instruction word.
        word: u32,
        /// Where it was found.
        ip: usize,
    },

    /// The instruction stream ended inside an instruction's operands.
    #[error("internal: missing operand for {opcode} at ip {ip}")]
    MissingOperand {
        /// Mnemonic of the truncated instruction.
        opcode: &'static str,
        /// Where it started.
        ip: usize,
    },

    /// A constant index that is out of range or of the wrong type.
    #[error("internal: invalid constant {index} at ip {ip}")]
    InvalidConstant {
        /// The constant index.
        index: u32,
        /// Where it was referenced.
        ip: usize,
    },

    /// A call to a name that is neither a label nor a registered native.
    #[error("undefined function '{0}'")]
    UndefinedFunction(String),

    /// An arithmetic instruction received non-numeric operands.
    #[error("{op} requires numeric operands, got {left} and {right}")]
    InvalidOperands {
        /// Mnemonic of the instruction.
        op: &'static str,
        /// Type name of the left operand.
        left: &'static str,
        /// Type name of the right operand.
        right: &'static str,
    },

    /// A property or index access on a value that has neither.
    #[error("cannot access {key} on {target}")]
    NotIndexable {
        /// Type name of the accessed value.
        target: &'static str,
        /// Rendered key.
        key: String,
    },

    /// A native function failed.
    #[error("native '{name}' failed: {message}")]
    Native {
        /// The native's name.
        name: String,
        /// Its failure message.
        message: String,
    },

    /// The configured instruction budget ran out.
    #[error("instruction budget of {0} exhausted")]
    BudgetExhausted(u64),
}

impl VmError {
    /// Whether this error indicates a code generation bug.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            VmError::StackUnderflow { .. }
                | VmError::UnresolvedLabel { .. }
                | VmError::InvalidOpcode { .. }
                | VmError::MissingOperand { .. }
                | VmError::InvalidConstant { .. }
        )
    }
}

// ============================================================================
// Decode Errors
// ============================================================================

/// Errors raised while reading a `Zrc` binary chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input does not start with the `Zrc` magic.
    #[error("missing Zrc header")]
    BadMagic,

    /// Input ended early.
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    /// A section tag this reader does not know.
    #[error("unknown section tag {0:#04x}")]
    UnknownSection(u8),

    /// A constant tag this reader does not know.
    #[error("unknown constant tag {0:#04x}")]
    UnknownConstantTag(u8),

    /// A string payload is not valid UTF-8.
    #[error("invalid UTF-8 in string payload at byte {0}")]
    InvalidUtf8(usize),
}

// ============================================================================
// Unified Error
// ============================================================================

/// Any error produced by the Zirconium pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZirconiumError {
    /// One or more parse errors.
    #[error(transparent)]
    Parse(#[from] ParseErrors),

    /// A compile error.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A runtime error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A VM error.
    #[error(transparent)]
    Vm(#[from] VmError),

    /// A decode error.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ZirconiumError {
    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ZirconiumError::Parse(_))
    }

    /// Check if this is a runtime error.
    pub fn is_runtime(&self) -> bool {
        matches!(self, ZirconiumError::Runtime(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
