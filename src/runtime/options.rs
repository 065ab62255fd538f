//! Interpreter configuration.

/// What the interpreter does when an identifier resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedPolicy {
    /// Raise `UndefinedVariable`.
    #[default]
    Error,
    /// Evaluate to `undefined`.
    Undefined,
}

/// Options for [`Runtime`](super::Runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Maximum number of nested scopes above globals.
    pub max_depth: usize,
    pub undefined_identifiers: UndefinedPolicy,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            undefined_identifiers: UndefinedPolicy::Error,
        }
    }
}
