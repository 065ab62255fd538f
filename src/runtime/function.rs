//! Callable values: host natives and script functions.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use super::ZrValue;

/// Failure reported by a native function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    #[error("expected at least {expected} arguments, got {got}")]
    MissingArgument { expected: usize, got: usize },

    #[error("argument {index} must be a {expected}, got {got}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{0}")]
    Message(String),
}

/// Arguments handed to a native function.
///
/// Positional arguments keep call order. Options are collected from
/// `--name value` pairs; a bare `--flag` maps to `true`.
#[derive(Debug, Default)]
pub struct CallContext {
    args: Vec<ZrValue>,
    options: IndexMap<String, ZrValue>,
}

impl CallContext {
    pub fn new(args: Vec<ZrValue>, options: IndexMap<String, ZrValue>) -> Self {
        Self { args, options }
    }

    pub fn positional(args: Vec<ZrValue>) -> Self {
        Self::new(args, IndexMap::new())
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[ZrValue] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Result<&ZrValue, NativeError> {
        self.args.get(index).ok_or(NativeError::MissingArgument {
            expected: index + 1,
            got: self.args.len(),
        })
    }

    pub fn number(&self, index: usize) -> Result<f64, NativeError> {
        let value = self.arg(index)?;
        value.as_number().ok_or(NativeError::ArgumentType {
            index,
            expected: "number",
            got: value.type_name(),
        })
    }

    pub fn options(&self) -> &IndexMap<String, ZrValue> {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&ZrValue> {
        self.options.get(name)
    }

    /// Whether `--name` was passed with a truthy value.
    pub fn flag(&self, name: &str) -> bool {
        self.option(name).is_some_and(ZrValue::is_truthy)
    }
}

type NativeCallable = dyn Fn(&CallContext) -> Result<ZrValue, NativeError>;

/// Type-erased native function.
#[derive(Clone)]
pub struct NativeFn {
    name: Rc<str>,
    inner: Rc<NativeCallable>,
}

impl NativeFn {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&CallContext) -> Result<ZrValue, NativeError> + 'static,
    {
        Self {
            name: Rc::from(name),
            inner: Rc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, ctx: &CallContext) -> Result<ZrValue, NativeError> {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Index of a script function in the runtime that declared it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// A script-declared function value.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    pub name: Rc<str>,
    pub id: FunctionId,
}

#[derive(Debug, Clone)]
pub enum ZrFunction {
    Native(NativeFn),
    User(UserFunction),
}

impl ZrFunction {
    pub fn name(&self) -> &str {
        match self {
            ZrFunction::Native(native) => native.name(),
            ZrFunction::User(user) => &user.name,
        }
    }
}

impl PartialEq for ZrFunction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ZrFunction::Native(a), ZrFunction::Native(b)) => std::ptr::addr_eq(Rc::as_ptr(&a.inner), Rc::as_ptr(&b.inner)),
            (ZrFunction::User(a), ZrFunction::User(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl From<NativeFn> for ZrValue {
    fn from(native: NativeFn) -> Self {
        ZrValue::Function(ZrFunction::Native(native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_call() {
        let add = NativeFn::new("add", |ctx| Ok(ZrValue::Number(ctx.number(0)? + ctx.number(1)?)));
        let ctx = CallContext::positional(vec![ZrValue::Number(2.0), ZrValue::Number(3.0)]);
        assert_eq!(add.call(&ctx), Ok(ZrValue::Number(5.0)));
    }

    #[test]
    fn argument_errors() {
        let ctx = CallContext::positional(vec![ZrValue::from("x")]);
        assert_eq!(
            ctx.number(0),
            Err(NativeError::ArgumentType {
                index: 0,
                expected: "number",
                got: "string"
            })
        );
        assert!(matches!(ctx.arg(2), Err(NativeError::MissingArgument { expected: 3, got: 1 })));
    }

    #[test]
    fn options_and_flags() {
        let mut options = IndexMap::new();
        options.insert("silent".to_string(), ZrValue::Boolean(true));
        options.insert("reason".to_string(), ZrValue::from("spam"));
        let ctx = CallContext::new(vec![], options);
        assert!(ctx.flag("silent"));
        assert!(!ctx.flag("loud"));
        assert_eq!(ctx.option("reason"), Some(&ZrValue::from("spam")));
    }

    #[test]
    fn identity() {
        let f = NativeFn::new("f", |_| Ok(ZrValue::Undefined));
        let a = ZrFunction::Native(f.clone());
        let b = ZrFunction::Native(f);
        let c = ZrFunction::Native(NativeFn::new("f", |_| Ok(ZrValue::Undefined)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
