//! Standard natives available to every script.

use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::{NativeError, NativeFn, Runtime, ZrRange, ZrValue};

/// Lines written by `print`, shared between the host and the native.
#[derive(Debug, Clone, Default)]
pub struct Output {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    /// A copy of everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Drain everything written so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

/// `print a b ...` writes its arguments, space separated, as one line.
pub fn print(output: &Output) -> NativeFn {
    let output = output.clone();
    NativeFn::new("print", move |ctx| {
        let rendered: Vec<String> = ctx.args().iter().map(ZrValue::to_string).collect();
        output.push(rendered.join(" "));
        Ok(ZrValue::Undefined)
    })
}

/// `range(start, stop[, step])`.
pub fn range() -> NativeFn {
    NativeFn::new("range", |ctx| {
        let start = ctx.number(0)? as i64;
        let stop = ctx.number(1)? as i64;
        let range = if ctx.arg_count() > 2 {
            let step = ctx.number(2)? as i64;
            ZrRange::with_step(start, stop, step).ok_or_else(|| NativeError::Message("step cannot be zero".into()))?
        } else {
            ZrRange::new(start, stop)
        };
        Ok(ZrValue::Range(range))
    })
}

/// `typeof(value)` names the value's type.
pub fn type_of() -> NativeFn {
    NativeFn::new("typeof", |ctx| {
        let name = ctx.args().first().map_or("undefined", ZrValue::type_name);
        Ok(ZrValue::string(name))
    })
}

/// Every standard native, with `print` writing to `output`.
pub fn natives(output: &Output) -> Vec<NativeFn> {
    vec![print(output), range(), type_of()]
}

/// Register every standard native as a global of `runtime`.
pub fn install(runtime: &mut Runtime<'_>, output: &Output) {
    for native in natives(output) {
        runtime.register(native);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::CallContext;

    #[test]
    fn print_joins_arguments() {
        let output = Output::new();
        let ctx = CallContext::positional(vec![ZrValue::from("hp"), ZrValue::Number(3.0)]);
        print(&output).call(&ctx).unwrap();
        assert_eq!(output.take(), vec!["hp 3"]);
        assert!(output.lines().is_empty());
    }

    #[test]
    fn range_builds_ranges() {
        let ctx = CallContext::positional(vec![ZrValue::Number(0.0), ZrValue::Number(10.0), ZrValue::Number(5.0)]);
        let value = range().call(&ctx).unwrap();
        assert_eq!(value.to_string(), "range(0, 10, 5)");

        let ctx = CallContext::positional(vec![ZrValue::Number(0.0), ZrValue::Number(1.0), ZrValue::Number(0.0)]);
        assert!(range().call(&ctx).is_err());
    }

    #[test]
    fn type_of_names_types() {
        let ctx = CallContext::positional(vec![ZrValue::Boolean(true)]);
        assert_eq!(type_of().call(&ctx), Ok(ZrValue::from("boolean")));
        assert_eq!(type_of().call(&CallContext::default()), Ok(ZrValue::from("undefined")));
    }
}
