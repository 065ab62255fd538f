//! Tree-walking interpreter.
//!
//! Statements execute directly against a [`ZrLocalStack`]. Every error is
//! recorded in the runtime's error list and returned, unwinding the
//! evaluation; scopes pushed on the way down are always popped.

use std::rc::Rc;

use indexmap::IndexMap;
use zirconium_core::{RuntimeError, RuntimeErrorKind, Span};
use zirconium_parser::ast::{
    BinaryOp, Block, EnumDeclaration, Expr, ForInStatement, FunctionDeclaration, IfStatement, InterpolatedPart,
    NodeFlags, Parameter, SourceFile, Stmt, VariableStatement,
};

use super::function::{CallContext, FunctionId, NativeFn, UserFunction, ZrFunction};
use super::{RuntimeOptions, UndefinedPolicy, ZrEnum, ZrLocalStack, ZrValue, ops};

type Result<T> = std::result::Result<T, RuntimeError>;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

/// How a statement finished.
enum Flow {
    Next,
    Return(ZrValue),
}

/// A function declared by the program being run.
struct FunctionDef<'ast> {
    parameters: &'ast [&'ast Parameter<'ast>],
    body: &'ast Block<'ast>,
}

/// Executes a parsed program.
pub struct Runtime<'ast> {
    stack: ZrLocalStack,
    options: RuntimeOptions,
    functions: Vec<FunctionDef<'ast>>,
    errors: Vec<RuntimeError>,
    /// Value of the most recent expression statement.
    last_value: Option<ZrValue>,
}

impl Default for Runtime<'_> {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

impl<'ast> Runtime<'ast> {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            stack: ZrLocalStack::new(options.max_depth),
            options,
            functions: Vec::new(),
            errors: Vec::new(),
            last_value: None,
        }
    }

    /// Bind a native function as a global.
    pub fn register(&mut self, native: NativeFn) {
        let name = native.name().to_string();
        self.stack.set_global(&name, ZrValue::from(native));
    }

    pub fn set_global(&mut self, name: &str, value: ZrValue) {
        self.stack.set_global(name, value);
    }

    pub fn global(&self, name: &str) -> Option<&ZrValue> {
        self.stack.global(name)
    }

    pub fn stack(&self) -> &ZrLocalStack {
        &self.stack
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[RuntimeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<RuntimeError> {
        std::mem::take(&mut self.errors)
    }

    /// Run every statement of `file` in the global scope.
    ///
    /// Returns the value of the last expression statement, if any.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn execute(&mut self, file: &'ast SourceFile<'ast>) -> Result<Option<ZrValue>> {
        self.last_value = None;
        let result = self.execute_statements(file.statements);
        match result {
            Ok(_) => Ok(self.last_value.take()),
            Err(err) => {
                self.stack.unwind();
                self.errors.push(err.clone());
                Err(err)
            }
        }
    }

    /// Call a function value with positional arguments.
    pub fn call(&mut self, callee: &ZrValue, args: Vec<ZrValue>) -> Result<ZrValue> {
        self.call_value(callee, CallContext::positional(args), Span::default())
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn execute_statements(&mut self, statements: &'ast [Stmt<'ast>]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute_stmt(*stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn execute_stmt(&mut self, stmt: Stmt<'ast>) -> Result<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_stmt_inner(stmt))
    }

    fn execute_stmt_inner(&mut self, stmt: Stmt<'ast>) -> Result<Flow> {
        match stmt {
            Stmt::Block(block) => self.execute_block(block),
            Stmt::Expression(s) => {
                self.last_value = self.evaluate_node(s.expression)?;
                Ok(Flow::Next)
            }
            Stmt::Variable(s) => {
                self.execute_variable(s)?;
                Ok(Flow::Next)
            }
            Stmt::If(s) => self.execute_if(s),
            Stmt::ForIn(s) => self.execute_for_in(s),
            Stmt::Function(f) => {
                self.declare_function(f)?;
                Ok(Flow::Next)
            }
            Stmt::Return(s) => {
                let value = match s.expression {
                    Some(expr) => self.value_of(expr)?,
                    None => ZrValue::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Enum(e) => {
                self.declare_enum(e)?;
                Ok(Flow::Next)
            }
            Stmt::Invalid(node) => Err(RuntimeError::new(
                RuntimeErrorKind::EvaluationError,
                format!("cannot execute invalid statement '{}'", node.text),
            )
            .at(node.meta.span)),
        }
    }

    fn execute_block(&mut self, block: &'ast Block<'ast>) -> Result<Flow> {
        self.with_scope(block.meta.span, |rt| rt.execute_statements(block.statements))
    }

    /// Run `f` in a fresh block scope, popping it however `f` exits.
    fn with_scope<T>(&mut self, span: Span, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.stack.push_scope().map_err(|e| e.at(span))?;
        let result = f(self);
        self.stack.pop_scope();
        result
    }

    fn execute_variable(&mut self, stmt: &'ast VariableStatement<'ast>) -> Result<()> {
        let decl = stmt.declaration;
        let value = self.value_of(decl.initializer)?;
        let name = decl.name.name;
        let result = if stmt.is_const() {
            self.stack.declare(name, value, true)
        } else if stmt.meta.flags().contains(NodeFlags::LET) {
            self.stack.declare(name, value, false)
        } else {
            self.stack.set(name, value)
        };
        result.map_err(|e| e.at(decl.name.meta.span))
    }

    fn execute_if(&mut self, stmt: &'ast IfStatement<'ast>) -> Result<Flow> {
        let condition = self.evaluate_node(stmt.condition)?.ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::EvaluationError, "if condition produced no value")
                .at(stmt.condition.span())
        })?;
        if condition.is_truthy() {
            self.execute_stmt(stmt.then_statement)
        } else if let Some(else_statement) = stmt.else_statement {
            self.execute_stmt(else_statement)
        } else {
            Ok(Flow::Next)
        }
    }

    /// Ranges are walked lazily. Arrays and objects are snapshotted first, so
    /// the body may mutate them freely.
    fn execute_for_in(&mut self, stmt: &'ast ForInStatement<'ast>) -> Result<Flow> {
        let iterable = self.value_of(stmt.expression)?;
        match &iterable {
            ZrValue::Range(range) => self.run_loop(stmt, range.iter().map(|n| ZrValue::Number(n as f64))),
            ZrValue::Object(map) => {
                let pairs: Vec<ZrValue> = map
                    .borrow()
                    .iter()
                    .map(|(key, value)| ZrValue::array(vec![ZrValue::string(key), value.clone()]))
                    .collect();
                self.run_loop(stmt, pairs.into_iter())
            }
            ZrValue::Array(items) => {
                let items = items.borrow().clone();
                self.run_loop(stmt, items.into_iter())
            }
            other => Err(RuntimeError::new(
                RuntimeErrorKind::InvalidForInExpression,
                format!("cannot iterate over {}", other.type_name()),
            )
            .at(stmt.expression.span())),
        }
    }

    fn run_loop(&mut self, stmt: &'ast ForInStatement<'ast>, items: impl Iterator<Item = ZrValue>) -> Result<Flow> {
        let name = stmt.initializer.name;
        for item in items {
            let flow = self.with_scope(stmt.body.meta.span, |rt| {
                rt.stack.declare(name, item, false)?;
                rt.execute_statements(stmt.body.statements)
            })?;
            if let Flow::Return(value) = flow {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn declare_function(&mut self, func: &'ast FunctionDeclaration<'ast>) -> Result<()> {
        let value = self.define_function(func.name.name, func.parameters, func.body);
        self.stack
            .declare(func.name.name, value, false)
            .map_err(|e| e.at(func.name.meta.span))
    }

    fn define_function(
        &mut self,
        name: &str,
        parameters: &'ast [&'ast Parameter<'ast>],
        body: &'ast Block<'ast>,
    ) -> ZrValue {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FunctionDef { parameters, body });
        ZrValue::Function(ZrFunction::User(UserFunction {
            name: Rc::from(name),
            id,
        }))
    }

    fn declare_enum(&mut self, decl: &'ast EnumDeclaration<'ast>) -> Result<()> {
        let value = ZrEnum::new(decl.name.name, decl.items.iter().map(|item| item.name.name));
        self.stack
            .declare(decl.name.name, ZrValue::Enum(Rc::new(value)), true)
            .map_err(|e| e.at(decl.name.meta.span))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Evaluate `expr`, requiring it to produce a value.
    fn value_of(&mut self, expr: Expr<'ast>) -> Result<ZrValue> {
        self.evaluate_node(expr)?.ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::NodeValueError,
                format!("{:?} does not produce a value", expr.kind()),
            )
            .at(expr.span())
        })
    }

    /// Evaluate `expr`. Option syntax outside a call produces no value.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn evaluate_node(&mut self, expr: Expr<'ast>) -> Result<Option<ZrValue>> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: Expr<'ast>) -> Result<Option<ZrValue>> {
        let value = match expr {
            Expr::String(s) => ZrValue::string(s.text),
            Expr::Number(n) => ZrValue::Number(n.value),
            Expr::Boolean(b) => ZrValue::Boolean(b.value),
            Expr::Interpolated(s) => {
                let mut out = String::new();
                for part in s.parts {
                    match part {
                        InterpolatedPart::Text(text) => out.push_str(text.text),
                        InterpolatedPart::Variable(var) => {
                            let value = self.lookup(var.name, var.meta.span)?;
                            out.push_str(&value.to_string());
                        }
                    }
                }
                ZrValue::from(out)
            }
            Expr::Identifier(id) => self.lookup(id.name, id.meta.span)?,
            Expr::PropertyAccess(p) => {
                let target = self.value_of(p.expression)?;
                target.get_property(p.name.name).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::EvaluationError,
                        format!("cannot read property '{}' of {}", p.name.name, target.type_name()),
                    )
                    .at(p.meta.span)
                })?
            }
            Expr::ArrayIndex(a) => {
                let target = self.value_of(a.expression)?;
                target.get_index(a.index as usize).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::EvaluationError,
                        format!("cannot index {} with {}", target.type_name(), a.index),
                    )
                    .at(a.meta.span)
                })?
            }
            Expr::ElementAccess(e) => {
                let target = self.value_of(e.expression)?;
                let key = self.value_of(e.argument)?;
                element(&target, &key).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::EvaluationError,
                        format!("cannot index {} with {}", target.type_name(), key.repr()),
                    )
                    .at(e.meta.span)
                })?
            }
            Expr::Binary(b) => match b.op {
                BinaryOp::Assign => self.assign(b.left, b.right, b.meta.span)?,
                BinaryOp::LogicalAnd => {
                    let left = self.value_of(b.left)?;
                    ZrValue::Boolean(left.is_truthy() && self.value_of(b.right)?.is_truthy())
                }
                BinaryOp::LogicalOr => {
                    let left = self.value_of(b.left)?;
                    ZrValue::Boolean(left.is_truthy() || self.value_of(b.right)?.is_truthy())
                }
                op => {
                    let left = self.value_of(b.left)?;
                    let right = self.value_of(b.right)?;
                    ops::binary(op, &left, &right).map_err(|message| {
                        RuntimeError::new(RuntimeErrorKind::InvalidOperands, message).at(b.meta.span)
                    })?
                }
            },
            Expr::Unary(u) => {
                let operand = self.value_of(u.operand)?;
                ops::unary(u.op, &operand)
                    .map_err(|message| RuntimeError::new(RuntimeErrorKind::InvalidOperands, message).at(u.meta.span))?
            }
            Expr::Call(c) => self.evaluate_call(c.callee, c.arguments, c.meta.span)?,
            Expr::SimpleCall(c) => self.evaluate_call(c.callee, c.arguments, c.meta.span)?,
            Expr::Function(f) => self.define_function("<anonymous>", f.parameters, f.body),
            Expr::Object(o) => {
                let mut entries = IndexMap::with_capacity(o.properties.len());
                for prop in o.properties {
                    let value = self.value_of(prop.initializer)?;
                    entries.insert(prop.name.to_string(), value);
                }
                ZrValue::object(entries)
            }
            Expr::Array(a) => {
                let mut items = Vec::with_capacity(a.elements.len());
                for element in a.elements {
                    items.push(self.value_of(*element)?);
                }
                ZrValue::array(items)
            }
            Expr::Option(_) | Expr::OptionKey(_) => return Ok(None),
            Expr::Parenthesized(p) => return self.evaluate_node(p.expression),
            Expr::Invalid(node) => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::EvaluationError,
                    format!("cannot evaluate invalid expression '{}'", node.text),
                )
                .at(node.meta.span));
            }
        };
        Ok(Some(value))
    }

    fn lookup(&self, name: &str, span: Span) -> Result<ZrValue> {
        match self.stack.get(name) {
            Some(value) => Ok(value.clone()),
            None => match self.options.undefined_identifiers {
                UndefinedPolicy::Undefined => Ok(ZrValue::Undefined),
                UndefinedPolicy::Error => Err(RuntimeError::new(
                    RuntimeErrorKind::UndefinedVariable,
                    format!("'{}' is not defined", name),
                )
                .at(span)),
            },
        }
    }

    fn assign(&mut self, target: Expr<'ast>, value: Expr<'ast>, span: Span) -> Result<ZrValue> {
        let value = self.value_of(value)?;
        match target.unparenthesized() {
            Expr::Identifier(id) => {
                self.stack.set(id.name, value.clone()).map_err(|e| e.at(id.meta.span))?;
            }
            Expr::PropertyAccess(p) => {
                let object = self.value_of(p.expression)?;
                set_property(&object, p.name.name, value.clone())
                    .map_err(|message| RuntimeError::new(RuntimeErrorKind::EvaluationError, message).at(span))?;
            }
            other => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::EvaluationError,
                    format!("cannot assign to {:?}", other.kind()),
                )
                .at(span));
            }
        }
        Ok(value)
    }

    fn evaluate_call(&mut self, callee: Expr<'ast>, arguments: &'ast [Expr<'ast>], span: Span) -> Result<ZrValue> {
        let function = self.value_of(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        let mut options = IndexMap::new();
        for argument in arguments {
            match argument {
                Expr::Option(option) => {
                    let value = self.value_of(option.expression)?;
                    options.insert(option.option.name.to_string(), value);
                }
                Expr::OptionKey(key) => {
                    options.insert(key.name.to_string(), ZrValue::Boolean(true));
                }
                other => args.push(self.value_of(*other)?),
            }
        }

        self.call_value(&function, CallContext::new(args, options), span)
    }

    fn call_value(&mut self, function: &ZrValue, ctx: CallContext, span: Span) -> Result<ZrValue> {
        match function {
            ZrValue::Function(ZrFunction::Native(native)) => native.call(&ctx).map_err(|err| {
                RuntimeError::new(RuntimeErrorKind::NativeError, format!("{}: {}", native.name(), err)).at(span)
            }),
            ZrValue::Function(ZrFunction::User(user)) => self.call_user(user, ctx.args(), span),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::NotCallable,
                format!("{} is not a function", other.type_name()),
            )
            .at(span)),
        }
    }

    fn call_user(&mut self, user: &UserFunction, args: &[ZrValue], span: Span) -> Result<ZrValue> {
        let Some(def) = self.functions.get(user.id.0 as usize) else {
            return Err(RuntimeError::new(
                RuntimeErrorKind::NotCallable,
                format!("function '{}' belongs to another runtime", user.name),
            )
            .at(span));
        };
        let (parameters, body) = (def.parameters, def.body);

        self.stack.push_function_scope().map_err(|e| e.at(span))?;
        let result = self.run_function(parameters, body, args);
        self.stack.pop_scope();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(ZrValue::Undefined),
        }
    }

    fn run_function(
        &mut self,
        parameters: &'ast [&'ast Parameter<'ast>],
        body: &'ast Block<'ast>,
        args: &[ZrValue],
    ) -> Result<Flow> {
        for (index, param) in parameters.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or_default();
            self.stack
                .declare(param.name.name, value, false)
                .map_err(|e| e.at(param.meta.span))?;
        }
        self.execute_statements(body.statements)
    }
}

/// `target[key]` for a computed key.
fn element(target: &ZrValue, key: &ZrValue) -> Option<ZrValue> {
    match key {
        ZrValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => target.get_index(*n as usize),
        ZrValue::String(s) => target.get_property(s),
        _ => None,
    }
}

fn set_property(target: &ZrValue, name: &str, value: ZrValue) -> std::result::Result<(), String> {
    match target {
        ZrValue::Object(map) => {
            map.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        ZrValue::Userdata(data) => data.set(name, value),
        other => Err(format!("cannot set property '{}' on {}", name, other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use bumpalo::Bump;
    use zirconium_parser::{ParserOptions, parse_or_throw};

    use super::*;
    use crate::runtime::ZrUserdata;
    use crate::stdlib::{self, Output};

    fn run_with(source: &str, options: RuntimeOptions) -> (Result<Option<ZrValue>>, Vec<String>) {
        let arena = Bump::new();
        let file = parse_or_throw(source, &arena, ParserOptions::default()).unwrap();
        let output = Output::default();
        let mut runtime = Runtime::new(options);
        stdlib::install(&mut runtime, &output);
        let result = runtime.execute(file);
        (result, output.lines())
    }

    fn run(source: &str) -> Vec<String> {
        let (result, lines) = run_with(source, RuntimeOptions::default());
        result.unwrap();
        lines
    }

    fn run_err(source: &str) -> RuntimeError {
        run_with(source, RuntimeOptions::default()).0.unwrap_err()
    }

    #[test]
    fn end_to_end_print() {
        assert_eq!(run("$x = 10\nprint $x"), vec!["10"]);
    }

    #[test]
    fn block_shadowing() {
        let lines = run("let x = 1\n{\n  let x = 2\n  print $x\n}\nprint $x");
        assert_eq!(lines, vec!["2", "1"]);
    }

    #[test]
    fn assignment_reaches_outer_scope() {
        assert_eq!(run("x = 1\n{\n  x = 2\n}\nprint $x"), vec!["2"]);
    }

    #[test]
    fn for_in_over_object_binds_pairs() {
        let (result, lines) = run_with(
            "for (pair in {a: 1, b: 2}) {\n  print $pair\n}\nprint typeof($pair)",
            RuntimeOptions {
                undefined_identifiers: UndefinedPolicy::Undefined,
                ..RuntimeOptions::default()
            },
        );
        result.unwrap();
        assert_eq!(lines, vec!["[\"a\", 1]", "[\"b\", 2]", "undefined"]);
    }

    #[test]
    fn for_in_over_array_and_range() {
        assert_eq!(run("for x in [1, 2] {\n  print $x\n}"), vec!["1", "2"]);
        assert_eq!(run("for i in range(0, 3) {\n  print $i\n}"), vec!["0", "1", "2"]);
    }

    #[test]
    fn for_in_rejects_scalars() {
        let err = run_err("for x in 5 {\n}");
        assert_eq!(err.kind, RuntimeErrorKind::InvalidForInExpression);
    }

    #[test]
    fn if_else_branches() {
        let source = "x = 0\nif $x {\n  print yes\n} else if $x == 0 {\n  print zero\n} else {\n  print no\n}";
        assert_eq!(run(source), vec!["zero"]);
        assert_eq!(run("if true: print inline"), vec!["inline"]);
    }

    #[test]
    fn functions_return_values() {
        let source = "function add(a, b) {\n  return $a + $b\n}\nprint add(1, 2)\nprint add(1)";
        let (result, lines) = run_with(
            source,
            RuntimeOptions {
                undefined_identifiers: UndefinedPolicy::Undefined,
                ..RuntimeOptions::default()
            },
        );
        assert_eq!(lines[0], "3");
        // add(1) leaves b undefined, which cannot be added to a number.
        assert_eq!(result.unwrap_err().kind, RuntimeErrorKind::InvalidOperands);
    }

    #[test]
    fn functions_see_globals_not_caller_locals() {
        let source = "g = 1\nfunction show() {\n  print $g\n  print typeof($local)\n}\n{\n  local = 2\n  show()\n}";
        let (result, lines) = run_with(
            source,
            RuntimeOptions {
                undefined_identifiers: UndefinedPolicy::Undefined,
                ..RuntimeOptions::default()
            },
        );
        result.unwrap();
        assert_eq!(lines, vec!["1", "undefined"]);
    }

    #[test]
    fn recursion() {
        let source = "function fact(n) {\n  if $n <= 1 {\n    return 1\n  }\n  return $n * fact($n - 1)\n}\nprint fact(5)";
        assert_eq!(run(source), vec!["120"]);
    }

    #[test]
    fn function_expressions_are_values() {
        let source = "double = function(x) {\n  return $x * 2\n}\nprint double(4)";
        assert_eq!(run(source), vec!["8"]);
    }

    #[test]
    fn operators() {
        let lines = run("print (7 % 4)\nprint (\"a\" + 1)\nprint (1 < 2 && 2 < 1)\nprint !0\nprint -(3)");
        assert_eq!(lines, vec!["3", "a1", "false", "true", "-3"]);
    }

    #[test]
    fn short_circuit_skips_right_side() {
        assert_eq!(run("print (false && missing())\nprint (true || missing())"), vec!["false", "true"]);
    }

    #[test]
    fn interpolation() {
        assert_eq!(run("name = \"Ann\"\nprint \"hi $name!\""), vec!["hi Ann!"]);
    }

    #[test]
    fn property_and_index_access() {
        let source = "p = {name: \"Bo\", items: [1, 2, 3]}\nprint $p.name\nprint $p.items.length\nprint $p.items.1\nprint $p.missing";
        assert_eq!(run(source), vec!["Bo", "3", "2", "undefined"]);
    }

    #[test]
    fn property_assignment() {
        assert_eq!(run("p = {hp: 1}\n$p.hp = 5\nprint $p.hp"), vec!["5"]);
    }

    #[test]
    fn enums() {
        let source = "enum Color { Red, Green }\nprint $Color.Green\nprint $Color.Green.index\nprint ($Color.Red == $Color.Red)";
        assert_eq!(run(source), vec!["Color.Green", "1", "true"]);
    }

    #[test]
    fn options_reach_natives() {
        let arena = Bump::new();
        let file = parse_or_throw("kick bob --reason spam --silent", &arena, ParserOptions::default()).unwrap();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        let mut runtime = Runtime::default();
        runtime.register(NativeFn::new("kick", move |ctx| {
            *sink.borrow_mut() = format!(
                "{} {} {}",
                ctx.arg(0)?,
                ctx.option("reason").cloned().unwrap_or_default(),
                ctx.flag("silent")
            );
            Ok(ZrValue::Undefined)
        }));
        runtime.execute(file).unwrap();
        assert_eq!(*seen.borrow(), "bob spam true");
    }

    #[test]
    fn undefined_identifier_policy() {
        let err = run_err("print $nope");
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable);
        assert!(err.span.is_some());

        let (result, lines) = run_with(
            "print $nope",
            RuntimeOptions {
                undefined_identifiers: UndefinedPolicy::Undefined,
                ..RuntimeOptions::default()
            },
        );
        result.unwrap();
        assert_eq!(lines, vec!["undefined"]);
    }

    #[test]
    fn const_reassignment() {
        let err = run_err("const limit = 3\nlimit = 4");
        assert_eq!(err.kind, RuntimeErrorKind::ConstReassignment);
    }

    #[test]
    fn calling_a_non_function() {
        let err = run_err("x = 1\nx()");
        assert_eq!(err.kind, RuntimeErrorKind::NotCallable);
    }

    #[test]
    fn native_failures_are_reported() {
        let err = run_err("range(\"a\", 2)");
        assert_eq!(err.kind, RuntimeErrorKind::NativeError);
        assert!(err.message.starts_with("range:"));
    }

    #[test]
    fn scope_depth_is_guarded() {
        let depth = 20;
        let source = format!("{}{}", "{\n".repeat(depth), "}\n".repeat(depth));
        let (result, _) = run_with(
            &source,
            RuntimeOptions {
                max_depth: 16,
                ..RuntimeOptions::default()
            },
        );
        assert_eq!(result.unwrap_err().kind, RuntimeErrorKind::StackOverflow);
    }

    #[test]
    fn runaway_recursion_is_guarded() {
        let (result, _) = run_with(
            "function f() {\n  f()\n}\nf()",
            RuntimeOptions {
                max_depth: 32,
                ..RuntimeOptions::default()
            },
        );
        assert_eq!(result.unwrap_err().kind, RuntimeErrorKind::StackOverflow);
    }

    #[test]
    fn runaway_recursion_at_default_depth() {
        let arena = Bump::new();
        let file = parse_or_throw("function f(n) {\n  f($n + 1)\n}\nf(0)", &arena, ParserOptions::default()).unwrap();
        let mut runtime = Runtime::default();
        let err = runtime.execute(file).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::StackOverflow);
        assert_eq!(runtime.stack().depth(), 0);
    }

    #[test]
    fn range_loops_do_not_materialize() {
        let source = "function first() {\n  for i in range(0, 3000000000) {\n    return $i\n  }\n}\nprint first()";
        assert_eq!(run(source), vec!["0"]);
    }

    #[test]
    fn array_loops_iterate_a_snapshot() {
        let source = "items = [1, 2]\nfor x in $items {\n  items = [9]\n  print $x\n}";
        assert_eq!(run(source), vec!["1", "2"]);
    }

    #[test]
    fn errors_are_collected_and_scopes_unwound() {
        let arena = Bump::new();
        let file = parse_or_throw("{\n  {\n    print $nope\n  }\n}", &arena, ParserOptions::default()).unwrap();
        let mut runtime = Runtime::default();
        assert!(runtime.execute(file).is_err());
        assert_eq!(runtime.errors().len(), 1);
        assert_eq!(runtime.stack().depth(), 0);
        assert_eq!(runtime.take_errors().len(), 1);
        assert!(runtime.errors().is_empty());
    }

    #[test]
    fn userdata_properties() {
        #[derive(Debug, Default)]
        struct Door {
            open: RefCell<bool>,
        }

        impl ZrUserdata for Door {
            fn get(&self, name: &str) -> Option<ZrValue> {
                (name == "open").then(|| ZrValue::Boolean(*self.open.borrow()))
            }

            fn set(&self, name: &str, value: ZrValue) -> std::result::Result<(), String> {
                if name != "open" {
                    return Err(format!("no property '{}'", name));
                }
                *self.open.borrow_mut() = value.is_truthy();
                Ok(())
            }
        }

        let arena = Bump::new();
        let file = parse_or_throw("$door.open = true\n$door.open", &arena, ParserOptions::default()).unwrap();
        let mut runtime = Runtime::default();
        runtime.set_global("door", ZrValue::Userdata(Rc::new(Door::default())));
        assert_eq!(runtime.execute(file).unwrap(), Some(ZrValue::Boolean(true)));
    }
}
