//! Stack machine for compiled chunks.
//!
//! The VM fetches `(opcode, operands...)` tuples from a [`ZrChunk`] and runs
//! them against a value stack. Jumps and calls name their target; labels
//! are resolved through the chunk's label table when a run starts.
//!
//! Calls push a [`Frame`] holding the return address, the stack height
//! below the arguments, and the callee's locals. The first `argc`
//! `SETUPVALUE`s executed in a new frame bind its parameters.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use zirconium_compiler::{Constant, OpCode, ZrChunk};
use zirconium_core::VmError;
use zirconium_parser::ast::BinaryOp;

use crate::runtime::{CallContext, NativeFn, ZrValue, ops};

type Result<T> = std::result::Result<T, VmError>;

/// Options for [`Vm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmOptions {
    /// Stop with [`VmError::BudgetExhausted`] after this many instructions.
    pub instruction_budget: Option<u64>,
}

struct Frame {
    return_ip: usize,
    stack_base: usize,
    /// Parameters still waiting to be bound.
    pending_args: usize,
    locals: FxHashMap<String, ZrValue>,
}

pub struct Vm {
    stack: Vec<ZrValue>,
    frames: Vec<Frame>,
    globals: FxHashMap<String, ZrValue>,
    natives: FxHashMap<String, NativeFn>,
    options: VmOptions,
    executed: u64,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(VmOptions::default())
    }
}

impl Vm {
    pub fn new(options: VmOptions) -> Self {
        Self {
            stack: Vec::new(),
            frames: Vec::new(),
            globals: FxHashMap::default(),
            natives: FxHashMap::default(),
            options,
            executed: 0,
        }
    }

    /// Make `native` callable with `CALLK`.
    pub fn register(&mut self, native: NativeFn) {
        self.natives.insert(native.name().to_string(), native);
    }

    pub fn set_global(&mut self, name: &str, value: ZrValue) {
        self.globals.insert(name.to_string(), value);
    }

    pub fn global(&self, name: &str) -> Option<&ZrValue> {
        self.globals.get(name)
    }

    /// Instructions executed by the last run.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Execute `chunk` from its first instruction.
    ///
    /// Returns the value left on top of the stack, or `undefined`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&mut self, chunk: &ZrChunk) -> Result<ZrValue> {
        self.stack.clear();
        self.frames.clear();
        self.executed = 0;

        let labels = chunk.label_table();
        let code = chunk.instructions();
        let mut ip = 0;

        while ip < code.len() {
            if let Some(budget) = self.options.instruction_budget {
                if self.executed >= budget {
                    return Err(VmError::BudgetExhausted(budget));
                }
            }
            self.executed += 1;

            let word = code[ip];
            let op = OpCode::from_word(word).ok_or(VmError::InvalidOpcode { word, ip })?;
            let operands = code.get(ip + 1..ip + 1 + op.arity()).ok_or(VmError::MissingOperand {
                opcode: op.name(),
                ip,
            })?;
            log::trace!("{:04} {:<12}{:?} stack={}", ip, op.name(), operands, self.stack.len());

            let mut next = ip + 1 + op.arity();
            match op {
                OpCode::LoadK => {
                    let value = constant_value(chunk, operands[0], ip)?;
                    self.stack.push(value);
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                    let right = self.pop(ip)?;
                    let left = self.pop(ip)?;
                    self.stack.push(arithmetic(op, &left, &right)?);
                }
                OpCode::CallK => {
                    let name = string_operand(chunk, operands[0], ip)?;
                    let argc = operands[1] as usize;
                    if let Some(&target) = labels.get(name) {
                        let stack_base = self.stack.len().checked_sub(argc).ok_or(VmError::StackUnderflow { ip })?;
                        self.frames.push(Frame {
                            return_ip: next,
                            stack_base,
                            pending_args: argc,
                            locals: FxHashMap::default(),
                        });
                        next = target;
                    } else {
                        let result = self.call_native(name, argc, ip)?;
                        self.stack.push(result);
                    }
                }
                OpCode::Ret => {
                    let value = if operands[0] > 0 { self.pop(ip)? } else { ZrValue::Undefined };
                    match self.frames.pop() {
                        Some(frame) => {
                            self.stack.truncate(frame.stack_base);
                            self.stack.push(value);
                            next = frame.return_ip;
                        }
                        None => return Ok(value),
                    }
                }
                OpCode::JmpK => {
                    next = resolve(&labels, string_operand(chunk, operands[0], ip)?)?;
                }
                OpCode::JmpIfK => {
                    let label = string_operand(chunk, operands[0], ip)?;
                    if self.pop(ip)?.is_truthy() {
                        next = resolve(&labels, label)?;
                    }
                }
                OpCode::GetGlobal => {
                    let name = string_operand(chunk, operands[0], ip)?;
                    let value = self.load(name);
                    self.stack.push(value);
                }
                OpCode::SetUpvalue => {
                    let name = string_operand(chunk, operands[0], ip)?;
                    let value = self.pop(ip)?;
                    self.store(name, value);
                }
                OpCode::GetProperty => {
                    let name = string_operand(chunk, operands[0], ip)?;
                    let target = self.pop(ip)?;
                    let value = target.get_property(name).ok_or_else(|| VmError::NotIndexable {
                        target: target.type_name(),
                        key: name.to_string(),
                    })?;
                    self.stack.push(value);
                }
                OpCode::GetIndex => {
                    let index = operands[0];
                    let target = self.pop(ip)?;
                    let value = target.get_index(index as usize).ok_or_else(|| VmError::NotIndexable {
                        target: target.type_name(),
                        key: index.to_string(),
                    })?;
                    self.stack.push(value);
                }
                OpCode::NewObject => {
                    let values = self.pop_n(operands[0] as usize * 2, ip)?;
                    let mut entries = IndexMap::with_capacity(values.len() / 2);
                    let mut values = values.into_iter();
                    while let (Some(key), Some(value)) = (values.next(), values.next()) {
                        entries.insert(key.to_string(), value);
                    }
                    self.stack.push(ZrValue::object(entries));
                }
                OpCode::NewArray => {
                    let values = self.pop_n(operands[0] as usize, ip)?;
                    self.stack.push(ZrValue::array(values));
                }
                OpCode::LoadNone => self.stack.push(ZrValue::Undefined),
            }
            ip = next;
        }

        Ok(self.stack.pop().unwrap_or_default())
    }

    fn pop(&mut self, ip: usize) -> Result<ZrValue> {
        self.stack.pop().ok_or(VmError::StackUnderflow { ip })
    }

    /// Pop `n` values, returned in push order.
    fn pop_n(&mut self, n: usize, ip: usize) -> Result<Vec<ZrValue>> {
        let start = self.stack.len().checked_sub(n).ok_or(VmError::StackUnderflow { ip })?;
        Ok(self.stack.split_off(start))
    }

    /// Current frame's locals, then globals. Unknown names read as undefined.
    fn load(&self, name: &str) -> ZrValue {
        self.frames
            .last()
            .and_then(|frame| frame.locals.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn store(&mut self, name: &str, value: ZrValue) {
        let Some(frame) = self.frames.last_mut() else {
            self.globals.insert(name.to_string(), value);
            return;
        };
        if frame.pending_args > 0 {
            frame.pending_args -= 1;
            frame.locals.insert(name.to_string(), value);
        } else if frame.locals.contains_key(name) || !self.globals.contains_key(name) {
            frame.locals.insert(name.to_string(), value);
        } else {
            self.globals.insert(name.to_string(), value);
        }
    }

    fn call_native(&mut self, name: &str, argc: usize, ip: usize) -> Result<ZrValue> {
        let native = self
            .natives
            .get(name)
            .cloned()
            .ok_or_else(|| VmError::UndefinedFunction(name.to_string()))?;
        let args = self.pop_n(argc, ip)?;
        native.call(&CallContext::positional(args)).map_err(|err| VmError::Native {
            name: name.to_string(),
            message: err.to_string(),
        })
    }
}

fn resolve(labels: &FxHashMap<&str, usize>, label: &str) -> Result<usize> {
    labels.get(label).copied().ok_or_else(|| VmError::UnresolvedLabel {
        label: label.to_string(),
    })
}

fn constant_value(chunk: &ZrChunk, index: u32, ip: usize) -> Result<ZrValue> {
    let constant = chunk
        .constants()
        .get(index)
        .ok_or(VmError::InvalidConstant { index, ip })?;
    Ok(match constant {
        Constant::String(s) => ZrValue::string(s),
        Constant::Number(n) => ZrValue::Number(*n),
        Constant::Boolean(b) => ZrValue::Boolean(*b),
        Constant::Undefined => ZrValue::Undefined,
    })
}

fn string_operand(chunk: &ZrChunk, index: u32, ip: usize) -> Result<&str> {
    chunk.string_constant(index).ok_or(VmError::InvalidConstant { index, ip })
}

/// Arithmetic opcodes accept numbers only.
fn arithmetic(op: OpCode, left: &ZrValue, right: &ZrValue) -> Result<ZrValue> {
    let binary = match op {
        OpCode::Add => BinaryOp::Add,
        OpCode::Sub => BinaryOp::Sub,
        OpCode::Mul => BinaryOp::Mul,
        _ => BinaryOp::Div,
    };
    match (left, right) {
        (ZrValue::Number(a), ZrValue::Number(b)) => Ok(ZrValue::Number(ops::arithmetic(binary, *a, *b))),
        _ => Err(VmError::InvalidOperands {
            op: op.name(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use zirconium_compiler::{ConstantPool, ZrBytecodeReader, ZrBytecodeWriter, compile};
    use zirconium_parser::{ParserOptions, parse_or_throw};

    use super::*;
    use crate::stdlib::{self, Output};

    fn compile_source(source: &str) -> ZrChunk {
        let arena = Bump::new();
        let file = parse_or_throw(source, &arena, ParserOptions::default()).unwrap();
        compile(file).unwrap()
    }

    fn vm_with_output(options: VmOptions) -> (Vm, Output) {
        let output = Output::new();
        let mut vm = Vm::new(options);
        for native in stdlib::natives(&output) {
            vm.register(native);
        }
        (vm, output)
    }

    fn run(source: &str) -> Result<Vec<String>> {
        let chunk = compile_source(source);
        let (mut vm, output) = vm_with_output(VmOptions::default());
        vm.run(&chunk)?;
        Ok(output.lines())
    }

    fn raw_chunk(words: Vec<u32>, constants: Vec<Constant>, labels: Vec<(usize, String)>) -> ZrChunk {
        ZrChunk::from_parts(words, ConstantPool::from_constants(constants), labels)
    }

    #[test]
    fn end_to_end_print() {
        assert_eq!(run("$x = 10\nprint $x").unwrap(), vec!["10"]);
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("x = 1 + 2 * 3\nprint $x").unwrap(), vec!["7"]);
    }

    #[test]
    fn if_else() {
        let source = "a = 0\nif $a {\n  print yes\n} else {\n  print no\n}";
        assert_eq!(run(source).unwrap(), vec!["no"]);
        let source = "a = 1\nif $a {\n  print yes\n} else {\n  print no\n}";
        assert_eq!(run(source).unwrap(), vec!["yes"]);
    }

    #[test]
    fn function_call_and_return() {
        let source = "function add(a, b) {\n  return $a + $b\n}\nprint add(1, 2)";
        assert_eq!(run(source).unwrap(), vec!["3"]);
    }

    #[test]
    fn parameters_do_not_clobber_globals() {
        let source = "a = 5\nfunction f(a) {\n  return $a\n}\nprint f(1)\nprint $a";
        assert_eq!(run(source).unwrap(), vec!["1", "5"]);
    }

    #[test]
    fn functions_update_existing_globals() {
        let source = "count = 0\nfunction bump() {\n  count = $count + 1\n}\nbump()\nbump()\nprint $count";
        assert_eq!(run(source).unwrap(), vec!["2"]);
    }

    #[test]
    fn missing_arguments_are_undefined() {
        let source = "function f(a, b) {\n  return $b\n}\nprint f(1)";
        assert_eq!(run(source).unwrap(), vec!["undefined"]);
    }

    #[test]
    fn composites() {
        let source = "p = {name: \"Bo\", items: [1, 2]}\nprint $p.name\nprint $p.items.1\nprint $p";
        assert_eq!(run(source).unwrap(), vec!["Bo", "2", "{name: \"Bo\", items: [1, 2]}"]);
    }

    #[test]
    fn result_is_top_of_stack() {
        let chunk = compile_source("x = 2 * 21\n$x");
        let mut vm = Vm::default();
        assert_eq!(vm.run(&chunk).unwrap(), ZrValue::Number(42.0));
        assert_eq!(vm.global("x"), Some(&ZrValue::Number(42.0)));
    }

    #[test]
    fn script_errors() {
        assert_eq!(run("nope 1").unwrap_err(), VmError::UndefinedFunction("nope".into()));

        let err = run("x = \"a\" - 1").unwrap_err();
        assert!(matches!(err, VmError::InvalidOperands { op: "SUB", left: "string", .. }));
        assert!(!err.is_internal());

        let err = run("x = 5\ny = $x.foo").unwrap_err();
        assert!(matches!(err, VmError::NotIndexable { target: "number", .. }));

        let err = run("range(1)").unwrap_err();
        assert!(matches!(err, VmError::Native { ref name, .. } if name == "range"));
    }

    #[test]
    fn budget_stops_runaway_recursion() {
        let chunk = compile_source("function f() {\n  f()\n}\nf()");
        let mut vm = Vm::new(VmOptions {
            instruction_budget: Some(1000),
        });
        assert_eq!(vm.run(&chunk), Err(VmError::BudgetExhausted(1000)));
        assert_eq!(vm.executed(), 1000);
    }

    #[test]
    fn internal_faults() {
        let mut vm = Vm::default();

        let err = vm.run(&raw_chunk(vec![OpCode::Add.word()], vec![], vec![])).unwrap_err();
        assert_eq!(err, VmError::StackUnderflow { ip: 0 });
        assert!(err.is_internal());

        let jump = raw_chunk(vec![OpCode::JmpK.word(), 0], vec![Constant::String("@gone".into())], vec![]);
        assert!(matches!(vm.run(&jump), Err(VmError::UnresolvedLabel { .. })));

        assert_eq!(
            vm.run(&raw_chunk(vec![99], vec![], vec![])),
            Err(VmError::InvalidOpcode { word: 99, ip: 0 })
        );
        assert_eq!(
            vm.run(&raw_chunk(vec![OpCode::LoadK.word()], vec![], vec![])),
            Err(VmError::MissingOperand { opcode: "LOADK", ip: 0 })
        );
        assert_eq!(
            vm.run(&raw_chunk(vec![OpCode::LoadK.word(), 7], vec![], vec![])),
            Err(VmError::InvalidConstant { index: 7, ip: 0 })
        );
    }

    #[test]
    fn decoded_chunks_run() {
        let chunk = compile_source("function sq(n) {\n  return $n * $n\n}\nprint sq(9)");
        let decoded = ZrBytecodeReader::read(&ZrBytecodeWriter::write(&chunk)).unwrap();
        let (mut vm, output) = vm_with_output(VmOptions::default());
        vm.run(&decoded).unwrap();
        assert_eq!(output.lines(), vec!["81"]);
    }
}
