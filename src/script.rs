//! One-shot host entry point.
//!
//! A [`Script`] owns its source and options. Each call to [`Script::execute`]
//! or [`Script::run_vm`] builds a fresh arena, runtime and output buffer, so
//! a script can be executed any number of times.

use bumpalo::Bump;
use thiserror::Error;
use zirconium_compiler::{ZrChunk, compile};
use zirconium_core::{ParseErrors, RuntimeError, ZirconiumError};
use zirconium_parser::ast::SourceFile;
use zirconium_parser::{ParserOptions, parse_or_throw};

use crate::runtime::{Runtime, RuntimeOptions};
use crate::stdlib::{self, Output};
use crate::vm::{Vm, VmOptions};

/// Why [`Script::execute`] failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseErrors),

    /// Every error the runtime collected. Never empty.
    #[error("{}", .0.first().map(ToString::to_string).unwrap_or_default())]
    Runtime(Vec<RuntimeError>),
}

impl ScriptError {
    /// The collected runtime errors, empty for parse failures.
    pub fn runtime_errors(&self) -> &[RuntimeError] {
        match self {
            ScriptError::Runtime(errors) => errors,
            ScriptError::Parse(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    source: String,
    parser_options: ParserOptions,
    runtime_options: RuntimeOptions,
    vm_options: VmOptions,
}

impl Script {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            parser_options: ParserOptions::default(),
            runtime_options: RuntimeOptions::default(),
            vm_options: VmOptions::default(),
        }
    }

    pub fn with_parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    pub fn with_runtime_options(mut self, options: RuntimeOptions) -> Self {
        self.runtime_options = options;
        self
    }

    pub fn with_vm_options(mut self, options: VmOptions) -> Self {
        self.vm_options = options;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse the source and hand the tree to `f`.
    pub fn parse_with<R>(&self, f: impl FnOnce(&SourceFile<'_>) -> R) -> Result<R, ParseErrors> {
        let arena = Bump::new();
        let file = parse_or_throw(&self.source, &arena, self.parser_options)?;
        Ok(f(file))
    }

    /// Check that the source parses.
    pub fn parse(&self) -> Result<(), ParseErrors> {
        self.parse_with(|_| ())
    }

    /// Interpret the script, returning every line written by `print`.
    pub fn execute(&self) -> Result<Vec<String>, ScriptError> {
        let arena = Bump::new();
        let file = parse_or_throw(&self.source, &arena, self.parser_options)?;

        let output = Output::new();
        let mut runtime = Runtime::new(self.runtime_options.clone());
        stdlib::install(&mut runtime, &output);

        match runtime.execute(file) {
            Ok(_) => Ok(output.take()),
            Err(_) => Err(ScriptError::Runtime(runtime.take_errors())),
        }
    }

    /// Compile the script for the VM.
    pub fn compile(&self) -> Result<ZrChunk, ZirconiumError> {
        let arena = Bump::new();
        let file = parse_or_throw(&self.source, &arena, self.parser_options)?;
        Ok(compile(file)?)
    }

    /// Compile and run the script on the VM, returning every line written
    /// by `print`.
    pub fn run_vm(&self) -> Result<Vec<String>, ZirconiumError> {
        let chunk = self.compile()?;
        let output = Output::new();
        let mut vm = Vm::new(self.vm_options.clone());
        for native in stdlib::natives(&output) {
            vm.register(native);
        }
        vm.run(&chunk)?;
        Ok(output.take())
    }
}

#[cfg(test)]
mod tests {
    use zirconium_core::RuntimeErrorKind;

    use super::*;

    #[test]
    fn execute_collects_output() {
        let script = Script::new("$x = 10\nprint $x\nprint \"hp: $x\"");
        assert_eq!(script.execute().unwrap(), vec!["10", "hp: 10"]);
        // Every run starts fresh.
        assert_eq!(script.execute().unwrap(), vec!["10", "hp: 10"]);
    }

    #[test]
    fn parse_failures() {
        let script = Script::new("print )");
        assert!(script.parse().is_err());
        let err = script.execute().unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
        assert!(err.runtime_errors().is_empty());
        assert!(script.compile().unwrap_err().is_parse());
    }

    #[test]
    fn runtime_failures_are_collected() {
        let err = Script::new("print $missing").execute().unwrap_err();
        let errors = err.runtime_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, RuntimeErrorKind::UndefinedVariable);
        assert_eq!(err.to_string(), errors[0].to_string());
    }

    #[test]
    fn parse_with_exposes_the_tree() {
        let count = Script::new("a = 1\nb = 2").parse_with(|file| file.statements.len());
        assert_eq!(count, Ok(2));
    }

    #[test]
    fn both_paths_agree() {
        let script = Script::new("function add(a, b) {\n  return $a + $b\n}\nprint add(2, 3)");
        assert_eq!(script.execute().unwrap(), vec!["5"]);
        assert_eq!(script.run_vm().unwrap(), vec!["5"]);
    }

    #[test]
    fn vm_budget_applies() {
        let script = Script::new("function f() {\n  f()\n}\nf()").with_vm_options(VmOptions {
            instruction_budget: Some(50),
        });
        let err = script.run_vm().unwrap_err();
        assert!(matches!(err, ZirconiumError::Vm(zirconium_core::VmError::BudgetExhausted(50))));
    }
}
