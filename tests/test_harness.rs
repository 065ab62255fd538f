// tests/test_harness.rs
//! Shared harness for the integration suites.
//!
//! Scripts live in `test_scripts/` and describe their own expectations in
//! comment directives:
//!
//! - `#> text` is the next line the script prints
//! - `#! Kind` is the `RuntimeErrorKind` the run must stop with
//! - `#@ vm` marks a script the bytecode VM can run too

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use bumpalo::Bump;
use zirconium::parser::{ParserOptions, parse_or_throw};
use zirconium::stdlib::{self, Output};
use zirconium::{Runtime, RuntimeError, Script};

/// A loaded script plus the expectations parsed from its directives.
pub struct ScriptCase {
    pub name: String,
    pub source: String,
    pub expected_output: Vec<String>,
    pub expected_error: Option<String>,
    pub runs_on_vm: bool,
}

/// Outcome of one interpreter run.
pub struct RunResult {
    pub output: Vec<String>,
    pub error: Option<RuntimeError>,
}

pub struct TestHarness {
    test_scripts_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_scripts");
        Self { test_scripts_dir }
    }

    /// Load `filename` from `test_scripts/`.
    pub fn load(&self, filename: &str) -> ScriptCase {
        let path = self.test_scripts_dir.join(filename);
        let source = fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        ScriptCase::from_source(filename, source)
    }

    /// Every `.zr` script, sorted by name.
    pub fn all(&self) -> Vec<ScriptCase> {
        let mut names: Vec<String> = fs::read_dir(&self.test_scripts_dir)
            .expect("test_scripts directory")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "zr"))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        names.iter().map(|name| self.load(name)).collect()
    }
}

impl ScriptCase {
    pub fn from_source(name: &str, source: String) -> Self {
        let mut expected_output = Vec::new();
        let mut expected_error = None;
        let mut runs_on_vm = false;

        for line in source.lines().map(str::trim) {
            if let Some(text) = line.strip_prefix("#>") {
                expected_output.push(text.strip_prefix(' ').unwrap_or(text).to_string());
            } else if let Some(kind) = line.strip_prefix("#!") {
                expected_error = Some(kind.trim().to_string());
            } else if line == "#@ vm" {
                runs_on_vm = true;
            }
        }

        Self {
            name: name.to_string(),
            source,
            expected_output,
            expected_error,
            runs_on_vm,
        }
    }

    pub fn script(&self) -> Script {
        Script::new(self.source.as_str())
    }

    /// Run on the tree-walking runtime, keeping output printed before any
    /// failure.
    pub fn interpret(&self) -> RunResult {
        let arena = Bump::new();
        let file = parse_or_throw(&self.source, &arena, ParserOptions::default()).unwrap_or_else(|errors| {
            for err in errors.iter() {
                eprintln!("{}", err.display_with_source(&self.source));
            }
            panic!("{}: expected a successful parse", self.name)
        });

        let output = Output::new();
        let mut runtime = Runtime::default();
        stdlib::install(&mut runtime, &output);
        let error = runtime.execute(file).err();
        RunResult {
            output: output.take(),
            error,
        }
    }

    /// Check every expectation against an interpreter run.
    #[track_caller]
    pub fn assert_interpreter(&self) {
        let result = self.interpret();
        assert_eq!(result.output, self.expected_output, "{}: output", self.name);
        match (&self.expected_error, &result.error) {
            (None, None) => {}
            (Some(kind), Some(err)) => assert_eq!(&format!("{:?}", err.kind), kind, "{}: {}", self.name, err),
            (None, Some(err)) => panic!("{}: unexpected error: {}", self.name, err),
            (Some(kind), None) => panic!("{}: expected {} but the run succeeded", self.name, kind),
        }
    }

    /// Check the output of a VM run.
    #[track_caller]
    pub fn assert_vm(&self) {
        assert!(self.runs_on_vm, "{} is not marked `#@ vm`", self.name);
        let output = self
            .script()
            .run_vm()
            .unwrap_or_else(|e| panic!("{}: vm run failed: {}", self.name, e));
        assert_eq!(output, self.expected_output, "{}: vm output", self.name);
    }
}
