// tests/interpreter_tests.rs
//! End-to-end tests for the tree-walking runtime.

mod test_harness;

use std::rc::Rc;

use bumpalo::Bump;
use test_harness::TestHarness;
use zirconium::parser::{ParserOptions, parse_or_throw};
use zirconium::runtime::ZrRange;
use zirconium::stdlib::{self, Output};
use zirconium::{
    NativeError, NativeFn, ParseErrorKind, Runtime, RuntimeErrorKind, RuntimeOptions, Script, ScriptError, ZrValue,
};

#[test]
fn test_hello() {
    TestHarness::new().load("hello.zr").assert_interpreter();
}

#[test]
fn test_arithmetic() {
    TestHarness::new().load("arithmetic.zr").assert_interpreter();
}

#[test]
fn test_control_flow() {
    TestHarness::new().load("control_flow.zr").assert_interpreter();
}

#[test]
fn test_functions() {
    TestHarness::new().load("functions.zr").assert_interpreter();
}

#[test]
fn test_collections() {
    TestHarness::new().load("collections.zr").assert_interpreter();
}

#[test]
fn test_enums() {
    TestHarness::new().load("enums.zr").assert_interpreter();
}

#[test]
fn test_scopes() {
    TestHarness::new().load("scopes.zr").assert_interpreter();
}

#[test]
fn test_error_scripts() {
    let harness = TestHarness::new();
    for name in ["undefined_variable.zr", "const_reassignment.zr", "bad_loop.zr"] {
        let case = harness.load(name);
        assert!(case.expected_error.is_some(), "{name} should expect an error");
        case.assert_interpreter();
    }
}

#[test]
fn test_every_script() {
    let cases = TestHarness::new().all();
    assert!(cases.len() >= 10);
    for case in cases {
        case.assert_interpreter();
    }
}

#[test]
fn test_script_wrapper_reports_errors() {
    let err = Script::new("print ok\nx = 1\nx()").execute().unwrap_err();
    let ScriptError::Runtime(errors) = &err else {
        panic!("expected runtime errors, got {err:?}");
    };
    assert_eq!(errors[0].kind, RuntimeErrorKind::NotCallable);
    assert_eq!(errors[0].span.map(|s| s.line), Some(3));
}

#[test]
fn test_host_natives_and_globals() {
    let arena = Bump::new();
    let file = parse_or_throw("print (double($base) + 1)", &arena, ParserOptions::default()).unwrap();

    let output = Output::new();
    let mut runtime = Runtime::default();
    stdlib::install(&mut runtime, &output);
    runtime.set_global("base", ZrValue::Number(20.0));
    runtime.register(NativeFn::new("double", |ctx| Ok(ZrValue::Number(ctx.number(0)? * 2.0))));

    runtime.execute(file).unwrap();
    assert_eq!(output.lines(), vec!["41"]);
}

#[test]
fn test_native_argument_errors() {
    let arena = Bump::new();
    let file = parse_or_throw("need", &arena, ParserOptions::default()).unwrap();
    let mut runtime = Runtime::default();
    runtime.register(NativeFn::new("need", |ctx| {
        ctx.arg(0)?;
        Err(NativeError::Message("unreachable".into()))
    }));

    let err = runtime.execute(file).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::NativeError);
    assert!(err.message.starts_with("need:"), "{}", err.message);
}

#[test]
fn test_host_calls_script_functions() {
    let arena = Bump::new();
    let file = parse_or_throw("function square(n) {\n  return $n * $n\n}", &arena, ParserOptions::default()).unwrap();
    let mut runtime = Runtime::default();
    runtime.execute(file).unwrap();

    let square = runtime.global("square").cloned().unwrap();
    let result = runtime.call(&square, vec![ZrValue::Number(7.0)]).unwrap();
    assert_eq!(result, ZrValue::Number(49.0));
}

#[test]
fn test_ranges_are_restartable() {
    let range = ZrRange::new(0, 3);
    let first: Vec<i64> = range.iter().collect();
    let second: Vec<i64> = range.iter().collect();
    assert_eq!(first, vec![0, 1, 2]);
    assert_eq!(first, second);

    let output = Script::new("r = range(0, 2)\nfor i in $r {\n  print $i\n}\nfor i in $r {\n  print $i\n}")
        .execute()
        .unwrap();
    assert_eq!(output, vec!["0", "1", "0", "1"]);
}

#[test]
fn test_shared_composites_alias() {
    let output = Script::new("a = {n: 1}\nb = $a\n$b.n = 2\nprint $a")
        .execute()
        .unwrap();
    assert_eq!(output, vec!["{n: 2}"]);
}

#[test]
fn test_only_names_and_properties_are_assignable() {
    let err = Script::new("a = [1]\n$a.0 = $a").execute().unwrap_err();
    let ScriptError::Parse(errors) = &err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(errors.contains(ParseErrorKind::InvalidVariableAssignment));
}

#[test]
fn test_cyclic_composites_print() {
    let output = Script::new("o = {}\n$o.me = $o\nprint $o\nl = {items: [1]}\n$l.self = $l\nprint $l")
        .execute()
        .unwrap();
    assert_eq!(output, vec!["{me: {...}}", "{items: [1], self: {...}}"]);
}

#[test]
fn test_range_length_at_the_extremes() {
    let source = "r = range(-99999999999999999999, 99999999999999999999)\nprint ($r.length > 0)\nprint (range(5, 5).length)";
    assert_eq!(Script::new(source).execute().unwrap(), vec!["true", "0"]);
}

#[test]
fn test_huge_ranges_loop_lazily() {
    let source = "n = 0\nfor i in range(0, 3000000000) {\n  n = $i\n  if $i == 3 {\n    halt()\n  }\n}";
    let arena = Bump::new();
    let file = parse_or_throw(source, &arena, ParserOptions::default()).unwrap();
    let mut runtime = Runtime::default();
    runtime.register(NativeFn::new("halt", |_| Err(NativeError::Message("stop".into()))));

    let err = runtime.execute(file).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::NativeError);
    assert_eq!(runtime.global("n"), Some(&ZrValue::Number(3.0)));
}

#[test]
fn test_default_depth_ceiling() {
    let depth = 300;
    let source = format!("{}{}", "{\n".repeat(depth), "}\n".repeat(depth));
    let err = Script::new(source).execute().unwrap_err();
    assert_eq!(err.runtime_errors()[0].kind, RuntimeErrorKind::StackOverflow);
}

#[test]
fn test_depth_ceiling_leaves_room_below_it() {
    let depth = 200;
    let source = format!("{}print deep\n{}", "{\n".repeat(depth), "}\n".repeat(depth));
    let output = Script::new(source)
        .with_runtime_options(RuntimeOptions::default())
        .execute()
        .unwrap();
    assert_eq!(output, vec!["deep"]);
}

#[test]
fn test_runaway_recursion_is_catchable() {
    let err = Script::new("function f(n) {\n  f($n + 1)\n}\nf(0)").execute().unwrap_err();
    assert_eq!(err.runtime_errors()[0].kind, RuntimeErrorKind::StackOverflow);

    let err = Script::new("function f(n) {\n  return f($n + 1) + 1\n}\nprint f(0)").execute().unwrap_err();
    assert_eq!(err.runtime_errors()[0].kind, RuntimeErrorKind::StackOverflow);
}

#[test]
fn test_runaway_parser_nesting_is_an_error() {
    let source = format!("x = {}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = Script::new(source).execute().unwrap_err();
    let ScriptError::Parse(errors) = &err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(errors.contains(ParseErrorKind::NestingTooDeep));
}

#[test]
fn test_userdata_is_opaque() {
    #[derive(Debug)]
    struct Handle;

    impl zirconium::ZrUserdata for Handle {
        fn type_name(&self) -> &str {
            "Handle"
        }

        fn get(&self, _name: &str) -> Option<ZrValue> {
            None
        }

        fn set(&self, name: &str, _value: ZrValue) -> Result<(), String> {
            Err(format!("'{}' is read-only", name))
        }
    }

    let arena = Bump::new();
    let file = parse_or_throw("print $h\n$h.x = 1", &arena, ParserOptions::default()).unwrap();
    let output = Output::new();
    let mut runtime = Runtime::default();
    stdlib::install(&mut runtime, &output);
    runtime.set_global("h", ZrValue::Userdata(Rc::new(Handle)));

    let err = runtime.execute(file).unwrap_err();
    assert_eq!(output.lines(), vec!["userdata<Handle>"]);
    assert_eq!(err.kind, RuntimeErrorKind::EvaluationError);
}
