//! Compile failures, uncaught errors, recursion limits and collection.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use qs_eval::{Engine, EngineError, ErrorCode, ErrorKind, EvalConfig, Value};

fn runtime_error(result: Result<Value, EngineError>) -> qs_eval::EvalError {
    match result {
        Err(EngineError::Runtime(error)) => error,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

fn compile_codes(result: Result<Value, EngineError>) -> Vec<ErrorCode> {
    match result {
        Err(EngineError::Compile(diagnostics)) => diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.code)
            .collect(),
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn check_errors_prevent_execution() {
    let mut engine = Engine::default();
    let codes = compile_codes(engine.evaluate("var ran = 1; break;"));
    assert_eq!(codes, vec![ErrorCode::E2002]);
    assert!(!matches!(engine.global("ran"), Some(Value::Number(_))));
}

#[test]
fn parse_errors_are_compile_errors() {
    let mut engine = Engine::default();
    let error = engine.evaluate("var = ;").unwrap_err();
    assert!(!error.diagnostics().is_empty());
    assert!(error.as_runtime().is_none());
}

#[test]
fn global_statements_can_be_forbidden() {
    let mut engine = Engine::new(EvalConfig::default().with_forbidden_global_statements());
    let codes = compile_codes(engine.evaluate("var a = 1; a = 2;"));
    assert_eq!(codes, vec![ErrorCode::E2014]);
    assert!(engine
        .evaluate("var b = 1; function f() { return b; }")
        .is_ok());
}

#[test]
fn syntax_check_leaves_globals_alone() {
    let mut engine = Engine::default();
    assert!(engine.check_syntax("var fresh = 1; class K { }").is_empty());
    assert!(!engine.check_syntax("return 1;").is_empty());
    assert!(!engine.check_syntax("var = ;").is_empty());
    assert!(engine.global("fresh").is_none());
    assert!(engine.global("K").is_none());
}

#[test]
fn uncaught_errors_carry_kind_and_line() {
    let mut engine = Engine::default();
    let error = runtime_error(engine.evaluate("var a = 1;\nvar b = 2;\nnosuch();"));
    assert_eq!(error.kind, ErrorKind::Reference);
    assert_eq!(error.message, "Use of undefined variable 'nosuch'");
    assert_eq!(error.line, 3);
    assert_eq!(
        error.to_string(),
        "ReferenceError: Use of undefined variable 'nosuch' (line 3)"
    );
}

#[test]
fn thrown_primitives_cross_the_boundary_as_text() {
    let mut engine = Engine::default();
    let error = runtime_error(engine.evaluate("throw 'boom';"));
    assert_eq!(error.kind, ErrorKind::Throw);
    assert_eq!(error.message, "boom");

    assert_eq!(
        engine
            .evaluate("try { throw 5; } catch (e) { e.value }")
            .unwrap()
            .as_number(),
        Some(5.0)
    );
}

#[test]
fn type_errors_from_operators() {
    let mut engine = Engine::default();
    let error = runtime_error(engine.evaluate("var n = null; n.field;"));
    assert_eq!(error.kind, ErrorKind::Type);
    assert_eq!(error.message, "Cannot access property 'field' of null");

    let error = runtime_error(engine.evaluate("1 instanceof 2;"));
    assert_eq!(error.kind, ErrorKind::Type);

    let error = runtime_error(engine.evaluate("var f = 3; f();"));
    assert_eq!(error.message, "'f' undefined or not a function");
}

#[test]
fn deep_recursion_is_a_range_error() {
    let mut engine = Engine::new(EvalConfig::default().with_max_recursion_depth(50));
    engine
        .evaluate("function down(n) { return down(n + 1); }")
        .unwrap();

    let error = runtime_error(engine.evaluate("down(0);"));
    assert_eq!(error.kind, ErrorKind::Range);
    assert_eq!(error.message, "Maximum call depth 50 exceeded");

    assert!(matches!(
        engine
            .evaluate("try { down(0); } catch (e) { e instanceof RangeError }")
            .unwrap(),
        Value::Bool(true)
    ));
}

#[test]
fn oversized_arrays_are_range_errors() {
    let mut engine = Engine::default();
    engine.evaluate("var a = [];").unwrap();

    let error = runtime_error(engine.evaluate("a[4294967294] = 1;"));
    assert_eq!(error.kind, ErrorKind::Range);
    assert_eq!(
        error.message,
        "Array length 4294967295 exceeds the limit of 4194304 elements"
    );
    assert_eq!(
        runtime_error(engine.evaluate("a.length = 4e9;")).kind,
        ErrorKind::Range
    );
    assert_eq!(
        runtime_error(engine.evaluate("new Array(4e9);")).kind,
        ErrorKind::Range
    );

    let caught = engine
        .evaluate("var r; try { a[4294967294] = 1; } catch (e) { r = e.name; } r")
        .unwrap();
    assert_eq!(caught.as_str(), Some("RangeError"));
    assert_eq!(engine.evaluate("a.length").unwrap().as_number(), Some(0.0));
}

#[test]
fn array_limit_is_configurable() {
    let mut engine = Engine::new(EvalConfig::default().with_max_array_length(3));
    assert_eq!(
        engine.evaluate("var a = [1, 2]; a.push(3)").unwrap().as_number(),
        Some(3.0)
    );
    assert_eq!(
        runtime_error(engine.evaluate("a.push(4);")).kind,
        ErrorKind::Range
    );
    assert_eq!(
        runtime_error(engine.evaluate("a[3] = 4;")).kind,
        ErrorKind::Range
    );
    assert_eq!(engine.evaluate("a[2]").unwrap().as_number(), Some(3.0));
}

#[test]
fn recursion_below_the_limit_succeeds() {
    let mut engine = Engine::new(EvalConfig::default().with_max_recursion_depth(200));
    assert_eq!(
        engine
            .evaluate("function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); } fact(10)")
            .unwrap()
            .as_number(),
        Some(3_628_800.0)
    );
}

#[test]
fn collection_frees_unreachable_cycles() {
    let mut engine = Engine::new(EvalConfig::default().with_gc_threshold(0));
    engine
        .evaluate(
            "function make() { var a = {}; var b = {}; a.other = b; b.other = a; }
             make();",
        )
        .unwrap();
    let before = engine.live_objects();
    let freed = engine.collect_garbage().unwrap();
    assert!(freed >= 2);
    assert_eq!(engine.live_objects(), before - freed);
}

#[test]
fn reachable_values_survive_collection() {
    let mut engine = Engine::default();
    engine
        .evaluate("var kept = { inner: [1, 2, 3] };")
        .unwrap();
    engine.collect_garbage().unwrap();
    assert_eq!(
        engine.evaluate("kept.inner.join('')").unwrap().as_str(),
        Some("123")
    );
}

#[test]
fn display_strings_use_script_conversions() {
    let mut engine = Engine::default();
    let error = engine.evaluate("new TypeError('bad')").unwrap();
    assert_eq!(engine.to_display_string(&error).unwrap(), "TypeError: bad");

    let object = engine
        .evaluate(
            "class Named { function toString() { return 'named'; } }
             new Named()",
        )
        .unwrap();
    assert_eq!(engine.to_display_string(&object).unwrap(), "named");
}

#[test]
fn completion_value_skips_declarations() {
    let mut engine = Engine::default();
    assert_eq!(
        engine
            .evaluate("7; function f() { } var z = 1;")
            .unwrap()
            .as_number(),
        Some(7.0)
    );
    assert!(engine.evaluate("var only = 1;").unwrap().is_undefined());
}
