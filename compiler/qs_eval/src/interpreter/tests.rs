#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use qs_check::CheckOptions;
use qs_ir::{ExprKind, Program, SharedInterner, StmtKind};
use qs_object::{ErrorKind, Payload, Value};

use super::ops::strict_equals;
use super::reference::array_index;
use super::Interpreter;
use crate::completion::Completion;
use crate::{EvalConfig, OutputSink};

fn env() -> Interpreter {
    Interpreter::new(
        SharedInterner::new(),
        EvalConfig::default(),
        OutputSink::Silent,
        None,
    )
}

/// Parse, check against the global scope and run `source`, keeping the
/// annotated tree for inspection.
fn run_checked(interp: &mut Interpreter, source: &str) -> Program {
    let program = qs_parse::parse(source, &interp.interner).unwrap();
    let diagnostics = qs_check::check(
        &program,
        &mut interp.types,
        &interp.interner,
        &[interp.global_type],
        CheckOptions::default(),
    );
    assert!(!diagnostics.has_errors());
    let completion = interp.exec_statements(&program.body);
    assert!(matches!(completion, Completion::Normal(_)));
    program
}

#[test]
fn direct_read_matches_dynamic_lookup() {
    let mut interp = env();
    let program = run_checked(&mut interp, "var a = 1; var b = 'two'; b;");

    let StmtKind::Expr(expr) = &program.body[2].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Ident(ident) = &expr.kind else {
        panic!("expected an identifier");
    };
    assert!(ident.address.get().is_some());

    let direct = interp.read_ident(ident).unwrap();
    let reference = interp.resolve(ident.name);
    let dynamic = interp.get_value(&reference).unwrap();
    assert_eq!(direct.as_str(), Some("two"));
    assert_eq!(dynamic.as_str(), Some("two"));
}

#[test]
fn unresolved_read_is_reference_error() {
    let mut interp = env();
    let missing = interp.interner.intern("missing");
    let reference = interp.resolve(missing);
    let thrown = interp.get_value(&reference).unwrap_err();

    let error = interp.to_eval_error(&thrown.0);
    assert_eq!(error.kind, ErrorKind::Reference);
    assert_eq!(error.message, "Use of undefined variable 'missing'");
}

#[test]
fn unresolved_write_creates_global_property() {
    let mut interp = env();
    let name = interp.interner.intern("fresh");
    let reference = interp.resolve(name);
    interp.put_value(&reference, Value::Number(3.0)).unwrap();

    assert_eq!(
        interp.heap.property(interp.global, name).and_then(|v| v.as_number()),
        Some(3.0)
    );
    assert_eq!(interp.global("fresh").and_then(|v| v.as_number()), Some(3.0));
}

#[test]
fn global_calls_run_under_the_global_chain() {
    let interp = env();
    let chain = interp.scope_chain_for(Some(interp.global_type), &Value::Undefined);
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].view, interp.global_type);
}

#[test]
fn error_values_carry_kind_message_and_line() {
    let mut interp = env();
    interp.line = 7;
    let error = interp.make_error(ErrorKind::Range, "too far");

    let converted = interp.to_eval_error(&error);
    assert_eq!(converted.kind, ErrorKind::Range);
    assert_eq!(converted.message, "too far");
    assert_eq!(converted.line, 7);
    assert_eq!(interp.display(&error), "RangeError: too far");
}

#[test]
fn thrown_primitives_are_wrapped_with_their_value() {
    let mut interp = env();
    let thrown = interp.wrap_thrown(Value::Number(42.0)).unwrap();

    let object = thrown.0.as_object().unwrap();
    assert_eq!(interp.heap.error_kind(object), Some(ErrorKind::Throw));
    assert_eq!(
        interp
            .heap
            .property(object, interp.names.value)
            .and_then(|v| v.as_number()),
        Some(42.0)
    );
    assert_eq!(interp.to_eval_error(&thrown.0).message, "42");
}

#[test]
fn pending_exception_fires_at_the_next_check() {
    let mut interp = env();
    interp.raise(ErrorKind::Type, "host says no".to_owned());

    let thrown = interp.check_interrupt().unwrap_err();
    assert_eq!(interp.to_eval_error(&thrown.0).message, "host says no");
    assert!(interp.check_interrupt().is_ok());
}

#[test]
fn unreachable_cycles_are_collected() {
    let mut interp = env();
    let before = interp.heap.len();
    let link = interp.interner.intern("link");
    let a = interp.heap.alloc(&interp.types, interp.builtins.object, Payload::None);
    let b = interp.heap.alloc(&interp.types, interp.builtins.object, Payload::None);
    interp.heap.set_property(a, link, Value::Object(b));
    interp.heap.set_property(b, link, Value::Object(a));

    let freed = interp.collect_garbage(&[]);
    assert_eq!(freed, 2);
    assert_eq!(interp.heap.len(), before);
    assert!(!interp.heap.contains(a));
}

#[test]
fn rooted_values_survive_collection() {
    let mut interp = env();
    let kept = interp.new_array(vec![Value::Number(1.0)]);
    let freed = interp.collect_garbage(std::slice::from_ref(&kept));
    assert_eq!(freed, 0);
    assert!(interp.heap.contains(kept.as_object().unwrap()));
}

#[test]
fn array_positions() {
    assert_eq!(array_index(0.0), Some(0));
    assert_eq!(array_index(12.0), Some(12));
    assert_eq!(array_index(-1.0), None);
    assert_eq!(array_index(1.5), None);
    assert_eq!(array_index(f64::NAN), None);
}

#[test]
fn strict_equality_is_false_on_nan() {
    assert!(!strict_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    assert!(strict_equals(&Value::from("a"), &Value::from("a")));
    assert!(!strict_equals(&Value::Number(1.0), &Value::from("1")));
    assert!(strict_equals(&Value::Null, &Value::Null));
}
