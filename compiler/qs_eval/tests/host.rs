//! Host integration: native functions, host objects, globals and
//! cooperative interruption.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use qs_eval::{Engine, EngineError, ErrorKind, HostObject, NativeFunction, Value};

/// A key/value store exposed to scripts. `readonly` rejects writes.
#[derive(Default)]
struct Settings {
    values: RefCell<BTreeMap<String, Value>>,
}

impl Settings {
    fn with(pairs: &[(&str, f64)]) -> Rc<Self> {
        let settings = Settings::default();
        for (key, value) in pairs {
            settings
                .values
                .borrow_mut()
                .insert((*key).to_owned(), Value::Number(*value));
        }
        Rc::new(settings)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.values.borrow().get(key).and_then(Value::as_number)
    }
}

impl HostObject for Settings {
    fn class_name(&self) -> &str {
        "Settings"
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: Value) -> Result<(), String> {
        if name == "readonly" {
            return Err(format!("Setting '{name}' cannot be changed"));
        }
        self.values.borrow_mut().insert(name.to_owned(), value);
        Ok(())
    }

    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, String>> {
        match name {
            "count" => Some(Ok(Value::Number(self.values.borrow().len() as f64))),
            "fail" => Some(Err(format!("failed with {} arguments", args.len()))),
            _ => None,
        }
    }

    fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    fn delete(&self, name: &str) -> bool {
        self.values.borrow_mut().remove(name).is_some()
    }
}

fn runtime_error(result: Result<Value, EngineError>) -> qs_eval::EvalError {
    match result {
        Err(EngineError::Runtime(error)) => error,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn native_functions_are_callable_globals() {
    let mut engine = Engine::default();
    engine
        .register_function(NativeFunction::new("twice", |cx, _this, args| {
            let n = cx.to_number(args.first().unwrap_or(&Value::Undefined))?;
            Ok(Value::Number(n * 2.0))
        }))
        .unwrap();
    assert_eq!(
        engine.evaluate("twice('21')").unwrap().as_number(),
        Some(42.0)
    );
    assert_eq!(
        engine.evaluate("typeof twice").unwrap().as_str(),
        Some("function")
    );
}

#[test]
fn native_errors_are_catchable() {
    let mut engine = Engine::default();
    engine
        .register_function(NativeFunction::new("reject", |cx, _this, _args| {
            Err(cx.error(ErrorKind::Range, "out of range".to_owned()))
        }))
        .unwrap();
    assert_eq!(
        engine
            .evaluate("try { reject(); } catch (e) { e.name + ': ' + e.message }")
            .unwrap()
            .as_str(),
        Some("RangeError: out of range")
    );
}

#[test]
fn host_object_properties_round_trip() {
    let mut engine = Engine::default();
    let settings = Settings::with(&[("volume", 3.0), ("readonly", 1.0)]);
    engine
        .register_object("settings", Rc::clone(&settings) as Rc<dyn HostObject>)
        .unwrap();

    assert_eq!(
        engine.evaluate("settings.volume").unwrap().as_number(),
        Some(3.0)
    );
    engine.evaluate("settings.volume = settings.volume + 4;").unwrap();
    assert_eq!(settings.number("volume"), Some(7.0));

    engine.evaluate("settings.brightness = 50;").unwrap();
    assert_eq!(settings.number("brightness"), Some(50.0));
    assert!(engine.evaluate("settings.missing").unwrap().is_undefined());
}

#[test]
fn host_object_rejections_become_type_errors() {
    let mut engine = Engine::default();
    let settings = Settings::with(&[("readonly", 1.0)]);
    engine.register_object("settings", settings).unwrap();

    let error = runtime_error(engine.evaluate("settings.readonly = 2;"));
    assert_eq!(error.kind, ErrorKind::Type);
    assert_eq!(error.message, "Setting 'readonly' cannot be changed");

    let error = runtime_error(engine.evaluate("settings.fail(1, 2);"));
    assert_eq!(error.kind, ErrorKind::Type);
    assert_eq!(error.message, "failed with 2 arguments");
}

#[test]
fn host_object_methods_and_enumeration() {
    let mut engine = Engine::default();
    let settings = Settings::with(&[("a", 1.0), ("b", 2.0)]);
    engine
        .register_object("settings", Rc::clone(&settings) as Rc<dyn HostObject>)
        .unwrap();

    assert_eq!(
        engine.evaluate("settings.count()").unwrap().as_number(),
        Some(2.0)
    );
    assert_eq!(
        engine
            .evaluate("var seen = ''; for (var k in settings) { seen += k; } seen")
            .unwrap()
            .as_str(),
        Some("ab")
    );
    engine.evaluate("delete settings.a;").unwrap();
    assert_eq!(settings.number("a"), None);

    let error = runtime_error(engine.evaluate("settings.nothing();"));
    assert_eq!(error.kind, ErrorKind::Type);
}

#[test]
fn host_objects_survive_collection() {
    let mut engine = Engine::default();
    engine
        .register_object("settings", Settings::with(&[("volume", 1.0)]))
        .unwrap();
    engine.collect_garbage().unwrap();
    assert_eq!(
        engine.evaluate("settings.volume").unwrap().as_number(),
        Some(1.0)
    );
}

#[test]
fn calling_script_functions_from_the_host() {
    let mut engine = Engine::default();
    engine
        .evaluate("function add(a, b) { return a + b; }")
        .unwrap();
    assert_eq!(
        engine
            .call("add", &[Value::Number(1.0), Value::Number(2.0)])
            .unwrap()
            .as_number(),
        Some(3.0)
    );

    let error = runtime_error(engine.call("missing", &[]));
    assert_eq!(error.kind, ErrorKind::Reference);
    assert_eq!(error.message, "Function 'missing' is not defined");
}

#[test]
fn host_calls_report_script_throws() {
    let mut engine = Engine::default();
    engine
        .evaluate("function check(n) { if (n < 0) throw new RangeError('negative'); return n; }")
        .unwrap();
    let error = runtime_error(engine.call("check", &[Value::Number(-1.0)]));
    assert_eq!(error.kind, ErrorKind::Range);
    assert_eq!(error.message, "negative");
    assert_eq!(error.line, 1);
}

#[test]
fn globals_are_readable_and_writable() {
    let mut engine = Engine::default();
    engine.set_global("limit", Value::Number(5.0)).unwrap();
    assert_eq!(
        engine.evaluate("limit * 2").unwrap().as_number(),
        Some(10.0)
    );

    engine.evaluate("var declared = 1;").unwrap();
    engine.set_global("declared", Value::Number(4.0)).unwrap();
    assert_eq!(
        engine.evaluate("declared").unwrap().as_number(),
        Some(4.0)
    );
    assert_eq!(
        engine.global("declared").and_then(|v| v.as_number()),
        Some(4.0)
    );
    assert!(engine.global("never_declared").is_none());
}

#[test]
fn interrupt_hook_stops_loops() {
    let mut engine = Engine::default();
    let mut polls = 0;
    engine.set_interrupt_hook(move || {
        polls += 1;
        if polls > 100 {
            ControlFlow::Break("stopped by host".to_owned())
        } else {
            ControlFlow::Continue(())
        }
    });
    let error = runtime_error(engine.evaluate("while (true) { }"));
    assert_eq!(error.kind, ErrorKind::General);
    assert_eq!(error.message, "stopped by host");
}

#[test]
fn interrupts_are_catchable() {
    let mut engine = Engine::default();
    engine.set_interrupt_hook(|| ControlFlow::Break("halt".to_owned()));
    assert_eq!(
        engine
            .evaluate("var m; try { while (true) { } } catch (e) { m = e.message; } m")
            .unwrap()
            .as_str(),
        Some("halt")
    );
}

#[test]
fn raised_exceptions_fire_at_the_next_call() {
    let mut engine = Engine::default();
    engine.evaluate("function tick() { return 1; }").unwrap();
    engine.raise(ErrorKind::Type, "host says no").unwrap();

    let error = runtime_error(engine.evaluate("tick();"));
    assert_eq!(error.kind, ErrorKind::Type);
    assert_eq!(error.message, "host says no");
    assert_eq!(
        engine.evaluate("tick();").unwrap().as_number(),
        Some(1.0)
    );
}

#[test]
fn cleared_engine_rejects_host_calls() {
    let mut engine = Engine::default();
    engine.clear();
    assert!(matches!(
        engine.call("anything", &[]),
        Err(EngineError::NotInitialized)
    ));
    assert!(matches!(
        engine.set_global("x", Value::Null),
        Err(EngineError::NotInitialized)
    ));
    assert!(matches!(
        engine.raise(ErrorKind::General, "late"),
        Err(EngineError::NotInitialized)
    ));
    assert!(engine.global("x").is_none());
    assert_eq!(engine.live_objects(), 0);
}
