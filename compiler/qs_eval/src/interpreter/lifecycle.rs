//! Top-level runs, globals, collection and teardown.

use std::rc::Rc;

use qs_check::CheckOptions;
use qs_diagnostic::Diagnostic;
use qs_ir::{Name, StringInterner};
use qs_object::{
    BuiltinTypes, EvalError, ErrorKind, HostObject, MemberAttrs, NativeFunction, NewMember,
    Payload, Thrown, Type, TypeArena, TypeKind, Value,
};
use tracing::{debug, warn};

use super::{Interpreter, Reference};
use crate::completion::Completion;
use crate::engine::InterruptHook;
use crate::{EngineError, EvalConfig, OutputSink};

impl Interpreter {
    /// Parse, check against the global scope and run one compilation unit.
    pub(crate) fn evaluate_program(&mut self, source: &str) -> Result<Value, EngineError> {
        let program = qs_parse::parse(source, &self.interner)
            .map_err(|failure| EngineError::Compile(failure.diagnostics))?;

        let options = CheckOptions {
            forbid_global_statements: self.config.forbid_global_statements,
            allow_return: false,
            resolve_by_name: false,
        };
        let diagnostics = qs_check::check(
            &program,
            &mut self.types,
            &self.interner,
            &[self.global_type],
            options,
        );
        self.heap.reset_recycled_slots(&mut self.types);
        if diagnostics.has_errors() {
            return Err(EngineError::Compile(diagnostics.into_vec()));
        }
        for warning in diagnostics.warnings() {
            debug!(%warning, "check warning");
        }

        self.reset_stack();
        let completion = self.exec_statements(&program.body);
        self.reset_stack();
        let result = match completion {
            Completion::Throw(value) => Err(EngineError::Runtime(self.to_eval_error(&value))),
            Completion::Normal(value) | Completion::Return(value) => Ok(value),
            Completion::Break(_) | Completion::Continue(_) => Ok(Value::Undefined),
        };

        if self.config.wants_collection(self.heap.len()) {
            let extra = result.as_ref().map_or(Value::Undefined, Value::clone);
            self.collect_garbage(&[extra]);
        }
        result
    }

    /// Back to the state between top-level runs: the global frame only.
    fn reset_stack(&mut self) {
        self.chain.clear();
        self.chain.push(self.global_frame());
        self.this = Value::Object(self.global);
        self.depth.reset();
    }

    /// Mark from the global object, the current chain, `this`, host roots
    /// and `extra`; sweep the rest. Returns the number of freed instances.
    pub(crate) fn collect_garbage(&mut self, extra: &[Value]) -> usize {
        let mut roots = vec![Value::Object(self.global), self.this.clone()];
        roots.extend(self.chain.iter().map(|frame| frame.value.clone()));
        roots.extend(self.host_roots.iter().cloned());
        roots.extend(extra.iter().cloned());
        let freed = self.heap.collect_garbage(&self.types, &roots);
        debug!(freed, live = self.heap.len(), "collected");
        freed
    }

    /// Convert an uncaught throw for the engine boundary.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "line numbers are small non-negative integers"
    )]
    pub(crate) fn to_eval_error(&self, value: &Value) -> EvalError {
        let Some(object) = value.as_object() else {
            return EvalError {
                kind: ErrorKind::Throw,
                message: self.describe(value),
                line: self.line,
            };
        };
        let Some(kind) = self.heap.error_kind(object) else {
            return EvalError {
                kind: ErrorKind::Throw,
                message: self.describe(value),
                line: self.line,
            };
        };
        let message = self
            .heap
            .property(object, self.names.message)
            .map_or_else(String::new, |message| self.describe(&message));
        let line = self
            .heap
            .property(object, self.names.line_number)
            .and_then(|line| line.as_number())
            .map_or(self.line, |line| line.max(0.0) as u32);
        EvalError {
            kind,
            message,
            line,
        }
    }

    /// Read a global variable, function or property.
    pub(crate) fn global(&mut self, name: &str) -> Option<Value> {
        let name = self.interner.get(name)?;
        let reference = self.lookup_in_frame(0, name)?;
        self.get_value(&reference).ok()
    }

    /// Write a global: through its member when declared, as a dynamic
    /// property of the global object otherwise.
    pub(crate) fn set_global(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
        let name = self.interner.intern(name);
        let reference = self
            .lookup_in_frame(0, name)
            .unwrap_or(Reference::Unresolved(name));
        self.put_value(&reference, value)
            .map_err(|Thrown(thrown)| EngineError::Runtime(self.to_eval_error(&thrown)))
    }

    pub(crate) fn register_function(&mut self, native: NativeFunction) {
        let name = self.interner.intern(native.name());
        self.types.add_member(
            self.global_type,
            name,
            NewMember::Native(native),
            MemberAttrs::FUNCTION,
        );
    }

    /// Expose `host` as the global `name`. Host objects sharing a class name
    /// share one Type.
    pub(crate) fn register_object(&mut self, name: &str, host: Rc<dyn HostObject>) {
        let class_name = host.class_name().to_owned();
        let ty = match self.host_types.get(&class_name) {
            Some(&ty) => ty,
            None => {
                let type_name = self.interner.intern(&class_name);
                let ty = self.types.alloc(Type::new(type_name, TypeKind::Host));
                self.host_types.insert(class_name, ty);
                ty
            }
        };
        let object = Value::Object(self.heap.alloc(&self.types, ty, Payload::Host(host)));
        self.host_roots.push(object.clone());
        let name = self.interner.intern(name);
        self.heap.set_property(self.global, name, object);
    }

    /// Call the global function `name`.
    pub(crate) fn call_global(&mut self, name: &str, args: &[Value]) -> Result<Value, EngineError> {
        let Some(function) = self.global(name) else {
            let message = format!("Function '{name}' is not defined");
            return Err(EngineError::Runtime(EvalError {
                kind: ErrorKind::Reference,
                message,
                line: 0,
            }));
        };
        self.reset_stack();
        let result = self.call_value(&function, None, args, name);
        self.reset_stack();
        result.map_err(|Thrown(thrown)| EngineError::Runtime(self.to_eval_error(&thrown)))
    }

    /// Display text of a value, running `toString` where a script defines
    /// one.
    pub(crate) fn display(&mut self, value: &Value) -> String {
        match self.to_string(value) {
            Ok(text) => text.to_string(),
            Err(Thrown(thrown)) => {
                warn!(error = %self.to_eval_error(&thrown), "toString threw during display");
                self.describe(value)
            }
        }
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.heap.len()
    }

    /// Finalize every instance and Type, then drop both arenas. Returns
    /// the host-owned parts for the next environment.
    pub(crate) fn teardown(mut self) -> (OutputSink, Option<InterruptHook>) {
        self.chain.clear();
        self.host_roots.clear();
        self.this = Value::Undefined;
        self.heap.finalize_all();
        self.types.finalize_all();
        self.heap.teardown();
        self.types.teardown();
        debug!("environment torn down");
        (std::mem::take(&mut self.output), self.interrupt.take())
    }
}

/// Parse and check `source` against a scratch global scope holding only the
/// builtin classes.
pub(crate) fn check_syntax(
    source: &str,
    interner: &StringInterner,
    config: &EvalConfig,
) -> Vec<Diagnostic> {
    let program = match qs_parse::parse(source, interner) {
        Ok(program) => program,
        Err(failure) => return failure.diagnostics,
    };
    let mut types = TypeArena::new();
    let builtins = BuiltinTypes::install(&mut types, interner);
    let global = types.alloc(Type::new(Name::EMPTY, TypeKind::Global));
    crate::builtins::declare_classes(&mut types, &builtins, global, interner);
    let options = CheckOptions {
        forbid_global_statements: config.forbid_global_statements,
        allow_return: false,
        resolve_by_name: false,
    };
    qs_check::check(&program, &mut types, interner, &[global], options).into_vec()
}
