//! Tree-walking interpreter for QScript.
//!
//! The [`Interpreter`] is the live environment of one engine: the Type
//! arena, the heap, the global object and the scope chain the evaluator
//! walks.
//!
//! # Architecture
//!
//! - `exec` - statements, producing a [`Completion`]
//! - `expr` - expressions, producing `Result<Value, Thrown>`
//! - `reference` - lvalues (`Reference`) and member access by kind
//! - `scope` - direct and by-name identifier lookup, call chain assembly
//! - `call` - invocation, construction and class definition
//! - `ops` - conversions and operators
//! - `eval` - dynamic `eval` of source text
//! - `lifecycle` - top-level runs, globals, collection and teardown
//!
//! # Scope chain
//!
//! The chain is a list of frames (view Type, storage value), innermost
//! last. Addresses written by the resolver count frames from the innermost
//! end, so every function call rebuilds the chain to mirror the lexical
//! nesting of the callee: its enclosing scopes, then its activation.

mod call;
mod eval;
mod exec;
mod expr;
mod lifecycle;
mod names;
mod ops;
mod reference;
mod scope;

use std::ops::ControlFlow;
use std::rc::Rc;

use qs_ir::{Name, SharedInterner, StringInterner, TypeId};
use qs_object::{
    BuiltinTypes, ErrorKind, Frame, Heap, NativeContext, ObjectId, Payload, Thrown, Type,
    TypeArena, TypeKind, Value,
};
use qs_stack::DepthCounter;
use rustc_hash::FxHashMap;

use crate::completion::Completion;
use crate::engine::InterruptHook;
use crate::errors::RuntimeMessage;
use crate::{EvalConfig, OutputSink};
use names::KnownNames;

pub(crate) use lifecycle::check_syntax;
pub(crate) use reference::Reference;

/// One live environment.
pub(crate) struct Interpreter {
    pub(crate) interner: SharedInterner,
    pub(crate) config: EvalConfig,
    pub(crate) types: TypeArena,
    pub(crate) heap: Heap,
    pub(crate) builtins: BuiltinTypes,
    pub(crate) global_type: TypeId,
    pub(crate) global: ObjectId,
    /// Scope chain, innermost last.
    chain: Vec<Frame>,
    this: Value,
    /// Exception raised by the host, thrown at the next check point.
    pending: Option<RuntimeMessage>,
    depth: DepthCounter,
    pub(crate) interrupt: Option<InterruptHook>,
    pub(crate) output: OutputSink,
    /// Host objects registered through the engine.
    host_roots: Vec<Value>,
    host_types: FxHashMap<String, TypeId>,
    /// Source line of the node being evaluated.
    line: u32,
    names: KnownNames,
}

impl Interpreter {
    /// Create the builtins, the global Type and the global object.
    pub(crate) fn new(
        interner: SharedInterner,
        config: EvalConfig,
        output: OutputSink,
        interrupt: Option<InterruptHook>,
    ) -> Self {
        let mut types = TypeArena::new();
        let builtins = BuiltinTypes::install(&mut types, &interner);
        let global_type = types.alloc(Type::new(interner.intern("Global"), TypeKind::Global));
        let mut heap = Heap::new();
        let global = heap.alloc(&types, global_type, Payload::None);
        let names = KnownNames::new(&interner);
        let depth = DepthCounter::new(config.max_recursion_depth());

        let mut interpreter = Interpreter {
            interner,
            config,
            types,
            heap,
            builtins,
            global_type,
            global,
            chain: Vec::new(),
            this: Value::Object(global),
            pending: None,
            depth,
            interrupt,
            output,
            host_roots: Vec::new(),
            host_types: FxHashMap::default(),
            line: 0,
            names,
        };
        interpreter.chain.push(interpreter.global_frame());
        crate::builtins::install(&mut interpreter);
        interpreter
    }

    pub(crate) fn global_frame(&self) -> Frame {
        Frame::new(self.global_type, Value::Object(self.global))
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn type_name(&self, ty: TypeId) -> &'static str {
        self.types.name_of(ty, &self.interner)
    }

    /// Build an Error instance of `kind` carrying `name`, `message` and
    /// `lineNumber`.
    pub(crate) fn make_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        let ty = self.builtins.error_type(kind);
        let id = self.heap.alloc(&self.types, ty, Payload::Error(kind));
        self.init_error_properties(id, kind.class_name(), message);
        Value::Object(id)
    }

    fn init_error_properties(&mut self, id: ObjectId, name: &str, message: &str) {
        let names = self.names;
        self.heap.set_property(id, names.name, Value::from(name));
        self.heap.set_property(id, names.message, Value::from(message));
        self.heap
            .set_property(id, names.line_number, Value::Number(f64::from(self.line)));
    }

    pub(crate) fn throw(&mut self, (kind, message): RuntimeMessage) -> Thrown {
        Thrown(self.make_error(kind, &message))
    }

    /// Record a host-raised exception for the next check point.
    pub(crate) fn raise(&mut self, kind: ErrorKind, message: String) {
        self.pending = Some((kind, message));
    }

    /// Honor a pending exception and poll the interrupt hook.
    fn check_interrupt(&mut self) -> Result<(), Thrown> {
        if let Some(pending) = self.pending.take() {
            return Err(self.throw(pending));
        }
        if let Some(hook) = self.interrupt.as_mut() {
            if let ControlFlow::Break(message) = hook() {
                tracing::debug!(%message, "interrupted");
                return Err(self.throw((ErrorKind::General, message)));
            }
        }
        Ok(())
    }

    pub(crate) fn new_array(&mut self, elements: Vec<Value>) -> Value {
        let id = self
            .heap
            .alloc(&self.types, self.builtins.array, Payload::Array(elements));
        Value::Object(id)
    }
}

impl NativeContext for Interpreter {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn heap(&mut self) -> &mut Heap {
        &mut self.heap
    }

    fn types(&self) -> &TypeArena {
        &self.types
    }

    fn to_string(&mut self, value: &Value) -> Result<Rc<str>, Thrown> {
        Interpreter::to_string(self, value)
    }

    fn to_number(&mut self, value: &Value) -> Result<f64, Thrown> {
        Interpreter::to_number(self, value)
    }

    fn error(&mut self, kind: ErrorKind, message: String) -> Thrown {
        self.throw((kind, message))
    }

    fn new_array(&mut self, elements: Vec<Value>) -> Value {
        Interpreter::new_array(self, elements)
    }

    fn max_array_length(&self) -> usize {
        self.config.max_array_length
    }

    fn eval_source(&mut self, source: &str) -> Result<Value, Thrown> {
        self.eval_dynamic(source)
    }

    fn print(&mut self, text: &str) {
        self.output.println(text);
    }
}

/// Map a statement-level completion onto a call result.
fn completion_value(completion: Completion) -> Result<Value, Thrown> {
    match completion {
        Completion::Normal(value) | Completion::Return(value) => Ok(value),
        Completion::Throw(value) => Err(Thrown(value)),
        Completion::Break(_) | Completion::Continue(_) => Ok(Value::Undefined),
    }
}

#[cfg(test)]
mod tests;
