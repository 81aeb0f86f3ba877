//! Host bridge: native functions and host objects.

use std::fmt;
use std::rc::Rc;

use qs_ir::StringInterner;

use crate::{ErrorKind, Heap, Thrown, TypeArena, Value};

/// Services the evaluator offers to native functions.
pub trait NativeContext {
    fn interner(&self) -> &StringInterner;

    fn heap(&mut self) -> &mut Heap;

    fn types(&self) -> &TypeArena;

    /// Script string conversion, which may run script code.
    fn to_string(&mut self, value: &Value) -> Result<Rc<str>, Thrown>;

    fn to_number(&mut self, value: &Value) -> Result<f64, Thrown>;

    /// Build an Error value of `kind` ready to be thrown.
    fn error(&mut self, kind: ErrorKind, message: String) -> Thrown;

    fn new_array(&mut self, elements: Vec<Value>) -> Value;

    /// Longest array the engine lets a script build.
    fn max_array_length(&self) -> usize;

    /// Run `source` in the caller's scope.
    fn eval_source(&mut self, source: &str) -> Result<Value, Thrown>;

    /// Write a line to the engine's output sink.
    fn print(&mut self, text: &str);
}

pub type NativeFn = dyn Fn(&mut dyn NativeContext, &Value, &[Value]) -> Result<Value, Thrown>;

/// A function implemented by the host.
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<Rc<str>>,
        func: impl Fn(&mut dyn NativeContext, &Value, &[Value]) -> Result<Value, Thrown> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        cx: &mut dyn NativeContext,
        this: &Value,
        args: &[Value],
    ) -> Result<Value, Thrown> {
        (self.func)(cx, this, args)
    }

    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// An object owned by the embedding application.
///
/// Member access on instances of a host Type is forwarded here. Methods take
/// `&self`; implementations use interior mutability for state.
pub trait HostObject {
    /// Name reported by `typeof`-style introspection and error messages.
    fn class_name(&self) -> &str;

    fn get(&self, name: &str) -> Option<Value>;

    /// Write a property. `Err` carries a message for a script `TypeError`.
    fn set(&self, name: &str, value: Value) -> Result<(), String>;

    /// Invoke a method. `None` means there is no such method.
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, String>>;

    /// Enumerable property names, in order.
    fn keys(&self) -> Vec<String>;

    fn delete(&self, name: &str) -> bool;

    /// Report script values kept alive by this object.
    fn trace(&self, _visit: &mut dyn FnMut(&Value)) {}
}
