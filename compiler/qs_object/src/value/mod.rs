//! Runtime values.
//!
//! Primitives are stored inline. Instances and Types are referenced through
//! generation-checked handles, functions through `Rc`. Cloning a value
//! clones the handle only.

use std::fmt;
use std::rc::Rc;

use qs_ir::{FunctionDecl, Name, TypeId};

use crate::NativeFunction;

/// Generation-checked handle to a heap [`Instance`](crate::Instance).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        ObjectId { index, generation }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}v{})", self.index, self.generation)
    }
}

/// A script value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectId),
    Function(Rc<FunctionValue>),
    Type(TypeId),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Identity of the storage behind a frame value, if it has any.
    pub fn storage(&self) -> Option<Storage> {
        match self {
            Value::Object(id) => Some(Storage::Instance(*id)),
            Value::Type(id) => Some(Storage::Statics(*id)),
            _ => None,
        }
    }

    /// Identity comparison used by `===` on composites.
    pub fn same_handle(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_function(b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

/// Where a frame's variables live.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Storage {
    /// Slots of a heap instance.
    Instance(ObjectId),
    /// Static storage of a Type.
    Statics(TypeId),
}

/// One entry of the scope chain.
///
/// `view` is the Type used for lookups in this frame. Block frames reuse the
/// enclosing frame's `value` under the block's Type.
#[derive(Clone, Debug)]
pub struct Frame {
    pub view: TypeId,
    pub value: Value,
}

impl Frame {
    pub fn new(view: TypeId, value: Value) -> Self {
        Frame { view, value }
    }
}

/// Callable body.
#[derive(Clone, Debug)]
pub enum FunctionBody {
    Script(Rc<FunctionDecl>),
    Native(NativeFunction),
}

/// A function reference.
///
/// Reading a function member yields one of these bound to the receiver it
/// was read from. Function expressions additionally capture the scope chain
/// they were created in.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub name: Name,
    pub body: FunctionBody,
    /// Receiver the function was read from; `None` for free functions.
    pub receiver: Option<Value>,
    /// Captured chain of a closure.
    pub closure: Option<Rc<[Frame]>>,
}

impl FunctionValue {
    pub fn script(name: Name, decl: Rc<FunctionDecl>) -> Self {
        FunctionValue {
            name,
            body: FunctionBody::Script(decl),
            receiver: None,
            closure: None,
        }
    }

    pub fn native(name: Name, native: NativeFunction) -> Self {
        FunctionValue {
            name,
            body: FunctionBody::Native(native),
            receiver: None,
            closure: None,
        }
    }

    #[must_use]
    pub fn bound_to(mut self, receiver: Value) -> Self {
        self.receiver = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_closure(mut self, chain: Rc<[Frame]>) -> Self {
        self.closure = Some(chain);
        self
    }

    /// Two references call the same code on the same receiver.
    pub fn same_function(&self, other: &FunctionValue) -> bool {
        let same_body = match (&self.body, &other.body) {
            (FunctionBody::Script(a), FunctionBody::Script(b)) => Rc::ptr_eq(a, b),
            (FunctionBody::Native(a), FunctionBody::Native(b)) => a.ptr_eq(b),
            _ => false,
        };
        let same_receiver = match (&self.receiver, &other.receiver) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_handle(b),
            _ => false,
        };
        same_body && same_receiver
    }
}

#[cfg(test)]
mod tests;
