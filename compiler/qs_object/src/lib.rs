//! Runtime object model for QScript.
//!
//! - [`Value`]: tagged script values with handle semantics
//! - [`Type`] / [`Member`]: per-category descriptors and their member tables
//! - [`Heap`] / [`Instance`]: slot storage with a mark-sweep collector
//! - class model: member replacement and forward-base resolution
//! - host bridge: [`NativeFunction`], [`HostObject`], [`NativeContext`]
//!
//! Types and instances live in generation-checked arenas, so a handle to a
//! freed entity is detected rather than dereferenced.

mod arena;
mod class;
pub mod convert;
mod error;
mod flags;
mod heap;
mod host;
mod member;
mod slots;
mod types;
mod value;

pub use arena::{Arena, ArenaId};
pub use error::{ErrorKind, EvalError, Thrown};
pub use flags::{MemberAttrs, TypeQualifiers};
pub use heap::{Heap, Instance, Payload, PropertyMap};
pub use host::{HostObject, NativeContext, NativeFn, NativeFunction};
pub use member::{Member, MemberKind, NewMember};
pub use slots::SlotFreeList;
pub use types::{BuiltinTypes, Initializer, Type, TypeArena, TypeKind};
pub use value::{Frame, FunctionBody, FunctionValue, ObjectId, Storage, Value};
