//! References: what assignment, `++`/`--`, `delete` and `typeof` operate on.
//!
//! Member access is dispatched on the base value's kind. Instances go
//! through their Type's member table, then their dynamic properties; host
//! objects go through [`HostObject`].

use std::rc::Rc;

use qs_ir::Name;
use qs_object::{
    FunctionValue, HostObject, Member, MemberKind, ObjectId, Thrown, TypeKind, Value,
};
use tracing::warn;

use super::Interpreter;
use crate::errors;

/// A resolved storage location.
#[derive(Clone)]
pub(crate) enum Reference {
    /// Instance slot reached through a resolver address.
    Slot { object: ObjectId, slot: u32 },
    /// Member of the base's Type. `frame` is the chain index the member was
    /// found through, for scope-chain lookups.
    Member {
        base: Value,
        member: Member,
        frame: Option<usize>,
    },
    /// Dynamic property of an instance.
    Property { object: ObjectId, name: Name },
    Element { array: ObjectId, index: usize },
    ArrayLength(ObjectId),
    Host { host: Rc<dyn HostObject>, name: Name },
    /// Name not found anywhere on the chain.
    Unresolved(Name),
    /// Not an lvalue.
    Value(Value),
}

impl Interpreter {
    /// Reject growing an array to `length` past the configured limit.
    pub(crate) fn check_array_length(&mut self, length: usize) -> Result<(), Thrown> {
        let limit = self.config.max_array_length;
        if length > limit {
            return Err(self.throw(errors::array_too_long(length, limit)));
        }
        Ok(())
    }

    pub(crate) fn get_value(&mut self, reference: &Reference) -> Result<Value, Thrown> {
        match reference {
            Reference::Slot { object, slot } => Ok(self.heap.read_slot(&self.types, *object, *slot)),
            Reference::Member {
                base,
                member,
                frame,
            } => self.member_value(base, member, *frame),
            Reference::Property { object, name } => {
                Ok(self.heap.property(*object, *name).unwrap_or_default())
            }
            Reference::Element { array, index } => Ok(self
                .heap
                .array(*array)
                .and_then(|items| items.get(*index))
                .cloned()
                .unwrap_or_default()),
            Reference::ArrayLength(array) => {
                let len = self.heap.array(*array).map_or(0, Vec::len);
                Ok(Value::Number(len as f64))
            }
            Reference::Host { host, name } => Ok(host.get(self.name(*name)).unwrap_or_default()),
            Reference::Unresolved(name) => {
                let message = errors::undefined_variable(self.name(*name));
                Err(self.throw(message))
            }
            Reference::Value(value) => Ok(value.clone()),
        }
    }

    pub(crate) fn put_value(&mut self, reference: &Reference, value: Value) -> Result<(), Thrown> {
        match reference {
            Reference::Slot { object, slot } => {
                self.heap.write_slot(&self.types, *object, *slot, value);
                Ok(())
            }
            Reference::Member { base, member, .. } => self.write_member(base, member, value),
            Reference::Property { object, name } => {
                let ty = self.heap.type_of_object(*object);
                let dynamic = ty
                    .and_then(|ty| self.types.kind(ty))
                    .is_some_and(TypeKind::is_dynamic);
                if !dynamic {
                    let ty_name = ty.map_or("undefined", |ty| self.type_name(ty));
                    let message = errors::cannot_add_property(self.name(*name), ty_name);
                    return Err(self.throw(message));
                }
                self.heap.set_property(*object, *name, value);
                Ok(())
            }
            Reference::Element { array, index } => {
                self.check_array_length(*index + 1)?;
                if let Some(items) = self.heap.array_mut(*array) {
                    if *index >= items.len() {
                        items.resize(*index + 1, Value::Undefined);
                    }
                    items[*index] = value;
                }
                Ok(())
            }
            Reference::ArrayLength(array) => {
                let length = self.to_number(&value)?;
                let Some(length) = array_index(length) else {
                    return Err(self.throw(errors::invalid_array_length()));
                };
                self.check_array_length(length)?;
                if let Some(items) = self.heap.array_mut(*array) {
                    items.resize(length, Value::Undefined);
                }
                Ok(())
            }
            Reference::Host { host, name } => host
                .set(self.name(*name), value)
                .map_err(|message| self.throw((qs_object::ErrorKind::Type, message))),
            Reference::Unresolved(name) => {
                self.heap.set_property(self.global, *name, value);
                Ok(())
            }
            Reference::Value(_) => Err(self.throw(errors::not_writable())),
        }
    }

    /// `delete` on a reference. Only dynamic storage can be deleted.
    pub(crate) fn delete_reference(&mut self, reference: &Reference) -> bool {
        match reference {
            Reference::Property { object, name } => self.heap.delete_property(*object, *name),
            Reference::Member {
                base: Value::Object(object),
                member,
                ..
            } if matches!(member.kind, MemberKind::Dynamic) => {
                self.heap.delete_property(*object, member.name)
            }
            Reference::Element { array, index } => {
                if let Some(slot) = self.heap.array_mut(*array).and_then(|a| a.get_mut(*index)) {
                    *slot = Value::Undefined;
                }
                true
            }
            Reference::Host { host, name } => host.delete(self.name(*name)),
            Reference::Unresolved(_) | Reference::Value(_) => true,
            Reference::Slot { .. } | Reference::Member { .. } | Reference::ArrayLength(_) => false,
        }
    }

    /// Read a member through `base`.
    fn member_value(
        &mut self,
        base: &Value,
        member: &Member,
        frame: Option<usize>,
    ) -> Result<Value, Thrown> {
        match &member.kind {
            MemberKind::Variable { index } => match base {
                Value::Object(object) => Ok(self.heap.read_slot(&self.types, *object, *index)),
                Value::Type(_) => Err(self.throw(errors::non_static_access())),
                _ => Ok(Value::Undefined),
            },
            MemberKind::Static { index } => Ok(self
                .types
                .get(member.owner)
                .and_then(|owner| owner.static_value(*index))
                .cloned()
                .unwrap_or_default()),
            MemberKind::NativeFunction(native) => {
                let mut function = FunctionValue::native(member.name, native.clone());
                if matches!(
                    base,
                    Value::Object(_) | Value::String(_) | Value::Number(_) | Value::Bool(_)
                ) {
                    function = function.bound_to(base.clone());
                }
                Ok(Value::Function(Rc::new(function)))
            }
            MemberKind::ScriptFunction(decl) => {
                let mut function = FunctionValue::script(member.name, Rc::clone(decl));
                let owner_kind = self.types.kind(member.owner);
                if member.is_static() {
                    function = function.bound_to(Value::Type(member.owner));
                } else if owner_kind == Some(TypeKind::Class) {
                    if matches!(base, Value::Object(_)) {
                        function = function.bound_to(base.clone());
                    }
                } else if let (Some(frame), Some(TypeKind::Function | TypeKind::Block | TypeKind::Eval)) =
                    (frame, owner_kind)
                {
                    function = function.with_closure(self.chain[..=frame].into());
                }
                Ok(Value::Function(Rc::new(function)))
            }
            MemberKind::Dynamic => Ok(base
                .as_object()
                .and_then(|object| self.heap.property(object, member.name))
                .unwrap_or_default()),
            MemberKind::Placeholder => Ok(Value::Undefined),
        }
    }

    fn write_member(&mut self, base: &Value, member: &Member, value: Value) -> Result<(), Thrown> {
        match member.kind {
            MemberKind::Dynamic => match base {
                Value::Object(object) => {
                    self.heap.set_property(*object, member.name, value);
                    Ok(())
                }
                _ => Err(self.throw(errors::not_writable())),
            },
            _ if !member.is_writable() => Err(self.throw(errors::not_writable())),
            MemberKind::Variable { index } => match base {
                Value::Object(object) => {
                    self.heap.write_slot(&self.types, *object, index, value);
                    Ok(())
                }
                Value::Type(_) => Err(self.throw(errors::non_static_access())),
                _ => Err(self.throw(errors::not_writable())),
            },
            MemberKind::Static { index } => {
                let written = self
                    .types
                    .get_mut(member.owner)
                    .is_some_and(|owner| owner.set_static(index, value));
                if !written {
                    warn!(index, "static write through a stale member");
                }
                Ok(())
            }
            _ => Err(self.throw(errors::not_writable())),
        }
    }

    /// `base.name`.
    pub(crate) fn member_reference(&mut self, base: Value, name: Name) -> Result<Reference, Thrown> {
        match base {
            Value::Undefined | Value::Null => {
                let what = if base.is_undefined() { "undefined" } else { "null" };
                let message = errors::property_of_nullish(self.name(name), what);
                Err(self.throw(message))
            }
            Value::Object(object) => {
                if let Some(host) = self.heap.host(object) {
                    return Ok(Reference::Host { host, name });
                }
                if name == self.names.length && self.heap.array(object).is_some() {
                    return Ok(Reference::ArrayLength(object));
                }
                let Some(ty) = self.heap.type_of_object(object) else {
                    warn!(?object, "member access through stale object handle");
                    return Ok(Reference::Value(Value::Undefined));
                };
                match self.types.lookup(ty, name).cloned() {
                    Some(member) => Ok(Reference::Member {
                        base,
                        member,
                        frame: None,
                    }),
                    None => Ok(Reference::Property { object, name }),
                }
            }
            Value::Type(ty) => match self.types.lookup(ty, name).cloned() {
                Some(member) => Ok(Reference::Member {
                    base,
                    member,
                    frame: None,
                }),
                None => Ok(Reference::Value(Value::Undefined)),
            },
            Value::String(ref text) if name == self.names.length => {
                Ok(Reference::Value(Value::Number(text.encode_utf16().count() as f64)))
            }
            other => {
                let ty = self.heap.type_of(&other, &self.builtins);
                match self.types.lookup(ty, name).cloned() {
                    Some(member) => Ok(Reference::Member {
                        base: other,
                        member,
                        frame: None,
                    }),
                    None => Ok(Reference::Value(Value::Undefined)),
                }
            }
        }
    }

    /// `base[index]`: array elements and string characters by position,
    /// everything else by the index's string form.
    pub(crate) fn element_reference(&mut self, base: Value, index: &Value) -> Result<Reference, Thrown> {
        let position = match index {
            Value::Number(n) => array_index(*n),
            Value::String(s) => canonical_index(s),
            _ => None,
        };
        if let Some(position) = position {
            match &base {
                Value::Object(object) if self.heap.array(*object).is_some() => {
                    return Ok(Reference::Element {
                        array: *object,
                        index: position,
                    });
                }
                Value::String(text) => {
                    let unit = text
                        .encode_utf16()
                        .nth(position)
                        .map_or(Value::Undefined, |u| {
                            Value::string(String::from_utf16_lossy(&[u]))
                        });
                    return Ok(Reference::Value(unit));
                }
                _ => {}
            }
        }
        let key = self.to_string(index)?;
        let name = self.interner.intern(&key);
        self.member_reference(base, name)
    }
}

/// A non-negative integral number usable as an array position.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "range-checked before the cast"
)]
pub(crate) fn array_index(n: f64) -> Option<usize> {
    if n >= 0.0 && n.fract() == 0.0 && n < f64::from(u32::MAX) {
        Some(n as usize)
    } else {
        None
    }
}

/// `"12"` but not `"012"`, `"+1"` or `"1.0"`.
fn canonical_index(text: &str) -> Option<usize> {
    if text.is_empty() || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
