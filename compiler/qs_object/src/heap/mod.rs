//! Instance storage and the tracing collector.
//!
//! Instances refer to each other through [`ObjectId`] handles, so reference
//! cycles are plain data. Reachability is decided by mark-sweep from the
//! roots the evaluator supplies plus every Type's static storage.

use std::rc::Rc;

use indexmap::IndexMap;
use qs_ir::{Name, TypeId};
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::{debug, warn};

use crate::{Arena, BuiltinTypes, ErrorKind, HostObject, ObjectId, TypeArena, Value};

/// Dynamic properties of an instance, in insertion order.
pub type PropertyMap = IndexMap<Name, Value, FxBuildHasher>;

/// Kind-specific data carried next to the slots.
#[derive(Clone, Default)]
pub enum Payload {
    #[default]
    None,
    Array(Vec<Value>),
    Error(ErrorKind),
    Host(Rc<dyn HostObject>),
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Array(items) => f.debug_tuple("Array").field(&items.len()).finish(),
            Payload::Error(kind) => f.debug_tuple("Error").field(kind).finish(),
            Payload::Host(host) => f.debug_tuple("Host").field(&host.class_name()).finish(),
        }
    }
}

/// A heap object: its Type, one slot per instance variable, and optional
/// dynamic properties.
#[derive(Debug)]
pub struct Instance {
    pub ty: TypeId,
    pub(crate) slots: Vec<Value>,
    pub(crate) properties: Option<PropertyMap>,
    pub payload: Payload,
}

impl Instance {
    pub fn new(ty: TypeId, slot_count: u32, payload: Payload) -> Self {
        Instance {
            ty,
            slots: vec![Value::Undefined; slot_count as usize],
            properties: None,
            payload,
        }
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    pub fn properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref()
    }

    fn trace(&self, visit: &mut dyn FnMut(&Value)) {
        self.slots.iter().for_each(&mut *visit);
        if let Some(props) = &self.properties {
            props.values().for_each(&mut *visit);
        }
        match &self.payload {
            Payload::Array(items) => items.iter().for_each(&mut *visit),
            Payload::Host(host) => host.trace(visit),
            Payload::None | Payload::Error(_) => {}
        }
    }

    fn finalize(&mut self) {
        self.slots.clear();
        self.properties = None;
        self.payload = Payload::None;
    }
}

/// Owner of every instance in an environment.
#[derive(Default)]
pub struct Heap {
    arena: Arena<ObjectId, Instance>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an instance of `ty` sized to the Type's current slot count.
    pub fn alloc(&mut self, types: &TypeArena, ty: TypeId, payload: Payload) -> ObjectId {
        let slots = types.get(ty).map_or(0, crate::Type::instance_slots);
        self.arena.insert(Instance::new(ty, slots, payload))
    }

    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&Instance> {
        self.arena.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Instance> {
        self.arena.get_mut(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.arena.contains(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn type_of_object(&self, id: ObjectId) -> Option<TypeId> {
        self.get(id).map(|i| i.ty)
    }

    /// Runtime Type of any value. Stale handles report `undefined`.
    pub fn type_of(&self, value: &Value, builtins: &BuiltinTypes) -> TypeId {
        match value {
            Value::Undefined => builtins.undefined,
            Value::Null => builtins.null,
            Value::Bool(_) => builtins.boolean,
            Value::Number(_) => builtins.number,
            Value::String(_) => builtins.string,
            Value::Object(id) => self.type_of_object(*id).unwrap_or(builtins.undefined),
            Value::Function(_) => builtins.func_ref,
            Value::Type(_) => builtins.type_type,
        }
    }

    /// Read an instance slot.
    ///
    /// An instance created before its Type grew reads the new slots as
    /// `undefined`. Indices the Type never had, and stale handles, also read
    /// `undefined` but are reported.
    pub fn read_slot(&self, types: &TypeArena, id: ObjectId, slot: u32) -> Value {
        let Some(instance) = self.get(id) else {
            warn!(?id, slot, "read through stale object handle");
            return Value::Undefined;
        };
        if let Some(value) = instance.slots.get(slot as usize) {
            return value.clone();
        }
        if !slot_declared(types, instance.ty, slot) {
            warn!(?id, slot, "read past the slots of its type");
        }
        Value::Undefined
    }

    /// Write an instance slot, growing an instance that predates its Type's
    /// latest slots. Returns `false` when the write was dropped.
    pub fn write_slot(&mut self, types: &TypeArena, id: ObjectId, slot: u32, value: Value) -> bool {
        let Some(instance) = self.arena.get_mut(id) else {
            warn!(?id, slot, "write through stale object handle");
            return false;
        };
        let index = slot as usize;
        if index >= instance.slots.len() {
            if !slot_declared(types, instance.ty, slot) {
                warn!(?id, slot, "write past the slots of its type");
                return false;
            }
            instance.slots.resize(index + 1, Value::Undefined);
        }
        instance.slots[index] = value;
        true
    }

    /// Reset to `undefined` every slot index the Types handed out again
    /// since the last call, in each instance that already holds it. A new
    /// member must not see the value of the member that used its slot
    /// before. Returns the number of slots reset.
    pub fn reset_recycled_slots(&mut self, types: &mut TypeArena) -> usize {
        let recycled = types.take_recycled_slots();
        if recycled.is_empty() {
            return 0;
        }
        let mut reset = 0;
        for instance in self.arena.iter_mut() {
            for &(owner, slot) in &recycled {
                if !types.derives_from(instance.ty, owner) {
                    continue;
                }
                if let Some(value) = instance.slots.get_mut(slot as usize) {
                    *value = Value::Undefined;
                    reset += 1;
                }
            }
        }
        debug!(slots = recycled.len(), reset, "reset recycled slots");
        reset
    }

    pub fn property(&self, id: ObjectId, name: Name) -> Option<Value> {
        self.get(id)?.properties.as_ref()?.get(&name).cloned()
    }

    pub fn has_property(&self, id: ObjectId, name: Name) -> bool {
        self.get(id)
            .and_then(|i| i.properties.as_ref())
            .is_some_and(|p| p.contains_key(&name))
    }

    /// Create or overwrite a dynamic property. Returns `false` for a stale
    /// handle.
    pub fn set_property(&mut self, id: ObjectId, name: Name, value: Value) -> bool {
        match self.arena.get_mut(id) {
            Some(instance) => {
                instance
                    .properties
                    .get_or_insert_with(PropertyMap::default)
                    .insert(name, value);
                true
            }
            None => false,
        }
    }

    pub fn delete_property(&mut self, id: ObjectId, name: Name) -> bool {
        self.arena
            .get_mut(id)
            .and_then(|i| i.properties.as_mut())
            .is_some_and(|p| p.shift_remove(&name).is_some())
    }

    /// Dynamic property names in insertion order.
    pub fn property_names(&self, id: ObjectId) -> Vec<Name> {
        self.get(id)
            .and_then(|i| i.properties.as_ref())
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn array(&self, id: ObjectId) -> Option<&Vec<Value>> {
        match &self.get(id)?.payload {
            Payload::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn array_mut(&mut self, id: ObjectId) -> Option<&mut Vec<Value>> {
        match &mut self.arena.get_mut(id)?.payload {
            Payload::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn error_kind(&self, id: ObjectId) -> Option<ErrorKind> {
        match self.get(id)?.payload {
            Payload::Error(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn host(&self, id: ObjectId) -> Option<Rc<dyn HostObject>> {
        match &self.get(id)?.payload {
            Payload::Host(host) => Some(Rc::clone(host)),
            _ => None,
        }
    }

    /// Free every instance unreachable from `roots` or from static storage.
    /// Returns the number of freed instances.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn collect_garbage(&mut self, types: &TypeArena, roots: &[Value]) -> usize {
        let mut pending: Vec<Value> = roots.to_vec();
        for ty in types.iter() {
            pending.extend(ty.statics().iter().cloned());
        }

        let mut marked: FxHashSet<ObjectId> = FxHashSet::default();
        while let Some(value) = pending.pop() {
            match value {
                Value::Object(id) => {
                    if !marked.insert(id) {
                        continue;
                    }
                    if let Some(instance) = self.arena.get(id) {
                        instance.trace(&mut |v| pending.push(v.clone()));
                    }
                }
                Value::Function(func) => {
                    if let Some(receiver) = &func.receiver {
                        pending.push(receiver.clone());
                    }
                    if let Some(chain) = &func.closure {
                        pending.extend(chain.iter().map(|frame| frame.value.clone()));
                    }
                }
                _ => {}
            }
        }

        let mut freed = 0;
        for id in self.arena.ids() {
            if !marked.contains(&id) {
                if let Some(mut instance) = self.arena.remove(id) {
                    instance.finalize();
                }
                freed += 1;
            }
        }
        debug!(live = self.arena.len(), freed, "collected");
        freed
    }

    /// First teardown phase: drop every reference held by every instance.
    pub fn finalize_all(&mut self) {
        for instance in self.arena.iter_mut() {
            instance.finalize();
        }
    }

    /// Second teardown phase: free all instances.
    pub fn teardown(&mut self) {
        self.arena.clear();
    }
}

fn slot_declared(types: &TypeArena, ty: TypeId, slot: u32) -> bool {
    types.get(ty).is_some_and(|t| slot < t.instance_slots())
}
