//! Identifier lookup and call-chain assembly.

use qs_ir::{Address, Ident, Name, TypeId};
use qs_object::{Frame, TypeKind, Value};
use tracing::{trace, warn};

use super::{Interpreter, Reference};

impl Interpreter {
    /// Reference for an identifier: its resolver address when it has one,
    /// otherwise a by-name walk of the chain.
    pub(crate) fn ident_reference(&self, ident: &Ident) -> Reference {
        if let Some(address) = ident.address.get() {
            if let Some(reference) = self.direct_reference(address) {
                return reference;
            }
        }
        self.resolve(ident.name)
    }

    /// Read an identifier.
    pub(crate) fn read_ident(&mut self, ident: &Ident) -> Result<Value, qs_object::Thrown> {
        if let Some(address) = ident.address.get() {
            return Ok(self.read_direct(address));
        }
        let reference = self.resolve(ident.name);
        self.get_value(&reference)
    }

    fn direct_frame(&self, address: Address) -> Option<&Frame> {
        let depth = address.depth as usize;
        let index = self.chain.len().checked_sub(depth + 1)?;
        self.chain.get(index)
    }

    fn direct_reference(&self, address: Address) -> Option<Reference> {
        match self.direct_frame(address)?.value {
            Value::Object(object) => Some(Reference::Slot {
                object,
                slot: address.slot,
            }),
            _ => None,
        }
    }

    fn read_direct(&self, address: Address) -> Value {
        match self.direct_frame(address).map(|f| &f.value) {
            Some(Value::Object(object)) => self.heap.read_slot(&self.types, *object, address.slot),
            _ => {
                warn!(
                    depth = address.depth,
                    slot = address.slot,
                    "direct read on a frame that is not an instance"
                );
                Value::Undefined
            }
        }
    }

    /// Walk the chain innermost-first for `name`.
    pub(crate) fn resolve(&self, name: Name) -> Reference {
        (0..self.chain.len())
            .rev()
            .find_map(|index| self.lookup_in_frame(index, name))
            .unwrap_or(Reference::Unresolved(name))
    }

    /// Look `name` up in one frame: the view's members (class frames let
    /// the instance's own Type override functions), then the storage's
    /// dynamic properties.
    pub(crate) fn lookup_in_frame(&self, index: usize, name: Name) -> Option<Reference> {
        let frame = self.chain.get(index)?;
        let overriding = match frame.value {
            Value::Object(object) if self.types.kind(frame.view) == Some(TypeKind::Class) => self
                .heap
                .type_of_object(object)
                .filter(|&dynamic| dynamic != frame.view)
                .and_then(|dynamic| self.types.lookup(dynamic, name))
                .filter(|member| member.is_function()),
            _ => None,
        };
        if let Some(member) = overriding.or_else(|| self.types.lookup(frame.view, name)) {
            return Some(Reference::Member {
                base: frame.value.clone(),
                member: member.clone(),
                frame: Some(index),
            });
        }

        let Value::Object(object) = frame.value else {
            return None;
        };
        if let Some(host) = self.heap.host(object) {
            return host
                .get(self.name(name))
                .is_some()
                .then_some(Reference::Host { host, name });
        }
        if self.heap.has_property(object, name) {
            return Some(Reference::Property { object, name });
        }
        if name == self.names.length && self.heap.array(object).is_some() {
            return Some(Reference::ArrayLength(object));
        }
        None
    }

    /// Frames a function whose activation is enclosed by `enclosing` runs
    /// under, not counting the activation itself.
    ///
    /// The result mirrors the callee's lexical nesting so that resolver
    /// addresses count the right number of frames.
    pub(crate) fn scope_chain_for(&self, enclosing: Option<TypeId>, receiver: &Value) -> Vec<Frame> {
        let Some(enclosing) = enclosing else {
            trace!("call chain: no enclosing scope");
            return vec![self.global_frame()];
        };
        match self.types.kind(enclosing) {
            Some(TypeKind::Global) | None => {
                trace!("call chain: global");
                vec![self.global_frame()]
            }
            Some(TypeKind::Class) => {
                let storage = self.class_storage(enclosing, receiver);
                if let Some(index) = self
                    .chain
                    .iter()
                    .rposition(|f| f.view == enclosing && f.value.same_handle(&storage))
                {
                    trace!(index, "call chain: trimmed to receiver");
                    return self.chain[..=index].to_vec();
                }
                trace!("call chain: rebuilt around receiver");
                let outer = self.types.get(enclosing).and_then(|t| t.enclosing);
                let mut frames = self.scope_chain_for(outer, &Value::Undefined);
                frames.push(Frame::new(enclosing, storage));
                frames
            }
            Some(_) => {
                if let Some(index) = self.chain.iter().rposition(|f| f.view == enclosing) {
                    trace!(index, "call chain: trimmed to enclosing scope");
                    return self.chain[..=index].to_vec();
                }
                warn!(?enclosing, "enclosing scope of callee is not live");
                let outer = self.types.get(enclosing).and_then(|t| t.enclosing);
                let mut frames = self.scope_chain_for(outer, &Value::Undefined);
                frames.push(Frame::new(enclosing, Value::Undefined));
                frames
            }
        }
    }

    /// Storage of class `class` for a call on `receiver`: the receiver when
    /// it is an instance of the class, the Type value otherwise.
    fn class_storage(&self, class: TypeId, receiver: &Value) -> Value {
        match receiver {
            Value::Object(object)
                if self
                    .heap
                    .type_of_object(*object)
                    .is_some_and(|ty| self.types.derives_from(ty, class)) =>
            {
                receiver.clone()
            }
            _ => Value::Type(class),
        }
    }

    /// Run `f` with `frame` pushed on the chain.
    pub(crate) fn with_frame<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> T) -> T {
        self.chain.push(frame);
        let result = f(self);
        self.chain.pop();
        result
    }

    /// Run `f` under a replacement chain and `this`, restoring both after.
    pub(crate) fn with_chain<T>(
        &mut self,
        chain: Vec<Frame>,
        this: Value,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved_chain = std::mem::replace(&mut self.chain, chain);
        let saved_this = std::mem::replace(&mut self.this, this);
        let result = f(self);
        self.chain = saved_chain;
        self.this = saved_this;
        result
    }

    /// Storage of the innermost frame.
    pub(crate) fn top_storage(&self) -> Option<&Value> {
        self.chain.last().map(|f| &f.value)
    }
}
