//! Class model: member table mutation and forward-base resolution.
//!
//! Member replacement is total over (old kind, new kind, old static, new
//! static). Storage is handed back before new storage is taken:
//!
//! | old \ new        | instance var     | static var        | function | dynamic/placeholder |
//! |------------------|------------------|-------------------|----------|---------------------|
//! | instance var     | reuse slot       | release, append   | release  | release             |
//! | static var       | remove, allocate | reuse, overwrite  | remove   | remove              |
//! | function         | allocate         | append            | swap     | drop                |
//! | dynamic/placeh.  | allocate         | append            | store    | store               |
//!
//! An instance-variable index below the Type's peak slot count is recorded
//! as recycled: instances created earlier may still hold the value of the
//! member that used it before. [`Heap::reset_recycled_slots`] clears those.
//!
//! [`Heap::reset_recycled_slots`]: crate::Heap::reset_recycled_slots

use std::rc::Rc;

use qs_ir::{ClassDecl, Name, TypeId};
use tracing::{debug, trace};

use crate::{
    Member, MemberAttrs, MemberKind, NewMember, Type, TypeArena, TypeKind, TypeQualifiers, Value,
};

impl Type {
    /// Add or replace the member `name`. `self_id` is this Type's handle.
    pub(crate) fn declare(
        &mut self,
        self_id: TypeId,
        name: Name,
        new: NewMember,
        attrs: MemberAttrs,
    ) -> Member {
        let make_static = attrs.contains(MemberAttrs::STATIC);
        let old = self.members.get(&name).map(|m| m.kind.clone());

        let kind = match (old, new) {
            (Some(MemberKind::Variable { index }), NewMember::Variable) if !make_static => {
                MemberKind::Variable { index }
            }
            (Some(MemberKind::Static { index }), NewMember::Variable) if make_static => {
                self.set_static(index, Value::Undefined);
                MemberKind::Static { index }
            }
            (old, new) => {
                match old {
                    Some(MemberKind::Variable { index }) => self.release_slot(index),
                    Some(MemberKind::Static { index }) => self.remove_static(index),
                    _ => {}
                }
                self.fresh_storage(new, make_static)
            }
        };

        trace!(?name, ?kind, "declare member");
        let member = Member {
            name,
            kind,
            attrs,
            owner: self_id,
        };
        self.members.insert(name, member.clone());
        member
    }

    fn fresh_storage(&mut self, new: NewMember, make_static: bool) -> MemberKind {
        match new {
            NewMember::Variable if make_static => {
                let index = u32::try_from(self.statics.len()).unwrap_or(u32::MAX);
                self.statics.push(Value::Undefined);
                MemberKind::Static { index }
            }
            NewMember::Variable => {
                let index = self.free_slots.allocate(&mut self.instance_slots);
                self.note_allocated(index);
                MemberKind::Variable { index }
            }
            NewMember::Native(f) => MemberKind::NativeFunction(f),
            NewMember::Script(decl) => MemberKind::ScriptFunction(decl),
            NewMember::Dynamic => MemberKind::Dynamic,
            NewMember::Placeholder => MemberKind::Placeholder,
        }
    }

    fn release_slot(&mut self, index: u32) {
        if index >= self.inherited_slots && index < self.instance_slots {
            self.free_slots.release(index, &mut self.instance_slots);
        }
    }

    /// Remove static storage at `index` and compact the indices above it.
    fn remove_static(&mut self, index: u32) {
        if (index as usize) < self.statics.len() {
            self.statics.remove(index as usize);
        }
        for member in self.members.values_mut() {
            if let MemberKind::Static { index: other } = &mut member.kind {
                if *other > index {
                    *other -= 1;
                }
            }
        }
    }

    /// Remove `name` from the table and release its storage.
    pub(crate) fn undeclare(&mut self, name: Name) -> Option<Member> {
        let member = self.members.shift_remove(&name)?;
        match member.kind {
            MemberKind::Variable { index } => self.release_slot(index),
            MemberKind::Static { index } => self.remove_static(index),
            _ => {}
        }
        Some(member)
    }

    /// Insert `delta` inherited slots below every own slot.
    fn shift_slots(&mut self, delta: u32) {
        self.instance_slots += delta;
        self.inherited_slots += delta;
        self.peak_slots += delta;
        for index in &mut self.recycled_slots {
            *index += delta;
        }
        for member in self.members.values_mut() {
            if let MemberKind::Variable { index } = &mut member.kind {
                *index += delta;
            }
        }
        self.free_slots.shift(delta);
    }
}

impl TypeArena {
    /// Create and register a script class.
    pub fn new_class(
        &mut self,
        name: Name,
        base: Option<TypeId>,
        enclosing: Option<TypeId>,
        qualifiers: TypeQualifiers,
        decl: Option<Rc<ClassDecl>>,
    ) -> TypeId {
        let inherited = base
            .and_then(|b| self.get(b))
            .map_or(0, Type::instance_slots);
        let mut ty = Type::new(name, TypeKind::Class)
            .with_enclosing(enclosing)
            .with_qualifiers(qualifiers)
            .with_inherited_slots(inherited);
        ty.base = base;
        ty.class_decl = decl;
        let id = self.alloc(ty);
        self.register_class(id);
        id
    }

    /// Declare `name` on `ty`, replacing an existing member of that name.
    /// Returns `None` for a stale handle.
    pub fn add_member(
        &mut self,
        ty: TypeId,
        name: Name,
        new: NewMember,
        attrs: MemberAttrs,
    ) -> Option<Member> {
        Some(self.get_mut(ty)?.declare(ty, name, new, attrs))
    }

    pub fn delete_member(&mut self, ty: TypeId, name: Name) -> Option<Member> {
        self.get_mut(ty)?.undeclare(name)
    }

    /// Replace the placeholder `stub` with the real class `real`.
    ///
    /// Every registered class deriving from `stub`, directly or not, gets
    /// `real`'s instance slots inserted below its own. Direct children are
    /// repointed at `real`, and the stub is freed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve_forward_base(&mut self, stub: TypeId, real: TypeId) -> bool {
        let Some(stub_name) = self.get(stub).filter(|t| t.is_placeholder()).map(|t| t.name)
        else {
            return false;
        };
        let Some(delta) = self.get(real).map(Type::instance_slots) else {
            return false;
        };

        let derived: Vec<TypeId> = self
            .classes()
            .iter()
            .copied()
            .filter(|&c| c != stub && self.derives_from(c, stub))
            .collect();

        for id in &derived {
            if let Some(ty) = self.get_mut(*id) {
                ty.shift_slots(delta);
                if ty.base == Some(stub) {
                    ty.base = Some(real);
                }
            }
        }

        self.forget_placeholder(stub_name);
        self.remove(stub);
        debug!(shifted = derived.len(), delta, "resolved forward base");
        true
    }
}

#[cfg(test)]
mod tests;
