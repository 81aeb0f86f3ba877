//! Runtime Types and the arena that owns them.

mod builtin;

pub use builtin::BuiltinTypes;

use std::rc::Rc;

use indexmap::IndexMap;
use qs_ir::{ClassDecl, Expr, FunctionDecl, Name, StringInterner, TypeId};
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::{Arena, Member, SlotFreeList, TypeQualifiers, Value};

pub(crate) type MemberTable = IndexMap<Name, Member, FxBuildHasher>;

/// Closed set of Type variants. Behavior that differs between values is
/// dispatched on this tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    /// Plain script object with dynamic properties.
    Object,
    Array,
    /// `Error` and its builtin subclasses.
    Error,
    /// Type of function references.
    FuncRef,
    /// Type of Type values.
    TypeType,
    /// Script class.
    Class,
    /// Activation record of a script function.
    Function,
    /// Block scope; shares its storage with the enclosing scope.
    Block,
    /// Scope of one `eval` call.
    Eval,
    Global,
    /// Stand-in for a base class that is not declared yet.
    Placeholder,
    /// Object owned by the embedding application.
    Host,
}

impl TypeKind {
    /// Instances of this kind accept dynamic properties.
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            TypeKind::Object
                | TypeKind::Array
                | TypeKind::Error
                | TypeKind::Class
                | TypeKind::Global
        )
    }

    /// A class may extend a Type value of this kind, and `new` builds an
    /// instance of it.
    pub fn is_constructible(self) -> bool {
        matches!(
            self,
            TypeKind::Object | TypeKind::Array | TypeKind::Error | TypeKind::Class
        )
    }

    /// Name reported by `typeof` for values of this kind.
    pub fn typeof_name(self) -> &'static str {
        match self {
            TypeKind::Undefined => "undefined",
            TypeKind::Null => "null",
            TypeKind::Boolean => "boolean",
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::FuncRef | TypeKind::TypeType => "function",
            _ => "object",
        }
    }
}

/// Member initializer run at construction (or class definition for
/// statics). The member is looked up by name each time, so index shifts
/// from forward-base resolution are honored.
#[derive(Clone, Debug)]
pub struct Initializer {
    pub name: Name,
    pub expr: Rc<Expr>,
}

/// Describes one category of values.
#[derive(Debug)]
pub struct Type {
    pub name: Name,
    pub kind: TypeKind,
    pub base: Option<TypeId>,
    pub enclosing: Option<TypeId>,
    pub qualifiers: TypeQualifiers,
    pub(crate) members: MemberTable,
    /// Own plus inherited instance slots.
    pub(crate) instance_slots: u32,
    /// Slots below the first own slot (base class, or the enclosing scope of
    /// a block).
    pub(crate) inherited_slots: u32,
    /// Slots held for nested block scopes.
    pub(crate) reserved_slots: u32,
    pub(crate) free_slots: SlotFreeList,
    /// Highest slot count this Type ever had. Instances may hold values at
    /// any index below it.
    pub(crate) peak_slots: u32,
    /// Indices below the peak handed out again since the last drain.
    pub(crate) recycled_slots: SmallVec<[u32; 2]>,
    pub(crate) statics: Vec<Value>,
    pub member_inits: Vec<Initializer>,
    pub static_inits: Vec<Initializer>,
    pub class_decl: Option<Rc<ClassDecl>>,
    pub function_decl: Option<Rc<FunctionDecl>>,
}

impl Type {
    pub fn new(name: Name, kind: TypeKind) -> Self {
        Type {
            name,
            kind,
            base: None,
            enclosing: None,
            qualifiers: TypeQualifiers::empty(),
            members: MemberTable::default(),
            instance_slots: 0,
            inherited_slots: 0,
            reserved_slots: 0,
            free_slots: SlotFreeList::new(),
            peak_slots: 0,
            recycled_slots: SmallVec::new(),
            statics: Vec::new(),
            member_inits: Vec::new(),
            static_inits: Vec::new(),
            class_decl: None,
            function_decl: None,
        }
    }

    #[must_use]
    pub fn with_enclosing(mut self, enclosing: Option<TypeId>) -> Self {
        self.enclosing = enclosing;
        self
    }

    #[must_use]
    pub fn with_qualifiers(mut self, qualifiers: TypeQualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    /// Start own slots at `count`, e.g. after the enclosing scope's slots
    /// for a block, or after the base class's slots.
    #[must_use]
    pub fn with_inherited_slots(mut self, count: u32) -> Self {
        self.inherited_slots = count;
        self.instance_slots = count;
        self.peak_slots = count;
        self
    }

    /// Own member, without looking at the base chain.
    pub fn member(&self, name: Name) -> Option<&Member> {
        self.members.get(&name)
    }

    /// Own members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn instance_slots(&self) -> u32 {
        self.instance_slots
    }

    pub fn inherited_slots(&self) -> u32 {
        self.inherited_slots
    }

    pub fn reserved_slots(&self) -> u32 {
        self.reserved_slots
    }

    pub fn free_slots(&self) -> &SlotFreeList {
        &self.free_slots
    }

    /// Slot indices in use: inherited slots, live own variables and slots
    /// reserved for nested blocks. Indices on the free list are excluded.
    pub fn occupied_slots(&self) -> u32 {
        let free = u32::try_from(self.free_slots.len()).unwrap_or(u32::MAX);
        self.instance_slots.saturating_sub(free)
    }

    /// Indices handed out again and not yet drained.
    pub fn recycled_slots(&self) -> &[u32] {
        &self.recycled_slots
    }

    /// Record an index that existing instances may still hold a value for.
    pub(crate) fn note_allocated(&mut self, index: u32) {
        if index < self.peak_slots && !self.recycled_slots.contains(&index) {
            self.recycled_slots.push(index);
        }
        self.peak_slots = self.peak_slots.max(self.instance_slots);
    }

    /// Grow the slot count to at least `count`, e.g. to cover a nested
    /// block scope's variables.
    pub fn reserve_slots(&mut self, count: u32) {
        if count > self.instance_slots {
            for index in self.instance_slots..count {
                self.note_allocated(index);
            }
            self.reserved_slots += count - self.instance_slots;
            self.instance_slots = count;
            self.peak_slots = self.peak_slots.max(count);
        }
    }

    pub fn statics(&self) -> &[Value] {
        &self.statics
    }

    pub fn static_value(&self, index: u32) -> Option<&Value> {
        self.statics.get(index as usize)
    }

    /// Write static storage. Returns `false` for an out-of-range index.
    pub fn set_static(&mut self, index: u32, value: Value) -> bool {
        match self.statics.get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == TypeKind::Placeholder
    }

    pub fn is_abstract(&self) -> bool {
        self.qualifiers.contains(TypeQualifiers::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.qualifiers.contains(TypeQualifiers::FINAL)
    }

    /// Drop everything that can keep other entities alive: member table,
    /// static storage and syntax back-pointers.
    pub(crate) fn finalize(&mut self) {
        self.members.clear();
        self.statics.clear();
        self.member_inits.clear();
        self.static_inits.clear();
        self.class_decl = None;
        self.function_decl = None;
        self.free_slots.clear();
        self.recycled_slots.clear();
    }
}

/// Owner of every Type in an environment.
#[derive(Default)]
pub struct TypeArena {
    arena: Arena<TypeId, Type>,
    /// Script classes in declaration order.
    classes: Vec<TypeId>,
    /// Unresolved forward-declared bases by name.
    placeholders: FxHashMap<Name, TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        self.arena.insert(ty)
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.arena.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut Type> {
        self.arena.get_mut(id)
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.arena.contains(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn ids(&self) -> Vec<TypeId> {
        self.arena.ids()
    }

    pub fn kind(&self, id: TypeId) -> Option<TypeKind> {
        self.get(id).map(|t| t.kind)
    }

    /// Readable name of a Type, `"<stale>"` for a dead handle.
    pub fn name_of(&self, id: TypeId, interner: &StringInterner) -> &'static str {
        self.get(id)
            .map_or("<stale>", |t| interner.lookup(t.name))
    }

    pub fn register_class(&mut self, id: TypeId) {
        self.classes.push(id);
    }

    pub fn classes(&self) -> &[TypeId] {
        &self.classes
    }

    /// Unresolved placeholder registered for `name`.
    pub fn placeholder(&self, name: Name) -> Option<TypeId> {
        self.placeholders.get(&name).copied()
    }

    /// Create (or reuse) the placeholder standing in for class `name`.
    pub fn placeholder_for(&mut self, name: Name) -> TypeId {
        if let Some(id) = self.placeholder(name) {
            return id;
        }
        let id = self.alloc(Type::new(name, TypeKind::Placeholder));
        self.placeholders.insert(name, id);
        id
    }

    pub(crate) fn forget_placeholder(&mut self, name: Name) {
        self.placeholders.remove(&name);
    }

    /// `id` followed by its bases, nearest first.
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(ty) = current {
            if chain.contains(&ty) {
                break;
            }
            let Some(entry) = self.get(ty) else { break };
            chain.push(ty);
            current = entry.base;
        }
        chain
    }

    /// Find a member on `id` or its bases.
    pub fn lookup(&self, id: TypeId, name: Name) -> Option<&Member> {
        self.base_chain(id)
            .into_iter()
            .find_map(|ty| self.get(ty).and_then(|t| t.member(name)))
    }

    /// `ty` is `ancestor` or derives from it.
    pub fn derives_from(&self, ty: TypeId, ancestor: TypeId) -> bool {
        self.base_chain(ty).contains(&ancestor)
    }

    /// First placeholder in the base chain of `id`, and whether it is
    /// reached through an intermediate class.
    pub fn placeholder_base(&self, id: TypeId) -> Option<(TypeId, bool)> {
        self.base_chain(id)
            .into_iter()
            .enumerate()
            .skip(1)
            .find(|&(_, ty)| self.get(ty).is_some_and(Type::is_placeholder))
            .map(|(depth, ty)| (ty, depth > 1))
    }

    /// Drain the recycled slot indices of every Type, keyed by the Type
    /// whose instances hold them.
    pub fn take_recycled_slots(&mut self) -> Vec<(TypeId, u32)> {
        let mut recycled = Vec::new();
        for id in self.arena.ids() {
            if let Some(ty) = self.arena.get_mut(id) {
                recycled.extend(ty.recycled_slots.drain(..).map(|slot| (id, slot)));
            }
        }
        recycled
            .into_iter()
            .map(|(id, slot)| (self.storage_type(id), slot))
            .collect()
    }

    /// Type whose instances hold the slots of `id`. A block outside a class
    /// body shares the storage of its enclosing scope.
    pub fn storage_type(&self, id: TypeId) -> TypeId {
        let mut current = id;
        while let Some(ty) = self.get(current) {
            match ty.enclosing {
                Some(outer) if ty.kind == TypeKind::Block && self.kind(outer) != Some(TypeKind::Class) => {
                    current = outer;
                }
                _ => break,
            }
        }
        current
    }

    /// Every live Type, for marking roots and finalization.
    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.arena.iter()
    }

    /// First teardown phase: break every link held by every Type.
    pub fn finalize_all(&mut self) {
        for ty in self.arena.iter_mut() {
            ty.finalize();
        }
    }

    /// Second teardown phase: free all Types and forget the registries.
    pub fn teardown(&mut self) {
        self.arena.clear();
        self.classes.clear();
        self.placeholders.clear();
    }

    pub(crate) fn remove(&mut self, id: TypeId) -> Option<Type> {
        self.classes.retain(|&c| c != id);
        self.arena.remove(id)
    }
}
