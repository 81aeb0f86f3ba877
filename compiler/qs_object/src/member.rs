//! Member table entries.

use std::rc::Rc;

use qs_ir::{FunctionDecl, Name, TypeId};

use crate::{MemberAttrs, NativeFunction};

/// A named, attributed entry of a Type's member table.
#[derive(Clone, Debug)]
pub struct Member {
    pub name: Name,
    pub kind: MemberKind,
    pub attrs: MemberAttrs,
    /// Type whose table holds this member.
    pub owner: TypeId,
}

#[derive(Clone, Debug)]
pub enum MemberKind {
    /// Instance variable at a slot index.
    Variable { index: u32 },
    /// Static variable at an index into the owner's static storage.
    Static { index: u32 },
    NativeFunction(NativeFunction),
    ScriptFunction(Rc<FunctionDecl>),
    /// Dynamic property of an instance; not stored in member tables by the
    /// resolver, but produced for references.
    Dynamic,
    /// Name with no storage yet: forward declarations and unresolved
    /// references.
    Placeholder,
}

impl Member {
    pub fn is_static(&self) -> bool {
        self.attrs.contains(MemberAttrs::STATIC)
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Variable { .. } | MemberKind::Static { .. }
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::NativeFunction(_) | MemberKind::ScriptFunction(_)
        )
    }

    pub fn is_writable(&self) -> bool {
        self.attrs.contains(MemberAttrs::WRITABLE)
    }

    pub fn is_enumerable(&self) -> bool {
        self.attrs.contains(MemberAttrs::ENUMERABLE)
    }
}

/// What a declaration asks the member table for. Whether a variable is
/// static comes from the attributes.
#[derive(Clone, Debug)]
pub enum NewMember {
    Variable,
    Native(NativeFunction),
    Script(Rc<FunctionDecl>),
    Dynamic,
    Placeholder,
}
