//! Attribute and qualifier bit sets.

use bitflags::bitflags;

bitflags! {
    /// Per-member attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MemberAttrs: u16 {
        const STATIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PUBLIC = 1 << 2;
        const READABLE = 1 << 3;
        const WRITABLE = 1 << 4;
        const EXECUTABLE = 1 << 5;
        const ENUMERABLE = 1 << 6;
    }
}

impl MemberAttrs {
    /// Plain `var`.
    pub const VARIABLE: MemberAttrs = MemberAttrs::READABLE
        .union(MemberAttrs::WRITABLE)
        .union(MemberAttrs::ENUMERABLE);

    /// `const`.
    pub const CONSTANT: MemberAttrs = MemberAttrs::READABLE.union(MemberAttrs::ENUMERABLE);

    /// Function member.
    pub const FUNCTION: MemberAttrs = MemberAttrs::READABLE.union(MemberAttrs::EXECUTABLE);

    /// Class name bound in its enclosing scope.
    pub const CLASS: MemberAttrs = MemberAttrs::STATIC
        .union(MemberAttrs::READABLE)
        .union(MemberAttrs::EXECUTABLE);
}

bitflags! {
    /// Per-type qualifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeQualifiers: u16 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const STATIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PUBLIC = 1 << 4;
        const EXECUTABLE = 1 << 5;
        /// Activation type of a class constructor.
        const CONSTRUCTOR = 1 << 6;
    }
}
