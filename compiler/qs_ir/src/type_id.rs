//! Handle into the runtime type arena.

use std::fmt;

/// Generation-checked handle to a runtime `Type`.
///
/// Lives here rather than next to the arena so AST nodes can carry the
/// resolver's type annotations. The generation is bumped every time an arena
/// slot is reused; a handle whose generation no longer matches is stale.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TypeId {
    index: u32,
    generation: u32,
}

impl TypeId {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        TypeId { index, generation }
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

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({}v{})", self.index, self.generation)
    }
}
