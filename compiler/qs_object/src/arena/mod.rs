//! Generation-checked arena.
//!
//! Slots are reused through a free list. Each reuse bumps the slot's
//! generation, so a handle to a freed entry is detected instead of aliasing
//! whatever took its place.

use qs_ir::TypeId;

use crate::ObjectId;

/// Handle type stored in an [`Arena`].
pub trait ArenaId: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

impl ArenaId for TypeId {
    #[inline]
    fn from_parts(index: u32, generation: u32) -> Self {
        TypeId::new(index, generation)
    }

    #[inline]
    fn index(self) -> usize {
        TypeId::index(self)
    }

    #[inline]
    fn generation(self) -> u32 {
        TypeId::generation(self)
    }
}

impl ArenaId for ObjectId {
    #[inline]
    fn from_parts(index: u32, generation: u32) -> Self {
        ObjectId::new(index, generation)
    }

    #[inline]
    fn index(self) -> usize {
        ObjectId::index(self)
    }

    #[inline]
    fn generation(self) -> u32 {
        ObjectId::generation(self)
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Arena<I, T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    live: usize,
    _id: std::marker::PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Arena {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
            _id: std::marker::PhantomData,
        }
    }

    pub fn insert(&mut self, value: T) -> I {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            return I::from_parts(index, entry.generation);
        }
        let index = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        I::from_parts(index, 0)
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.entries
            .get(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.value.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.value.as_mut())
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Free an entry. Its handle, and every copy of it, becomes stale.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let entry = self.entries.get_mut(id.index())?;
        if entry.generation != id.generation() {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(u32::try_from(id.index()).unwrap_or(u32::MAX));
        self.live -= 1;
        Some(value)
    }

    /// Handles of all live entries, in slot order.
    pub fn ids(&self) -> Vec<I> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.value.is_some())
            .map(|(i, e)| I::from_parts(u32::try_from(i).unwrap_or(u32::MAX), e.generation))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|e| e.value.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|e| e.value.as_mut())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drop every entry and forget all slots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
