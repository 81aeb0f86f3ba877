//! Free list for instance-variable slot indices.
//!
//! A Type's instance-slot counter only grows when the free list is empty.
//! Releasing the topmost index shrinks the counter instead of recording the
//! index, and any free indices exposed at the new top are folded in too.

use smallvec::SmallVec;

/// Released slot indices awaiting reuse.
///
/// Never hands out an index that is still held by a live member, provided
/// every index is released at most once.
#[derive(Clone, Debug, Default)]
pub struct SlotFreeList {
    free: SmallVec<[u32; 4]>,
}

impl SlotFreeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a free index, or bump `count` when none is free.
    pub fn allocate(&mut self, count: &mut u32) -> u32 {
        if let Some(index) = self.free.pop() {
            return index;
        }
        let index = *count;
        *count += 1;
        index
    }

    /// Return `index` to the pool.
    pub fn release(&mut self, index: u32, count: &mut u32) {
        debug_assert!(index < *count, "released slot {index} beyond count {count}");
        debug_assert!(!self.free.contains(&index), "slot {index} released twice");
        if index + 1 != *count {
            self.free.push(index);
            return;
        }
        *count -= 1;
        while let Some(pos) = self.free.iter().position(|&i| i + 1 == *count) {
            self.free.swap_remove(pos);
            *count -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.free.contains(&index)
    }

    /// Shift every free index up by `delta`, used when a forward-declared
    /// base is resolved and inherited slots are inserted below.
    pub fn shift(&mut self, delta: u32) {
        for index in &mut self.free {
            *index += delta;
        }
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

#[cfg(test)]
mod tests;
