//! Fixed-capacity, single-type node pools.
//!
//! Search trees allocate huge numbers of same-sized nodes, often under deep
//! recursion. Both allocators here reserve one contiguous block up front and
//! never grow it, so the hot path never touches the general-purpose heap.
//!
//! - [`StackAllocator`] reclaims slots in LIFO order only. Minimax nodes live
//!   exactly as long as one recursive call, which is this discipline.
//! - [`LinearAllocator`] is append-only and is reset in bulk with `flush`.
//!   MCTS trees grow monotonically during a search and are dropped whole.
//!
//! Slots are addressed by [`Handle`] indices instead of references, so a tree
//! stored in a pool can link parents and children without borrowing issues.

mod linear_allocator;
mod stack_allocator;

#[cfg(test)]
mod tests;

pub use linear_allocator::LinearAllocator;
pub use stack_allocator::StackAllocator;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    #[error("arena exhausted: all {capacity} slots are occupied")]
    Exhausted { capacity: usize },
    #[error("slot {handle} is not the most recently constructed slot (top is {top})")]
    NotMostRecent { handle: usize, top: usize },
    #[error("slot {0} is not occupied")]
    InvalidHandle(usize),
}

/// Index of an occupied slot in an allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Contiguous slot storage shared by both allocator flavours.
struct SlotBlock<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T> SlotBlock<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    fn push(&mut self, value: T) -> Result<Handle, ArenaError> {
        if self.slots.len() >= self.capacity {
            return Err(ArenaError::Exhausted {
                capacity: self.capacity,
            });
        }
        let handle = Handle(self.slots.len());
        self.slots.push(value);
        Ok(handle)
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        self.slots.pop()
    }

    #[inline]
    fn get(&self, handle: Handle) -> Result<&T, ArenaError> {
        self.slots
            .get(handle.0)
            .ok_or(ArenaError::InvalidHandle(handle.0))
    }

    #[inline]
    fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ArenaError> {
        self.slots
            .get_mut(handle.0)
            .ok_or(ArenaError::InvalidHandle(handle.0))
    }

    // `Vec::clear` keeps the reserved block; only the slot values are dropped.
    #[inline]
    fn flush(&mut self) {
        self.slots.clear();
    }

    #[inline]
    fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, value)| (Handle(index), value))
    }
}
