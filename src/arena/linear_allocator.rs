use super::{ArenaError, Handle, SlotBlock};

/// Append-only pool. Slots are reclaimed all at once by [`flush`], or one at
/// a time from the end with [`destroy_last`].
///
/// [`flush`]: LinearAllocator::flush
/// [`destroy_last`]: LinearAllocator::destroy_last
pub struct LinearAllocator<T> {
    block: SlotBlock<T>,
}

impl<T> LinearAllocator<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            block: SlotBlock::new(capacity),
        }
    }

    pub fn construct(&mut self, value: T) -> Result<Handle, ArenaError> {
        self.block.push(value)
    }

    pub fn destroy_last(&mut self) -> Option<T> {
        self.block.pop()
    }

    #[inline]
    pub fn get(&self, handle: Handle) -> Result<&T, ArenaError> {
        self.block.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ArenaError> {
        self.block.get_mut(handle)
    }

    /// Empties the pool; the next `construct` lands in slot 0 again.
    pub fn flush(&mut self) {
        self.block.flush();
    }

    /// Occupied slots in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.block.iter()
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    pub fn remaining(&self) -> usize {
        self.block.capacity() - self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}
