use super::{ArenaError, Handle, SlotBlock};

/// LIFO pool: only the most recently constructed slot may be destroyed.
pub struct StackAllocator<T> {
    block: SlotBlock<T>,
}

impl<T> StackAllocator<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            block: SlotBlock::new(capacity),
        }
    }

    /// Places `value` in the next free slot.
    pub fn construct(&mut self, value: T) -> Result<Handle, ArenaError> {
        self.block.push(value)
    }

    /// Releases the top slot and hands its value back.
    ///
    /// Any handle other than the current top is rejected and the pool is left
    /// untouched.
    pub fn destroy(&mut self, handle: Handle) -> Result<T, ArenaError> {
        let top = match self.block.len().checked_sub(1) {
            Some(top) => top,
            None => return Err(ArenaError::InvalidHandle(handle.index())),
        };

        if handle.index() > top {
            return Err(ArenaError::InvalidHandle(handle.index()));
        }
        if handle.index() != top {
            return Err(ArenaError::NotMostRecent {
                handle: handle.index(),
                top,
            });
        }

        self.block
            .pop()
            .ok_or(ArenaError::InvalidHandle(handle.index()))
    }

    pub fn get(&self, handle: Handle) -> Result<&T, ArenaError> {
        self.block.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ArenaError> {
        self.block.get_mut(handle)
    }

    /// Handle of the most recently constructed live slot.
    pub fn top(&self) -> Option<Handle> {
        self.block.len().checked_sub(1).map(Handle)
    }

    pub fn flush(&mut self) {
        self.block.flush();
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
