//! Block bump allocator for search tree nodes.
//!
//! Slots are handed out in order from a preallocated block. When a block
//! is full a new one is allocated next to it (up to a fixed number of
//! blocks), so existing slots never move. Slots are never freed one by
//! one: the whole pool is released at once by [`MemoryPool::reset`].

use std::ops::{Index, IndexMut};

/// Handle to a slot in a [`MemoryPool`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub struct MemoryPool<T> {
    blocks: Vec<Vec<T>>,
    block_size: usize,
    max_blocks: usize,
    len: usize,
}

impl<T> MemoryPool<T> {
    /// Create a pool of `max_blocks` blocks of `block_size` slots each.
    /// The first block is allocated immediately.
    pub fn new(block_size: usize, max_blocks: usize) -> Self {
        assert!(block_size > 0 && max_blocks > 0, "empty memory pool");
        assert!(
            block_size.saturating_mul(max_blocks) <= u32::MAX as usize,
            "memory pool too large for 32-bit handles"
        );
        Self {
            blocks: vec![Vec::with_capacity(block_size)],
            block_size,
            max_blocks,
            len: 0,
        }
    }

    /// Store `value` in the next free slot, growing by one block if needed.
    /// Returns `None` once every block is full.
    pub fn allocate(&mut self, value: T) -> Option<NodeId> {
        let full = self
            .blocks
            .last()
            .is_none_or(|block| block.len() == self.block_size);
        if full {
            if self.blocks.len() >= self.max_blocks {
                return None;
            }
            self.blocks.push(Vec::with_capacity(self.block_size));
        }
        let block = self.blocks.last_mut()?;
        block.push(value);
        let id = NodeId(self.len as u32);
        self.len += 1;
        Some(id)
    }

    /// Number of allocated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots the pool may ever hand out.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.block_size * self.max_blocks
    }

    /// Slots still available.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Number of blocks currently allocated.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Release every slot at once, keeping only the first block's memory.
    pub fn reset(&mut self) {
        self.blocks.truncate(1);
        if let Some(first) = self.blocks.first_mut() {
            first.clear();
        }
        self.len = 0;
    }

    #[inline]
    fn locate(&self, id: NodeId) -> (usize, usize) {
        let idx = id.index();
        assert!(idx < self.len, "node {idx} was never allocated");
        (idx / self.block_size, idx % self.block_size)
    }
}

impl<T> Index<NodeId> for MemoryPool<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        let (block, slot) = self.locate(id);
        &self.blocks[block][slot]
    }
}

impl<T> IndexMut<NodeId> for MemoryPool<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        let (block, slot) = self.locate(id);
        &mut self.blocks[block][slot]
    }
}
