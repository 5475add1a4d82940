//! Arena - contiguous memory map with a size-sorted holes index
//!
//! The 2048-byte address space is an ordered sequence of blocks, each
//! either owned by a process or a hole. A second sequence indexes the
//! holes ascending by size, so best-fit admission is "first hole that
//! fits". Invariants after every operation:
//!
//! - block starts are strictly increasing and exactly contiguous
//! - the first block starts at 0 and sizes sum to the capacity
//! - no two adjacent blocks are both holes
//! - the holes index holds exactly the arena's holes, ascending by size

use log::debug;

use crate::collections::{LinkedSequence, NodeRef};

/// Handle to a block in the arena.
pub type BlockRef = NodeRef;

/// What a region of the address space currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Owned by an admitted process.
    Process,
    /// Free for allocation.
    Hole,
}

/// One contiguous region of the arena.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub kind: BlockKind,
    /// Byte offset of the region's first byte.
    pub start: u32,
    /// Region length in bytes, always > 0.
    pub size: u32,
}

/// Contiguous address space with best-fit allocation and coalescing free.
#[derive(Debug)]
pub struct Arena {
    blocks: LinkedSequence<Block>,
    holes: LinkedSequence<BlockRef>,
}

impl Arena {
    /// Total bytes managed.
    pub const CAPACITY: u32 = 2048;

    /// A fresh arena is a single hole spanning the whole address space.
    pub fn new() -> Self {
        let mut blocks = LinkedSequence::new();
        let mut holes = LinkedSequence::new();
        let initial = blocks.push_back(Block {
            kind: BlockKind::Hole,
            start: 0,
            size: Self::CAPACITY,
        });
        holes.push_back(initial);
        Self { blocks, holes }
    }

    /// Byte offset of a block.
    pub fn address(&self, block: BlockRef) -> u32 {
        self.blocks.get(block).start
    }

    /// Carve `size` bytes out of the smallest hole that fits. Returns the
    /// new process block, or None when no hole is large enough.
    pub fn allocate(&mut self, size: u32) -> Option<BlockRef> {
        // ascending index: the first hole that fits is the best fit
        let mut cursor = self.holes.front();
        let (entry, hole) = loop {
            let entry = cursor?;
            let hole = *self.holes.get(entry);
            if self.blocks.get(hole).size >= size {
                break (entry, hole);
            }
            cursor = self.holes.next(entry);
        };
        self.holes.remove(entry);

        let start = self.blocks.get(hole).start;
        let block = self.blocks.insert_before(
            hole,
            Block {
                kind: BlockKind::Process,
                start,
                size,
            },
        );
        {
            let rest = self.blocks.get_mut(hole);
            rest.start += size;
            rest.size -= size;
        }
        if self.blocks.get(hole).size == 0 {
            self.blocks.remove(hole);
        } else {
            self.index_hole(hole);
        }
        debug!("allocated {} bytes at {}", size, start);
        Some(block)
    }

    /// Return a process block to the free pool, merging with free
    /// neighbours on both sides.
    pub fn free(&mut self, block: BlockRef) {
        self.blocks.get_mut(block).kind = BlockKind::Hole;

        while let Some(next) = self.blocks.next(block) {
            if self.blocks.get(next).kind != BlockKind::Hole {
                break;
            }
            self.unindex_hole(next);
            let absorbed = self.blocks.remove(next);
            self.blocks.get_mut(block).size += absorbed.size;
        }
        while let Some(prev) = self.blocks.prev(block) {
            if self.blocks.get(prev).kind != BlockKind::Hole {
                break;
            }
            self.unindex_hole(prev);
            let absorbed = self.blocks.remove(prev);
            let merged = self.blocks.get_mut(block);
            merged.start = absorbed.start;
            merged.size += absorbed.size;
        }
        self.index_hole(block);
        debug!(
            "freed block, hole now {} bytes at {}",
            self.blocks.get(block).size,
            self.blocks.get(block).start
        );
    }

    /// Insert a hole into the index, ascending by size, ties after their
    /// equals.
    fn index_hole(&mut self, hole: BlockRef) {
        let blocks = &self.blocks;
        self.holes
            .insert_sorted_by(hole, |a, b| blocks.get(*a).size < blocks.get(*b).size);
    }

    /// Drop a hole's index entry.
    fn unindex_hole(&mut self, hole: BlockRef) {
        let mut cursor = self.holes.front();
        while let Some(entry) = cursor {
            if *self.holes.get(entry) == hole {
                self.holes.remove(entry);
                return;
            }
            cursor = self.holes.next(entry);
        }
    }

    /// Blocks in address order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Hole sizes in index order.
    pub fn hole_sizes(&self) -> Vec<u32> {
        self.holes
            .iter()
            .map(|hole| self.blocks.get(*hole).size)
            .collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
