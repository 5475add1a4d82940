//! Memory - admission strategies over the contiguous arena
//!
//! Two strategies, fixed per run: `infinite` admits unconditionally and
//! tracks nothing; `best-fit` carves process blocks out of the 2048-byte
//! arena and defers any process that does not fit until a hole opens up.

pub mod arena;

pub use arena::{Arena, Block, BlockKind, BlockRef};

use clap::ValueEnum;
use log::debug;

use crate::process::Process;

/// Memory admission strategy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MemStrategy {
    /// No memory accounting; every arrived process is admitted.
    #[value(name = "infinite")]
    Infinite,
    /// Contiguous best-fit over the 2048-byte arena.
    #[value(name = "best-fit")]
    BestFit,
}

/// Per-run memory state: the strategy plus the arena it manages.
#[derive(Debug)]
pub struct MemoryManager {
    strategy: MemStrategy,
    arena: Arena,
}

impl MemoryManager {
    pub fn new(strategy: MemStrategy) -> Self {
        Self {
            strategy,
            arena: Arena::new(),
        }
    }

    /// Try to grant the process its memory requirement. Under best-fit a
    /// failed fit leaves the process unadmitted for this tick; under
    /// infinite admission always succeeds and no block is attached.
    pub fn try_admit(&mut self, process: &mut Process) -> bool {
        match self.strategy {
            MemStrategy::Infinite => true,
            MemStrategy::BestFit => match self.arena.allocate(process.memory()) {
                Some(block) => {
                    process.attach_block(block);
                    true
                }
                None => {
                    debug!(
                        "no hole fits {} ({} bytes), deferring",
                        process.name(),
                        process.memory()
                    );
                    false
                }
            },
        }
    }

    /// Give back a finished process's block. No-op under infinite.
    pub fn release(&mut self, process: &mut Process) {
        if let Some(block) = process.take_block() {
            self.arena.free(block);
        }
    }

    /// Start address of the block granted to `process`, if one is tracked.
    pub fn assigned_address(&self, process: &Process) -> Option<u32> {
        process.block().map(|block| self.arena.address(block))
    }
}
