//! Ready pools
//!
//! The pool of memory-granted, not-yet-running processes. SJF keeps a
//! min-heap ordered by (service time, name) so the extraction order is
//! total and deterministic; RR keeps plain FIFO arrival order.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::collections::MinHeap;
use crate::process::Process;

use super::ProcId;

/// Insertion/extraction interface shared by both disciplines.
pub trait ReadyPool {
    fn admit(&mut self, id: ProcId, process: &Process);
    fn take_next(&mut self) -> Option<ProcId>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Heap entry for SJF: shorter service first, name breaks ties.
#[derive(Debug)]
struct SjfEntry {
    service: u32,
    name: String,
    id: ProcId,
}

impl Ord for SjfEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.service
            .cmp(&other.service)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for SjfEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SjfEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SjfEntry {}

/// Min-heap pool for shortest job first.
#[derive(Debug, Default)]
pub struct SjfPool {
    heap: MinHeap<SjfEntry>,
}

impl SjfPool {
    pub fn new() -> Self {
        Self {
            heap: MinHeap::new(),
        }
    }
}

impl ReadyPool for SjfPool {
    fn admit(&mut self, id: ProcId, process: &Process) {
        self.heap.push(SjfEntry {
            service: process.service(),
            name: process.name().to_owned(),
            id,
        });
    }

    fn take_next(&mut self) -> Option<ProcId> {
        self.heap.pop().map(|entry| entry.id)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// FIFO pool for round robin.
#[derive(Debug, Default)]
pub struct RrPool {
    fifo: VecDeque<ProcId>,
}

impl RrPool {
    pub fn new() -> Self {
        Self {
            fifo: VecDeque::new(),
        }
    }
}

impl ReadyPool for RrPool {
    fn admit(&mut self, id: ProcId, _process: &Process) {
        self.fifo.push_back(id);
    }

    fn take_next(&mut self) -> Option<ProcId> {
        self.fifo.pop_front()
    }

    fn len(&self) -> usize {
        self.fifo.len()
    }
}
