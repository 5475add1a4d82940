//! Process - simulated job record
//!
//! One record per workload row. The scheduler loop owns the table of
//! records and mutates them through the tick clock; the allocator and the
//! child controller attach their handles (memory block, live worker) to
//! the record that owns them.

use crate::memory::BlockRef;
use crate::worker::Worker;

/// Lifecycle state of a simulated process.
///
/// A process moves Idle → Ready → Running → Finished exactly once; under
/// round-robin it may bounce Ready ⇌ Running while its service drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Arrived (or not yet arrived) and not yet granted memory.
    Idle,

    /// Memory granted, waiting in the ready pool.
    Ready,

    /// Holds the simulated CPU this quantum.
    Running,

    /// Service fully drained; only statistics remain.
    Finished,
}

impl ProcessState {
    /// Has the process left the system?
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// A simulated process: identity, service accounting, and the handles it
/// owns while alive (memory block, worker child).
#[derive(Debug)]
pub struct Process {
    name: String,
    arrival: u32,
    service: u32,
    remaining: u32,
    memory: u32,
    state: ProcessState,
    finish: u32,
    block: Option<BlockRef>,
    worker: Option<Worker>,
}

impl Process {
    pub fn new(name: String, arrival: u32, service: u32, memory: u32) -> Self {
        Self {
            name,
            arrival,
            service,
            remaining: service,
            memory,
            state: ProcessState::Idle,
            finish: 0,
            block: None,
            worker: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival(&self) -> u32 {
        self.arrival
    }

    pub fn service(&self) -> u32 {
        self.service
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Memory requirement in bytes.
    pub fn memory(&self) -> u32 {
        self.memory
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    /// Drain one quantum of service. Returns true when the process expires
    /// on this tick; the remaining time clamps to zero and the state moves
    /// to [`ProcessState::Finished`].
    pub fn tick(&mut self, quantum: u32) -> bool {
        if self.remaining <= quantum {
            self.remaining = 0;
            self.state = ProcessState::Finished;
            true
        } else {
            self.remaining -= quantum;
            false
        }
    }

    /// Record the completion clock, from which turnaround and overhead
    /// derive.
    pub fn record_finish(&mut self, now: u32) {
        self.finish = now;
    }

    pub fn finish_time(&self) -> u32 {
        self.finish
    }

    /// Completion clock minus arrival.
    pub fn turnaround(&self) -> u32 {
        self.finish - self.arrival
    }

    /// Turnaround divided by service time: the stretch factor relative to
    /// running uninterrupted.
    pub fn overhead(&self) -> f64 {
        f64::from(self.turnaround()) / f64::from(self.service)
    }

    pub fn block(&self) -> Option<BlockRef> {
        self.block
    }

    pub fn attach_block(&mut self, block: BlockRef) {
        self.block = Some(block);
    }

    pub fn take_block(&mut self) -> Option<BlockRef> {
        self.block.take()
    }

    pub fn worker_mut(&mut self) -> Option<&mut Worker> {
        self.worker.as_mut()
    }

    pub fn attach_worker(&mut self, worker: Worker) {
        self.worker = Some(worker);
    }
}
