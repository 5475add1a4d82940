//! Cycle - the tick-driven simulation loop
//!
//! Time advances in fixed quanta. Each iteration, in order: drain the
//! running job's service and handle its completion, admit arrivals to the
//! input queue, tick the held child (SJF only), grant memory and fill the
//! ready pool, dispatch according to the policy, advance the clock. The
//! loop exits the moment the last process finishes, so the final clock
//! value is the makespan.
//!
//! Event lines are written to the output sink in a fixed per-tick order:
//! FINISHED and FINISHED-PROCESS for the expiring job, then one READY per
//! newly admitted process, then RUNNING for the dispatched job.

use std::collections::VecDeque;
use std::io::Write;

use log::debug;

use crate::error::SimError;
use crate::memory::{MemStrategy, MemoryManager};
use crate::process::{Process, ProcessState};
use crate::worker::WorkerControl;

use super::ready::{ReadyPool, RrPool, SjfPool};
use super::{Policy, ProcId};

/// Result of a completed run: the process table (all finished) and the
/// final clock value.
#[derive(Debug)]
pub struct Completed {
    pub processes: Vec<Process>,
    pub makespan: u32,
}

/// One simulation run. Owns the process table, the queues and the clock;
/// drives the child controller and writes event lines to `out`.
pub struct Simulation<C, W> {
    quantum: u32,
    policy: Policy,
    memory: MemoryManager,
    workers: C,
    out: W,
    procs: Vec<Process>,
    pending: VecDeque<ProcId>,
    input: VecDeque<ProcId>,
    ready: Box<dyn ReadyPool>,
    finished: Vec<ProcId>,
    current: Option<ProcId>,
    clock: u32,
}

impl<C: WorkerControl, W: Write> Simulation<C, W> {
    /// Build a run over `workload`, which must be sorted by arrival time
    /// with file order preserved among equal arrivals.
    pub fn new(
        workload: Vec<Process>,
        policy: Policy,
        strategy: MemStrategy,
        quantum: u32,
        workers: C,
        out: W,
    ) -> Self {
        let pending = (0..workload.len()).collect();
        let ready: Box<dyn ReadyPool> = match policy {
            Policy::Sjf => Box::new(SjfPool::new()),
            Policy::Rr => Box::new(RrPool::new()),
        };
        Self {
            quantum,
            policy,
            memory: MemoryManager::new(strategy),
            workers,
            out,
            procs: workload,
            pending,
            input: VecDeque::new(),
            ready,
            finished: Vec::new(),
            current: None,
            clock: 0,
        }
    }

    /// Run every process to completion and return the table plus the
    /// makespan.
    pub fn run(mut self) -> Result<Completed, SimError> {
        let total = self.procs.len();
        if total > 0 {
            loop {
                // drain the running job's service; its expiry is the one
                // completion event this tick can carry
                let mut expired = false;
                if let Some(id) = self.current {
                    if self.procs[id].tick(self.quantum) {
                        expired = true;
                        self.current = None;
                        self.finish(id)?;
                        if self.finished.len() == total {
                            break;
                        }
                    }
                }

                self.drain_arrivals();

                // SJF holds its job for the whole service, but the child is
                // ticked every quantum to keep its clock in step
                if self.policy == Policy::Sjf && !expired {
                    if let Some(id) = self.current {
                        self.workers.dispatch(&mut self.procs[id], self.clock)?;
                    }
                }

                self.admit_ready()?;

                match self.policy {
                    Policy::Sjf => {
                        if expired || (self.current.is_none() && !self.ready.is_empty()) {
                            self.dispatch_next()?;
                        }
                    }
                    Policy::Rr => {
                        if expired {
                            self.dispatch_next()?;
                        } else if !self.ready.is_empty() {
                            if let Some(id) = self.current {
                                self.ready.admit(id, &self.procs[id]);
                                self.procs[id].set_state(ProcessState::Ready);
                                self.workers.suspend(&mut self.procs[id], self.clock)?;
                            }
                            self.dispatch_next()?;
                        } else if let Some(id) = self.current {
                            self.workers.dispatch(&mut self.procs[id], self.clock)?;
                        }
                    }
                }

                self.clock += self.quantum;
            }
        }

        Ok(Completed {
            processes: self.procs,
            makespan: self.clock,
        })
    }

    /// Emit the completion events for `id`, terminate its child and give
    /// back its memory. `proc_remaining` counts arrived-but-unfinished
    /// processes at the moment of completion, before this tick's arrivals.
    fn finish(&mut self, id: ProcId) -> Result<(), SimError> {
        let proc_remaining = self.input.len() + self.ready.len();
        self.finished.push(id);
        writeln!(
            self.out,
            "{},FINISHED,process_name={},proc_remaining={}",
            self.clock,
            self.procs[id].name(),
            proc_remaining
        )?;

        let hash = self.workers.retire(&mut self.procs[id], self.clock)?;
        writeln!(
            self.out,
            "{},FINISHED-PROCESS,process_name={},sha={}",
            self.clock,
            self.procs[id].name(),
            hash
        )?;

        self.procs[id].record_finish(self.clock);
        self.memory.release(&mut self.procs[id]);
        debug!("{} finished at {}", self.procs[id].name(), self.clock);
        Ok(())
    }

    /// Move every pending process whose arrival time has passed into the
    /// input queue, preserving workload order.
    fn drain_arrivals(&mut self) {
        while let Some(&id) = self.pending.front() {
            if self.procs[id].arrival() > self.clock {
                break;
            }
            self.pending.pop_front();
            self.input.push_back(id);
            debug!("{} arrived at {}", self.procs[id].name(), self.clock);
        }
    }

    /// Scan the input queue in order, admitting every process the memory
    /// strategy can satisfy. Processes that do not fit keep their queue
    /// position for future ticks.
    fn admit_ready(&mut self) -> Result<(), SimError> {
        let mut index = 0;
        while index < self.input.len() {
            let id = self.input[index];
            if self.memory.try_admit(&mut self.procs[id]) {
                self.input.remove(index);
                self.procs[id].set_state(ProcessState::Ready);
                self.ready.admit(id, &self.procs[id]);
                if let Some(address) = self.memory.assigned_address(&self.procs[id]) {
                    writeln!(
                        self.out,
                        "{},READY,process_name={},assigned_at={}",
                        self.clock,
                        self.procs[id].name(),
                        address
                    )?;
                }
            } else {
                index += 1;
            }
        }
        Ok(())
    }

    /// Pull the next process from the ready pool, hand it the CPU and
    /// emit its RUNNING line. Leaves the CPU idle when the pool is empty.
    fn dispatch_next(&mut self) -> Result<(), SimError> {
        self.current = self.ready.take_next();
        if let Some(id) = self.current {
            self.workers.dispatch(&mut self.procs[id], self.clock)?;
            self.procs[id].set_state(ProcessState::Running);
            writeln!(
                self.out,
                "{},RUNNING,process_name={},remaining_time={}",
                self.clock,
                self.procs[id].name(),
                self.procs[id].remaining()
            )?;
            debug!("dispatched {} at {}", self.procs[id].name(), self.clock);
        }
        Ok(())
    }
}
