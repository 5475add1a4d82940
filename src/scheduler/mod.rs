//! Scheduler - dispatch policies and the tick-driven loop
//!
//! Two disciplines, fixed per run:
//!
//! - `SJF`: non-preemptive shortest job first. The ready pool is a min-heap
//!   keyed on (service time, name); the dispatched job keeps the CPU until
//!   its service drains.
//! - `RR`: round robin. The ready pool is a FIFO; a running job is rotated
//!   to the tail whenever another job is waiting.
//!
//! `cycle` holds the loop itself, `ready` the pool implementations and
//! `stats` the end-of-run summary.

pub mod cycle;
pub mod ready;
pub mod stats;

use clap::ValueEnum;
use core::fmt;

/// Index of a process in the simulation's table.
pub type ProcId = usize;

/// Scheduling discipline for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Shortest job first, non-preemptive.
    #[value(name = "SJF")]
    Sjf,
    /// Round robin, one quantum per turn.
    #[value(name = "RR")]
    Rr,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sjf => write!(f, "SJF"),
            Self::Rr => write!(f, "RR"),
        }
    }
}
