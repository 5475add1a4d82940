//! Stats - end-of-run summary
//!
//! Aggregates over the finished table. The rounding is deliberate: mean
//! turnaround rounds up to a whole quantum count, the two overhead figures
//! round through `x * 100` to keep floating-point noise out of the second
//! decimal.

use core::fmt;

use crate::process::Process;

/// Round to two decimals through multiply-round-divide.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The four summary figures printed after the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean turnaround, rounded up.
    pub turnaround: u32,
    /// Largest per-process overhead, two decimals.
    pub max_overhead: f64,
    /// Mean overhead, two decimals.
    pub avg_overhead: f64,
    /// Final clock value at loop exit.
    pub makespan: u32,
}

impl Statistics {
    pub fn summarise(processes: &[Process], makespan: u32) -> Self {
        if processes.is_empty() {
            return Self {
                turnaround: 0,
                max_overhead: 0.0,
                avg_overhead: 0.0,
                makespan,
            };
        }

        let count = processes.len() as f64;
        let turnaround_sum: u64 = processes.iter().map(|p| u64::from(p.turnaround())).sum();
        let turnaround = (turnaround_sum as f64 / count).ceil() as u32;

        let mut overhead_sum = 0.0;
        let mut max_overhead = 0.0f64;
        for process in processes {
            let overhead = process.overhead();
            overhead_sum += overhead;
            max_overhead = max_overhead.max(overhead);
        }

        Self {
            turnaround,
            max_overhead: round2(max_overhead),
            avg_overhead: round2(overhead_sum / count),
            makespan,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Turnaround time {}", self.turnaround)?;
        writeln!(
            f,
            "Time overhead {:.2} {:.2}",
            self.max_overhead, self.avg_overhead
        )?;
        writeln!(f, "Makespan {}", self.makespan)
    }
}
