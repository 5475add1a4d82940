//! Error taxonomy
//!
//! Configuration and workload problems surface before the loop starts;
//! anything touching the child protocol is fatal mid-run, because the
//! scheduler's correctness depends on every handshake completing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot open workload file {path}: {source}")]
    OpenWorkload { path: PathBuf, source: io::Error },

    #[error("workload line {line}: {reason}")]
    Workload { line: usize, reason: String },

    #[error("failed to spawn worker for {name}: {source}")]
    Spawn { name: String, source: io::Error },

    #[error("worker {name} echoed {got:#04x}, expected {expected:#04x}")]
    ClockEcho { name: String, expected: u8, got: u8 },

    #[error("process {name} has no live worker")]
    WorkerMissing { name: String },

    #[error("signal delivery to {name} failed: {source}")]
    Signal { name: String, source: nix::Error },

    #[error("waitpid on {name} failed: {source}")]
    Wait { name: String, source: nix::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}
