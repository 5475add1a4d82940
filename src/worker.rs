//! Worker - real child processes behind the simulated jobs
//!
//! Every job that reaches the CPU is backed by a live child running the
//! external `process` binary with its stdin and stdout piped to the
//! parent. Each interaction starts by writing the simulation clock as
//! four big-endian bytes, one write per byte; the child echoes the least
//! significant byte back (start/continue) or, on termination, emits a
//! 64-character hash of everything it observed. Suspension and resumption
//! ride on SIGTSTP/SIGCONT, with `waitpid(WUNTRACED)` as the stop
//! barrier.
//!
//! The loop drives children through the [`WorkerControl`] seam so the
//! deterministic scheduling logic can be exercised without the worker
//! binary; [`RealWorkers`] is the production implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::debug;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::SimError;
use crate::process::Process;

/// Path the worker binary is launched from, relative to the working
/// directory.
pub const WORKER_BINARY: &str = "./process";

/// Length of the hash a terminating worker emits.
pub const HASH_LEN: usize = 64;

/// A live worker child and the two pipe ends the parent keeps.
#[derive(Debug)]
pub struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    reaped: bool,
}

impl Worker {
    /// Spawn the worker binary for `name`, send the current clock and
    /// verify the echoed byte.
    pub fn spawn(binary: &Path, name: &str, now: u32) -> Result<Self, SimError> {
        let mut child = Command::new(binary)
            .arg(name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| SimError::Spawn {
                name: name.to_owned(),
                source,
            })?;
        let stdin = child.stdin.take().expect("stdin is piped");
        let stdout = child.stdout.take().expect("stdout is piped");
        debug!("spawned worker {} (pid {})", name, child.id());

        let mut worker = Self {
            child,
            stdin,
            stdout,
            reaped: false,
        };
        let expected = worker.send_clock(now)?;
        worker.read_echo(name, expected)?;
        Ok(worker)
    }

    fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    /// Write the clock as four big-endian bytes, most significant first,
    /// one write per byte. Returns the least significant byte, which the
    /// child must echo.
    fn send_clock(&mut self, now: u32) -> Result<u8, SimError> {
        let bytes = now.to_be_bytes();
        for byte in bytes {
            self.stdin.write_all(std::slice::from_ref(&byte))?;
        }
        Ok(bytes[3])
    }

    /// Read one byte back and verify it matches the clock's low byte.
    fn read_echo(&mut self, name: &str, expected: u8) -> Result<(), SimError> {
        let mut buf = [0u8; 1];
        self.stdout.read_exact(&mut buf)?;
        if buf[0] != expected {
            return Err(SimError::ClockEcho {
                name: name.to_owned(),
                expected,
                got: buf[0],
            });
        }
        Ok(())
    }

    /// Send the clock, deliver SIGCONT and verify the echo.
    pub fn resume(&mut self, name: &str, now: u32) -> Result<(), SimError> {
        let expected = self.send_clock(now)?;
        kill(self.pid(), Signal::SIGCONT).map_err(|source| SimError::Signal {
            name: name.to_owned(),
            source,
        })?;
        self.read_echo(name, expected)
    }

    /// Send the clock, deliver SIGTSTP and block until the kernel reports
    /// the child stopped.
    pub fn suspend(&mut self, name: &str, now: u32) -> Result<(), SimError> {
        self.send_clock(now)?;
        kill(self.pid(), Signal::SIGTSTP).map_err(|source| SimError::Signal {
            name: name.to_owned(),
            source,
        })?;
        loop {
            let status =
                waitpid(self.pid(), Some(WaitPidFlag::WUNTRACED)).map_err(|source| {
                    SimError::Wait {
                        name: name.to_owned(),
                        source,
                    }
                })?;
            if let WaitStatus::Stopped(_, _) = status {
                return Ok(());
            }
        }
    }

    /// Send the clock, deliver SIGTERM, collect the final hash and reap
    /// the child.
    pub fn retire(&mut self, name: &str, now: u32) -> Result<String, SimError> {
        self.send_clock(now)?;
        kill(self.pid(), Signal::SIGTERM).map_err(|source| SimError::Signal {
            name: name.to_owned(),
            source,
        })?;
        let mut hash = [0u8; HASH_LEN];
        self.stdout.read_exact(&mut hash)?;
        self.reaped = true;
        self.child.wait()?;
        debug!("worker {} terminated", name);
        Ok(String::from_utf8_lossy(&hash).into_owned())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // backstop for abnormal exits: never leave a stopped child behind
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// The scheduler loop's view of the child controller.
pub trait WorkerControl {
    /// Hand the CPU to `process`: spawn its child on first dispatch,
    /// resume it afterwards.
    fn dispatch(&mut self, process: &mut Process, now: u32) -> Result<(), SimError>;

    /// Take the CPU away from a running `process`.
    fn suspend(&mut self, process: &mut Process, now: u32) -> Result<(), SimError>;

    /// Terminate a finished `process` and return its worker's hash.
    fn retire(&mut self, process: &mut Process, now: u32) -> Result<String, SimError>;
}

/// Production controller: one real child per dispatched process.
#[derive(Debug)]
pub struct RealWorkers {
    binary: PathBuf,
}

impl RealWorkers {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl WorkerControl for RealWorkers {
    fn dispatch(&mut self, process: &mut Process, now: u32) -> Result<(), SimError> {
        let name = process.name().to_owned();
        match process.worker_mut() {
            Some(worker) => worker.resume(&name, now),
            None => {
                let worker = Worker::spawn(&self.binary, &name, now)?;
                process.attach_worker(worker);
                Ok(())
            }
        }
    }

    fn suspend(&mut self, process: &mut Process, now: u32) -> Result<(), SimError> {
        let name = process.name().to_owned();
        match process.worker_mut() {
            Some(worker) => worker.suspend(&name, now),
            None => Err(SimError::WorkerMissing { name }),
        }
    }

    fn retire(&mut self, process: &mut Process, now: u32) -> Result<String, SimError> {
        let name = process.name().to_owned();
        match process.worker_mut() {
            Some(worker) => worker.retire(&name, now),
            None => Err(SimError::WorkerMissing { name }),
        }
    }
}
