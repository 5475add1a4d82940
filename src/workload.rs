//! Workload - input file loader
//!
//! One process per line, four whitespace-separated fields:
//! `arrival_time name service_time memory_requirement`. The file is
//! sorted by arrival time; equal arrivals keep file order, which the
//! loader preserves. Bad rows fail the run before the loop starts.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::memory::Arena;
use crate::process::Process;

/// Longest accepted process name.
pub const MAX_NAME_LEN: usize = 8;

/// Load and validate a workload file into a process table, in file order.
pub fn load(path: &Path) -> Result<Vec<Process>, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::OpenWorkload {
        path: path.to_owned(),
        source,
    })?;

    let mut processes = Vec::new();
    let mut seen = HashSet::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let process = parse_row(line).map_err(|reason| SimError::Workload {
            line: index + 1,
            reason,
        })?;
        if !seen.insert(process.name().to_owned()) {
            return Err(SimError::Workload {
                line: index + 1,
                reason: format!("duplicate process name {}", process.name()),
            });
        }
        processes.push(process);
    }
    Ok(processes)
}

fn parse_row(line: &str) -> Result<Process, String> {
    let mut fields = line.split_whitespace();
    let arrival = next_field(&mut fields, "arrival time")?;
    let name = fields.next().ok_or("missing process name")?;
    let service = next_field(&mut fields, "service time")?;
    let memory = next_field(&mut fields, "memory requirement")?;
    if fields.next().is_some() {
        return Err("trailing fields after memory requirement".to_owned());
    }

    if name.len() > MAX_NAME_LEN || !name.chars().all(|c| c.is_ascii_graphic()) {
        return Err(format!("invalid process name {:?}", name));
    }
    let arrival: u32 = arrival
        .parse()
        .map_err(|_| format!("invalid arrival time {:?}", arrival))?;
    let service: u32 = service
        .parse()
        .map_err(|_| format!("invalid service time {:?}", service))?;
    if service == 0 {
        return Err("service time must be positive".to_owned());
    }
    let memory: u32 = memory
        .parse()
        .map_err(|_| format!("invalid memory requirement {:?}", memory))?;
    if memory == 0 || memory > Arena::CAPACITY {
        return Err(format!(
            "memory requirement {} outside 1..={}",
            memory,
            Arena::CAPACITY
        ));
    }

    Ok(Process::new(name.to_owned(), arrival, service, memory))
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<&'a str, String> {
    fields.next().ok_or_else(|| format!("missing {}", what))
}
