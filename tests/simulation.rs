//! End-to-end scheduler loop scenarios
//!
//! Drives the full tick loop through a scripted child controller, so the
//! deterministic scheduling, admission and event emission can be asserted
//! byte for byte without the external worker binary.

use std::cell::RefCell;
use std::rc::Rc;

use exo_schedsim::process::Process;
use exo_schedsim::{MemStrategy, Policy, SimError, Simulation, Statistics, WorkerControl};

const HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Controller stand-in that records every handshake instead of touching
/// real children.
#[derive(Default)]
struct ScriptedWorkers {
    calls: Rc<RefCell<Vec<String>>>,
}

impl WorkerControl for ScriptedWorkers {
    fn dispatch(&mut self, process: &mut Process, now: u32) -> Result<(), SimError> {
        self.calls
            .borrow_mut()
            .push(format!("dispatch {} @{}", process.name(), now));
        Ok(())
    }

    fn suspend(&mut self, process: &mut Process, now: u32) -> Result<(), SimError> {
        self.calls
            .borrow_mut()
            .push(format!("suspend {} @{}", process.name(), now));
        Ok(())
    }

    fn retire(&mut self, process: &mut Process, now: u32) -> Result<String, SimError> {
        self.calls
            .borrow_mut()
            .push(format!("retire {} @{}", process.name(), now));
        Ok(HASH.to_owned())
    }
}

fn run_case(
    rows: &[(u32, &str, u32, u32)],
    policy: Policy,
    strategy: MemStrategy,
    quantum: u32,
) -> (String, Statistics, Vec<String>) {
    let workload: Vec<Process> = rows
        .iter()
        .map(|&(arrival, name, service, memory)| {
            Process::new(name.to_owned(), arrival, service, memory)
        })
        .collect();

    let calls = Rc::new(RefCell::new(Vec::new()));
    let workers = ScriptedWorkers {
        calls: Rc::clone(&calls),
    };
    let mut out = Vec::new();
    let simulation = Simulation::new(workload, policy, strategy, quantum, workers, &mut out);
    let completed = simulation.run().expect("run succeeds");
    let stats = Statistics::summarise(&completed.processes, completed.makespan);

    let events = String::from_utf8(out).expect("events are utf-8");
    let log = calls.borrow().clone();
    (events, stats, log)
}

#[test]
fn single_job_runs_to_completion() {
    let (events, stats, calls) = run_case(
        &[(0, "P1", 6, 100)],
        Policy::Sjf,
        MemStrategy::Infinite,
        3,
    );

    assert_eq!(
        events,
        format!(
            "0,RUNNING,process_name=P1,remaining_time=6\n\
             6,FINISHED,process_name=P1,proc_remaining=0\n\
             6,FINISHED-PROCESS,process_name=P1,sha={HASH}\n"
        )
    );
    assert_eq!(stats.turnaround, 6);
    assert_eq!(stats.max_overhead, 1.0);
    assert_eq!(stats.avg_overhead, 1.0);
    assert_eq!(stats.makespan, 6);
    // the held child is ticked every quantum, then terminated
    assert_eq!(
        calls,
        vec!["dispatch P1 @0", "dispatch P1 @3", "retire P1 @6"]
    );
}

#[test]
fn sjf_picks_the_shorter_job_first() {
    let (events, stats, _) = run_case(
        &[(0, "P1", 9, 100), (0, "P2", 3, 100)],
        Policy::Sjf,
        MemStrategy::Infinite,
        3,
    );

    assert_eq!(
        events,
        format!(
            "0,RUNNING,process_name=P2,remaining_time=3\n\
             3,FINISHED,process_name=P2,proc_remaining=1\n\
             3,FINISHED-PROCESS,process_name=P2,sha={HASH}\n\
             3,RUNNING,process_name=P1,remaining_time=9\n\
             12,FINISHED,process_name=P1,proc_remaining=0\n\
             12,FINISHED-PROCESS,process_name=P1,sha={HASH}\n"
        )
    );
    // turnarounds 3 and 12, overheads 1.00 and 1.33
    assert_eq!(stats.turnaround, 8);
    assert_eq!(stats.max_overhead, 1.33);
    assert_eq!(stats.avg_overhead, 1.17);
    assert_eq!(stats.makespan, 12);
}

#[test]
fn sjf_breaks_service_ties_by_name() {
    let (events, _, _) = run_case(
        &[(0, "zeta", 3, 100), (0, "alpha", 3, 100)],
        Policy::Sjf,
        MemStrategy::Infinite,
        3,
    );

    let running: Vec<&str> = events
        .lines()
        .filter(|line| line.contains("RUNNING"))
        .collect();
    assert_eq!(
        running,
        vec![
            "0,RUNNING,process_name=alpha,remaining_time=3",
            "3,RUNNING,process_name=zeta,remaining_time=3",
        ]
    );
}

#[test]
fn round_robin_rotates_every_quantum() {
    let (events, stats, calls) = run_case(
        &[(0, "A", 9, 100), (0, "B", 9, 100)],
        Policy::Rr,
        MemStrategy::Infinite,
        3,
    );

    assert_eq!(
        events,
        format!(
            "0,RUNNING,process_name=A,remaining_time=9\n\
             3,RUNNING,process_name=B,remaining_time=9\n\
             6,RUNNING,process_name=A,remaining_time=6\n\
             9,RUNNING,process_name=B,remaining_time=6\n\
             12,RUNNING,process_name=A,remaining_time=3\n\
             15,FINISHED,process_name=A,proc_remaining=1\n\
             15,FINISHED-PROCESS,process_name=A,sha={HASH}\n\
             15,RUNNING,process_name=B,remaining_time=3\n\
             18,FINISHED,process_name=B,proc_remaining=0\n\
             18,FINISHED-PROCESS,process_name=B,sha={HASH}\n"
        )
    );
    assert_eq!(stats.makespan, 18);
    assert_eq!(stats.turnaround, 17); // mean of 15 and 18, rounded up
    assert_eq!(stats.max_overhead, 2.0);
    assert_eq!(stats.avg_overhead, 1.83);

    // every rotation suspends the preempted child before the next dispatch
    assert_eq!(
        calls[..4],
        [
            "dispatch A @0".to_owned(),
            "suspend A @3".to_owned(),
            "dispatch B @3".to_owned(),
            "suspend B @6".to_owned(),
        ]
    );
}

#[test]
fn best_fit_splits_and_reports_addresses() {
    let (events, stats, _) = run_case(
        &[(0, "P1", 4, 512), (0, "P2", 4, 256), (0, "P3", 4, 512)],
        Policy::Sjf,
        MemStrategy::BestFit,
        4,
    );

    assert_eq!(
        events,
        format!(
            "0,READY,process_name=P1,assigned_at=0\n\
             0,READY,process_name=P2,assigned_at=512\n\
             0,READY,process_name=P3,assigned_at=768\n\
             0,RUNNING,process_name=P1,remaining_time=4\n\
             4,FINISHED,process_name=P1,proc_remaining=2\n\
             4,FINISHED-PROCESS,process_name=P1,sha={HASH}\n\
             4,RUNNING,process_name=P2,remaining_time=4\n\
             8,FINISHED,process_name=P2,proc_remaining=1\n\
             8,FINISHED-PROCESS,process_name=P2,sha={HASH}\n\
             8,RUNNING,process_name=P3,remaining_time=4\n\
             12,FINISHED,process_name=P3,proc_remaining=0\n\
             12,FINISHED-PROCESS,process_name=P3,sha={HASH}\n"
        )
    );
    assert_eq!(stats.makespan, 12);
    assert_eq!(stats.max_overhead, 3.0);
    assert_eq!(stats.avg_overhead, 2.0);
}

#[test]
fn best_fit_defers_admission_until_memory_frees() {
    let (events, stats, _) = run_case(
        &[(0, "P1", 4, 1500), (0, "P2", 4, 1500)],
        Policy::Sjf,
        MemStrategy::BestFit,
        4,
    );

    assert_eq!(
        events,
        format!(
            "0,READY,process_name=P1,assigned_at=0\n\
             0,RUNNING,process_name=P1,remaining_time=4\n\
             4,FINISHED,process_name=P1,proc_remaining=1\n\
             4,FINISHED-PROCESS,process_name=P1,sha={HASH}\n\
             4,READY,process_name=P2,assigned_at=0\n\
             4,RUNNING,process_name=P2,remaining_time=4\n\
             8,FINISHED,process_name=P2,proc_remaining=0\n\
             8,FINISHED-PROCESS,process_name=P2,sha={HASH}\n"
        )
    );
    assert_eq!(stats.makespan, 8);
}

#[test]
fn arrival_gating_leaves_the_cpu_idle() {
    let (events, stats, calls) = run_case(
        &[(0, "P1", 3, 100), (5, "P2", 3, 100)],
        Policy::Rr,
        MemStrategy::Infinite,
        3,
    );

    assert_eq!(
        events,
        format!(
            "0,RUNNING,process_name=P1,remaining_time=3\n\
             3,FINISHED,process_name=P1,proc_remaining=0\n\
             3,FINISHED-PROCESS,process_name=P1,sha={HASH}\n\
             6,RUNNING,process_name=P2,remaining_time=3\n\
             9,FINISHED,process_name=P2,proc_remaining=0\n\
             9,FINISHED-PROCESS,process_name=P2,sha={HASH}\n"
        )
    );
    assert_eq!(stats.makespan, 9);
    // nothing ran between t=3 and t=6, and nothing was ever suspended
    assert!(calls.iter().all(|call| !call.starts_with("suspend")));
}

#[test]
fn identical_runs_emit_identical_streams() {
    let rows = [
        (0, "P1", 9, 400),
        (0, "P2", 3, 800),
        (4, "P3", 7, 1200),
        (8, "P4", 2, 200),
    ];
    let first = run_case(&rows, Policy::Rr, MemStrategy::BestFit, 2);
    let second = run_case(&rows, Policy::Rr, MemStrategy::BestFit, 2);

    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn every_process_finishes_exactly_once() {
    let rows = [
        (0, "P1", 5, 600),
        (2, "P2", 9, 1800),
        (2, "P3", 1, 700),
        (10, "P4", 4, 2048),
    ];
    for policy in [Policy::Sjf, Policy::Rr] {
        let (events, stats, _) = run_case(&rows, policy, MemStrategy::BestFit, 3);
        for (_, name, _, _) in &rows {
            let marker = format!("FINISHED,process_name={name},");
            assert_eq!(
                events.matches(&marker).count(),
                1,
                "{name} under {policy}"
            );
        }
        let last_finish: u32 = events
            .lines()
            .filter(|line| line.contains(",FINISHED,"))
            .filter_map(|line| line.split(',').next())
            .filter_map(|t| t.parse().ok())
            .max()
            .expect("at least one finish");
        assert_eq!(stats.makespan, last_finish);
    }
}
