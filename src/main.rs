//! exo-schedsim binary entry point

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use exo_schedsim::{
    logger, worker, workload, MemStrategy, Policy, RealWorkers, Simulation, Statistics,
};

/// Tick-driven process scheduling simulator backed by real worker
/// children.
#[derive(Debug, Parser)]
#[command(name = "exo-schedsim", version, about)]
struct Args {
    /// Workload file: one `arrival name service memory` row per process
    #[arg(short = 'f', value_name = "FILE")]
    filename: PathBuf,

    /// Scheduling discipline
    #[arg(short = 's', value_name = "SCHEDULER")]
    scheduler: Policy,

    /// Memory admission strategy
    #[arg(short = 'm', value_name = "STRATEGY")]
    memory: MemStrategy,

    /// Simulation time units per tick
    #[arg(short = 'q', value_name = "QUANTUM", value_parser = clap::value_parser!(u32).range(1..))]
    quantum: u32,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    });

    let processes = workload::load(&args.filename)?;
    let stdout = io::stdout();

    let simulation = Simulation::new(
        processes,
        args.scheduler,
        args.memory,
        args.quantum,
        RealWorkers::new(worker::WORKER_BINARY),
        stdout.lock(),
    );
    let completed = simulation.run()?;

    let stats = Statistics::summarise(&completed.processes, completed.makespan);
    print!("{stats}");
    Ok(())
}
