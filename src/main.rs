//! blastmux — parallel driver for an external sequence-search tool
//!
//! One process, N+2 roles: a coordinator that cuts the query file into
//! record-aligned blocks and hands them to whichever worker asks next, a pool
//! of workers that each run the search tool as a subprocess per block, and a
//! sink that serializes all worker output into the one output file. Roles
//! share nothing; they only exchange tagged messages.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

mod chunker;
mod cli;
mod coordinator;
mod protocol;
mod sink;
mod transport;
mod worker;

use chunker::Chunker;
use cli::{Cli, Config};
use coordinator::coordinator_thread;
use protocol::{COORDINATOR, FIRST_WORKER, MAILBOX_CAPACITY};
use sink::sink_thread;
use transport::switchboard;
use worker::worker_thread;

fn main() {
    let cli = Cli::parse();
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("blastmux: {err:#}");
            eprintln!(
                "Usage: blastmux [OPTIONS] <SEARCH-TOOL> [ARGS]... -query <FILE> -out <FILE>"
            );
            process::exit(2);
        }
    };

    if let Err(err) = run(config) {
        eprintln!("blastmux: {err:#}");
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let query = File::open(&config.query_file)
        .with_context(|| format!("open query file {}", config.query_file.display()))?;
    let out = File::create(&config.out_file)
        .with_context(|| format!("create output file {}", config.out_file.display()))?;
    let chunker = Chunker::new(BufReader::new(query), config.block_size);

    let mut endpoints = switchboard(FIRST_WORKER + config.workers, MAILBOX_CAPACITY);
    let coordinator_ep = endpoints.remove(COORDINATOR);
    let sink_ep = endpoints.remove(0);
    let worker_eps = endpoints;

    let sink_handle = spawn_role("sink".to_string(), move || {
        sink_thread(sink_ep, BufWriter::new(out))
    });

    let mut worker_handles = Vec::with_capacity(config.workers);
    for (idx, endpoint) in worker_eps.into_iter().enumerate() {
        let role = FIRST_WORKER + idx;
        let command = config.command.clone();
        let fragment_size = config.fragment_size;
        worker_handles.push(spawn_role(format!("worker {}", role), move || {
            worker_thread(role, endpoint, &command, fragment_size)
        }));
    }

    let workers = config.workers;
    let fragment_size = config.fragment_size;
    let coordinator_handle = spawn_role("coordinator".to_string(), move || {
        coordinator_thread(coordinator_ep, chunker, workers, fragment_size)
    });

    coordinator_handle
        .join()
        .unwrap_or_else(|e| panic!("Coordinator thread panicked: {:?}", e));
    for (idx, handle) in worker_handles.into_iter().enumerate() {
        handle
            .join()
            .unwrap_or_else(|e| panic!("Worker thread {} panicked: {:?}", idx, e));
    }
    sink_handle
        .join()
        .unwrap_or_else(|e| panic!("Sink thread panicked: {:?}", e));

    Ok(())
}

/// Spawn one role's thread. A role that fails prints its diagnostic and takes
/// the whole process down, so no other role can block forever on a dead
/// partner.
fn spawn_role<F>(name: String, role: F) -> thread::JoinHandle<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    thread::spawn(move || {
        if let Err(err) = role() {
            eprintln!("blastmux: {name}: {err:#}");
            process::exit(1);
        }
    })
}
