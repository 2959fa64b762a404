//! Command-line interface definitions and parsing logic
//!
//! The invocation mirrors the search tool's own: everything after the options
//! is the tool command line, forwarded verbatim except for `-query` and
//! `-out`, which name the files this program owns (the query source read by
//! the coordinator and the consolidated output written by the sink) and are
//! stripped before the subprocess is built.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::protocol::{DEFAULT_BLOCK_SIZE, DEFAULT_FRAGMENT_SIZE};

#[derive(Parser)]
#[command(name = "blastmux")]
#[command(
    about = "Runs a batch of sequence-search queries through an external search tool in parallel"
)]
#[command(
    long_about = "Runs a batch of sequence-search queries through an external search tool in parallel.\n\nThe query file is cut into record-aligned blocks; each block is searched by a fresh\ninvocation of the tool and all output is consolidated into one file. Blocks finish\nin whatever order the workers race to, so the output order is not the query order.\n\nEXAMPLE:\n  blastmux --workers 8 blastp -db nr -query queries.fa -out hits.txt -evalue 1e-5"
)]
#[command(version)]
pub struct Cli {
    /// Number of parallel workers (defaults to the CPU count)
    #[arg(long = "workers", help_heading = "Scheduling Options")]
    pub workers: Option<usize>,

    /// Upper bound in bytes on one block of query records; a single larger
    /// record still travels whole
    #[arg(
        long = "block-size",
        default_value_t = DEFAULT_BLOCK_SIZE,
        help_heading = "Scheduling Options"
    )]
    pub block_size: usize,

    /// Upper bound in bytes on one transport message fragment
    #[arg(
        long = "fragment-size",
        default_value_t = DEFAULT_FRAGMENT_SIZE,
        help_heading = "Scheduling Options"
    )]
    pub fragment_size: usize,

    /// Search tool command line. Must contain `-query <file>` and
    /// `-out <file>`; those two pairs are consumed here, the rest is passed
    /// to the tool unchanged.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "SEARCH-TOOL [ARGS]..."
    )]
    pub command: Vec<String>,
}

/// Resolved run configuration.
#[derive(Debug)]
pub struct Config {
    /// Argument vector for each subprocess invocation, `-query`/`-out`
    /// removed.
    pub command: Vec<String>,
    pub query_file: PathBuf,
    pub out_file: PathBuf,
    pub workers: usize,
    pub block_size: usize,
    pub fragment_size: usize,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut command = Vec::with_capacity(cli.command.len());
        let mut query_file = None;
        let mut out_file = None;

        let mut args = cli.command.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-query" => {
                    query_file = Some(args.next().context("-query requires a file argument")?);
                }
                "-out" => {
                    out_file = Some(args.next().context("-out requires a file argument")?);
                }
                _ => command.push(arg),
            }
        }

        let query_file =
            query_file.context("missing -query <file> among the search tool arguments")?;
        let out_file = out_file.context("missing -out <file> among the search tool arguments")?;
        if command.is_empty() {
            bail!("no search tool command given");
        }
        if cli.block_size == 0 || cli.fragment_size == 0 {
            bail!("--block-size and --fragment-size must be at least 1");
        }

        Ok(Self {
            command,
            query_file: PathBuf::from(query_file),
            out_file: PathBuf::from(out_file),
            workers: cli.workers.unwrap_or_else(num_cpus::get).max(1),
            block_size: cli.block_size,
            fragment_size: cli.fragment_size,
        })
    }
}
