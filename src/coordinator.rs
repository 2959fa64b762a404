//! Coordinator role: pull-based block distribution
//!
//! Workers ask for work; whoever's ready-request is received first gets the
//! next block. Workers are never told how many blocks exist, only that the
//! source is exhausted, via their own DONE. After every worker has been
//! finalized the sink gets a single DONE telling it to flush and close.

use std::io::{BufRead, Seek};

use anyhow::Result;

use crate::chunker::Chunker;
use crate::protocol::{Tag, SINK};
use crate::transport::Endpoint;

/// Distribution loop. Runs until every worker has received its DONE.
///
/// Per-worker delivery is FIFO (BEGIN, DATA fragments in order, END); across
/// workers the order is whatever the wildcard receive happens to serve.
pub(crate) fn coordinator_thread<R: BufRead + Seek>(
    mut endpoint: Endpoint,
    mut chunker: Chunker<R>,
    worker_count: usize,
    fragment_size: usize,
) -> Result<()> {
    let mut pending = worker_count;

    while pending > 0 {
        let request = endpoint.rx.recv_any()?;
        let worker = request.from;

        match chunker.next_block()? {
            None => {
                endpoint.tx.send(worker, Tag::Done, Vec::new())?;
                pending -= 1;
            }
            Some(block) => {
                endpoint.tx.send(worker, Tag::Begin, Vec::new())?;
                for fragment in block.chunks(fragment_size) {
                    endpoint.tx.send(worker, Tag::Data, fragment.to_vec())?;
                }
                endpoint.tx.send(worker, Tag::End, Vec::new())?;
            }
        }
    }

    endpoint.tx.send(SINK, Tag::Done, Vec::new())?;
    Ok(())
}
