//! Sink role: single-writer output consolidation
//!
//! The sink owns the output file exclusively. Worker output arrives as framed
//! sessions (BEGIN, DATA fragments, END); while one session is open, frames
//! from every other worker stay queued in the mailbox, so each session's
//! bytes land in the file contiguously and in arrival order. A frame from
//! the coordinator is the shutdown signal.

use std::io::Write;

use anyhow::{Context, Result};

use crate::protocol::{Tag, COORDINATOR};
use crate::transport::Endpoint;

/// Consolidation loop. Returns after the coordinator's DONE, with `out`
/// flushed.
///
/// A session is inferred from "first frame from a worker with no open
/// session"; the opening frame's tag and payload are not inspected. Within a
/// session only DATA payloads are written; any other tag is discarded.
pub(crate) fn sink_thread<W: Write>(mut endpoint: Endpoint, mut out: W) -> Result<()> {
    loop {
        let opening = endpoint.rx.recv_any()?;
        if opening.from == COORDINATOR {
            break;
        }

        let peer = opening.from;
        let mut tag = opening.tag;
        while tag != Tag::End {
            let frame = endpoint.rx.recv_from(peer)?;
            tag = frame.tag;
            if tag == Tag::Data {
                out.write_all(&frame.payload)
                    .context("write to output file")?;
            }
        }
    }

    out.flush().context("flush output file")?;
    Ok(())
}
