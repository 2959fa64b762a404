//! Shared protocol constants and message types
//!
//! Every role (coordinator, sink, workers) speaks the same tagged protocol,
//! so the tags, role identities, and size defaults live here and nowhere else.

/// A role's stable numeric identity within one run.
pub type Role = usize;

/// The coordinator owns the query source and hands out blocks.
pub const COORDINATOR: Role = 0;

/// The sink owns the output file and serializes worker output into it.
pub const SINK: Role = 1;

/// The first worker role; workers occupy `2..2 + worker_count`.
pub const FIRST_WORKER: Role = 2;

/// Default upper bound on the serialized size of one block of records.
pub const DEFAULT_BLOCK_SIZE: usize = 20_000;

/// Default upper bound on one transport fragment. Equal to the block size by
/// default, but independently configurable.
pub const DEFAULT_FRAGMENT_SIZE: usize = 20_000;

/// Bounded depth of each role's mailbox, in frames. Senders block once a
/// receiver falls this far behind.
pub const MAILBOX_CAPACITY: usize = 64;

/// Leading character of a record header line in the query format.
pub const SENTINEL: u8 = b'>';

/// Upper bound on one logical line as seen by the chunker's line reader.
/// Longer header lines are truncated; longer payload lines are split.
pub const MAX_LINE_LEN: usize = 16_384;

/// Message tags.
///
/// `Ready` flows worker -> coordinator as the pull request; the block/session
/// framing tags flow coordinator -> worker and worker -> sink; `Done` is the
/// coordinator's exhaustion signal to a worker or the final-flush signal to
/// the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Ready,
    Begin,
    Data,
    End,
    Done,
}

/// One delivered message: sender role, tag, payload bytes.
#[derive(Debug)]
pub struct Frame {
    pub from: Role,
    pub tag: Tag,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(from: Role, tag: Tag, payload: Vec<u8>) -> Self {
        Self { from, tag, payload }
    }
}
