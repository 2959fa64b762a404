//! Worker relay: subprocess bridge between coordinator and sink
//!
//! Each worker pulls one block at a time, runs a fresh search-tool subprocess
//! for it, and relays the subprocess's output to the sink as one framed
//! session. Feeding the subprocess and draining it MUST overlap: both pipes
//! have bounded capacity, and a sequential feed-then-drain can wedge with the
//! child blocked writing output while we are still blocked writing input.
//! The feeder runs as a scoped thread for exactly one block; closing the
//! child's stdin is what tells it the block is complete.

use std::io::{Read, Write};
use std::process::{ChildStdin, ChildStdout, Command, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};

use crate::protocol::{Role, Tag, COORDINATOR, SINK};
use crate::transport::{Endpoint, Mailbox, Outbox};

/// Relay loop for one worker role. Returns once the coordinator answers a
/// ready-request with DONE.
///
/// A subprocess that cannot be launched is fatal; there is no retry.
pub(crate) fn worker_thread(
    role: Role,
    endpoint: Endpoint,
    command: &[String],
    fragment_size: usize,
) -> Result<()> {
    let Endpoint { tx, mut rx } = endpoint;
    loop {
        tx.send(COORDINATOR, Tag::Ready, Vec::new())?;
        let reply = rx.recv_from(COORDINATOR)?;
        match reply.tag {
            Tag::Done => return Ok(()),
            Tag::Begin => run_block(role, &tx, &mut rx, command, fragment_size)?,
            other => bail!("worker {}: unexpected {:?} from coordinator", role, other),
        }
    }
}

/// Run one block through a fresh subprocess.
fn run_block(
    role: Role,
    tx: &Outbox,
    rx: &mut Mailbox,
    command: &[String],
    fragment_size: usize,
) -> Result<()> {
    let mut child = Command::new(&command[0])
        .args(&command[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("worker {}: failed to launch '{}'", role, command[0]))?;

    let stdin = child
        .stdin
        .take()
        .with_context(|| format!("worker {}: subprocess stdin unavailable", role))?;
    let mut stdout = child
        .stdout
        .take()
        .with_context(|| format!("worker {}: subprocess stdout unavailable", role))?;

    // The feeder owns the stdin write end; this thread owns the stdout read
    // end. Both must finish before the child is reaped.
    let (feed_result, drain_result) = thread::scope(|scope| {
        let feeder = scope.spawn(move || feed_subprocess(role, rx, stdin));
        let drained = drain_subprocess(tx, &mut stdout, fragment_size);
        let fed = feeder
            .join()
            .unwrap_or_else(|e| panic!("worker {} feeder panicked: {:?}", role, e));
        (fed, drained)
    });
    drain_result?;
    feed_result?;

    // Exit status is not interpreted; the tool's output already went to the
    // sink, and a failed search shows up as missing output.
    child
        .wait()
        .with_context(|| format!("worker {}: wait for subprocess", role))?;
    Ok(())
}

/// Receive this block's DATA frames and write them to the subprocess, in
/// arrival order. Dropping `stdin` on END delivers end-of-input.
fn feed_subprocess(role: Role, rx: &mut Mailbox, mut stdin: ChildStdin) -> Result<()> {
    loop {
        let frame = rx.recv_from(COORDINATOR)?;
        match frame.tag {
            Tag::Data => stdin
                .write_all(&frame.payload)
                .with_context(|| format!("worker {}: write block to subprocess", role))?,
            Tag::End => return Ok(()),
            other => bail!("worker {}: unexpected {:?} inside block", role, other),
        }
    }
}

/// Forward the subprocess's output to the sink as one session.
fn drain_subprocess(tx: &Outbox, stdout: &mut ChildStdout, fragment_size: usize) -> Result<()> {
    tx.send(SINK, Tag::Begin, Vec::new())?;
    let mut buf = vec![0u8; fragment_size];
    loop {
        let n = stdout.read(&mut buf).context("read from subprocess")?;
        if n == 0 {
            break;
        }
        tx.send(SINK, Tag::Data, buf[..n].to_vec())?;
    }
    tx.send(SINK, Tag::End, Vec::new())?;
    Ok(())
}
