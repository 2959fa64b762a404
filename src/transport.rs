//! Role-addressed message transport
//!
//! Connects the roles with one bounded multi-producer mailbox per role.
//! Senders block when a mailbox's buffer is full, which is the only
//! backpressure in the system. Delivery is FIFO per sender/receiver pair;
//! nothing is guaranteed across senders.
//!
//! An endpoint is split in two so a worker's feeder task can hold the
//! receiving half while the drainer keeps sending: `Outbox` (cloneable
//! senders to every role) and `Mailbox` (receiver plus a stash that makes
//! exact-sender receive possible without consuming other senders' frames).

use std::collections::VecDeque;

use anyhow::{bail, Result};
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::protocol::{Frame, Role, Tag};

/// Outbound half of an endpoint: can deliver a tagged payload to any role.
#[derive(Clone)]
pub struct Outbox {
    role: Role,
    peers: Vec<Sender<Frame>>,
}

impl Outbox {
    /// Deliver `payload` to `to`, blocking while its mailbox is full.
    pub fn send(&self, to: Role, tag: Tag, payload: Vec<u8>) -> Result<()> {
        let Some(peer) = self.peers.get(to) else {
            bail!("role {}: no such peer role {}", self.role, to);
        };
        if peer.send(Frame::new(self.role, tag, payload)).is_err() {
            bail!("role {}: role {} disconnected", self.role, to);
        }
        Ok(())
    }
}

/// Inbound half of an endpoint.
pub struct Mailbox {
    role: Role,
    inbox: Receiver<Frame>,
    stash: VecDeque<Frame>,
}

impl Mailbox {
    /// Wildcard receive: the next frame from any sender.
    ///
    /// Frames set aside by an earlier [`recv_from`](Self::recv_from) are
    /// returned first, in their original arrival order.
    pub fn recv_any(&mut self) -> Result<Frame> {
        if let Some(frame) = self.stash.pop_front() {
            return Ok(frame);
        }
        match self.inbox.recv() {
            Ok(frame) => Ok(frame),
            Err(_) => bail!("role {}: all peers disconnected", self.role),
        }
    }

    /// Targeted receive: the next frame from exactly `from`.
    ///
    /// Frames from other senders arriving in the meantime are stashed, not
    /// dropped, so their per-sender ordering survives for later receives.
    pub fn recv_from(&mut self, from: Role) -> Result<Frame> {
        if let Some(idx) = self.stash.iter().position(|frame| frame.from == from) {
            if let Some(frame) = self.stash.remove(idx) {
                return Ok(frame);
            }
        }
        loop {
            match self.inbox.recv() {
                Ok(frame) if frame.from == from => return Ok(frame),
                Ok(frame) => self.stash.push_back(frame),
                Err(_) => bail!(
                    "role {}: disconnected while waiting for role {}",
                    self.role,
                    from
                ),
            }
        }
    }
}

/// One role's two transport halves.
pub struct Endpoint {
    pub tx: Outbox,
    pub rx: Mailbox,
}

/// Build the full set of connected endpoints, one per role, with mailboxes
/// bounded at `capacity` frames.
pub fn switchboard(roles: usize, capacity: usize) -> Vec<Endpoint> {
    let mut senders = Vec::with_capacity(roles);
    let mut receivers = Vec::with_capacity(roles);
    for _ in 0..roles {
        let (tx, rx) = bounded(capacity);
        senders.push(tx);
        receivers.push(rx);
    }

    receivers
        .into_iter()
        .enumerate()
        .map(|(role, inbox)| Endpoint {
            tx: Outbox {
                role,
                peers: senders.clone(),
            },
            rx: Mailbox {
                role,
                inbox,
                stash: VecDeque::new(),
            },
        })
        .collect()
}
