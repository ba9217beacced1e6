use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::debug;

use super::comm::Communicator;
use crate::error::Error;

const ABORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

struct Envelope {
    source: usize,
    tag: u64,
    bytes: Vec<u8>,
}

/// A communicator connecting ranks that live in the same process, usually
/// on separate threads. Every rank owns one inbox; peers push tagged
/// envelopes into it. Envelopes which arrive before they are asked for are
/// parked in a pending list until a matching `recv` is posted.
///
/// The ranks of a group share an abort flag. A rank that fails sets it, and
/// peers blocked in `recv` then give up with `Error::Aborted` rather than
/// waiting forever for a message that will never be sent.
///
pub struct ChannelCommunicator {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    pending: RefCell<Vec<Envelope>>,
    aborted: Arc<AtomicBool>,
}

impl ChannelCommunicator {
    /// Create a group of `size` connected communicators, in rank order.
    ///
    pub fn group(size: usize) -> Vec<Self> {
        let aborted = Arc::new(AtomicBool::new(false));
        let (sinks, sources): (Vec<_>, Vec<_>) =
            (0..size).map(|_| crossbeam_channel::unbounded()).unzip();

        sources
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self {
                rank,
                peers: sinks.clone(),
                inbox,
                pending: RefCell::new(Vec::new()),
                aborted: aborted.clone(),
            })
            .collect()
    }

    /// Signal every rank in the group to stop waiting for messages.
    ///
    pub fn abort(&self) {
        debug!("rank {} aborting the group", self.rank);
        self.aborted.store(true, Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn take_pending(&self, rank: usize, tag: u64) -> Option<Vec<u8>> {
        let mut pending = self.pending.borrow_mut();
        let i = pending
            .iter()
            .position(|e| e.source == rank && e.tag == tag)?;
        Some(pending.remove(i).bytes)
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, rank: usize, tag: u64, message: Vec<u8>) -> Result<(), Error> {
        let envelope = Envelope {
            source: self.rank,
            tag,
            bytes: message,
        };
        self.peers[rank]
            .send(envelope)
            .map_err(|_| Error::Disconnected(rank))
    }

    fn recv(&self, rank: usize, tag: u64) -> Result<Vec<u8>, Error> {
        if let Some(bytes) = self.take_pending(rank, tag) {
            return Ok(bytes);
        }
        loop {
            match self.inbox.recv_timeout(ABORT_POLL_INTERVAL) {
                Ok(e) if e.source == rank && e.tag == tag => return Ok(e.bytes),
                Ok(e) => self.pending.borrow_mut().push(e),
                Err(RecvTimeoutError::Timeout) => {
                    if self.is_aborted() {
                        return Err(Error::Aborted);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Err(Error::Disconnected(rank)),
            }
        }
    }
}
