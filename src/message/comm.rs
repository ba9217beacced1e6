use super::util;
use crate::error::Error;

/// Message tag reserved for the broadcast stage of collectives.
pub const BROADCAST_TAG: u64 = 1;

/// Message tag reserved for the reduce stage of collectives.
pub const REDUCE_TAG: u64 = 2;

/// Interface for a group of ranks that can exchange messages. The underlying
/// transport can in principle be in-process channels, TCP, or a higher level
/// abstraction like MPI.
///
pub trait Communicator {
    /// Must be implemented to return the rank of this process within the
    /// communicator.
    fn rank(&self) -> usize;

    /// Must be implemented to return the number of peers processes in this
    /// communicator.
    fn size(&self) -> usize;

    /// Must be implemented to send a tagged message to a peer. This method
    /// must return immediately, in other words it is not allowed to block
    /// until a matching receive is posted.
    fn send(&self, rank: usize, tag: u64, message: Vec<u8>) -> Result<(), Error>;

    /// Must be implemented to receive the next message with the given tag
    /// from the given peer. This method is allowed to block until that
    /// message is ready to be received. Messages with the same source and
    /// tag are received in the order they were sent.
    fn recv(&self, rank: usize, tag: u64) -> Result<Vec<u8>, Error>;

    /// Implements a binomial tree broadcast from the root node. The message
    /// buffer must be `Some` if this is the root node, and it is ignored
    /// otherwise.
    ///
    fn broadcast(&self, value: Option<Vec<u8>>) -> Result<Vec<u8>, Error> {
        let r = self.rank();
        let p = self.size();

        assert!(
            r != 0 || value.is_some(),
            "the root rank must supply the broadcast value"
        );

        let value = match value {
            Some(value) if r == 0 => value,
            _ => self.recv(r & (r - 1), BROADCAST_TAG)?,
        };
        for level in (0..util::ceil_log2(p)).rev() {
            let one = 1 << level;
            let two = 1 << (level + 1);

            if r % two == 0 && r + one < p {
                self.send(r + one, BROADCAST_TAG, value.clone())?
            }
        }
        Ok(value)
    }

    /// Implements a binomial tree reduce. All ranks return `None` except for
    /// the root.
    ///
    fn reduce<F>(&self, f: F, mut value: Vec<u8>) -> Result<Option<Vec<u8>>, Error>
    where
        F: Fn(Vec<u8>, Vec<u8>) -> Vec<u8>,
    {
        let r = self.rank();
        let p = self.size();

        for level in 0..util::ceil_log2(p) {
            let one = 1 << level;
            let two = 1 << (level + 1);

            if r % two == 0 {
                if r + one < p {
                    value = f(value, self.recv(r + one, REDUCE_TAG)?)
                }
            } else {
                self.send(r - one, REDUCE_TAG, value)?;
                return Ok(None);
            }
        }
        Ok(Some(value))
    }

    /// Implements an all-reduce (symmetric fold) operation over a commutative
    /// binary operator.
    ///
    fn all_reduce<F>(&self, f: F, value: Vec<u8>) -> Result<Vec<u8>, Error>
    where
        F: Fn(Vec<u8>, Vec<u8>) -> Vec<u8>,
    {
        let reduced = self.reduce(f, value)?;
        self.broadcast(reduced)
    }
}
