use std::panic;
use std::thread;

use core_affinity::CoreId;
use log::{error, info};

use crate::error::Error;
use crate::message::{ChannelCommunicator, Communicator};

/// Run a job once per rank, each on its own thread with its own endpoint of
/// a connected `ChannelCommunicator` group, and return the per-rank results
/// in rank order. This brackets the whole lifetime of the parallel runtime:
/// the group is created before the first job starts and torn down after the
/// last one finishes.
///
/// If `pin_cores` is set and the core ids can be queried, rank `r` is pinned
/// to core `r % num_cores`.
///
/// A rank whose job returns `Err` (or panics) aborts the group, so peers
/// blocked on its messages return instead of deadlocking. The error reported
/// is the first one that is not just a consequence of the abort. A panic is
/// resumed on the calling thread.
///
pub fn launch<T, F>(num_ranks: usize, pin_cores: bool, job: F) -> Result<Vec<T>, Error>
where
    F: Fn(&ChannelCommunicator) -> Result<T, Error> + Sync,
    T: Send,
{
    if num_ranks == 0 {
        return Err(Error::InvalidConfig("at least one rank is required".into()));
    }
    let core_ids: Vec<CoreId> = if pin_cores {
        core_affinity::get_core_ids().unwrap_or_default()
    } else {
        Vec::new()
    };
    info!("launching {} rank(s)", num_ranks);

    let job = &job;
    let outcomes: Vec<thread::Result<Result<T, Error>>> = thread::scope(|scope| {
        let handles: Vec<_> = ChannelCommunicator::group(num_ranks)
            .into_iter()
            .map(|comm| {
                let core = match core_ids.len() {
                    0 => None,
                    n => Some(core_ids[comm.rank() % n]),
                };
                scope.spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }
                    let _guard = AbortOnPanic(&comm);
                    let result = job(&comm);

                    if let Err(e) = &result {
                        error!("rank {} failed: {}", comm.rank(), e);
                        comm.abort()
                    }
                    result
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut results = Vec::with_capacity(num_ranks);
    let mut failure: Option<Error> = None;

    for outcome in outcomes {
        match outcome {
            Err(payload) => panic::resume_unwind(payload),
            Ok(Ok(value)) => results.push(value),
            Ok(Err(e)) => {
                failure = match failure {
                    None | Some(Error::Aborted) => Some(e),
                    Some(first) => Some(first),
                }
            }
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

struct AbortOnPanic<'a>(&'a ChannelCommunicator);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort()
        }
    }
}

#[cfg(test)]
mod test {

    use super::launch;
    use crate::error::Error;
    use crate::message::Communicator;

    #[test]
    fn results_come_back_in_rank_order() {
        let ranks = launch(4, false, |comm| Ok(comm.rank())).unwrap();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn a_failing_rank_releases_its_peers() {
        let result = launch(3, false, |comm| {
            if comm.rank() == 0 {
                Err(Error::InvalidConfig("rank 0 gives up".into()))
            } else {
                comm.recv(0, 99).map(|_| ())
            }
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_ranks_is_rejected() {
        assert!(launch(0, false, |_| Ok(())).is_err());
    }
}
