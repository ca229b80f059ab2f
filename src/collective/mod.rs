//! Rank-level collectives used by the reduction coordinator.
//!
//! [`LocalGroup`] runs every rank inside one process on its own thread. The
//! lamellar backed implementation lives in
//! [`active_message`](crate::active_message).

use crate::error::CollectiveError;

use parking_lot::Mutex;

use std::sync::{Arc, Barrier};

/// The rank that loads the graph and receives the gathered counts.
pub const COORDINATOR: usize = 0;

pub trait Collective {
    fn rank(&self) -> usize;

    fn num_ranks(&self) -> usize;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// Every rank receives the coordinator's payload. Only the coordinator's
    /// `payload` is read; the others pass `None`.
    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>, CollectiveError>;

    fn barrier(&self);

    /// The coordinator receives one payload per rank, indexed by rank.
    /// Every other rank receives `None`.
    fn gather(&self, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CollectiveError>;
}

struct Board {
    barrier: Barrier,
    broadcast: Mutex<Option<Vec<u8>>>,
    slots: Mutex<Vec<Option<Vec<u8>>>>,
}

/// A fixed set of in-process ranks sharing one board.
#[derive(Clone)]
pub struct LocalGroup {
    size: usize,
    board: Arc<Board>,
}

impl LocalGroup {
    pub fn new(size: usize) -> LocalGroup {
        assert!(size > 0, "a group needs at least one rank");
        LocalGroup {
            size,
            board: Arc::new(Board {
                barrier: Barrier::new(size),
                broadcast: Mutex::new(None),
                slots: Mutex::new(vec![None; size]),
            }),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rank(&self, rank: usize) -> LocalRank {
        assert!(rank < self.size, "rank {rank} out of {}", self.size);
        LocalRank {
            rank,
            size: self.size,
            board: self.board.clone(),
        }
    }

    /// Run `f` once per rank, each on its own thread, and return the results
    /// in rank order.
    pub fn run<T, F>(size: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(LocalRank) -> T + Sync,
    {
        let group = LocalGroup::new(size);
        std::thread::scope(|s| {
            let handles = (0..size)
                .map(|rank| {
                    let member = group.rank(rank);
                    let f = &f;
                    s.spawn(move || f(member))
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

pub struct LocalRank {
    rank: usize,
    size: usize,
    board: Arc<Board>,
}

impl Collective for LocalRank {
    fn rank(&self) -> usize {
        self.rank
    }

    fn num_ranks(&self) -> usize {
        self.size
    }

    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>, CollectiveError> {
        let root = self.is_coordinator();
        if root {
            *self.board.broadcast.lock() = payload;
        }
        self.board.barrier.wait();
        let received = self.board.broadcast.lock().clone();
        self.board.barrier.wait();
        match received {
            Some(bytes) => Ok(bytes),
            None if root => Err(CollectiveError::MissingRootPayload(COORDINATOR)),
            None => Err(CollectiveError::NothingReceived(self.rank)),
        }
    }

    fn barrier(&self) {
        self.board.barrier.wait();
    }

    fn gather(&self, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CollectiveError> {
        self.board.slots.lock()[self.rank] = Some(payload);
        self.board.barrier.wait();
        let gathered = self.is_coordinator().then(|| {
            std::mem::replace(&mut *self.board.slots.lock(), vec![None; self.size])
        });
        self.board.barrier.wait();
        match gathered {
            Some(slots) => collect_slots(slots).map(Some),
            None => Ok(None),
        }
    }
}

/// Unwrap per-rank slots, naming the first rank that sent nothing.
pub(crate) fn collect_slots(slots: Vec<Option<Vec<u8>>>) -> Result<Vec<Vec<u8>>, CollectiveError> {
    slots
        .into_iter()
        .enumerate()
        .map(|(rank, slot)| {
            slot.ok_or(CollectiveError::MissingGather(rank))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_every_rank() {
        let received = LocalGroup::run(4, |member| {
            let payload = member.is_coordinator().then(|| vec![1, 2, 3]);
            member.broadcast(payload).unwrap()
        });
        assert_eq!(received, vec![vec![1, 2, 3]; 4]);
    }

    #[test]
    fn repeated_broadcasts_do_not_mix() {
        let received = LocalGroup::run(3, |member| {
            (0..20u8)
                .map(|round| {
                    let payload = member.is_coordinator().then(|| vec![round]);
                    member.broadcast(payload).unwrap()[0]
                })
                .collect::<Vec<_>>()
        });
        for per_rank in received {
            assert_eq!(per_rank, (0..20).collect::<Vec<_>>());
        }
    }

    #[test]
    fn missing_root_payload_fails_everywhere() {
        let results = LocalGroup::run(2, |member| member.broadcast(None));
        assert!(matches!(
            results[0],
            Err(CollectiveError::MissingRootPayload(0))
        ));
        assert!(matches!(
            results[1],
            Err(CollectiveError::NothingReceived(1))
        ));
    }

    #[test]
    fn gather_orders_by_rank() {
        let results = LocalGroup::run(3, |member| {
            let first = member.gather(vec![member.rank() as u8]).unwrap();
            member.barrier();
            let second = member.gather(vec![10 + member.rank() as u8]).unwrap();
            (first, second)
        });
        assert_eq!(results[0].0, Some(vec![vec![0], vec![1], vec![2]]));
        assert_eq!(results[0].1, Some(vec![vec![10], vec![11], vec![12]]));
        for (first, second) in &results[1..] {
            assert_eq!((first, second), (&None, &None));
        }
    }

    #[test]
    fn single_rank_group() {
        let member = LocalGroup::new(1).rank(0);
        assert!(member.is_coordinator());
        assert_eq!(member.broadcast(Some(vec![7])).unwrap(), vec![7]);
        assert_eq!(member.gather(vec![8]).unwrap(), Some(vec![vec![8]]));
    }
}
