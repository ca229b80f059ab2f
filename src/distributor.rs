use crate::config::SeedPolicy;
use crate::graph::VertexId;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out ESU seed vertices to one worker.
pub trait SeedSource {
    fn claim_next_seed(&mut self) -> Option<VertexId>;
}

/// `worker, worker + workers, worker + 2 * workers, ...` below `limit`.
/// No shared state at all.
#[derive(Debug, Clone)]
pub struct StaticStride {
    next: usize,
    stride: usize,
    limit: usize,
}

impl StaticStride {
    pub fn new(worker: usize, workers: usize, limit: usize) -> StaticStride {
        assert!(worker < workers, "worker {worker} out of {workers}");
        StaticStride {
            next: worker,
            stride: workers,
            limit,
        }
    }
}

impl SeedSource for StaticStride {
    fn claim_next_seed(&mut self) -> Option<VertexId> {
        if self.next >= self.limit {
            return None;
        }
        let seed = self.next;
        self.next += self.stride;
        Some(seed as VertexId)
    }
}

/// A claim counter shared by the threads of one PE. Starts at `base` and
/// moves by `stride`, so PEs keep disjoint residues while threads inside a PE
/// balance dynamically.
#[derive(Debug)]
pub struct SharedCounter {
    next: AtomicUsize,
    stride: usize,
    limit: usize,
}

impl SharedCounter {
    pub fn new(base: usize, stride: usize, limit: usize) -> SharedCounter {
        assert!(stride > 0, "stride must be positive");
        SharedCounter {
            next: AtomicUsize::new(base),
            stride,
            limit,
        }
    }

    /// Lock-free; the counter never moves past `limit + stride`.
    pub fn claim(&self) -> Option<VertexId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next < self.limit).then(|| next + self.stride)
            })
            .ok()
            .map(|seed| seed as VertexId)
    }
}

impl<'a> SeedSource for &'a SharedCounter {
    fn claim_next_seed(&mut self) -> Option<VertexId> {
        self.claim()
    }
}

/// Owns the seed assignment of one PE for one run.
#[derive(Debug)]
pub struct WorkDistributor {
    policy: SeedPolicy,
    rank: usize,
    num_ranks: usize,
    threads: usize,
    vertex_count: usize,
    counter: SharedCounter,
}

impl WorkDistributor {
    pub fn new(
        policy: SeedPolicy,
        rank: usize,
        num_ranks: usize,
        threads: usize,
        vertex_count: usize,
    ) -> WorkDistributor {
        assert!(rank < num_ranks, "rank {rank} out of {num_ranks}");
        assert!(threads > 0, "at least one thread is required");
        WorkDistributor {
            policy,
            rank,
            num_ranks,
            threads,
            vertex_count,
            counter: SharedCounter::new(rank, num_ranks, vertex_count),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn handle(&self, worker: usize) -> SeedHandle<'_> {
        assert!(
            worker < self.threads,
            "worker {worker} out of {}",
            self.threads
        );
        match self.policy {
            SeedPolicy::StaticStride => SeedHandle::Static(StaticStride::new(
                self.rank * self.threads + worker,
                self.num_ranks * self.threads,
                self.vertex_count,
            )),
            SeedPolicy::SharedCounter => SeedHandle::Shared(&self.counter),
        }
    }
}

pub enum SeedHandle<'a> {
    Static(StaticStride),
    Shared(&'a SharedCounter),
}

impl<'a> SeedSource for SeedHandle<'a> {
    fn claim_next_seed(&mut self) -> Option<VertexId> {
        match self {
            SeedHandle::Static(stride) => stride.claim_next_seed(),
            SeedHandle::Shared(counter) => counter.claim(),
        }
    }
}
