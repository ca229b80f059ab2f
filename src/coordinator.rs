use crate::collective::Collective;
use crate::config::RunConfig;
use crate::counts::{MotifCounts, SharedCounts};
use crate::distributor::{SeedSource, WorkDistributor};
use crate::error::{GraphError, IntSetError, MotifError};
use crate::esu::EsuEngine;
use crate::graph::Graph;
use crate::labeler::Labeler;
use crate::wire::{self, CountsPayload, Replica};

use tracing::{debug, error, info};

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Replicating,
    Enumerating,
    LocalCanonicalizing,
    Synchronizing,
    Gathering,
    Merging,
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    pub load: Duration,
    pub replicate: Duration,
    pub enumerate: Duration,
    pub canonicalize: Duration,
    pub synchronize: Duration,
    pub gather: Duration,
    pub merge: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.load
            + self.replicate
            + self.enumerate
            + self.canonicalize
            + self.synchronize
            + self.gather
            + self.merge
    }
}

/// What one rank knows once a run is over.
#[derive(Debug)]
pub struct RunReport {
    pub rank: usize,
    pub vertex_count: usize,
    /// Subgraphs enumerated by this rank's workers.
    pub subgraphs: u64,
    /// The merged canonical table, only present on the coordinator.
    pub counts: Option<MotifCounts>,
    pub timings: PhaseTimings,
}

/// Drives one rank through load, replication, enumeration and reduction.
///
/// Failures that every rank learns about at the same collective (a failed
/// load rides the broadcast) end the run right there on all ranks. Failures
/// local to one rank are carried to the coordinator as a failure marker in
/// the gather, so no rank is left waiting at a barrier.
pub struct ReductionCoordinator<'a, C: Collective, L: Labeler> {
    collective: &'a C,
    labeler: &'a L,
    config: &'a RunConfig,
    phase: Phase,
}

impl<'a, C: Collective, L: Labeler> ReductionCoordinator<'a, C, L> {
    pub fn new(collective: &'a C, labeler: &'a L, config: &'a RunConfig) -> Self {
        ReductionCoordinator {
            collective,
            labeler,
            config,
            phase: Phase::Loading,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        if self.collective.is_coordinator() {
            info!(?phase, "entering phase");
        } else {
            debug!(rank = self.collective.rank(), ?phase, "entering phase");
        }
    }

    /// `load` is only called on the coordinator.
    pub fn run(
        &mut self,
        load: impl FnOnce() -> Result<Graph, GraphError>,
    ) -> Result<RunReport, MotifError> {
        let rank = self.collective.rank();
        let order = self.config.motif_order;
        self.run_with(load, |graph, distributor| {
            enumerate_local(graph, order, distributor, rank)
        })
    }

    /// [`run`](Self::run) with the local enumeration step supplied by the
    /// caller.
    pub fn run_with<E>(
        &mut self,
        load: impl FnOnce() -> Result<Graph, GraphError>,
        enumerate: E,
    ) -> Result<RunReport, MotifError>
    where
        E: FnOnce(&Graph, &WorkDistributor) -> Result<MotifCounts, MotifError>,
    {
        let rank = self.collective.rank();
        let mut timings = PhaseTimings::default();

        self.enter(Phase::Loading);
        // identical on every rank, so no rank is left at a collective
        self.config.validate(self.collective.num_ranks())?;
        let start = Instant::now();
        let loaded = self.collective.is_coordinator().then(load);
        timings.load = start.elapsed();

        self.enter(Phase::Replicating);
        let start = Instant::now();
        let graph = self.replicate(loaded)?;
        timings.replicate = start.elapsed();

        self.enter(Phase::Enumerating);
        let start = Instant::now();
        let mut vertex_count = 0;
        let local = graph.and_then(|graph| {
            vertex_count = graph.vertex_count();
            let distributor = WorkDistributor::new(
                self.config.seed_policy,
                rank,
                self.collective.num_ranks(),
                self.config.threads,
                vertex_count,
            );
            enumerate(&graph, &distributor)
        });
        timings.enumerate = start.elapsed();
        let subgraphs = local.as_ref().map_or(0, |counts| counts.total());
        debug!(
            rank,
            subgraphs,
            secs = timings.enumerate.as_secs_f64(),
            "local enumeration done"
        );

        self.enter(Phase::LocalCanonicalizing);
        let start = Instant::now();
        let canonical = local.map(|counts| self.labeler.canonical_labels(&counts));
        timings.canonicalize = start.elapsed();

        self.enter(Phase::Synchronizing);
        let start = Instant::now();
        self.collective.barrier();
        timings.synchronize = start.elapsed();

        self.enter(Phase::Gathering);
        let start = Instant::now();
        let (payload, local_error) = match canonical {
            Ok(counts) => (CountsPayload::Counts(counts), None),
            Err(e) => {
                error!(rank, "local enumeration failed: {e}");
                (CountsPayload::Failed(e.to_string()), Some(e))
            }
        };
        let bytes = match wire::encode_counts(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(rank, "unable to encode local counts: {e}");
                // an undecodable payload is reported by the coordinator as a peer failure
                let marker = CountsPayload::Failed(e.to_string());
                wire::encode_counts(&marker).unwrap_or_default()
            }
        };
        let gathered = self.collective.gather(bytes)?;
        timings.gather = start.elapsed();
        if let Some(e) = local_error {
            return Err(e);
        }

        let counts = match gathered {
            Some(gathered) => {
                self.enter(Phase::Merging);
                let start = Instant::now();
                let merged = merge_gathered(gathered)?;
                timings.merge = start.elapsed();
                info!(
                    subgraphs = merged.total(),
                    labels = merged.len(),
                    secs = timings.total().as_secs_f64(),
                    "motif counts merged"
                );
                Some(merged)
            }
            None => None,
        };

        self.enter(Phase::Done);
        Ok(RunReport {
            rank,
            vertex_count,
            subgraphs,
            counts,
            timings,
        })
    }

    /// The outer error ends the run on every rank; the inner one is local to
    /// this rank.
    fn replicate(
        &self,
        loaded: Option<Result<Graph, GraphError>>,
    ) -> Result<Result<Graph, MotifError>, MotifError> {
        let Some(loaded) = loaded else {
            let bytes = self.collective.broadcast(None)?;
            return Ok(match wire::decode_replica(&bytes) {
                Ok(Replica::Graph(graph)) => Ok(graph),
                Ok(Replica::LoadFailed(reason)) => {
                    return Err(MotifError::RemoteLoadFailed(reason))
                }
                Err(e) => {
                    let rank = self.collective.rank();
                    error!(rank, "unable to decode graph replica: {e}");
                    Err(e.into())
                }
            });
        };
        if self.collective.num_ranks() == 1 {
            return Ok(Ok(loaded?));
        }

        let (replica, load_error) = match loaded {
            Ok(graph) => (Replica::Graph(graph), None),
            Err(e) => {
                error!("graph load failed: {e}");
                let reason = e.to_string();
                (Replica::LoadFailed(reason), Some(MotifError::from(e)))
            }
        };
        let (payload, encode_error) = match wire::encode_replica(&replica) {
            Ok(bytes) => (Some(bytes), None),
            Err(e) => {
                error!("unable to encode graph replica: {e}");
                let marker = Replica::LoadFailed(e.to_string());
                let payload = wire::encode_replica(&marker).ok();
                (payload, Some(MotifError::from(e)))
            }
        };
        if let Some(bytes) = &payload {
            debug!(bytes = bytes.len(), "replicating graph");
        }
        self.collective.broadcast(payload)?;
        if let Some(e) = load_error.or(encode_error) {
            return Err(e);
        }
        match replica {
            Replica::Graph(graph) => Ok(Ok(graph)),
            Replica::LoadFailed(reason) => Err(MotifError::RemoteLoadFailed(reason)),
        }
    }
}

/// Enumerate every seed this rank owns with `distributor.threads()` workers
/// and return the merged positional counts.
pub fn enumerate_local(
    graph: &Graph,
    order: usize,
    distributor: &WorkDistributor,
    rank: usize,
) -> Result<MotifCounts, MotifError> {
    let handles = (0..distributor.threads())
        .map(|worker| distributor.handle(worker))
        .collect::<Vec<_>>();
    run_workers(graph, order, rank, handles)
}

fn run_workers<S: SeedSource + Send>(
    graph: &Graph,
    order: usize,
    rank: usize,
    sources: Vec<S>,
) -> Result<MotifCounts, MotifError> {
    let shared = SharedCounts::new();
    let outcomes = std::thread::scope(|s| {
        let workers = sources
            .into_iter()
            .map(|mut source| {
                let shared = &shared;
                s.spawn(move || -> Result<usize, IntSetError> {
                    let engine = EsuEngine::new(graph, order);
                    let mut seeds = 0;
                    while let Some(seed) = source.claim_next_seed() {
                        let mut counts = MotifCounts::new();
                        engine.enumerate_from(seed, &mut counts)?;
                        shared.absorb(counts);
                        seeds += 1;
                    }
                    Ok(seeds)
                })
            })
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|worker| worker.join())
            .collect::<Vec<_>>()
    });
    for (worker, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(Ok(seeds)) => debug!(rank, worker, seeds, "worker finished"),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(MotifError::WorkerPanicked { rank, worker }),
        }
    }
    Ok(shared.into_inner())
}

/// Sum the per-rank payloads received by the coordinator.
pub fn merge_gathered(gathered: Vec<Vec<u8>>) -> Result<MotifCounts, MotifError> {
    let mut merged = MotifCounts::new();
    for (rank, bytes) in gathered.into_iter().enumerate() {
        match wire::decode_counts(&bytes) {
            Ok(CountsPayload::Counts(counts)) => merged.merge(counts),
            Ok(CountsPayload::Failed(reason)) => {
                return Err(MotifError::PeerFailed { rank, reason })
            }
            Err(e) => {
                return Err(MotifError::PeerFailed {
                    rank,
                    reason: e.to_string(),
                })
            }
        }
    }
    Ok(merged)
}

/// Load the configured input, writing the `.bin` image when asked to.
pub fn load_input(config: &RunConfig) -> Result<Graph, GraphError> {
    let graph = Graph::load_path(&config.input, config.shuffle_seed)?;
    let from_image = config.input.extension().map_or(false, |ext| ext == "bin");
    if config.dump_bin && !from_image {
        let path = config.bin_path();
        graph.dump_to_bin(&path)?;
        info!(path = %path.display(), "graph image written");
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::LocalGroup;
    use crate::config::{SeedPolicy, MAX_MOTIF_ORDER};
    use crate::error::ConfigError;
    use crate::graph::VertexId;
    use crate::labeler::DegreeRefinedLabeler;

    fn triangle_with_tail() -> Graph {
        Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]).unwrap()
    }

    struct PanicAfter(VertexId);

    impl SeedSource for PanicAfter {
        fn claim_next_seed(&mut self) -> Option<VertexId> {
            if self.0 == 0 {
                panic!("seed source exhausted its budget");
            }
            self.0 -= 1;
            Some(self.0)
        }
    }

    #[test]
    fn single_rank_run() {
        let graph = triangle_with_tail();
        let config = RunConfig::new("unused", 3);
        let group = LocalGroup::new(1);
        let member = group.rank(0);
        let labeler = DegreeRefinedLabeler;
        let mut coordinator = ReductionCoordinator::new(&member, &labeler, &config);
        assert_eq!(coordinator.phase(), Phase::Loading);
        let report = coordinator.run(|| Ok(graph)).unwrap();
        assert_eq!(coordinator.phase(), Phase::Done);
        assert_eq!(report.vertex_count, 4);
        assert_eq!(report.subgraphs, 3);
        let counts = report.counts.unwrap();
        assert_eq!(counts.get(b"Bw"), 1);
        assert_eq!(counts.get(b"Bo"), 2);
    }

    #[test]
    fn every_thread_count_agrees() {
        let graph = triangle_with_tail();
        let expected = {
            let policy = SeedPolicy::StaticStride;
            let distributor = WorkDistributor::new(policy, 0, 1, 1, 4);
            enumerate_local(&graph, 3, &distributor, 0).unwrap()
        };
        for policy in [SeedPolicy::StaticStride, SeedPolicy::SharedCounter] {
            for threads in 1..=4 {
                let distributor = WorkDistributor::new(policy, 0, 1, threads, 4);
                let counts = enumerate_local(&graph, 3, &distributor, 0).unwrap();
                assert_eq!(counts, expected);
            }
        }
    }

    #[test]
    fn panicking_worker_is_reported() {
        let graph = triangle_with_tail();
        let err = run_workers(&graph, 2, 3, vec![PanicAfter(2)]).unwrap_err();
        assert!(matches!(
            err,
            MotifError::WorkerPanicked { rank: 3, worker: 0 }
        ));
    }

    #[test]
    fn failed_payload_names_the_rank() {
        let empty = CountsPayload::Counts(MotifCounts::new());
        let ok = wire::encode_counts(&empty).unwrap();
        let failed = wire::encode_counts(&CountsPayload::Failed("boom".into())).unwrap();
        let err = merge_gathered(vec![ok.clone(), failed]).unwrap_err();
        assert!(matches!(
            err,
            MotifError::PeerFailed {
                rank: 1,
                ref reason,
            } if reason == "boom"
        ));
        let err = merge_gathered(vec![ok, vec![1, 2]]).unwrap_err();
        assert!(matches!(err, MotifError::PeerFailed { rank: 1, .. }));
    }

    #[test]
    fn load_failure_reaches_every_rank() {
        let config = RunConfig::new("missing.txt", 3);
        let results = LocalGroup::run(3, |member| {
            ReductionCoordinator::new(&member, &DegreeRefinedLabeler, &config)
                .run(|| Err(GraphError::TooManyVertices))
        });
        assert!(matches!(
            results[0],
            Err(MotifError::Graph(GraphError::TooManyVertices))
        ));
        for result in &results[1..] {
            assert!(matches!(result, Err(MotifError::RemoteLoadFailed(_))));
        }
    }

    #[test]
    fn one_failing_rank_is_reported_by_the_coordinator() {
        let graph = triangle_with_tail();
        let config = RunConfig::new("in-memory", 2);
        let results = LocalGroup::run(3, |member| {
            let rank = member.rank();
            let enumerate = |graph: &Graph, distributor: &WorkDistributor| {
                if rank == 1 {
                    run_workers(graph, 2, rank, vec![PanicAfter(1)])
                } else {
                    enumerate_local(graph, 2, distributor, rank)
                }
            };
            ReductionCoordinator::new(&member, &DegreeRefinedLabeler, &config)
                .run_with(|| Ok(graph.clone()), enumerate)
        });
        assert!(matches!(
            &results[0],
            Err(MotifError::PeerFailed { rank: 1, reason }) if reason.contains("panicked")
        ));
        assert!(matches!(
            results[1],
            Err(MotifError::WorkerPanicked { rank: 1, worker: 0 })
        ));
        assert!(results[2].is_ok());
        assert!(results[2].as_ref().unwrap().counts.is_none());
    }

    #[test]
    fn invalid_order_is_rejected_before_loading() {
        for order in [0, 1, MAX_MOTIF_ORDER + 1, 63] {
            let config = RunConfig::new("in-memory", order);
            let results = LocalGroup::run(2, |member| {
                ReductionCoordinator::new(&member, &DegreeRefinedLabeler, &config)
                    .run(|| panic!("load must not run with an invalid config"))
            });
            for result in results {
                assert!(matches!(
                    result,
                    Err(MotifError::Config(ConfigError::MotifOrder { found, .. }))
                        if found == order
                ));
            }
        }
    }
}
