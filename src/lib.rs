//! Distributed network-motif counting.
//!
//! Every PE holds a full replica of the graph, enumerates the connected
//! induced subgraphs of order k rooted at its share of the vertices (ESU),
//! reduces its positional counts to canonical labels, and the coordinator PE
//! merges everyone's table.

pub mod active_message;
pub mod collective;
pub mod config;
pub mod coordinator;
pub mod counts;
pub mod distributor;
pub mod error;
pub mod esu;
pub mod graph;
pub mod intset;
pub mod labeler;
pub mod subgraph;
pub mod wire;

pub use collective::{Collective, LocalGroup, LocalRank, COORDINATOR};
pub use config::{RunConfig, SeedPolicy, MAX_MOTIF_ORDER};
pub use coordinator::{load_input, Phase, PhaseTimings, ReductionCoordinator, RunReport};
pub use counts::MotifCounts;
pub use error::MotifError;
pub use esu::EsuEngine;
pub use graph::{Graph, VertexId};
pub use intset::CompactIntSet;
pub use labeler::{DegreeRefinedLabeler, Labeler};
pub use subgraph::Subgraph;
