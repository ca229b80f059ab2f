//! Byte payloads exchanged between PEs and written to `.bin` graph images.
//!
//! Every payload starts with a four byte magic and a little-endian `u16`
//! version, followed by a bincode body.

use crate::counts::MotifCounts;
use crate::error::{GraphError, WireError};
use crate::graph::{Graph, VertexId};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const WIRE_VERSION: u16 = 1;

const GRAPH_MAGIC: [u8; 4] = *b"MGRF";
const REPLICA_MAGIC: [u8; 4] = *b"MRPL";
const COUNTS_MAGIC: [u8; 4] = *b"MCNT";
const HEADER_LEN: usize = 6;

/// What the coordinator broadcasts after loading.
#[derive(Debug)]
pub enum Replica {
    Graph(Graph),
    LoadFailed(String),
}

/// What every rank sends to the coordinator after enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountsPayload {
    Counts(MotifCounts),
    Failed(String),
}

#[derive(Serialize, Deserialize)]
struct GraphImage {
    names: Vec<String>,
    neighbors: Vec<Vec<VertexId>>,
}

impl GraphImage {
    fn of(graph: &Graph) -> GraphImage {
        GraphImage {
            names: graph.names().to_vec(),
            neighbors: (0..graph.vertex_count() as VertexId)
                .map(|node| graph.adjacency(node).to_sorted_vec())
                .collect(),
        }
    }

    fn into_graph(self) -> Result<Graph, GraphError> {
        Graph::from_parts(self.names, self.neighbors)
    }
}

#[derive(Serialize, Deserialize)]
enum ReplicaBody {
    Graph(GraphImage),
    LoadFailed(String),
}

#[derive(Serialize, Deserialize)]
enum CountsBody {
    Counts(Vec<(Vec<u8>, u64)>),
    Failed(String),
}

fn frame<T: Serialize>(magic: [u8; 4], body: &T) -> Result<Vec<u8>, WireError> {
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    bytes.extend_from_slice(&magic);
    bytes.extend_from_slice(&WIRE_VERSION.to_le_bytes());
    bincode::serialize_into(&mut bytes, body)?;
    Ok(bytes)
}

fn unframe<T: DeserializeOwned>(magic: [u8; 4], bytes: &[u8]) -> Result<T, WireError> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::Truncated(bytes.len()));
    }
    let found = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if found != magic {
        return Err(WireError::BadMagic(found));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != WIRE_VERSION {
        return Err(WireError::UnsupportedVersion {
            found: version,
            expected: WIRE_VERSION,
        });
    }
    Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
}

pub fn encode_graph(graph: &Graph) -> Result<Vec<u8>, WireError> {
    frame(GRAPH_MAGIC, &GraphImage::of(graph))
}

pub fn decode_graph(bytes: &[u8]) -> Result<Graph, GraphError> {
    unframe::<GraphImage>(GRAPH_MAGIC, bytes)?.into_graph()
}

pub fn encode_replica(replica: &Replica) -> Result<Vec<u8>, WireError> {
    let body = match replica {
        Replica::Graph(graph) => ReplicaBody::Graph(GraphImage::of(graph)),
        Replica::LoadFailed(reason) => ReplicaBody::LoadFailed(reason.clone()),
    };
    frame(REPLICA_MAGIC, &body)
}

pub fn decode_replica(bytes: &[u8]) -> Result<Replica, GraphError> {
    match unframe(REPLICA_MAGIC, bytes)? {
        ReplicaBody::Graph(image) => Ok(Replica::Graph(image.into_graph()?)),
        ReplicaBody::LoadFailed(reason) => Ok(Replica::LoadFailed(reason)),
    }
}

pub fn encode_counts(payload: &CountsPayload) -> Result<Vec<u8>, WireError> {
    let body = match payload {
        CountsPayload::Counts(counts) => {
            let mut entries = counts
                .iter()
                .map(|(key, count)| (key.to_vec(), count))
                .collect::<Vec<_>>();
            entries.sort_unstable();
            CountsBody::Counts(entries)
        }
        CountsPayload::Failed(reason) => CountsBody::Failed(reason.clone()),
    };
    frame(COUNTS_MAGIC, &body)
}

pub fn decode_counts(bytes: &[u8]) -> Result<CountsPayload, WireError> {
    Ok(match unframe(COUNTS_MAGIC, bytes)? {
        CountsBody::Counts(entries) => CountsPayload::Counts(entries.into_iter().collect()),
        CountsBody::Failed(reason) => CountsPayload::Failed(reason),
    })
}
