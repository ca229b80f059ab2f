use crate::error::GraphError;
use crate::intset::{CompactIntSet, EMPTY};
use crate::wire;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use std::collections::HashMap;
use std::path::Path;

pub mod source;
pub use source::{EdgeListFile, EdgeListText, EdgeRecord, EdgeSource};

pub type VertexId = u32;

/// Interns endpoint names in first-seen order and accumulates undirected
/// adjacency.
#[derive(Default)]
pub struct GraphBuilder {
    adjacency: Vec<CompactIntSet>,
    names: Vec<String>,
    index: HashMap<String, VertexId>,
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn index_or_insert(&mut self, name: &str) -> Result<VertexId, GraphError> {
        if let Some(index) = self.index.get(name) {
            return Ok(*index);
        }
        if self.names.len() >= EMPTY as usize {
            return Err(GraphError::TooManyVertices);
        }
        let index = self.names.len() as VertexId;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), index);
        self.adjacency.push(CompactIntSet::new());
        Ok(index)
    }

    /// Returns `false` when both endpoints resolve to the same vertex, in
    /// which case nothing but the name is recorded.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        let from = self.index_or_insert(from)?;
        let to = self.index_or_insert(to)?;
        if from == to {
            return Ok(false);
        }
        self.adjacency[from as usize].add(to)?;
        self.adjacency[to as usize].add(from)?;
        Ok(true)
    }

    pub fn build(self) -> Graph {
        Graph {
            adjacency: self.adjacency,
            names: self.names,
            index: self.index,
        }
    }
}

/// Static undirected graph; the only source of neighbor queries during
/// enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<CompactIntSet>,
    names: Vec<String>,
    index: HashMap<String, VertexId>,
}

impl Graph {
    /// Read every record from `source`, shuffle them with `rng` and intern the
    /// endpoints in the shuffled order. Self loops are dropped, duplicate
    /// edges collapse.
    pub fn load<S: EdgeSource, R: Rng + ?Sized>(
        source: S,
        rng: &mut R,
    ) -> Result<Graph, GraphError> {
        let start = std::time::Instant::now();
        let mut records = source.read_edges()?;
        debug!(records = records.len(), "edge records read");
        records.shuffle(rng);
        let mut builder = GraphBuilder::new();
        let mut self_loops = 0;
        for record in &records {
            if !builder.add_edge(&record.from, &record.to)? {
                self_loops += 1;
            }
        }
        let graph = builder.build();
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            self_loops,
            secs = start.elapsed().as_secs_f64(),
            "graph loaded"
        );
        Ok(graph)
    }

    /// Load `path`, either a text edge list or (extension `bin`) a graph
    /// previously written by [`dump_to_bin`](Self::dump_to_bin).
    pub fn load_path(path: &Path, shuffle_seed: Option<u64>) -> Result<Graph, GraphError> {
        if path.extension().map_or(false, |ext| ext == "bin") {
            return Graph::load_bin(path);
        }
        let source = EdgeListFile::new(path);
        match shuffle_seed {
            Some(seed) => Graph::load(source, &mut StdRng::seed_from_u64(seed)),
            None => Graph::load(source, &mut rand::thread_rng()),
        }
    }

    /// Build without shuffling, in the given edge order.
    pub fn from_edges(edges: &[(&str, &str)]) -> Result<Graph, GraphError> {
        let mut builder = GraphBuilder::new();
        for (from, to) in edges {
            builder.add_edge(from, to)?;
        }
        Ok(builder.build())
    }

    /// Rebuild a graph from names in index order and per-vertex neighbor
    /// lists, checking that the lists describe a simple undirected graph.
    pub fn from_parts(
        names: Vec<String>,
        neighbors: Vec<Vec<VertexId>>,
    ) -> Result<Graph, GraphError> {
        if names.len() != neighbors.len() {
            return Err(GraphError::InvalidImage(format!(
                "{} names for {} adjacency lists",
                names.len(),
                neighbors.len()
            )));
        }
        let vertex_count = names.len();
        let mut adjacency = Vec::with_capacity(vertex_count);
        for (node, list) in neighbors.iter().enumerate() {
            let mut set = CompactIntSet::new();
            for &neighbor in list {
                if neighbor as usize >= vertex_count || neighbor as usize == node {
                    return Err(GraphError::InvalidImage(format!(
                        "vertex {node} lists neighbor {neighbor}"
                    )));
                }
                set.add(neighbor)?;
            }
            adjacency.push(set);
        }
        for (node, set) in adjacency.iter().enumerate() {
            let one_way = set
                .iter()
                .find(|n| !adjacency[*n as usize].contains(node as u32));
            if let Some(neighbor) = one_way {
                return Err(GraphError::InvalidImage(format!(
                    "edge {node}-{neighbor} is only recorded in one direction"
                )));
            }
        }
        let mut index = HashMap::with_capacity(vertex_count);
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i as VertexId).is_some() {
                return Err(GraphError::InvalidImage(format!(
                    "duplicate vertex name {name:?}"
                )));
            }
        }
        Ok(Graph {
            adjacency,
            names,
            index,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|set| set.len()).sum::<usize>() / 2
    }

    /// Panics if `node` is not a vertex of this graph.
    pub fn adjacency(&self, node: VertexId) -> &CompactIntSet {
        match self.adjacency.get(node as usize) {
            Some(set) => set,
            None => panic!("node {:?} does not exist in graph", node),
        }
    }

    pub fn index_of(&self, name: &str) -> Option<VertexId> {
        self.index.get(name).copied()
    }

    pub fn name_of(&self, node: VertexId) -> Option<&str> {
        self.names.get(node as usize).map(|name| name.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn dump_to_bin(&self, path: &Path) -> Result<(), GraphError> {
        std::fs::write(path, wire::encode_graph(self)?)?;
        Ok(())
    }

    pub fn load_bin(path: &Path) -> Result<Graph, GraphError> {
        let start = std::time::Instant::now();
        let graph = wire::decode_graph(&std::fs::read(path)?)?;
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            secs = start.elapsed().as_secs_f64(),
            "graph loaded from binary image"
        );
        Ok(graph)
    }
}
