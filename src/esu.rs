//! ESU: exhaustive enumeration of connected induced subgraphs of a fixed order.
//!
//! Every subgraph is produced from exactly one seed, its minimum vertex. From
//! there a vertex `w` is drawn from the extension set and removed from it
//! before branching, so later siblings at the same level never pick `w`
//! again. The child's extension is what is left of the parent's plus the
//! neighbors of `w` that are greater than the root and exclusive to the
//! current subgraph: not already in it and not adjacent to any of its
//! vertices. A vertex adjacent to the subgraph is already reachable through
//! the parent's extension (or was deliberately removed from it by a sibling
//! that owns every subgraph containing it), so re-adding it would duplicate
//! results.
//!
//! Each level works on its own copy of the extension set; the set handed to
//! a call is never mutated.

use crate::counts::MotifCounts;
use crate::error::IntSetError;
use crate::graph::{Graph, VertexId};
use crate::intset::CompactIntSet;
use crate::subgraph::Subgraph;

pub struct EsuEngine<'g> {
    graph: &'g Graph,
    order: usize,
}

impl<'g> EsuEngine<'g> {
    pub fn new(graph: &'g Graph, order: usize) -> EsuEngine<'g> {
        EsuEngine { graph, order }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Count every subgraph rooted at `seed` by its positional encoding.
    pub fn enumerate_from(
        &self,
        seed: VertexId,
        counts: &mut MotifCounts,
    ) -> Result<(), IntSetError> {
        self.visit_from(seed, &mut |subgraph| {
            counts.record(&subgraph.canonical_positional_encoding())
        })
    }

    /// Call `visit` once for every complete subgraph whose minimum vertex is
    /// `seed`.
    pub fn visit_from(
        &self,
        seed: VertexId,
        visit: &mut impl FnMut(&Subgraph),
    ) -> Result<(), IntSetError> {
        let neighbors = self.graph.adjacency(seed);
        let mut subgraph = Subgraph::new(self.order);
        subgraph.add(seed, neighbors);
        if subgraph.is_complete() {
            visit(&subgraph);
            return Ok(());
        }
        let mut extension = CompactIntSet::new();
        for w in neighbors.iter().filter(|w| *w > seed) {
            extension.add(w)?;
        }
        self.extend(&subgraph, &extension, seed, visit)
    }

    fn extend(
        &self,
        subgraph: &Subgraph,
        extension: &CompactIntSet,
        root: VertexId,
        visit: &mut impl FnMut(&Subgraph),
    ) -> Result<(), IntSetError> {
        let mut remaining = extension.clone();
        for w in extension.iter() {
            remaining.remove(w)?;
            let w_neighbors = self.graph.adjacency(w);
            let mut grown = subgraph.clone();
            grown.add(w, w_neighbors);
            if grown.is_complete() {
                visit(&grown);
                continue;
            }
            let mut next_extension = remaining.clone();
            for u in w_neighbors.iter() {
                if u > root && self.is_exclusive(u, subgraph) {
                    next_extension.add(u)?;
                }
            }
            self.extend(&grown, &next_extension, root, visit)?;
        }
        Ok(())
    }

    /// `u` is neither in `subgraph` nor adjacent to any of its vertices.
    fn is_exclusive(&self, u: VertexId, subgraph: &Subgraph) -> bool {
        !subgraph.contains(u)
            && subgraph
                .nodes()
                .iter()
                .all(|node| !self.graph.adjacency(*node).contains(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_sets(graph: &Graph, order: usize) -> Vec<Vec<VertexId>> {
        let engine = EsuEngine::new(graph, order);
        let mut found = vec![];
        for seed in 0..graph.vertex_count() as VertexId {
            engine
                .visit_from(seed, &mut |subgraph| {
                    assert_eq!(subgraph.root(), Some(seed));
                    assert_eq!(subgraph.nodes().iter().min(), Some(&seed));
                    let mut nodes = subgraph.nodes().to_vec();
                    nodes.sort_unstable();
                    found.push(nodes);
                })
                .unwrap();
        }
        found.sort();
        found
    }

    #[test]
    fn triangle_with_tail() {
        // 0-1-2 triangle, 2-3 tail
        let graph = Graph::from_edges(&[("0", "1"), ("1", "2"), ("2", "0"), ("2", "3")]).unwrap();
        assert_eq!(
            vertex_sets(&graph, 3),
            vec![vec![0, 1, 2], vec![0, 2, 3], vec![1, 2, 3]]
        );
        assert_eq!(vertex_sets(&graph, 4), vec![vec![0, 1, 2, 3]]);
        assert_eq!(vertex_sets(&graph, 2).len(), 4);
    }

    #[test]
    fn order_one_counts_vertices() {
        let graph = Graph::from_edges(&[("a", "b"), ("c", "c")]).unwrap();
        assert_eq!(vertex_sets(&graph, 1), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn isolated_vertices_produce_nothing() {
        let graph = Graph::from_edges(&[("a", "b"), ("c", "c"), ("d", "d")]).unwrap();
        assert_eq!(vertex_sets(&graph, 2), vec![vec![0, 1]]);
        assert!(vertex_sets(&graph, 3).is_empty());
    }

    #[test]
    fn star_counts_by_encoding() {
        let graph = Graph::from_edges(&[("x", "a"), ("x", "b"), ("x", "c"), ("x", "d")]).unwrap();
        let engine = EsuEngine::new(&graph, 3);
        let mut counts = MotifCounts::new();
        for seed in 0..graph.vertex_count() as VertexId {
            engine.enumerate_from(seed, &mut counts).unwrap();
        }
        assert_eq!(counts.total(), 6);
        // x has index 0 and is always the root, so every path has the same
        // positional pattern
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(b"Bo"), 6);
    }

    #[test]
    fn caller_extension_is_untouched() {
        let graph = Graph::from_edges(&[("0", "1"), ("0", "2"), ("0", "3")]).unwrap();
        let engine = EsuEngine::new(&graph, 3);
        let mut subgraph = Subgraph::new(3);
        subgraph.add(0, graph.adjacency(0));
        let mut extension = CompactIntSet::new();
        for v in [1u32, 2, 3] {
            extension.add(v).unwrap();
        }
        let before = extension.clone();
        let mut seen = 0;
        engine
            .extend(&subgraph, &extension, 0, &mut |_| seen += 1)
            .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(extension, before);
    }
}
