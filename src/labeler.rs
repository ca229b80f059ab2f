//! Reduction of positional encodings to isomorphism-class labels.
//!
//! The rest of the crate only relies on the [`Labeler`] contract: mutually
//! isomorphic keys map to the same label and their counts are summed.
//! [`DegreeRefinedLabeler`] is the default implementation. It picks the
//! lexicographically smallest graph6 string among the relabelings that list
//! vertices by non-increasing degree. Isomorphic graphs share that set of
//! relabelings, so they share the minimum, and the minimum is itself a
//! relabeling of the input, so non-isomorphic graphs never collide.

use crate::counts::MotifCounts;
use crate::subgraph::{pack_graph6, AdjacencyMatrix};

use tracing::warn;

pub trait Labeler: Sync {
    /// Canonical label of a single positional key.
    fn canonical_label(&self, positional: &[u8]) -> Vec<u8>;

    fn canonical_labels(&self, positional: &MotifCounts) -> MotifCounts {
        let mut labels = MotifCounts::new();
        for (key, count) in positional.iter() {
            labels.add(self.canonical_label(key), count);
        }
        labels
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeRefinedLabeler;

impl Labeler for DegreeRefinedLabeler {
    fn canonical_label(&self, positional: &[u8]) -> Vec<u8> {
        match AdjacencyMatrix::from_graph6(positional) {
            Some(matrix) => canonical_form(&matrix),
            None => {
                let key = String::from_utf8_lossy(positional);
                warn!(%key, "not a graph6 key, passing through");
                positional.to_vec()
            }
        }
    }
}

/// Smallest graph6 encoding of `matrix` over degree-ordered relabelings.
pub fn canonical_form(matrix: &AdjacencyMatrix) -> Vec<u8> {
    let order = matrix.order();
    let degree = (0..order).map(|v| matrix.degree(v)).collect::<Vec<_>>();
    let mut slot_degree = degree.clone();
    slot_degree.sort_unstable_by(|a, b| b.cmp(a));

    let mut search = Search {
        matrix,
        degree,
        slot_degree,
        perm: Vec::with_capacity(order),
        used: vec![false; order],
        bits: Vec::with_capacity(order * order.saturating_sub(1) / 2),
        best: None,
    };
    search.place(0);
    pack_graph6(order, search.best.unwrap_or_default())
}

struct Search<'a> {
    matrix: &'a AdjacencyMatrix,
    degree: Vec<u32>,
    slot_degree: Vec<u32>,
    /// perm[slot] = original vertex
    perm: Vec<usize>,
    used: Vec<bool>,
    bits: Vec<bool>,
    best: Option<Vec<bool>>,
}

impl<'a> Search<'a> {
    fn place(&mut self, slot: usize) {
        if slot == self.slot_degree.len() {
            let better = match &self.best {
                Some(best) => self.bits < *best,
                None => true,
            };
            if better {
                self.best = Some(self.bits.clone());
            }
            return;
        }
        for vertex in 0..self.degree.len() {
            if self.used[vertex] || self.degree[vertex] != self.slot_degree[slot] {
                continue;
            }
            // column `slot` of the upper triangle
            let mark = self.bits.len();
            for earlier in 0..slot {
                let edge = self.matrix.has_edge(self.perm[earlier], vertex);
                self.bits.push(edge);
            }
            let pruned = match &self.best {
                Some(best) => self.bits[..] > best[..self.bits.len()],
                None => false,
            };
            if !pruned {
                self.used[vertex] = true;
                self.perm.push(vertex);
                self.place(slot + 1);
                self.perm.pop();
                self.used[vertex] = false;
            }
            self.bits.truncate(mark);
        }
    }
}
