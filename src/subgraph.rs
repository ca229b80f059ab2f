use crate::graph::VertexId;
use crate::intset::CompactIntSet;

/// Largest order graph6's single byte header can describe.
pub const MAX_ORDER: usize = 62;

/// Pack upper-triangle bits (column by column) into graph6 bytes.
pub(crate) fn pack_graph6(order: usize, bits: impl IntoIterator<Item = bool>) -> Vec<u8> {
    let num_bits = order * order.saturating_sub(1) / 2;
    let mut bytes = Vec::with_capacity(1 + (num_bits + 5) / 6);
    bytes.push(order as u8 + 63);
    let mut word = 0u8;
    let mut filled = 0;
    for bit in bits {
        word = (word << 1) | bit as u8;
        filled += 1;
        if filled == 6 {
            bytes.push(word + 63);
            word = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        bytes.push((word << (6 - filled)) + 63);
    }
    bytes
}

/// Symmetric boolean matrix over subgraph positions, one `u64` row per position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjacencyMatrix {
    rows: Vec<u64>,
}

impl AdjacencyMatrix {
    pub fn new(order: usize) -> AdjacencyMatrix {
        assert!(order <= MAX_ORDER, "order {order} exceeds {MAX_ORDER}");
        AdjacencyMatrix {
            rows: vec![0; order],
        }
    }

    pub fn order(&self) -> usize {
        self.rows.len()
    }

    pub fn add_edge(&mut self, i: usize, j: usize) {
        self.rows[i] |= 1u64 << j;
        self.rows[j] |= 1u64 << i;
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.rows[i] & (1u64 << j) != 0
    }

    pub fn degree(&self, i: usize) -> u32 {
        self.rows[i].count_ones()
    }

    /// graph6 encoding of the first `size` positions.
    fn graph6_prefix(&self, size: usize) -> Vec<u8> {
        pack_graph6(
            size,
            (1..size).flat_map(|j| (0..j).map(move |i| self.has_edge(i, j))),
        )
    }

    pub fn to_graph6(&self) -> Vec<u8> {
        self.graph6_prefix(self.order())
    }

    /// Inverse of [`to_graph6`](Self::to_graph6); `None` for malformed input.
    pub fn from_graph6(bytes: &[u8]) -> Option<AdjacencyMatrix> {
        let (&header, body) = bytes.split_first()?;
        let order = header.checked_sub(63)? as usize;
        if order > MAX_ORDER {
            return None;
        }
        let num_bits = order * order.saturating_sub(1) / 2;
        if body.len() != (num_bits + 5) / 6 {
            return None;
        }
        let mut bits = Vec::with_capacity(body.len() * 6);
        for byte in body {
            let word = byte.checked_sub(63).filter(|w| *w < 64)?;
            bits.extend((0..6).rev().map(|shift| (word >> shift) & 1 == 1));
        }
        let mut matrix = AdjacencyMatrix::new(order);
        let mut bit = 0;
        for j in 1..order {
            for i in 0..j {
                if bits[bit] {
                    matrix.add_edge(i, j);
                }
                bit += 1;
            }
        }
        Some(matrix)
    }
}

/// An induced subgraph grown one vertex at a time.
///
/// Position 0 holds the enumeration root. The matrix is indexed by position,
/// and an edge between positions `i < p` is recorded when the vertex at `p`
/// is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    nodes: Vec<VertexId>,
    order: usize,
    matrix: AdjacencyMatrix,
}

impl Subgraph {
    pub fn new(order: usize) -> Subgraph {
        assert!(order > 0, "a subgraph needs at least one position");
        Subgraph {
            nodes: Vec::with_capacity(order),
            order,
            matrix: AdjacencyMatrix::new(order),
        }
    }

    /// Append `vertex` at the next free position. `neighbors` must be the
    /// vertex's adjacency in the host graph.
    pub fn add(&mut self, vertex: VertexId, neighbors: &CompactIntSet) {
        assert!(
            !self.is_complete(),
            "subgraph of order {} is full",
            self.order
        );
        let position = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            if neighbors.contains(*node) {
                self.matrix.add_edge(i, position);
            }
        }
        self.nodes.push(vertex);
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_complete(&self) -> bool {
        self.nodes.len() == self.order
    }

    pub fn root(&self) -> Option<VertexId> {
        self.nodes.first().copied()
    }

    pub fn get(&self, position: usize) -> Option<VertexId> {
        self.nodes.get(position).copied()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.nodes.contains(&vertex)
    }

    pub fn nodes(&self) -> &[VertexId] {
        &self.nodes
    }

    pub fn matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    /// graph6 bytes of the filled positions. Equal edge patterns at equal
    /// positions give equal keys; isomorphic subgraphs filled in a different
    /// order generally do not.
    pub fn canonical_positional_encoding(&self) -> Vec<u8> {
        self.matrix.graph6_prefix(self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(values: &[u32]) -> CompactIntSet {
        let mut set = CompactIntSet::new();
        for v in values {
            set.add(*v).unwrap();
        }
        set
    }

    #[test]
    fn add_records_edges_to_earlier_positions() {
        // path 10 - 20 - 30
        let mut subgraph = Subgraph::new(3);
        subgraph.add(10, &neighbors(&[20]));
        subgraph.add(30, &neighbors(&[20]));
        subgraph.add(20, &neighbors(&[10, 30]));
        assert!(subgraph.is_complete());
        assert_eq!(subgraph.root(), Some(10));
        assert!(!subgraph.matrix().has_edge(0, 1));
        assert!(subgraph.matrix().has_edge(0, 2));
        assert!(subgraph.matrix().has_edge(1, 2));
        assert!(subgraph.matrix().has_edge(2, 1));
        assert_eq!(subgraph.matrix().degree(2), 2);
    }

    #[test]
    fn known_graph6_strings() {
        let mut edge = AdjacencyMatrix::new(2);
        edge.add_edge(0, 1);
        assert_eq!(edge.to_graph6(), b"A_".to_vec());

        let mut triangle = AdjacencyMatrix::new(3);
        triangle.add_edge(0, 1);
        triangle.add_edge(0, 2);
        triangle.add_edge(1, 2);
        assert_eq!(triangle.to_graph6(), b"Bw".to_vec());

        let mut path = AdjacencyMatrix::new(3);
        path.add_edge(0, 1);
        path.add_edge(1, 2);
        assert_eq!(path.to_graph6(), b"Bg".to_vec());

        assert_eq!(AdjacencyMatrix::new(5).to_graph6(), b"D??".to_vec());
    }

    #[test]
    fn graph6_decodes_what_it_encodes() {
        let mut matrix = AdjacencyMatrix::new(7);
        for (i, j) in [(0, 3), (1, 2), (2, 6), (4, 5), (0, 6), (3, 5)] {
            matrix.add_edge(i, j);
        }
        let bytes = matrix.to_graph6();
        assert_eq!(AdjacencyMatrix::from_graph6(&bytes), Some(matrix));
        assert_eq!(AdjacencyMatrix::from_graph6(b""), None);
        assert_eq!(AdjacencyMatrix::from_graph6(b"Bgg"), None);
    }

    #[test]
    fn encoding_depends_only_on_matrix() {
        // star centred at position 0, built from different vertex ids and
        // different adjacency sets
        let mut a = Subgraph::new(3);
        a.add(1, &neighbors(&[2, 3]));
        a.add(2, &neighbors(&[1]));
        a.add(3, &neighbors(&[1]));

        let mut b = Subgraph::new(3);
        b.add(40, &neighbors(&[41, 50, 60]));
        b.add(50, &neighbors(&[40, 7]));
        b.add(60, &neighbors(&[40]));

        assert_eq!(
            a.canonical_positional_encoding(),
            b.canonical_positional_encoding()
        );

        // same vertex set, different insertion order: positional, not canonical
        let mut c = Subgraph::new(3);
        c.add(2, &neighbors(&[1]));
        c.add(3, &neighbors(&[1]));
        c.add(1, &neighbors(&[2, 3]));
        assert_ne!(
            a.canonical_positional_encoding(),
            c.canonical_positional_encoding()
        );
    }

    #[test]
    fn clone_branches_independently() {
        let mut base = Subgraph::new(3);
        base.add(0, &neighbors(&[1, 2]));
        let mut left = base.clone();
        left.add(1, &neighbors(&[0]));
        let mut right = base.clone();
        right.add(2, &neighbors(&[0, 1]));
        assert_eq!(base.size(), 1);
        assert_eq!(left.nodes(), &[0, 1]);
        assert_eq!(right.nodes(), &[0, 2]);
        assert!(!base.matrix().has_edge(0, 1));
    }

    #[test]
    #[should_panic]
    fn adding_to_a_complete_subgraph_panics() {
        let mut subgraph = Subgraph::new(1);
        subgraph.add(0, &CompactIntSet::new());
        subgraph.add(1, &CompactIntSet::new());
    }
}
