use lamellar_motifs::{
    DegreeRefinedLabeler, Graph, LocalGroup, MotifCounts, ReductionCoordinator, RunConfig,
};

fn count(edges: &[(&str, &str)], order: usize, ranks: usize) -> MotifCounts {
    let graph = Graph::from_edges(edges).unwrap();
    let config = RunConfig::new("in-memory", order);
    let mut reports = LocalGroup::run(ranks, |member| {
        ReductionCoordinator::new(&member, &DegreeRefinedLabeler, &config)
            .run(|| Ok(graph.clone()))
            .unwrap()
    });
    assert!(reports[1..].iter().all(|report| report.counts.is_none()));
    reports.swap_remove(0).counts.unwrap()
}

const CYCLE: [(&str, &str); 4] = [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")];
const STAR: [(&str, &str); 4] = [("X", "A"), ("X", "B"), ("X", "C"), ("X", "D")];

#[test]
fn four_cycle_edges() {
    for ranks in [1, 3] {
        let counts = count(&CYCLE, 2, ranks);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(b"A_"), 4);
    }
}

#[test]
fn four_cycle_paths() {
    for ranks in [1, 2] {
        let counts = count(&CYCLE, 3, ranks);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(b"Bo"), 4);
    }
}

#[test]
fn four_cycle_whole() {
    let counts = count(&CYCLE, 4, 2);
    assert_eq!(counts.total(), 1);
    assert_eq!(counts.len(), 1);
}

#[test]
fn star_paths() {
    for ranks in [1, 4] {
        let counts = count(&STAR, 3, ranks);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(b"Bo"), 6);
    }
}

#[test]
fn star_has_no_four_vertex_path() {
    // every connected 4-subset of a star is itself a 3-leaf star
    let counts = count(&STAR, 4, 2);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.total(), 4);
}
