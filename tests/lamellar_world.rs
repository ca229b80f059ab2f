use lamellar_motifs::active_message::LamellarCollective;
use lamellar_motifs::{Collective, DegreeRefinedLabeler, Graph, ReductionCoordinator, RunConfig};

// one world per process, so everything lives in a single test
#[test]
fn single_pe_world() {
    let world = lamellar::LamellarWorldBuilder::new().build();
    let collective = LamellarCollective::new(&world).unwrap();
    assert_eq!(collective.num_ranks(), 1);
    assert!(collective.is_coordinator());

    assert_eq!(collective.broadcast(Some(vec![4, 2])).unwrap(), vec![4, 2]);
    assert!(collective.broadcast(None).is_err());
    collective.barrier();
    assert_eq!(collective.gather(vec![9]).unwrap(), Some(vec![vec![9]]));

    let graph = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]).unwrap();
    let config = RunConfig::new("in-memory", 3);
    let report = ReductionCoordinator::new(&collective, &DegreeRefinedLabeler, &config)
        .run(|| Ok(graph))
        .unwrap();
    assert_eq!(report.counts.unwrap().get(b"Bo"), 4);
}
