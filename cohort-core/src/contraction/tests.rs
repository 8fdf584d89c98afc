//! Tests for edge contraction and reconstruction.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use super::*;
use crate::{generate::generate, test_utils::suite_proptest_config};

fn id(value: u64) -> NodeId {
    NodeId::new(value)
}

fn graph_from(edges: &[(u64, u64)]) -> Graph {
    let mut graph = Graph::new();
    for &(left, right) in edges {
        graph.add_edge(id(left), id(right)).expect("valid edge");
    }
    graph
}

fn complete(n: u64) -> Graph {
    let mut graph = Graph::with_nodes((0..n).map(id));
    for left in 0..n {
        for right in (left + 1)..n {
            graph.add_edge(id(left), id(right)).expect("valid edge");
        }
    }
    graph
}

#[test]
fn each_contraction_removes_one_node() {
    let mut graph = complete(6);
    let mut rng = SmallRng::seed_from_u64(12);
    let map = contract(&mut graph, 3, &mut rng).expect("contraction succeeds");

    assert_eq!(graph.node_count(), 3);
    assert_eq!(map.len(), 3);
    for (absorbed, _) in map.iter() {
        assert!(!graph.contains_node(absorbed));
        assert!(graph.contains_node(map.resolve(absorbed)));
    }
}

#[test]
fn survivor_is_the_smaller_endpoint() {
    let mut graph = graph_from(&[(3, 5), (0, 1)]);
    // Either edge keeps its smaller endpoint.
    let mut rng = SmallRng::seed_from_u64(0);
    let map = contract(&mut graph, 1, &mut rng).expect("contraction succeeds");

    let (absorbed, survivor) = map.iter().next().expect("one merge recorded");
    assert!(survivor < absorbed);
}

#[test]
fn merged_parallel_edges_sum_their_weights() {
    // Contracting any edge of a triangle leaves one edge of weight two.
    let mut graph = complete(3);
    let mut rng = SmallRng::seed_from_u64(5);
    contract(&mut graph, 1, &mut rng).expect("contraction succeeds");

    assert_eq!(graph.edge_count(), 1);
    let (_, _, edge) = graph.edges().next().expect("one edge remains");
    assert!((edge.weight() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn zero_contractions_leave_the_graph_untouched() {
    let mut graph = complete(4);
    let before = graph.clone();
    let mut rng = SmallRng::seed_from_u64(1);
    let map = contract(&mut graph, 0, &mut rng).expect("no-op succeeds");

    assert!(map.is_empty());
    assert_eq!(graph, before);
}

#[rstest]
#[case(3, 3)]
#[case(3, 10)]
#[case(0, 1)]
fn rejects_more_contractions_than_edges_allow(#[case] n: u64, #[case] requested: usize) {
    let mut graph = complete(n);
    let before = graph.clone();
    let edges = graph.edge_count();
    let mut rng = SmallRng::seed_from_u64(0);
    let err = contract(&mut graph, requested, &mut rng).expect_err("too many contractions");

    assert_eq!(err, ContractionError::TooManyContractions { requested, edges });
    assert_eq!(err.code().as_str(), "CONTRACTION_TOO_MANY");
    assert_eq!(graph, before);
}

#[rstest]
#[case(4, 4)]
#[case(4, 5)]
#[case(12, 20)]
fn rejects_more_contractions_than_nodes_allow(#[case] n: u64, #[case] requested: usize) {
    let mut graph = complete(n);
    let before = graph.clone();
    let nodes = graph.node_count();
    let mut rng = SmallRng::seed_from_u64(7);
    let err = contract(&mut graph, requested, &mut rng).expect_err("too many merges");

    assert_eq!(err, ContractionError::TooManyMerges { requested, nodes });
    assert_eq!(err.code().as_str(), "CONTRACTION_TOO_MANY_MERGES");
    assert_eq!(graph, before);
}

#[test]
fn generated_graph_is_untouched_when_the_budget_exceeds_its_nodes() {
    let mut rng = SmallRng::seed_from_u64(20);
    let planted = generate(&[6, 6], 0.9, 0.3, &mut rng).expect("valid configuration");
    let mut graph = planted.graph().clone();
    let before = graph.clone();

    let err = contract(&mut graph, 20, &mut rng).expect_err("twelve nodes allow eleven merges");

    assert!(matches!(err, ContractionError::TooManyMerges { requested: 20, nodes: 12 }));
    assert_eq!(graph, before);
}

#[test]
fn exhaustion_leaves_the_graph_untouched() {
    // Two disjoint triangles have six edges and six nodes but only four merges.
    let mut graph = graph_from(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
    let before = graph.clone();
    let mut rng = SmallRng::seed_from_u64(7);
    let err = contract(&mut graph, 5, &mut rng).expect_err("edges run out");

    assert_eq!(
        err,
        ContractionError::EdgesExhausted {
            performed: 4,
            requested: 5
        }
    );
    assert_eq!(graph, before);
}

#[test]
fn connected_graph_contracts_down_to_one_node() {
    let mut graph = graph_from(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2)]);
    let mut rng = SmallRng::seed_from_u64(9);
    let map = contract(&mut graph, 4, &mut rng).expect("connected graph absorbs four merges");

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(map.len(), 4);
    assert_eq!(map.resolve(id(4)), id(0));
}

#[test]
fn reconstruction_follows_merge_chains() {
    let mut map = IdentityMap::new();
    map.record(id(5), id(4));
    map.record(id(4), id(3));
    let partitions = vec![
        [0, 1, 2].into_iter().map(id).collect::<Cluster>(),
        [3].into_iter().map(id).collect::<Cluster>(),
    ];

    let restored = reconstruct(&map, partitions).expect("survivors are assigned");

    let expected: Cluster = [3, 4, 5].into_iter().map(id).collect();
    assert_eq!(restored[1], expected);
    assert_eq!(restored[0].len(), 3);
}

#[test]
fn reconstruction_rejects_unassigned_survivors() {
    let mut map = IdentityMap::new();
    map.record(id(9), id(8));
    let partitions = vec![[0].into_iter().map(id).collect::<Cluster>()];

    let err = reconstruct(&map, partitions).expect_err("survivor 8 is missing");
    assert_eq!(
        err,
        ContractionError::UnassignedSurvivor {
            node: id(9),
            survivor: id(8)
        }
    );
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn reconstruction_restores_the_original_node_set(
        sizes in proptest::collection::vec(1_usize..6, 1..4),
        seed in any::<u64>(),
        fraction in 0.0_f64..1.0,
        buckets in 1_usize..4,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        // The generated graph is complete, so no budget below the node count
        // can run out of edges.
        let planted = generate(&sizes, 1.0, 1.0, &mut rng).expect("valid configuration");
        let mut graph = planted.graph().clone();
        let original: BTreeSet<NodeId> = graph.nodes().collect();
        prop_assume!(graph.edge_count() > 1);

        let max = (graph.node_count() - 1).min(graph.edge_count() - 1);
        let requested = ((max as f64) * fraction).round() as usize;
        let map = contract(&mut graph, requested, &mut rng)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(graph.node_count() + map.len(), original.len());

        // Any partition of the contracted graph must expand to the original.
        let mut partitions = vec![Cluster::new(); buckets];
        for (index, node) in graph.nodes().enumerate() {
            partitions[index % buckets].insert(node);
        }
        let restored = reconstruct(&map, partitions).expect("every survivor is assigned");

        let mut seen = BTreeSet::new();
        for node in restored.iter().flat_map(Cluster::iter) {
            prop_assert!(seen.insert(node), "node {node} restored twice");
        }
        prop_assert_eq!(seen, original);
    }
}
