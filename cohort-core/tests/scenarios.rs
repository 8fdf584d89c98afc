//! End-to-end recovery scenarios exercised through the public API.

mod common;

use cohort_core::{
    Cluster, ContractionBudget, ExperimentBuilder, IdentityMap, NodeId, SpectralSparsifier,
    Strategy, Transform, contract, generate, partition, reconstruct, score,
};
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use common::{as_set, assert_exact_cover, cluster, graph_from_edges};

#[test]
fn noiseless_two_triangles_are_recovered_exactly() {
    let mut rng = SmallRng::seed_from_u64(11);
    let planted = generate(&[3, 3], 1.0, 0.0, &mut rng).expect("model is valid");
    let graph = planted.graph();

    assert_eq!(graph.edge_count(), 6);
    for (left, right, _) in graph.edges() {
        assert_eq!(left.get() / 3, right.get() / 3, "cross edge {left}-{right}");
    }

    let expected = as_set(&[cluster(&[0, 1, 2]), cluster(&[3, 4, 5])]);
    let partitions = partition(graph, 2, &mut rng).expect("partition succeeds");
    for strategy in Strategy::ALL {
        let recovered = partitions.get(strategy);
        assert_eq!(as_set(recovered), expected, "{}", strategy.as_str());
        let accuracy = score(planted.clusters(), recovered).expect("counts match");
        assert!((accuracy - 1.0).abs() < f64::EPSILON);
    }
}

#[test]
fn absorbed_node_follows_its_survivor() {
    // Node 5 merged into node 3: triangle {0,1,2} plus the edge 3-4.
    let contracted = graph_from_edges(&[(0, 1), (0, 2), (1, 2), (3, 4)]);
    let mut identities = IdentityMap::new();
    identities.record(NodeId::new(5), NodeId::new(3));

    let mut rng = SmallRng::seed_from_u64(5);
    let partitions = partition(&contracted, 2, &mut rng).expect("partition succeeds");
    for strategy in Strategy::ALL {
        let restored =
            reconstruct(&identities, partitions.get(strategy).to_vec()).expect("survivor assigned");
        let home = restored
            .iter()
            .find(|partition| partition.contains(NodeId::new(3)))
            .expect("node 3 is assigned");
        assert!(home.contains(NodeId::new(5)));
        assert_eq!(
            as_set(&restored),
            as_set(&[cluster(&[0, 1, 2]), cluster(&[3, 4, 5])])
        );
    }
}

#[rstest]
#[case(vec![5, 4, 3, 2])]
#[case(vec![8; 5])]
fn noiseless_blocks_score_perfectly_on_every_trial(#[case] sizes: Vec<usize>) {
    let summary = ExperimentBuilder::new()
        .with_cluster_sizes(sizes)
        .with_probabilities(1.0, 0.0)
        .with_trials(4)
        .with_seed(2024)
        .build()
        .expect("configuration is valid")
        .run();

    assert_eq!(summary.completed(), 4);
    for outcome in summary.outcomes() {
        for strategy in Strategy::ALL {
            assert!(
                (outcome.accuracy(strategy) - 1.0).abs() < 1e-12,
                "trial {} {} scored {}",
                outcome.trial(),
                strategy.as_str(),
                outcome.accuracy(strategy),
            );
        }
    }
}

#[test]
fn contracted_noiseless_blocks_stay_recoverable() {
    let experiment = ExperimentBuilder::new()
        .with_uniform_clusters(8, 5)
        .with_probabilities(1.0, 0.0)
        .with_transform(Transform::Contract(ContractionBudget::Edges(5)))
        .with_trials(3)
        .with_seed(8)
        .build()
        .expect("configuration is valid");

    let summary = experiment.run();
    assert_eq!(summary.completed(), 3);
    let mean = summary.mean(Strategy::KMeans).expect("trials completed");
    assert!(mean >= 0.9, "k-means mean accuracy {mean}");
}

#[test]
fn indistinguishable_blocks_score_near_chance() {
    let summary = ExperimentBuilder::new()
        .with_uniform_clusters(10, 2)
        .with_probabilities(0.5, 0.5)
        .with_trials(20)
        .with_seed(99)
        .build()
        .expect("configuration is valid")
        .run();

    assert_eq!(summary.completed(), 20);
    for strategy in Strategy::ALL {
        let mean = summary.mean(strategy).expect("trials completed");
        assert!(mean < 0.8, "{} mean accuracy {mean}", strategy.as_str());
    }
}

#[test]
fn alignment_ignores_recovered_order() {
    let truth = [
        cluster(&[0, 1, 2, 3, 4]),
        cluster(&[5, 6, 7, 8, 9]),
        cluster(&[10, 11, 12, 13, 14]),
    ];
    let recovered = [
        cluster(&[0, 1, 2, 3, 5]),
        cluster(&[4, 6, 7, 8, 9, 10]),
        cluster(&[11, 12, 13, 14]),
    ];
    let baseline = score(&truth, &recovered).expect("counts match");

    for order in [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
        let permuted: Vec<_> = order.iter().map(|&index| recovered[index].clone()).collect();
        let accuracy = score(&truth, &permuted).expect("counts match");
        assert!((accuracy - baseline).abs() < f64::EPSILON);
    }
    assert!((baseline - 12.0 / 15.0).abs() < 1e-12);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(6)]
#[case(11)]
fn contraction_round_trip_covers_every_node(#[case] contractions: usize) {
    let mut rng = SmallRng::seed_from_u64(contractions as u64);
    let planted = generate(&[6, 6], 0.9, 0.3, &mut rng).expect("model is valid");
    let (mut graph, truth) = planted.into_parts();
    // A ring through every node keeps the graph connected, so eleven merges
    // always find an edge.
    for id in 0..12 {
        graph
            .add_edge(NodeId::new(id), NodeId::new((id + 1) % 12))
            .expect("ring edges are valid");
    }
    let original: Vec<NodeId> = graph.nodes().collect();

    let identities = contract(&mut graph, contractions, &mut rng).expect("budget fits the graph");
    assert_eq!(graph.node_count(), 12 - contractions);
    let survivors = graph
        .nodes()
        .map(|node| cluster(&[node.get()]))
        .collect::<Vec<_>>();
    let restored = reconstruct(&identities, survivors).expect("every survivor assigned");

    assert_exact_cover(&restored, original);
    let total: usize = truth.iter().map(Cluster::len).sum();
    assert_eq!(identities.len() + graph.node_count(), total);
}

#[test]
fn sparsification_only_removes_existing_edges() {
    let mut rng = SmallRng::seed_from_u64(31);
    let planted = generate(&[15, 15], 0.8, 0.2, &mut rng).expect("model is valid");
    let original = planted.graph().clone();
    let mut graph = original.clone();

    let sparsifier = SpectralSparsifier::new(0.7).expect("epsilon is valid");
    let report = sparsifier.sparsify(&mut graph, &mut rng).expect("sparsify succeeds");

    assert_eq!(report.original_edges(), original.edge_count());
    assert_eq!(report.retained_edges(), graph.edge_count());
    assert!(graph.edge_count() <= original.edge_count());
    assert_eq!(graph.node_count(), original.node_count());
    for (left, right, _) in graph.edges() {
        assert!(original.contains_edge(left, right));
    }
}
