mod common;

use cohort_core::{
    CohortError, CohortErrorCode, ContractionBudget, ContractionError, ContractionErrorCode, Edge,
    ExperimentBuilder, GenerateError, GenerateErrorCode, Graph, GraphError, GraphErrorCode,
    IdentityMap, NodeId, PartitionError, PartitionErrorCode, ScoreErrorCode, SparsifyError,
    SparsifyErrorCode, SpectralSparsifier, Transform, contract, generate, partition,
    reconstruct, score,
};
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use common::{cluster, graph_from_edges};

#[rstest]
#[case(GraphError::SelfLoop { node: NodeId::new(1) }, GraphErrorCode::SelfLoop)]
#[case(
    GraphError::InvalidWeight { left: NodeId::new(0), right: NodeId::new(1), weight: -1.0 },
    GraphErrorCode::InvalidWeight,
)]
#[case(GraphError::UnknownNode { node: NodeId::new(9) }, GraphErrorCode::UnknownNode)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
}

#[test]
fn graph_rejects_self_loops_and_bad_weights() {
    let mut graph = Graph::new();
    let err = graph
        .add_edge(NodeId::new(2), NodeId::new(2))
        .expect_err("self-loop rejected");
    assert_eq!(err.code(), GraphErrorCode::SelfLoop);

    let err = graph
        .add_weighted_edge(NodeId::new(0), NodeId::new(1), Edge::with_weight(f64::NAN))
        .expect_err("NaN weight rejected");
    assert_eq!(err.code().as_str(), "GRAPH_INVALID_WEIGHT");
}

#[rstest]
#[case(&[][..], 0.5, 0.5, GenerateErrorCode::NoClusters)]
#[case(&[3, 3][..], 1.5, 0.5, GenerateErrorCode::InvalidProbability)]
#[case(&[3, 3][..], 0.5, -0.5, GenerateErrorCode::InvalidProbability)]
fn generation_rejects_invalid_models(
    #[case] sizes: &[usize],
    #[case] p: f64,
    #[case] q: f64,
    #[case] expected: GenerateErrorCode,
) {
    let mut rng = SmallRng::seed_from_u64(0);
    let err = generate(sizes, p, q, &mut rng).expect_err("model is invalid");
    assert_eq!(err.code(), expected);
}

#[test]
fn invalid_probability_names_the_parameter() {
    let mut rng = SmallRng::seed_from_u64(0);
    let err = generate(&[2, 2], 0.5, 2.0, &mut rng).expect_err("q is invalid");
    assert_eq!(
        err,
        GenerateError::InvalidProbability {
            parameter: "q",
            value: 2.0
        }
    );
}

#[rstest]
#[case(0, PartitionErrorCode::ZeroClusters)]
#[case(4, PartitionErrorCode::TooManyClusters)]
fn partition_rejects_invalid_cluster_counts(
    #[case] k: usize,
    #[case] expected: PartitionErrorCode,
) {
    let graph = graph_from_edges(&[(0, 1), (1, 2)]);
    let mut rng = SmallRng::seed_from_u64(0);
    let err = partition(&graph, k, &mut rng).expect_err("k is invalid");
    assert_eq!(err.code(), expected);
}

#[test]
fn partition_rejects_empty_graph() {
    let mut rng = SmallRng::seed_from_u64(0);
    let err = partition(&Graph::new(), 1, &mut rng).expect_err("graph is empty");
    assert_eq!(err, PartitionError::EmptyGraph);
}

#[test]
fn score_rejects_mismatched_counts() {
    let err = score(&[cluster(&[0, 1])], &[cluster(&[0]), cluster(&[1])])
        .expect_err("counts differ");
    assert_eq!(err.code(), ScoreErrorCode::ClusterCountMismatch);
    assert_eq!(err.code().as_str(), "SCORE_CLUSTER_COUNT_MISMATCH");
}

#[rstest]
#[case(3)]
#[case(4)]
fn contraction_rejects_budgets_reaching_edge_count(#[case] requested: usize) {
    let mut graph = graph_from_edges(&[(0, 1), (1, 2), (2, 0)]);
    let mut rng = SmallRng::seed_from_u64(0);
    let err = contract(&mut graph, requested, &mut rng).expect_err("budget too large");
    assert_eq!(
        err,
        ContractionError::TooManyContractions {
            requested,
            edges: 3
        }
    );
    assert_eq!(graph.node_count(), 3, "graph untouched on rejection");
}

#[test]
fn contraction_rejects_budgets_reaching_node_count() {
    let mut rng = SmallRng::seed_from_u64(20);
    let (mut graph, _) = generate(&[6, 6], 0.9, 0.3, &mut rng)
        .expect("model is valid")
        .into_parts();
    let before = graph.clone();

    let err = contract(&mut graph, 20, &mut rng).expect_err("twelve nodes allow eleven merges");
    assert_eq!(
        err,
        ContractionError::TooManyMerges {
            requested: 20,
            nodes: 12
        }
    );
    assert_eq!(err.code(), ContractionErrorCode::TooManyMerges);
    assert_eq!(graph, before, "graph untouched on rejection");
}

#[test]
fn exhausted_contraction_leaves_the_graph_untouched() {
    let mut graph = graph_from_edges(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
    let before = graph.clone();
    let mut rng = SmallRng::seed_from_u64(3);

    let err = contract(&mut graph, 5, &mut rng).expect_err("disjoint triangles allow four merges");
    assert_eq!(err.code().as_str(), "CONTRACTION_EDGES_EXHAUSTED");
    assert_eq!(graph, before);
}

#[test]
fn reconstruction_reports_unassigned_survivors() {
    let mut identities = IdentityMap::new();
    identities.record(NodeId::new(4), NodeId::new(2));
    let err = reconstruct(&identities, vec![cluster(&[0, 1])]).expect_err("survivor missing");
    assert_eq!(err.code(), ContractionErrorCode::UnassignedSurvivor);
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(-0.25)]
#[case(f64::INFINITY)]
fn sparsifier_rejects_epsilon_outside_unit_interval(#[case] epsilon: f64) {
    let err = SpectralSparsifier::new(epsilon).expect_err("epsilon is invalid");
    assert_eq!(err.code(), SparsifyErrorCode::InvalidEpsilon);
    assert!(matches!(err, SparsifyError::InvalidEpsilon { .. }));
}

#[rstest]
#[case(
    ExperimentBuilder::new().with_trials(0),
    CohortErrorCode::ZeroTrials,
    None,
)]
#[case(
    ExperimentBuilder::new().with_cluster_sizes(Vec::new()),
    CohortErrorCode::GenerateFailure,
    Some("GENERATE_NO_CLUSTERS"),
)]
#[case(
    ExperimentBuilder::new()
        .with_transform(Transform::Contract(ContractionBudget::Fraction(1.0))),
    CohortErrorCode::InvalidContractionFraction,
    None,
)]
#[case(
    ExperimentBuilder::new().with_transform(Transform::Sparsify { epsilon: 0.0 }),
    CohortErrorCode::SparsifyFailure,
    Some("SPARSIFY_INVALID_EPSILON"),
)]
fn builder_reports_stable_codes(
    #[case] builder: ExperimentBuilder,
    #[case] expected: CohortErrorCode,
    #[case] source: Option<&str>,
) {
    let err = builder.build().expect_err("configuration is invalid");
    assert_eq!(err.code(), expected);
    assert_eq!(err.source_code(), source);
}

#[test]
fn failing_trial_surfaces_component_error() {
    let experiment = ExperimentBuilder::new()
        .with_cluster_sizes(vec![3, 3])
        .with_probabilities(1.0, 0.0)
        .with_transform(Transform::Contract(ContractionBudget::Edges(6)))
        .build()
        .expect("configuration is valid");

    let err = experiment.run_trial(0).expect_err("six edges cannot absorb six merges");
    assert!(matches!(
        err,
        CohortError::Contraction(ContractionError::TooManyContractions { requested: 6, edges: 6 })
    ));
    assert_eq!(err.source_code(), Some("CONTRACTION_TOO_MANY"));
}
