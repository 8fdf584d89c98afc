use std::collections::BTreeSet;

use cohort_core::{Cluster, Graph, NodeId};

/// Builds an unweighted graph from `(left, right)` id pairs.
#[must_use]
pub fn graph_from_edges(edges: &[(u64, u64)]) -> Graph {
    let mut graph = Graph::new();
    for &(left, right) in edges {
        graph
            .add_edge(NodeId::new(left), NodeId::new(right))
            .expect("fixture edges are valid");
    }
    graph
}

/// Collects raw ids into a [`Cluster`].
#[must_use]
pub fn cluster(ids: &[u64]) -> Cluster {
    ids.iter().copied().map(NodeId::new).collect()
}

/// Partitions as an order-independent set for comparisons.
#[must_use]
pub fn as_set(partitions: &[Cluster]) -> BTreeSet<Cluster> {
    partitions.iter().cloned().collect()
}

/// Asserts `partitions` are pairwise disjoint and cover exactly `nodes`.
pub fn assert_exact_cover(partitions: &[Cluster], nodes: impl IntoIterator<Item = NodeId>) {
    let expected: BTreeSet<NodeId> = nodes.into_iter().collect();
    let mut seen = BTreeSet::new();
    for partition in partitions {
        for node in partition {
            assert!(seen.insert(node), "node {node:?} assigned twice");
        }
    }
    assert_eq!(seen, expected);
}
