//! Random edge contraction and reconstruction of contracted partitions.
//!
//! Contraction simulates identity loss: each step picks an edge uniformly
//! from the current edge set and merges its larger endpoint into its smaller
//! one, recording the merge in an [`IdentityMap`]. Partitions computed on the
//! contracted graph are later expanded back to the original identifiers with
//! [`reconstruct`].

mod identity;

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, instrument};

pub use self::identity::IdentityMap;
use crate::graph::{Cluster, Graph, GraphError, NodeId};

/// Errors raised while contracting a graph or reconstructing partitions.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum ContractionError {
    /// More contractions were requested than `edge_count - 1`.
    #[error("cannot contract {requested} edges in a graph with {edges} edges")]
    TooManyContractions {
        /// Requested contraction count.
        requested: usize,
        /// Edges present before contracting.
        edges: usize,
    },
    /// More contractions were requested than `node_count - 1`.
    #[error("cannot contract {requested} edges in a graph with {nodes} nodes")]
    TooManyMerges {
        /// Requested contraction count.
        requested: usize,
        /// Nodes present before contracting.
        nodes: usize,
    },
    /// The graph ran out of edges before the requested count was reached.
    #[error("edges exhausted after {performed} of {requested} contractions")]
    EdgesExhausted {
        /// Contractions completed before the edge set emptied.
        performed: usize,
        /// Requested contraction count.
        requested: usize,
    },
    /// A survivor recorded for an absorbed node belongs to no partition.
    #[error("node {node} resolves to {survivor}, which no partition contains")]
    UnassignedSurvivor {
        /// Absorbed node being restored.
        node: NodeId,
        /// Final survivor it resolves to.
        survivor: NodeId,
    },
    /// Merging two nodes failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ContractionError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> ContractionErrorCode {
        match self {
            Self::TooManyContractions { .. } => ContractionErrorCode::TooManyContractions,
            Self::TooManyMerges { .. } => ContractionErrorCode::TooManyMerges,
            Self::EdgesExhausted { .. } => ContractionErrorCode::EdgesExhausted,
            Self::UnassignedSurvivor { .. } => ContractionErrorCode::UnassignedSurvivor,
            Self::Graph(_) => ContractionErrorCode::Graph,
        }
    }
}

/// Machine-readable error codes for [`ContractionError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContractionErrorCode {
    /// More contractions were requested than `edge_count - 1`.
    TooManyContractions,
    /// More contractions were requested than `node_count - 1`.
    TooManyMerges,
    /// The graph ran out of edges mid-run.
    EdgesExhausted,
    /// A survivor belongs to no partition.
    UnassignedSurvivor,
    /// Merging two nodes failed.
    Graph,
}

impl ContractionErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TooManyContractions => "CONTRACTION_TOO_MANY",
            Self::TooManyMerges => "CONTRACTION_TOO_MANY_MERGES",
            Self::EdgesExhausted => "CONTRACTION_EDGES_EXHAUSTED",
            Self::UnassignedSurvivor => "CONTRACTION_UNASSIGNED_SURVIVOR",
            Self::Graph => "CONTRACTION_GRAPH",
        }
    }
}

/// Contracts `num_edges` uniformly chosen edges of `graph` in place.
///
/// Each contraction removes exactly one node. Parallel edges produced by a
/// merge combine into one edge whose weight is the sum; the contracted edge
/// itself is dropped.
///
/// # Errors
/// Returns [`ContractionError::TooManyContractions`] when `num_edges`
/// exceeds `edge_count - 1` and [`ContractionError::TooManyMerges`] when it
/// exceeds `node_count - 1`. Returns [`ContractionError::EdgesExhausted`]
/// when merges consume the edge set before `num_edges` contractions
/// complete, which only happens on disconnected graphs. The graph is left
/// untouched on every error.
///
/// # Examples
/// ```
/// use cohort_core::{Graph, NodeId, contract};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = Graph::new();
/// for (left, right) in [(0, 1), (1, 2), (2, 3)] {
///     graph.add_edge(NodeId::new(left), NodeId::new(right))?;
/// }
/// let mut rng = SmallRng::seed_from_u64(3);
/// let map = contract(&mut graph, 2, &mut rng)?;
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(map.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.contract",
    err,
    skip(graph, rng),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn contract<R: Rng + ?Sized>(
    graph: &mut Graph,
    num_edges: usize,
    rng: &mut R,
) -> Result<IdentityMap, ContractionError> {
    let edges = graph.edge_count();
    if num_edges > 0 && num_edges >= edges {
        return Err(ContractionError::TooManyContractions {
            requested: num_edges,
            edges,
        });
    }
    let nodes = graph.node_count();
    if num_edges > 0 && num_edges >= nodes {
        return Err(ContractionError::TooManyMerges {
            requested: num_edges,
            nodes,
        });
    }

    // A failed run leaves the caller's graph untouched.
    let mut working = graph.clone();
    let mut identities = IdentityMap::new();
    for performed in 0..num_edges {
        let available = working.edge_count();
        let exhausted = ContractionError::EdgesExhausted {
            performed,
            requested: num_edges,
        };
        if available == 0 {
            return Err(exhausted);
        }
        let pick = rng.gen_range(0..available);
        let Some((survivor, absorbed, _)) = working.edges().nth(pick) else {
            return Err(exhausted);
        };
        working.merge_nodes(survivor, absorbed)?;
        identities.record(absorbed, survivor);
    }
    *graph = working;

    debug!(
        contracted = identities.len(),
        remaining_nodes = graph.node_count(),
        remaining_edges = graph.edge_count(),
        "contraction finished"
    );
    Ok(identities)
}

/// Adds every absorbed node back into the partition holding its survivor.
///
/// Chains of merges are followed to the final survivor, so the result
/// covers the pre-contraction node set whenever `partitions` covers the
/// contracted one.
///
/// # Errors
/// Returns [`ContractionError::UnassignedSurvivor`] when an absorbed node's
/// final survivor is missing from every partition.
///
/// # Examples
/// ```
/// use cohort_core::{Cluster, IdentityMap, NodeId, reconstruct};
///
/// let mut map = IdentityMap::new();
/// map.record(NodeId::new(5), NodeId::new(3));
/// let partitions: Vec<Cluster> = vec![
///     [0, 1, 2].into_iter().map(NodeId::new).collect(),
///     [3, 4].into_iter().map(NodeId::new).collect(),
/// ];
///
/// let restored = reconstruct(&map, partitions)?;
/// assert!(restored[1].contains(NodeId::new(5)));
/// # Ok::<(), cohort_core::ContractionError>(())
/// ```
#[instrument(
    name = "core.reconstruct",
    err,
    skip(identities, partitions),
    fields(absorbed = identities.len(), partitions = partitions.len()),
)]
pub fn reconstruct(
    identities: &IdentityMap,
    mut partitions: Vec<Cluster>,
) -> Result<Vec<Cluster>, ContractionError> {
    let owner: HashMap<NodeId, usize> = partitions
        .iter()
        .enumerate()
        .flat_map(|(index, cluster)| cluster.iter().map(move |node| (node, index)))
        .collect();

    for (absorbed, _) in identities.iter() {
        let survivor = identities.resolve(absorbed);
        let index = owner
            .get(&survivor)
            .copied()
            .ok_or(ContractionError::UnassignedSurvivor {
                node: absorbed,
                survivor,
            })?;
        if let Some(cluster) = partitions.get_mut(index) {
            cluster.insert(absorbed);
        }
    }
    Ok(partitions)
}

#[cfg(test)]
mod tests;
