//! Stochastic block model generation with planted clusters.
//!
//! Clusters receive contiguous identifier ranges in the order their sizes are
//! given, so cluster `i` owns `[offset_i, offset_i + size_i)`. Every unordered
//! pair of distinct nodes is then connected independently with probability
//! `p` when both endpoints share a cluster and `q` otherwise.

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::graph::{Cluster, Graph, GraphError, NodeId};

/// Errors raised while generating a planted graph.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum GenerateError {
    /// No cluster sizes were supplied.
    #[error("at least one cluster size is required")]
    NoClusters,
    /// A connection probability fell outside `[0, 1]`.
    #[error("{parameter} must lie in [0, 1] (got {value})")]
    InvalidProbability {
        /// Which probability was rejected (`"p"` or `"q"`).
        parameter: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Inserting a sampled edge into the graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl GenerateError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> GenerateErrorCode {
        match self {
            Self::NoClusters => GenerateErrorCode::NoClusters,
            Self::InvalidProbability { .. } => GenerateErrorCode::InvalidProbability,
            Self::Graph(_) => GenerateErrorCode::Graph,
        }
    }
}

/// Machine-readable error codes for [`GenerateError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GenerateErrorCode {
    /// No cluster sizes were supplied.
    NoClusters,
    /// A connection probability fell outside `[0, 1]`.
    InvalidProbability,
    /// Inserting a sampled edge into the graph failed.
    Graph,
}

impl GenerateErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoClusters => "GENERATE_NO_CLUSTERS",
            Self::InvalidProbability => "GENERATE_INVALID_PROBABILITY",
            Self::Graph => "GENERATE_GRAPH",
        }
    }
}

/// A generated graph together with the clusters planted in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantedGraph {
    graph: Graph,
    clusters: Vec<Cluster>,
}

impl PlantedGraph {
    /// Returns the generated graph.
    #[rustfmt::skip]
    #[must_use]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Returns the planted (ground-truth) clusters in input order.
    #[rustfmt::skip]
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] { &self.clusters }

    /// Splits the value into the graph and its ground-truth clusters.
    #[must_use]
    pub fn into_parts(self) -> (Graph, Vec<Cluster>) {
        (self.graph, self.clusters)
    }
}

/// Builds disjoint clusters with contiguous identifiers for the given sizes.
///
/// Zero-sized clusters are kept as empty sets so cluster positions line up
/// with `sizes`.
///
/// # Examples
/// ```
/// use cohort_core::{NodeId, planted_clusters};
///
/// let clusters = planted_clusters(&[2, 0, 1]);
/// assert_eq!(clusters.len(), 3);
/// assert!(clusters[1].is_empty());
/// assert!(clusters[2].contains(NodeId::new(2)));
/// ```
#[must_use]
pub fn planted_clusters(sizes: &[usize]) -> Vec<Cluster> {
    let mut next = 0_u64;
    sizes
        .iter()
        .map(|&size| {
            let start = next;
            next = next.saturating_add(size as u64);
            (start..next).map(NodeId::new).collect()
        })
        .collect()
}

fn validate_probability(parameter: &'static str, value: f64) -> Result<(), GenerateError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GenerateError::InvalidProbability { parameter, value })
    }
}

/// Checks a block model configuration without sampling it.
pub(crate) fn validate_model(sizes: &[usize], p: f64, q: f64) -> Result<(), GenerateError> {
    if sizes.is_empty() {
        return Err(GenerateError::NoClusters);
    }
    validate_probability("p", p)?;
    validate_probability("q", q)
}

/// Generates a stochastic block model graph over planted clusters.
///
/// `q > p` is accepted but logged as a degenerate configuration.
///
/// # Errors
/// Returns [`GenerateError::NoClusters`] when `sizes` is empty and
/// [`GenerateError::InvalidProbability`] when `p` or `q` falls outside
/// `[0, 1]`.
///
/// # Examples
/// ```
/// use cohort_core::generate;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let planted = generate(&[3, 3], 1.0, 0.0, &mut rng)?;
/// assert_eq!(planted.graph().node_count(), 6);
/// assert_eq!(planted.graph().edge_count(), 6);
/// # Ok::<(), cohort_core::GenerateError>(())
/// ```
#[instrument(
    name = "core.generate",
    err,
    skip(sizes, rng),
    fields(clusters = sizes.len()),
)]
pub fn generate<R: Rng + ?Sized>(
    sizes: &[usize],
    p: f64,
    q: f64,
    rng: &mut R,
) -> Result<PlantedGraph, GenerateError> {
    validate_model(sizes, p, q)?;
    if q > p {
        warn!(p, q, "cross-cluster probability exceeds in-cluster probability");
    }

    let clusters = planted_clusters(sizes);
    let labels: Vec<(NodeId, usize)> = clusters
        .iter()
        .enumerate()
        .flat_map(|(label, cluster)| cluster.iter().map(move |node| (node, label)))
        .collect();

    let mut graph = Graph::with_nodes(labels.iter().map(|&(node, _)| node));
    for (offset, &(left, left_label)) in labels.iter().enumerate() {
        for &(right, right_label) in labels.iter().skip(offset + 1) {
            let probability = if left_label == right_label { p } else { q };
            if rng.gen_bool(probability) {
                graph.add_edge(left, right)?;
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "generated planted graph"
    );
    Ok(PlantedGraph { graph, clusters })
}
