//! Spectral community recovery with two independent strategies.
//!
//! [`SpectralPartitioner::partition`] returns two partitions of the same
//! graph so their accuracies can be compared:
//!
//! - `hierarchical`: the top-`k` adjacency eigenvectors clustered
//!   agglomeratively with the configured [`Linkage`];
//! - `kmeans`: the bottom-`k` normalised-Laplacian eigenvectors, rescaled
//!   to unit rows, clustered with k-means++ and restarts.
//!
//! Both strategies return exactly `k` non-empty, disjoint clusters covering
//! every node whenever `1 <= k <= node_count`.

mod agglomerative;
mod embedding;
mod kmeans;

use std::num::NonZeroUsize;

use nalgebra::DMatrix;
use rand::Rng;
use tracing::{debug, instrument};

pub use self::agglomerative::Linkage;
use self::kmeans::KMeansParams;
use crate::{
    graph::{Cluster, Graph, NodeId},
    linalg::LinalgError,
};

/// Errors raised while recovering communities.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum PartitionError {
    /// `k` was zero.
    #[error("at least one cluster must be requested")]
    ZeroClusters,
    /// `k` exceeded the number of nodes.
    #[error("requested {requested} clusters from a graph with {nodes} nodes")]
    TooManyClusters {
        /// Requested cluster count.
        requested: usize,
        /// Nodes available in the graph.
        nodes: usize,
    },
    /// The graph has no nodes.
    #[error("cannot partition an empty graph")]
    EmptyGraph,
    /// The k-means convergence tolerance was negative or not finite.
    #[error("k-means tolerance must be finite and non-negative (got {tolerance})")]
    InvalidTolerance {
        /// Offending tolerance.
        tolerance: f64,
    },
    /// An embedding produced NaN or infinite coordinates.
    #[error("spectral embedding contains non-finite coordinates")]
    NonFiniteEmbedding,
    /// The eigen-decomposition failed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl PartitionError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> PartitionErrorCode {
        match self {
            Self::ZeroClusters => PartitionErrorCode::ZeroClusters,
            Self::TooManyClusters { .. } => PartitionErrorCode::TooManyClusters,
            Self::EmptyGraph => PartitionErrorCode::EmptyGraph,
            Self::InvalidTolerance { .. } => PartitionErrorCode::InvalidTolerance,
            Self::NonFiniteEmbedding => PartitionErrorCode::NonFiniteEmbedding,
            Self::Linalg(LinalgError::NoConvergence { .. }) => PartitionErrorCode::NoConvergence,
            Self::Linalg(LinalgError::NonFinite) => PartitionErrorCode::NonFiniteEmbedding,
        }
    }
}

/// Machine-readable error codes for [`PartitionError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PartitionErrorCode {
    /// `k` was zero.
    ZeroClusters,
    /// `k` exceeded the number of nodes.
    TooManyClusters,
    /// The graph has no nodes.
    EmptyGraph,
    /// The k-means tolerance was invalid.
    InvalidTolerance,
    /// An embedding or matrix contained non-finite values.
    NonFiniteEmbedding,
    /// The eigen solver did not converge.
    NoConvergence,
}

impl PartitionErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZeroClusters => "PARTITION_ZERO_CLUSTERS",
            Self::TooManyClusters => "PARTITION_TOO_MANY_CLUSTERS",
            Self::EmptyGraph => "PARTITION_EMPTY_GRAPH",
            Self::InvalidTolerance => "PARTITION_INVALID_TOLERANCE",
            Self::NonFiniteEmbedding => "PARTITION_NON_FINITE_EMBEDDING",
            Self::NoConvergence => "PARTITION_NO_CONVERGENCE",
        }
    }
}

/// Identifies one of the two recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Adjacency embedding with agglomerative clustering.
    Hierarchical,
    /// Normalised-Laplacian embedding with k-means++.
    KMeans,
}

impl Strategy {
    /// Both strategies in reporting order.
    pub const ALL: [Self; 2] = [Self::Hierarchical, Self::KMeans];

    /// Short label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::KMeans => "kmeans",
        }
    }
}

/// The two partitions recovered from one graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpectralPartitions {
    hierarchical: Vec<Cluster>,
    kmeans: Vec<Cluster>,
}

impl SpectralPartitions {
    /// Partition recovered by the agglomerative strategy.
    #[rustfmt::skip]
    #[must_use]
    pub fn hierarchical(&self) -> &[Cluster] { &self.hierarchical }

    /// Partition recovered by the k-means strategy.
    #[rustfmt::skip]
    #[must_use]
    pub fn kmeans(&self) -> &[Cluster] { &self.kmeans }

    /// Returns the partition recovered by `strategy`.
    #[must_use]
    pub fn get(&self, strategy: Strategy) -> &[Cluster] {
        match strategy {
            Strategy::Hierarchical => &self.hierarchical,
            Strategy::KMeans => &self.kmeans,
        }
    }

    /// Splits the value into `(hierarchical, kmeans)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Cluster>, Vec<Cluster>) {
        (self.hierarchical, self.kmeans)
    }
}

/// Configures and runs spectral community recovery.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use cohort_core::{Linkage, SpectralPartitioner};
///
/// let partitioner = SpectralPartitioner::new()
///     .with_linkage(Linkage::Complete)
///     .with_kmeans_restarts(NonZeroUsize::new(4).expect("non-zero"));
/// assert_eq!(partitioner.linkage(), Linkage::Complete);
/// assert_eq!(partitioner.kmeans_restarts().get(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralPartitioner {
    linkage: Linkage,
    kmeans_restarts: NonZeroUsize,
    max_iterations: NonZeroUsize,
    tolerance: f64,
}

impl Default for SpectralPartitioner {
    fn default() -> Self {
        Self {
            linkage: Linkage::Average,
            kmeans_restarts: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
            max_iterations: NonZeroUsize::new(300).unwrap_or(NonZeroUsize::MIN),
            tolerance: 1e-8,
        }
    }
}

impl SpectralPartitioner {
    /// Creates a partitioner with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the linkage used by the agglomerative strategy.
    #[must_use]
    pub const fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Sets how many k-means++ restarts are attempted.
    #[must_use]
    pub const fn with_kmeans_restarts(mut self, restarts: NonZeroUsize) -> Self {
        self.kmeans_restarts = restarts;
        self
    }

    /// Caps the number of Lloyd iterations per restart.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: NonZeroUsize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the centroid-shift tolerance below which k-means stops early.
    ///
    /// Validated when [`partition`](Self::partition) runs.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Linkage used by the agglomerative strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn linkage(&self) -> Linkage { self.linkage }

    /// Number of k-means++ restarts.
    #[rustfmt::skip]
    #[must_use]
    pub const fn kmeans_restarts(&self) -> NonZeroUsize { self.kmeans_restarts }

    /// Lloyd iteration cap per restart.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max_iterations(&self) -> NonZeroUsize { self.max_iterations }

    /// k-means convergence tolerance.
    #[rustfmt::skip]
    #[must_use]
    pub const fn tolerance(&self) -> f64 { self.tolerance }

    /// Recovers `k` communities from `graph` with both strategies.
    ///
    /// # Errors
    /// Returns [`PartitionError::ZeroClusters`] for `k == 0`,
    /// [`PartitionError::EmptyGraph`] for a graph without nodes,
    /// [`PartitionError::TooManyClusters`] when `k` exceeds the node count and
    /// [`PartitionError::InvalidTolerance`] for a negative or non-finite
    /// tolerance. Eigen-decomposition failures surface as
    /// [`PartitionError::Linalg`] or [`PartitionError::NonFiniteEmbedding`].
    ///
    /// # Examples
    /// ```
    /// use cohort_core::{NodeId, SpectralPartitioner, generate};
    /// use rand::{SeedableRng, rngs::SmallRng};
    ///
    /// let mut rng = SmallRng::seed_from_u64(1);
    /// let planted = generate(&[3, 3], 1.0, 0.0, &mut rng)?;
    /// let partitions = SpectralPartitioner::new().partition(planted.graph(), 2, &mut rng)?;
    ///
    /// let group = partitions
    ///     .hierarchical()
    ///     .iter()
    ///     .find(|cluster| cluster.contains(NodeId::new(0)))
    ///     .expect("every node is assigned");
    /// assert!(group.contains(NodeId::new(2)));
    /// assert!(!group.contains(NodeId::new(3)));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(
        name = "core.partition",
        err,
        skip(self, graph, rng),
        fields(nodes = graph.node_count(), edges = graph.edge_count(), linkage = ?self.linkage),
    )]
    pub fn partition<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        k: usize,
        rng: &mut R,
    ) -> Result<SpectralPartitions, PartitionError> {
        self.validate(graph, k)?;
        let order = graph.node_order();

        let adjacency = embedding::adjacency_embedding(graph, k)?;
        ensure_finite(&adjacency)?;
        let hierarchical = agglomerative::cluster(&adjacency, k, self.linkage);

        let laplacian = embedding::laplacian_embedding(graph, k)?;
        ensure_finite(&laplacian)?;
        let params = KMeansParams {
            restarts: self.kmeans_restarts.get(),
            max_iterations: self.max_iterations.get(),
            tolerance: self.tolerance,
        };
        let centroid = kmeans::cluster(&rows(&laplacian), k, params, rng);

        debug!(k, "recovered spectral partitions");
        Ok(SpectralPartitions {
            hierarchical: labels_to_clusters(&order, &hierarchical, k),
            kmeans: labels_to_clusters(&order, &centroid, k),
        })
    }

    fn validate(&self, graph: &Graph, k: usize) -> Result<(), PartitionError> {
        if k == 0 {
            return Err(PartitionError::ZeroClusters);
        }
        let nodes = graph.node_count();
        if nodes == 0 {
            return Err(PartitionError::EmptyGraph);
        }
        if k > nodes {
            return Err(PartitionError::TooManyClusters { requested: k, nodes });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(PartitionError::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

/// Recovers `k` communities with the default [`SpectralPartitioner`].
///
/// # Errors
/// See [`SpectralPartitioner::partition`].
pub fn partition<R: Rng + ?Sized>(
    graph: &Graph,
    k: usize,
    rng: &mut R,
) -> Result<SpectralPartitions, PartitionError> {
    SpectralPartitioner::default().partition(graph, k, rng)
}

fn ensure_finite(embedding: &DMatrix<f64>) -> Result<(), PartitionError> {
    if embedding.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(PartitionError::NonFiniteEmbedding)
    }
}

fn rows(embedding: &DMatrix<f64>) -> Vec<Vec<f64>> {
    embedding
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

fn labels_to_clusters(order: &[NodeId], labels: &[usize], k: usize) -> Vec<Cluster> {
    let mut clusters = vec![Cluster::new(); k];
    for (&node, &label) in order.iter().zip(labels) {
        if let Some(cluster) = clusters.get_mut(label) {
            cluster.insert(node);
        }
    }
    clusters
}
