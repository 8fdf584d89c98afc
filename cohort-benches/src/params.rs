//! Benchmark parameter types.
//!
//! Display impls double as Criterion benchmark ids.

use std::fmt;

/// Shape of a planted-partition benchmark input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelBenchParams {
    /// Nodes per planted cluster.
    pub cluster_size: usize,
    /// Number of planted clusters.
    pub clusters: usize,
    /// In-cluster edge probability.
    pub p: f64,
    /// Cross-cluster edge probability.
    pub q: f64,
}

impl ModelBenchParams {
    /// Balanced model with the default `p = 0.75`, `q = 0.25` densities.
    #[must_use]
    pub const fn balanced(cluster_size: usize, clusters: usize) -> Self {
        Self {
            cluster_size,
            clusters,
            p: 0.75,
            q: 0.25,
        }
    }

    /// Total node count of the model.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.cluster_size.saturating_mul(self.clusters)
    }

    /// Cluster sizes as accepted by [`cohort_core::generate`].
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        vec![self.cluster_size; self.clusters]
    }
}

impl fmt::Display for ModelBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.node_count(), self.clusters)
    }
}

/// Parameters for a sparsification benchmark run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparsifyBenchParams {
    /// Planted model to sparsify.
    pub model: ModelBenchParams,
    /// Distortion parameter passed to the sparsifier.
    pub epsilon: f64,
}

impl fmt::Display for SparsifyBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},eps={}", self.model, self.epsilon)
    }
}
