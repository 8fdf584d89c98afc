//! Spectral sparsification by effective-resistance sampling.
//!
//! Every edge `(u, v)` is kept with a probability driven by its effective
//! resistance `R(u, v) = L⁺[u,u] + L⁺[v,v] - 2·L⁺[u,v]`, read from the
//! pseudoinverse of the graph Laplacian. Each edge receives
//! `ρ = ⌈6·ln(n)/ε²⌉` Bernoulli draws with success probability `R(u, v)`
//! clamped into `[0, 1]`; edges without a single success are removed.
//! Bridges have resistance one and are never removed.

use rand::Rng;
use tracing::{debug, info, instrument};

use crate::{
    graph::{Graph, NodeId},
    linalg::{LinalgError, psd_pseudoinverse},
};

/// Errors raised while sparsifying a graph.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum SparsifyError {
    /// `epsilon` was outside the open interval `(0, 1)`.
    #[error("epsilon must lie strictly between 0 and 1 (got {epsilon})")]
    InvalidEpsilon {
        /// Offending value.
        epsilon: f64,
    },
    /// The Laplacian pseudoinverse could not be computed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl SparsifyError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> SparsifyErrorCode {
        match self {
            Self::InvalidEpsilon { .. } => SparsifyErrorCode::InvalidEpsilon,
            Self::Linalg(_) => SparsifyErrorCode::Linalg,
        }
    }
}

/// Machine-readable error codes for [`SparsifyError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SparsifyErrorCode {
    /// `epsilon` was outside `(0, 1)`.
    InvalidEpsilon,
    /// The Laplacian pseudoinverse could not be computed.
    Linalg,
}

impl SparsifyErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEpsilon => "SPARSIFY_INVALID_EPSILON",
            Self::Linalg => "SPARSIFY_LINALG",
        }
    }
}

/// Diagnostics describing one sparsification pass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparsificationReport {
    node_count: usize,
    original_edges: usize,
    removed_edges: usize,
    sample_count: usize,
    expected_edges: f64,
}

impl SparsificationReport {
    /// Nodes in the graph (unchanged by sparsification).
    #[rustfmt::skip]
    #[must_use]
    pub const fn node_count(&self) -> usize { self.node_count }

    /// Edges before sparsification.
    #[rustfmt::skip]
    #[must_use]
    pub const fn original_edges(&self) -> usize { self.original_edges }

    /// Edges removed by the pass.
    #[rustfmt::skip]
    #[must_use]
    pub const fn removed_edges(&self) -> usize { self.removed_edges }

    /// Edges left after the pass.
    #[must_use]
    pub const fn retained_edges(&self) -> usize {
        self.original_edges.saturating_sub(self.removed_edges)
    }

    /// Bernoulli draws per edge (`ρ`); zero when the graph was too small.
    #[rustfmt::skip]
    #[must_use]
    pub const fn sample_count(&self) -> usize { self.sample_count }

    /// Diagnostic size estimate `6·n·ln(n)/ε²`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn expected_edges(&self) -> f64 { self.expected_edges }
}

/// Removes edges while approximately preserving the Laplacian quadratic form.
///
/// # Examples
/// ```
/// use cohort_core::{SpectralSparsifier, generate};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(2);
/// let (mut graph, _) = generate(&[20], 1.0, 0.0, &mut rng)?.into_parts();
/// let before = graph.edge_count();
///
/// let report = SpectralSparsifier::new(0.9)?.sparsify(&mut graph, &mut rng)?;
/// assert_eq!(graph.edge_count(), before - report.removed_edges());
/// assert!(graph.edge_count() <= before);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralSparsifier {
    epsilon: f64,
}

impl SpectralSparsifier {
    /// Creates a sparsifier with distortion parameter `epsilon`.
    ///
    /// # Errors
    /// Returns [`SparsifyError::InvalidEpsilon`] unless `0 < epsilon < 1`.
    pub fn new(epsilon: f64) -> Result<Self, SparsifyError> {
        if epsilon > 0.0 && epsilon < 1.0 {
            Ok(Self { epsilon })
        } else {
            Err(SparsifyError::InvalidEpsilon { epsilon })
        }
    }

    /// Configured distortion parameter.
    #[rustfmt::skip]
    #[must_use]
    pub const fn epsilon(&self) -> f64 { self.epsilon }

    /// Bernoulli draws per edge for a graph with `nodes` nodes.
    ///
    /// Returns zero for fewer than two nodes.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::float_arithmetic,
        reason = "the sample count is a rounded-up floating-point expression."
    )]
    #[must_use]
    pub fn sample_count(&self, nodes: usize) -> usize {
        if nodes < 2 {
            return 0;
        }
        let rho = (6.0 * (nodes as f64).ln() / (self.epsilon * self.epsilon)).ceil();
        rho.max(1.0) as usize
    }

    /// Expected edge count `6·n·ln(n)/ε²` for a graph with `nodes` nodes.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the estimate is a floating-point expression."
    )]
    #[must_use]
    pub fn expected_edges(&self, nodes: usize) -> f64 {
        if nodes < 2 {
            return 0.0;
        }
        let n = nodes as f64;
        6.0 * n * n.ln() / (self.epsilon * self.epsilon)
    }

    /// Sparsifies `graph` in place and reports what was removed.
    ///
    /// Graphs with fewer than two nodes are left untouched.
    ///
    /// # Errors
    /// Returns [`SparsifyError::Linalg`] when the Laplacian pseudoinverse
    /// cannot be computed.
    #[instrument(
        name = "core.sparsify",
        err,
        skip(self, graph, rng),
        fields(epsilon = self.epsilon, nodes = graph.node_count(), edges = graph.edge_count()),
    )]
    pub fn sparsify<R: Rng + ?Sized>(
        &self,
        graph: &mut Graph,
        rng: &mut R,
    ) -> Result<SparsificationReport, SparsifyError> {
        let node_count = graph.node_count();
        let original_edges = graph.edge_count();
        let sample_count = self.sample_count(node_count);
        let expected_edges = self.expected_edges(node_count);
        if sample_count == 0 {
            debug!(node_count, "graph too small to sparsify");
            return Ok(SparsificationReport {
                node_count,
                original_edges,
                removed_edges: 0,
                sample_count,
                expected_edges,
            });
        }

        let probabilities = edge_probabilities(graph)?;
        let marked: Vec<(NodeId, NodeId)> = probabilities
            .into_iter()
            .filter(|&(_, _, probability)| !any_success(probability, sample_count, rng))
            .map(|(left, right, _)| (left, right))
            .collect();
        for &(left, right) in &marked {
            graph.remove_edge(left, right);
        }

        let report = SparsificationReport {
            node_count,
            original_edges,
            removed_edges: marked.len(),
            sample_count,
            expected_edges,
        };
        info!(
            expected_edges,
            removed = report.removed_edges,
            retained = report.retained_edges(),
            "sparsification finished"
        );
        Ok(report)
    }
}

/// Convenience wrapper that validates `epsilon` and sparsifies in one call.
///
/// # Errors
/// See [`SpectralSparsifier::new`] and [`SpectralSparsifier::sparsify`].
pub fn sparsify<R: Rng + ?Sized>(
    graph: &mut Graph,
    epsilon: f64,
    rng: &mut R,
) -> Result<SparsificationReport, SparsifyError> {
    SpectralSparsifier::new(epsilon)?.sparsify(graph, rng)
}

/// Effective resistance of every edge, clamped into `[0, 1]`.
#[expect(
    clippy::float_arithmetic,
    reason = "effective resistance combines pseudoinverse entries."
)]
fn edge_probabilities(graph: &Graph) -> Result<Vec<(NodeId, NodeId, f64)>, LinalgError> {
    let pseudoinverse = psd_pseudoinverse(graph.laplacian_matrix())?;
    let order = graph.node_order();
    let position = |node: NodeId| order.binary_search(&node).ok();

    Ok(graph
        .edges()
        .filter_map(|(left, right, _)| {
            let (u, v) = (position(left)?, position(right)?);
            let resistance = pseudoinverse[(u, u)] + pseudoinverse[(v, v)]
                - 2.0 * pseudoinverse[(u, v)];
            Some((left, right, resistance.clamp(0.0, 1.0)))
        })
        .collect())
}

fn any_success<R: Rng + ?Sized>(probability: f64, draws: usize, rng: &mut R) -> bool {
    if probability.is_nan() || probability <= 0.0 {
        return false;
    }
    (0..draws).any(|_| rng.gen_bool(probability))
}
