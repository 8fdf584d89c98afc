//! Alignment of recovered partitions with ground truth, and accuracy.
//!
//! Recovered partitions carry no labels, so each ground-truth cluster is
//! paired with one recovered partition before counting agreements. Pairing
//! is greedy: ground-truth clusters are visited in input order and each takes
//! the unused recovered partition with the largest overlap, preferring the
//! lowest index on ties.
//!
//! Greedy pairing is an approximation of maximum-weight bipartite matching.
//! An early cluster can claim the partition that a later cluster overlaps
//! more, leaving the later cluster with a poorer match; accuracy is then a
//! lower bound on what an optimal assignment would report.

use tracing::{debug, instrument};

use crate::graph::Cluster;

/// Errors raised while scoring a recovered partition.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    /// The number of recovered partitions differs from the ground truth.
    #[error("expected {truth} recovered partitions to match the ground truth, got {recovered}")]
    ClusterCountMismatch {
        /// Number of ground-truth clusters.
        truth: usize,
        /// Number of recovered partitions.
        recovered: usize,
    },
}

impl ScoreError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> ScoreErrorCode {
        match self {
            Self::ClusterCountMismatch { .. } => ScoreErrorCode::ClusterCountMismatch,
        }
    }
}

/// Machine-readable error codes for [`ScoreError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScoreErrorCode {
    /// The number of recovered partitions differs from the ground truth.
    ClusterCountMismatch,
}

impl ScoreErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClusterCountMismatch => "SCORE_CLUSTER_COUNT_MISMATCH",
        }
    }
}

/// One ground-truth cluster paired with a recovered partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Index of the recovered partition assigned to the cluster.
    pub recovered: usize,
    /// Number of nodes the two share.
    pub overlap: usize,
    /// Size of the ground-truth cluster.
    pub truth_size: usize,
}

/// The pairing of every ground-truth cluster with a recovered partition.
///
/// `matches()[i]` describes ground-truth cluster `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    matches: Vec<Match>,
}

impl Alignment {
    /// Per-cluster pairings in ground-truth order.
    #[rustfmt::skip]
    #[must_use]
    pub fn matches(&self) -> &[Match] { &self.matches }

    /// Total number of nodes placed in their matched partition.
    #[must_use]
    pub fn agreements(&self) -> usize {
        self.matches.iter().map(|m| m.overlap).sum()
    }

    /// Total number of ground-truth nodes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matches.iter().map(|m| m.truth_size).sum()
    }

    /// Fraction of ground-truth nodes placed in their matched partition.
    ///
    /// Empty ground-truth clusters contribute nothing to either side of the
    /// ratio. A ground truth without any nodes scores `0.0`.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "accuracy is a floating-point ratio of node counts."
    )]
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.agreements() as f64 / total as f64
    }
}

/// Pairs each ground-truth cluster with a distinct recovered partition.
///
/// # Errors
/// Returns [`ScoreError::ClusterCountMismatch`] when the slices differ in
/// length.
///
/// # Examples
/// ```
/// use cohort_core::{Cluster, NodeId, align};
///
/// let set = |ids: &[u64]| ids.iter().copied().map(NodeId::new).collect::<Cluster>();
/// let truth = [set(&[0, 1, 2]), set(&[3, 4])];
/// let recovered = [set(&[3, 4, 2]), set(&[0, 1])];
///
/// let alignment = align(&truth, &recovered)?;
/// assert_eq!(alignment.matches()[0].recovered, 1);
/// assert_eq!(alignment.agreements(), 4);
/// # Ok::<(), cohort_core::ScoreError>(())
/// ```
pub fn align(truth: &[Cluster], recovered: &[Cluster]) -> Result<Alignment, ScoreError> {
    if truth.len() != recovered.len() {
        return Err(ScoreError::ClusterCountMismatch {
            truth: truth.len(),
            recovered: recovered.len(),
        });
    }

    let mut used = vec![false; recovered.len()];
    let mut matches = Vec::with_capacity(truth.len());
    for cluster in truth {
        let mut best: Option<(usize, usize)> = None;
        for (index, candidate) in recovered.iter().enumerate() {
            if used[index] {
                continue;
            }
            let overlap = cluster.overlap(candidate);
            if best.is_none_or(|(_, current)| overlap > current) {
                best = Some((index, overlap));
            }
        }
        // Counts are equal, so an unused partition always remains.
        let Some((index, overlap)) = best else {
            break;
        };
        used[index] = true;
        matches.push(Match {
            recovered: index,
            overlap,
            truth_size: cluster.len(),
        });
    }
    Ok(Alignment { matches })
}

/// Scores `recovered` against `truth` as the fraction of correctly placed
/// nodes after greedy alignment.
///
/// # Errors
/// Returns [`ScoreError::ClusterCountMismatch`] when the slices differ in
/// length.
#[instrument(
    name = "core.score",
    err,
    skip(truth, recovered),
    fields(clusters = truth.len()),
)]
pub fn score(truth: &[Cluster], recovered: &[Cluster]) -> Result<f64, ScoreError> {
    let alignment = align(truth, recovered)?;
    let accuracy = alignment.accuracy();
    debug!(
        agreements = alignment.agreements(),
        total = alignment.total(),
        accuracy,
        "scored partition"
    );
    Ok(accuracy)
}
