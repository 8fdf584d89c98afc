//! Trial orchestration: generate, transform, partition, reconstruct, score.
//!
//! Each trial owns its graph and random stream. Trials share nothing except
//! the immutable configuration, so [`Experiment::run`] fans them out across
//! the rayon pool when the `parallel` feature is enabled.

use std::num::NonZeroUsize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    Result,
    contraction::{contract, reconstruct},
    generate::{generate, planted_clusters},
    graph::Cluster,
    rng::trial_rng,
    score::score,
    sparsify::SpectralSparsifier,
    spectral::{SpectralPartitioner, Strategy},
};

/// How many edges a contraction transform merges.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContractionBudget {
    /// Contract exactly this many edges.
    Edges(usize),
    /// Contract `⌊fraction · edge_count⌋` edges of each generated graph.
    Fraction(f64),
}

impl ContractionBudget {
    /// Number of contractions for a graph with `edges` edges.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::float_arithmetic,
        reason = "fractional budgets round down to a whole edge count."
    )]
    #[must_use]
    pub fn contractions_for(self, edges: usize) -> usize {
        match self {
            Self::Edges(count) => count,
            Self::Fraction(fraction) => (fraction * edges as f64).floor() as usize,
        }
    }
}

/// Optional graph transformation applied between generation and recovery.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transform {
    /// Partition the generated graph as-is.
    #[default]
    None,
    /// Contract random edges, then reconstruct the recovered partitions.
    Contract(ContractionBudget),
    /// Remove edges by effective-resistance sampling.
    Sparsify {
        /// Distortion parameter in `(0, 1)`.
        epsilon: f64,
    },
}

/// Accuracies achieved by both strategies in one trial.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialOutcome {
    trial: usize,
    hierarchical: f64,
    kmeans: f64,
}

impl TrialOutcome {
    /// Zero-based index of the trial within its run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn trial(&self) -> usize { self.trial }

    /// Accuracy of the agglomerative strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn hierarchical(&self) -> f64 { self.hierarchical }

    /// Accuracy of the k-means strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn kmeans(&self) -> f64 { self.kmeans }

    /// Accuracy of `strategy`.
    #[must_use]
    pub const fn accuracy(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Hierarchical => self.hierarchical,
            Strategy::KMeans => self.kmeans,
        }
    }
}

/// Aggregated results of an experiment.
///
/// Failed trials are counted but excluded from the statistics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentSummary {
    outcomes: Vec<TrialOutcome>,
    failed: usize,
}

impl ExperimentSummary {
    /// Completed trials ordered by trial index.
    #[rustfmt::skip]
    #[must_use]
    pub fn outcomes(&self) -> &[TrialOutcome] { &self.outcomes }

    /// Number of trials that completed.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of trials dropped because they failed.
    #[rustfmt::skip]
    #[must_use]
    pub const fn failed(&self) -> usize { self.failed }

    /// Mean accuracy of `strategy`, or `None` when no trial completed.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the mean is a floating-point average."
    )]
    #[must_use]
    pub fn mean(&self, strategy: Strategy) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let total: f64 = self.outcomes.iter().map(|o| o.accuracy(strategy)).sum();
        Some(total / self.outcomes.len() as f64)
    }

    /// Median accuracy of `strategy`, or `None` when no trial completed.
    ///
    /// Even counts average the two middle values.
    #[expect(
        clippy::float_arithmetic,
        reason = "the median of an even count averages two values."
    )]
    #[must_use]
    pub fn median(&self, strategy: Strategy) -> Option<f64> {
        let mut values: Vec<f64> = self
            .outcomes
            .iter()
            .map(|o| o.accuracy(strategy))
            .collect();
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        match values.len() {
            0 => None,
            len if len % 2 == 1 => values.get(mid).copied(),
            _ => Some((values[mid - 1] + values[mid]) / 2.0),
        }
    }
}

/// A validated experiment configuration.
///
/// Build one with [`crate::ExperimentBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    cluster_sizes: Vec<usize>,
    p: f64,
    q: f64,
    transform: Transform,
    trials: NonZeroUsize,
    seed: u64,
    partitioner: SpectralPartitioner,
}

impl Experiment {
    pub(crate) fn new(
        cluster_sizes: Vec<usize>,
        p: f64,
        q: f64,
        transform: Transform,
        trials: NonZeroUsize,
        seed: u64,
        partitioner: SpectralPartitioner,
    ) -> Self {
        Self {
            cluster_sizes,
            p,
            q,
            transform,
            trials,
            seed,
            partitioner,
        }
    }

    /// Planted cluster sizes.
    #[rustfmt::skip]
    #[must_use]
    pub fn cluster_sizes(&self) -> &[usize] { &self.cluster_sizes }

    /// In-cluster connection probability.
    #[rustfmt::skip]
    #[must_use]
    pub const fn p(&self) -> f64 { self.p }

    /// Cross-cluster connection probability.
    #[rustfmt::skip]
    #[must_use]
    pub const fn q(&self) -> f64 { self.q }

    /// Transform applied to each generated graph before partitioning.
    #[rustfmt::skip]
    #[must_use]
    pub const fn transform(&self) -> Transform { self.transform }

    /// Number of trials [`run`](Self::run) executes.
    #[rustfmt::skip]
    #[must_use]
    pub const fn trials(&self) -> NonZeroUsize { self.trials }

    /// Base seed from which per-trial seeds are derived.
    #[rustfmt::skip]
    #[must_use]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Spectral partitioner shared by every trial.
    #[rustfmt::skip]
    #[must_use]
    pub const fn partitioner(&self) -> &SpectralPartitioner { &self.partitioner }

    /// Ground-truth clusters shared by every trial.
    #[must_use]
    pub fn ground_truth(&self) -> Vec<Cluster> {
        planted_clusters(&self.cluster_sizes)
    }

    /// Runs trial `trial` with its derived random stream.
    ///
    /// The result depends only on the configuration and `trial`.
    ///
    /// # Errors
    /// Propagates the failure of whichever stage failed, wrapped in
    /// [`crate::CohortError`].
    #[instrument(
        name = "core.experiment.trial",
        err,
        skip(self),
        fields(transform = ?self.transform),
    )]
    pub fn run_trial(&self, trial: usize) -> Result<TrialOutcome> {
        let mut rng = trial_rng(self.seed, trial);
        let (mut graph, truth) =
            generate(&self.cluster_sizes, self.p, self.q, &mut rng)?.into_parts();

        let identities = match self.transform {
            Transform::None => None,
            Transform::Contract(budget) => {
                let count = budget.contractions_for(graph.edge_count());
                Some(contract(&mut graph, count, &mut rng)?)
            }
            Transform::Sparsify { epsilon } => {
                SpectralSparsifier::new(epsilon)?.sparsify(&mut graph, &mut rng)?;
                None
            }
        };

        let (hierarchical, kmeans) = self
            .partitioner
            .partition(&graph, truth.len(), &mut rng)?
            .into_parts();
        let (hierarchical, kmeans) = match identities {
            Some(map) => (reconstruct(&map, hierarchical)?, reconstruct(&map, kmeans)?),
            None => (hierarchical, kmeans),
        };

        let outcome = TrialOutcome {
            trial,
            hierarchical: score(&truth, &hierarchical)?,
            kmeans: score(&truth, &kmeans)?,
        };
        debug!(
            trial,
            hierarchical = outcome.hierarchical,
            kmeans = outcome.kmeans,
            "trial finished"
        );
        Ok(outcome)
    }

    /// Runs every trial and summarises the completed ones.
    ///
    /// Failed trials are logged at `warn` and counted in
    /// [`ExperimentSummary::failed`].
    #[instrument(
        name = "core.experiment.run",
        skip(self),
        fields(trials = self.trials.get(), clusters = self.cluster_sizes.len()),
    )]
    pub fn run(&self) -> ExperimentSummary {
        let results = self.collect_trials();

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (trial, result) in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    failed += 1;
                    warn!(trial, code = %error.code(), error = %error, "trial dropped");
                }
            }
        }
        outcomes.sort_by_key(TrialOutcome::trial);

        debug!(completed = outcomes.len(), failed, "experiment finished");
        ExperimentSummary { outcomes, failed }
    }

    #[cfg(feature = "parallel")]
    fn collect_trials(&self) -> Vec<(usize, Result<TrialOutcome>)> {
        (0..self.trials.get())
            .into_par_iter()
            .map(|trial| (trial, self.run_trial(trial)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn collect_trials(&self) -> Vec<(usize, Result<TrialOutcome>)> {
        (0..self.trials.get())
            .map(|trial| (trial, self.run_trial(trial)))
            .collect()
    }
}
