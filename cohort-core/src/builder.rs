//! Builder utilities for configuring experiments.
//!
//! Exposes the validation surface used before constructing [`Experiment`]
//! instances. Every setter is infallible; [`ExperimentBuilder::build`] checks
//! the whole configuration at once.

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::CohortError,
    experiment::{ContractionBudget, Experiment, Transform},
    generate::validate_model,
    sparsify::SpectralSparsifier,
    spectral::{PartitionError, SpectralPartitioner},
};

/// Configures and constructs [`Experiment`] instances.
///
/// # Examples
/// ```
/// use cohort_core::{ContractionBudget, ExperimentBuilder, Transform};
///
/// let experiment = ExperimentBuilder::new()
///     .with_cluster_sizes(vec![8; 5])
///     .with_probabilities(0.9, 0.1)
///     .with_transform(Transform::Contract(ContractionBudget::Fraction(0.1)))
///     .with_trials(3)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(experiment.cluster_sizes().len(), 5);
/// assert_eq!(experiment.trials().get(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentBuilder {
    cluster_sizes: Vec<usize>,
    p: f64,
    q: f64,
    transform: Transform,
    trials: usize,
    seed: u64,
    partitioner: SpectralPartitioner,
}

impl Default for ExperimentBuilder {
    fn default() -> Self {
        Self {
            cluster_sizes: vec![10, 10],
            p: 0.75,
            q: 0.25,
            transform: Transform::None,
            trials: 5,
            seed: 0,
            partitioner: SpectralPartitioner::default(),
        }
    }
}

impl ExperimentBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use cohort_core::ExperimentBuilder;
    ///
    /// let builder = ExperimentBuilder::new();
    /// assert_eq!(builder.cluster_sizes(), &[10, 10]);
    /// assert_eq!(builder.trials(), 5);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the planted cluster sizes.
    #[must_use]
    pub fn with_cluster_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.cluster_sizes = sizes;
        self
    }

    /// Plants `count` clusters of `size` nodes each.
    ///
    /// # Examples
    /// ```
    /// use cohort_core::ExperimentBuilder;
    ///
    /// let builder = ExperimentBuilder::new().with_uniform_clusters(4, 3);
    /// assert_eq!(builder.cluster_sizes(), &[4, 4, 4]);
    /// ```
    #[must_use]
    pub fn with_uniform_clusters(mut self, size: usize, count: usize) -> Self {
        self.cluster_sizes = vec![size; count];
        self
    }

    /// Sets the in-cluster (`p`) and cross-cluster (`q`) probabilities.
    #[must_use]
    pub const fn with_probabilities(mut self, p: f64, q: f64) -> Self {
        self.p = p;
        self.q = q;
        self
    }

    /// Selects the transform applied to each generated graph.
    #[must_use]
    pub const fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets how many trials [`Experiment::run`] executes.
    #[must_use]
    pub const fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the base seed from which per-trial seeds are derived.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the spectral partitioner settings.
    #[must_use]
    pub const fn with_partitioner(mut self, partitioner: SpectralPartitioner) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Planted cluster sizes.
    #[rustfmt::skip]
    #[must_use]
    pub fn cluster_sizes(&self) -> &[usize] { &self.cluster_sizes }

    /// Within-cluster and cross-cluster probabilities as `(p, q)`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn probabilities(&self) -> (f64, f64) { (self.p, self.q) }

    /// Configured graph transform.
    #[rustfmt::skip]
    #[must_use]
    pub const fn transform(&self) -> Transform { self.transform }

    /// Requested trial count, unvalidated.
    #[rustfmt::skip]
    #[must_use]
    pub const fn trials(&self) -> usize { self.trials }

    /// Base seed for the run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Validates the configuration and constructs an [`Experiment`].
    ///
    /// # Errors
    /// - [`CohortError::ZeroTrials`] when no trials are requested.
    /// - [`CohortError::Generate`] for empty cluster sizes or probabilities
    ///   outside `[0, 1]`.
    /// - [`CohortError::Sparsify`] for a sparsification `epsilon` outside
    ///   `(0, 1)`.
    /// - [`CohortError::InvalidContractionFraction`] for a contraction
    ///   fraction outside `[0, 1)`.
    /// - [`CohortError::Partition`] for an invalid k-means tolerance.
    ///
    /// # Examples
    /// ```
    /// use cohort_core::{CohortError, ExperimentBuilder};
    ///
    /// let err = ExperimentBuilder::new().with_trials(0).build().unwrap_err();
    /// assert_eq!(err, CohortError::ZeroTrials);
    /// ```
    pub fn build(self) -> Result<Experiment> {
        let trials = NonZeroUsize::new(self.trials).ok_or(CohortError::ZeroTrials)?;
        validate_model(&self.cluster_sizes, self.p, self.q)?;
        validate_transform(self.transform)?;
        let tolerance = self.partitioner.tolerance();
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(PartitionError::InvalidTolerance { tolerance }.into());
        }

        Ok(Experiment::new(
            self.cluster_sizes,
            self.p,
            self.q,
            self.transform,
            trials,
            self.seed,
            self.partitioner,
        ))
    }
}

fn validate_transform(transform: Transform) -> Result<()> {
    match transform {
        Transform::None | Transform::Contract(ContractionBudget::Edges(_)) => Ok(()),
        Transform::Contract(ContractionBudget::Fraction(fraction)) => {
            if (0.0..1.0).contains(&fraction) {
                Ok(())
            } else {
                Err(CohortError::InvalidContractionFraction { fraction })
            }
        }
        Transform::Sparsify { epsilon } => {
            SpectralSparsifier::new(epsilon)?;
            Ok(())
        }
    }
}
