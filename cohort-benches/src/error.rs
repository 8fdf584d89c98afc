//! Benchmark setup error type.
//!
//! Lets setup functions propagate fixture failures with `?`.

use cohort_core::{ContractionError, GenerateError, PartitionError, SparsifyError};

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Planted graph generation failed.
    #[error("graph generation failed: {0}")]
    Generate(#[from] GenerateError),
    /// A warm-up partition failed.
    #[error("partitioning failed: {0}")]
    Partition(#[from] PartitionError),
    /// A warm-up contraction failed.
    #[error("contraction failed: {0}")]
    Contraction(#[from] ContractionError),
    /// Sparsifier construction failed.
    #[error("sparsification failed: {0}")]
    Sparsify(#[from] SparsifyError),
}
