//! Crate-level error type for experiment configuration and trials.
//!
//! Component errors keep their own enums and codes; [`CohortError`] wraps
//! them so trial orchestration can return a single type while callers still
//! reach the originating component's stable code through
//! [`CohortError::source_code`].

use std::fmt;

use thiserror::Error;

use crate::{
    contraction::ContractionError, generate::GenerateError, score::ScoreError,
    sparsify::SparsifyError, spectral::PartitionError,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error type produced when configuring or running an experiment.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CohortError {
    /// An experiment must run at least one trial.
    #[error("an experiment needs at least one trial")]
    ZeroTrials,
    /// A contraction fraction fell outside `[0, 1)`.
    #[error("contraction fraction must lie in [0, 1) (got {fraction})")]
    InvalidContractionFraction {
        /// Offending fraction.
        fraction: f64,
    },
    /// Graph generation failed.
    #[error("graph generation failed: {0}")]
    Generate(#[from] GenerateError),
    /// Spectral partitioning failed.
    #[error("partitioning failed: {0}")]
    Partition(#[from] PartitionError),
    /// Scoring failed.
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
    /// Contraction or reconstruction failed.
    #[error("contraction failed: {0}")]
    Contraction(#[from] ContractionError),
    /// Sparsification failed.
    #[error("sparsification failed: {0}")]
    Sparsify(#[from] SparsifyError),
}

define_error_codes! {
    /// Stable codes describing [`CohortError`] variants.
    enum CohortErrorCode for CohortError {
        /// An experiment must run at least one trial.
        ZeroTrials => ZeroTrials => "COHORT_ZERO_TRIALS",
        /// A contraction fraction fell outside `[0, 1)`.
        InvalidContractionFraction => InvalidContractionFraction { .. } => "COHORT_INVALID_CONTRACTION_FRACTION",
        /// Graph generation failed.
        GenerateFailure => Generate(..) => "COHORT_GENERATE_FAILURE",
        /// Spectral partitioning failed.
        PartitionFailure => Partition(..) => "COHORT_PARTITION_FAILURE",
        /// Scoring failed.
        ScoreFailure => Score(..) => "COHORT_SCORE_FAILURE",
        /// Contraction or reconstruction failed.
        ContractionFailure => Contraction(..) => "COHORT_CONTRACTION_FAILURE",
        /// Sparsification failed.
        SparsifyFailure => Sparsify(..) => "COHORT_SPARSIFY_FAILURE",
    }
}

impl CohortError {
    /// Retrieve the wrapped component's stable code, if the error came from one.
    #[must_use]
    pub const fn source_code(&self) -> Option<&'static str> {
        match self {
            Self::Generate(error) => Some(error.code().as_str()),
            Self::Partition(error) => Some(error.code().as_str()),
            Self::Score(error) => Some(error.code().as_str()),
            Self::Contraction(error) => Some(error.code().as_str()),
            Self::Sparsify(error) => Some(error.code().as_str()),
            Self::ZeroTrials | Self::InvalidContractionFraction { .. } => None,
        }
    }
}

/// Convenient alias for results returned by experiment orchestration.
pub type Result<T> = core::result::Result<T, CohortError>;
