//! Benchmark support crate for cohort.
//!
//! Provides planted-graph fixtures and parameter types used by the Criterion
//! benchmarks for partitioning, contraction and sparsification.

pub mod error;
pub mod fixture;
pub mod params;
