//! Shared test utilities used across cohort crates.

pub mod proptest_profile;
pub mod tracing;
