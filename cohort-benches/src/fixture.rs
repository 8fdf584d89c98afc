//! Deterministic planted-graph fixtures.

use cohort_core::{PlantedGraph, generate};
use rand::{SeedableRng, rngs::SmallRng};

use crate::{error::BenchSetupError, params::ModelBenchParams};

/// Generates the planted graph described by `params` from a fixed seed.
///
/// # Errors
/// Returns [`BenchSetupError::Generate`] when the model is invalid.
///
/// # Examples
/// ```
/// use cohort_benches::{fixture::planted_graph, params::ModelBenchParams};
///
/// let planted = planted_graph(&ModelBenchParams::balanced(5, 2), 7)?;
/// assert_eq!(planted.graph().node_count(), 10);
/// # Ok::<(), cohort_benches::error::BenchSetupError>(())
/// ```
pub fn planted_graph(params: &ModelBenchParams, seed: u64) -> Result<PlantedGraph, BenchSetupError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    Ok(generate(&params.sizes(), params.p, params.q, &mut rng)?)
}

/// Random source for the timed section of a benchmark.
#[must_use]
pub fn bench_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_add(1))
}
