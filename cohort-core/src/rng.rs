//! Per-trial seed derivation.
//!
//! Trials draw from independent `SmallRng` streams derived from the
//! experiment's base seed with SplitMix64, so a trial's result depends only on
//! the base seed and its index, never on scheduling.

use rand::{SeedableRng, rngs::SmallRng};

/// SplitMix64 increment (the 64-bit golden ratio), also used to space trials.
const TRIAL_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[inline]
pub(crate) fn mix_trial_seed(base_seed: u64, trial: usize) -> u64 {
    splitmix64(base_seed ^ ((trial as u64).wrapping_add(1).wrapping_mul(TRIAL_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(TRIAL_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Random source for trial `trial` of an experiment seeded with `base_seed`.
pub(crate) fn trial_rng(base_seed: u64, trial: usize) -> SmallRng {
    SmallRng::seed_from_u64(mix_trial_seed(base_seed, trial))
}
