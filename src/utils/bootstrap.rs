//! Bootstrap helpers for regression uncertainty estimation.
//!
//! Training rows are resampled with replacement, the model is refit on each
//! resample and the spread of the resulting predictions is summarised.

use crate::utils::stats::{mean, population_std_dev};
use rand::prelude::*;

/// Seeded generator, or one drawn from OS entropy when no seed is given.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Row indices drawn with replacement, same size as the input.
pub fn resample_indices(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Mean and spread (population standard deviation) of bootstrap draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapSummary {
    pub mean: f64,
    pub scale: f64,
}

/// Summarise bootstrap predictions; NaN draws propagate into the summary.
pub fn summarize(draws: &[f64]) -> BootstrapSummary {
    BootstrapSummary {
        mean: mean(draws),
        scale: population_std_dev(draws),
    }
}
