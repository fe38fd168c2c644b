// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use rand::Rng;
use rand::seq::SliceRandom;

/// Empirical null distribution from permutation surrogates.
///
/// Produced by re-estimating the measure under random reorderings of one
/// variable; the surrogate values approximate the distribution of the
/// estimator under the null hypothesis of no conditional coupling.
#[derive(Debug, Clone)]
pub struct SurrogateDistribution {
    /// Estimate per surrogate reordering, in the order they were evaluated.
    pub surrogates: Vec<f64>,
    /// The estimate on the unpermuted observations.
    pub actual_value: f64,
}

impl SurrogateDistribution {
    /// One-sided p-value: the fraction of surrogates at least as large as
    /// the actual estimate.
    pub fn p_value(&self) -> f64 {
        if self.surrogates.is_empty() {
            return 1.0;
        }
        let exceeding = self
            .surrogates
            .iter()
            .filter(|&&s| s >= self.actual_value)
            .count();
        exceeding as f64 / self.surrogates.len() as f64
    }
}

/// Generate `count` random orderings of `[0, n)`, one Fisher-Yates shuffle
/// each. The identity ordering is not excluded; for surrogate counts far
/// below n! the collision probability is negligible.
pub fn random_orderings<R: Rng + ?Sized>(n: usize, count: usize, rng: &mut R) -> Vec<Vec<usize>> {
    (0..count)
        .map(|_| {
            let mut ordering: Vec<usize> = (0..n).collect();
            ordering.shuffle(rng);
            ordering
        })
        .collect()
}
