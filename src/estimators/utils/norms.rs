// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::ArrayView1;

use crate::error::{EstimatorError, Result};

/// Norm used for distances within each marginal subspace.
///
/// The joint-space distance between two samples is the maximum of the
/// marginal norms, so with [`NormType::MaxNorm`] (the default) the joint
/// distance is the Chebyshev norm over all coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormType {
    /// L-infinity norm, the KSG default.
    #[default]
    MaxNorm,
    /// L2 norm.
    Euclidean,
    /// Squared L2 norm. Monotone in the L2 norm, so neighbour ranking and
    /// counting are unaffected; saves the square root.
    EuclideanSquared,
}

impl NormType {
    /// Parse a property value. Matching is case-insensitive.
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("MAX_NORM") {
            Ok(NormType::MaxNorm)
        } else if value.eq_ignore_ascii_case("EUCLIDEAN") {
            Ok(NormType::Euclidean)
        } else if value.eq_ignore_ascii_case("EUCLIDEAN_SQUARED") {
            Ok(NormType::EuclideanSquared)
        } else {
            Err(EstimatorError::UnknownNorm(value.to_string()))
        }
    }

    /// Distance between two points of the same marginal subspace.
    pub fn norm(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match self {
            NormType::MaxNorm => a
                .iter()
                .zip(b.iter())
                .map(|(ai, bi)| (ai - bi).abs())
                .fold(0.0, f64::max),
            NormType::Euclidean => self::sum_of_squares(a, b).sqrt(),
            NormType::EuclideanSquared => self::sum_of_squares(a, b),
        }
    }
}

fn sum_of_squares(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi) * (ai - bi))
        .sum()
}
