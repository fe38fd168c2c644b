// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! KSG (Kraskov-Stoegbauer-Grassberger) conditional mutual information,
//! Frenzel-Pompe formulation: neighbour search in the full joint (X,Y,Z)
//! space, neighbour counting in the (X,Z), (Y,Z) and (Z) marginal subspaces.
//!
//! [`CondMiKraskov`] orchestrates the estimation; the per-sample counting
//! rule is a pluggable [`NeighbourCountingKernel`], with the two Kraskov
//! algorithm variants as the provided implementations. Which closing formula
//! applies is tagged by [`KsgVariant`], fixed at construction.

pub mod common;
pub mod kraskov_cmi;

mod alg1;
mod alg2;

use statrs::function::gamma::digamma;

use crate::error::{EstimatorError, Result};
use crate::estimators::utils::norms::NormType;

pub use common::{CondMiCommon, ObservationSet};
pub use kraskov_cmi::CondMiKraskov;

/// Which Kraskov algorithm an estimator instance implements.
///
/// The variant determines both the counting convention of the kernel and the
/// closing formula; the two are not interchangeable on the same raw sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsgVariant {
    /// Strict counting within the k-th joint neighbour radius.
    Algorithm1,
    /// Inclusive counting within per-subspace radii taken over the k nearest
    /// joint neighbours.
    Algorithm2,
}

impl KsgVariant {
    /// Close the estimate from merged sufficient statistics. Result in nats.
    pub fn combine(&self, sums: &PartialSums, n: usize, k: usize) -> f64 {
        let n_f = n as f64;
        let average_digammas = sums.sum_digammas / n_f;
        log::debug!(
            "<n_xz>={:.3}, <n_yz>={:.3}, <n_z>={:.3}",
            sums.sum_nxz / n_f,
            sums.sum_nyz / n_f,
            sums.sum_nz / n_f
        );
        match self {
            KsgVariant::Algorithm1 => {
                let average = digamma(k as f64) + average_digammas;
                log::debug!(
                    "av = digamma(k)={:.3} + <digammas>={:.3} = {:.3}",
                    digamma(k as f64),
                    average_digammas,
                    average
                );
                average
            }
            KsgVariant::Algorithm2 => {
                let average_inv_nxz = sums.sum_inv_nxz / n_f;
                let average_inv_nyz = sums.sum_inv_nyz / n_f;
                let average = digamma(k as f64) - 2.0 / (k as f64)
                    + average_digammas
                    + average_inv_nxz
                    + average_inv_nyz;
                log::debug!(
                    "av = digamma(k)={:.3} - 2/k={:.3} + <digammas>={:.3} + <inverses>={:.3} = {:.3}",
                    digamma(k as f64),
                    2.0 / (k as f64),
                    average_digammas,
                    average_inv_nxz + average_inv_nyz,
                    average
                );
                average
            }
        }
    }
}

/// Sufficient statistics for one contiguous block of samples.
///
/// Merging is elementwise addition, so the global statistics are independent
/// of how the sample range was partitioned. The count sums (`sum_nxz`,
/// `sum_nyz`, `sum_nz`) only feed diagnostics; the inverse-count sums are
/// used by the algorithm-2 closing formula and stay zero under algorithm 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialSums {
    pub sum_digammas: f64,
    pub sum_nxz: f64,
    pub sum_nyz: f64,
    pub sum_nz: f64,
    pub sum_inv_nxz: f64,
    pub sum_inv_nyz: f64,
}

impl PartialSums {
    pub fn merge(&mut self, other: &PartialSums) {
        self.sum_digammas += other.sum_digammas;
        self.sum_nxz += other.sum_nxz;
        self.sum_nyz += other.sum_nyz;
        self.sum_nz += other.sum_nz;
        self.sum_inv_nxz += other.sum_inv_nxz;
        self.sum_inv_nyz += other.sum_inv_nyz;
    }
}

/// Immutable configuration snapshot taken at the start of each compute call,
/// so property changes cannot race an in-flight computation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ComputeConfig {
    pub k: usize,
    pub norm: NormType,
    pub num_threads: usize,
}

/// Per-sample neighbour counts in the three marginal subspaces.
pub(crate) struct NeighbourCounts {
    pub n_xz: usize,
    pub n_yz: usize,
    pub n_z: usize,
}

/// The pluggable per-sample counting rule. Implementations must be safe to
/// invoke from several worker threads over disjoint index ranges of the same
/// read-only observation set.
pub(crate) trait NeighbourCountingKernel: Send + Sync {
    /// Sufficient statistics for samples `[start, start + len)`.
    fn partial_sums(
        &self,
        obs: &ObservationSet,
        cfg: ComputeConfig,
        start: usize,
        len: usize,
    ) -> Result<PartialSums>;

    /// Local values for samples `[start, start + out.len())`, written into
    /// `out` in sample order.
    fn partial_locals(
        &self,
        obs: &ObservationSet,
        cfg: ComputeConfig,
        start: usize,
        out: &mut [f64],
    ) -> Result<()>;
}

/// Neighbour searches need at least k+1 samples.
pub(crate) fn check_neighbour_search(obs: &ObservationSet, k: usize) -> Result<()> {
    let n = obs.len();
    if n == 0 {
        return Err(EstimatorError::NoObservations);
    }
    if k >= n {
        return Err(EstimatorError::TooFewObservations { n, k });
    }
    Ok(())
}
