// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::gamma::digamma;

use crate::error::Result;

use super::common::ObservationSet;
use super::{
    ComputeConfig, NeighbourCountingKernel, NeighbourCounts, PartialSums, check_neighbour_search,
};

/// KSG algorithm 2 counting rule: per-subspace radii are the largest
/// marginal distances among the k nearest joint neighbours, and counts are
/// inclusive (`<=`). Every count is therefore at least k, keeping the
/// digamma and inverse terms of the
/// [`Algorithm2`](super::KsgVariant::Algorithm2) closing formula well
/// defined.
pub(crate) struct KsgAlg2;

fn count_neighbours(obs: &ObservationSet, cfg: ComputeConfig, i: usize) -> NeighbourCounts {
    let n = obs.len();
    let (dx, dy, dz) = obs.marginal_distances(cfg.norm, i);
    let dxz: Vec<f64> = (0..n).map(|j| dx[j].max(dz[j])).collect();
    let dyz: Vec<f64> = (0..n).map(|j| dy[j].max(dz[j])).collect();
    let joint: Vec<f64> = (0..n).map(|j| dxz[j].max(dy[j])).collect();

    // Indices of the k nearest joint neighbours (self excluded via the
    // infinite self distance).
    let mut order: Vec<usize> = (0..n).collect();
    order.select_nth_unstable_by(cfg.k - 1, |&a, &b| joint[a].total_cmp(&joint[b]));

    let mut eps_xz = 0.0f64;
    let mut eps_yz = 0.0f64;
    let mut eps_z = 0.0f64;
    for &j in &order[..cfg.k] {
        eps_xz = eps_xz.max(dxz[j]);
        eps_yz = eps_yz.max(dyz[j]);
        eps_z = eps_z.max(dz[j]);
    }

    let mut counts = NeighbourCounts {
        n_xz: 0,
        n_yz: 0,
        n_z: 0,
    };
    for j in 0..n {
        if dxz[j] <= eps_xz {
            counts.n_xz += 1;
        }
        if dyz[j] <= eps_yz {
            counts.n_yz += 1;
        }
        if dz[j] <= eps_z {
            counts.n_z += 1;
        }
    }
    counts
}

impl NeighbourCountingKernel for KsgAlg2 {
    fn partial_sums(
        &self,
        obs: &ObservationSet,
        cfg: ComputeConfig,
        start: usize,
        len: usize,
    ) -> Result<PartialSums> {
        check_neighbour_search(obs, cfg.k)?;
        let mut sums = PartialSums::default();
        for i in start..start + len {
            let c = count_neighbours(obs, cfg, i);
            sums.sum_digammas +=
                digamma(c.n_z as f64) - digamma(c.n_xz as f64) - digamma(c.n_yz as f64);
            sums.sum_nxz += c.n_xz as f64;
            sums.sum_nyz += c.n_yz as f64;
            sums.sum_nz += c.n_z as f64;
            sums.sum_inv_nxz += 1.0 / c.n_xz as f64;
            sums.sum_inv_nyz += 1.0 / c.n_yz as f64;
        }
        Ok(sums)
    }

    fn partial_locals(
        &self,
        obs: &ObservationSet,
        cfg: ComputeConfig,
        start: usize,
        out: &mut [f64],
    ) -> Result<()> {
        check_neighbour_search(obs, cfg.k)?;
        let constant = digamma(cfg.k as f64) - 2.0 / (cfg.k as f64);
        for (offset, slot) in out.iter_mut().enumerate() {
            let c = count_neighbours(obs, cfg, start + offset);
            *slot = constant + digamma(c.n_z as f64)
                - digamma(c.n_xz as f64)
                - digamma(c.n_yz as f64)
                + 1.0 / c.n_xz as f64
                + 1.0 / c.n_yz as f64;
        }
        Ok(())
    }
}
