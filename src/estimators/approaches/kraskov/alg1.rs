// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::gamma::digamma;

use crate::error::Result;

use super::common::ObservationSet;
use super::{
    ComputeConfig, NeighbourCountingKernel, NeighbourCounts, PartialSums, check_neighbour_search,
};

/// KSG algorithm 1 counting rule: `eps` is the distance to the k-th nearest
/// neighbour in the joint space, marginal counts are strictly within `eps`
/// and exclude the point itself. Pairs with the
/// [`Algorithm1`](super::KsgVariant::Algorithm1) closing formula.
pub(crate) struct KsgAlg1;

fn count_neighbours(obs: &ObservationSet, cfg: ComputeConfig, i: usize) -> NeighbourCounts {
    let n = obs.len();
    let (dx, dy, dz) = obs.marginal_distances(cfg.norm, i);

    // Joint distance is the max over the marginal norms. The self entry is
    // infinite, so it is never selected as the k-th neighbour.
    let mut joint: Vec<f64> = (0..n).map(|j| dx[j].max(dy[j]).max(dz[j])).collect();
    let (_, kth, _) = joint.select_nth_unstable_by(cfg.k - 1, |a, b| a.total_cmp(b));
    let eps = *kth;

    let mut counts = NeighbourCounts {
        n_xz: 0,
        n_yz: 0,
        n_z: 0,
    };
    for j in 0..n {
        if dz[j] < eps {
            counts.n_z += 1;
            if dx[j] < eps {
                counts.n_xz += 1;
            }
            if dy[j] < eps {
                counts.n_yz += 1;
            }
        }
    }
    counts
}

impl NeighbourCountingKernel for KsgAlg1 {
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
            sums.sum_digammas += digamma(c.n_z as f64 + 1.0)
                - digamma(c.n_xz as f64 + 1.0)
                - digamma(c.n_yz as f64 + 1.0);
            sums.sum_nxz += c.n_xz as f64;
            sums.sum_nyz += c.n_yz as f64;
            sums.sum_nz += c.n_z as f64;
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
        let psi_k = digamma(cfg.k as f64);
        for (offset, slot) in out.iter_mut().enumerate() {
            let c = count_neighbours(obs, cfg, start + offset);
            *slot = psi_k + digamma(c.n_z as f64 + 1.0)
                - digamma(c.n_xz as f64 + 1.0)
                - digamma(c.n_yz as f64 + 1.0);
        }
        Ok(())
    }
}
