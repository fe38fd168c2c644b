// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The KSG conditional-MI estimator: configuration surface, noise injection,
//! the parallel partition aggregator, the permutation evaluator and the
//! significance-test convenience built on it.

use std::thread;

use ndarray::{Array1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{EstimatorError, Result};
use crate::estimators::traits::{CmiVariable, ConditionalMutualInfoEstimator};
use crate::estimators::utils::norms::NormType;
use crate::estimators::utils::surrogates::{SurrogateDistribution, random_orderings};

use super::alg1::KsgAlg1;
use super::alg2::KsgAlg2;
use super::common::CondMiCommon;
use super::{ComputeConfig, KsgVariant, NeighbourCountingKernel, PartialSums};

/// Conditional mutual information estimator using Kraskov-Stoegbauer-
/// Grassberger nearest-neighbour counting in the full joint space.
///
/// Construct via [`CondMutualInformation`](crate::estimators::CondMutualInformation)
/// or [`CondMiKraskov::new`]; the algorithm variant is fixed per instance.
/// Computed values are in **nats**, not bits.
///
/// New property values are not guaranteed to take effect until the next call
/// to [`initialise`](ConditionalMutualInfoEstimator::initialise); every
/// compute call snapshots the configuration at entry.
pub struct CondMiKraskov {
    common: CondMiCommon,
    variant: KsgVariant,
    kernel: Box<dyn NeighbourCountingKernel>,
    k: usize,
    norm: NormType,
    add_noise: bool,
    noise_level: f64,
    num_threads: usize,
}

impl CondMiKraskov {
    /// Property name for the number of nearest neighbours in the joint
    /// space (default 4).
    pub const PROP_K: &'static str = "k";
    /// Property name for the norm between data points in each marginal
    /// space; values are parsed by [`NormType::parse`] (default MAX_NORM).
    pub const PROP_NORM_TYPE: &'static str = "NORM_TYPE";
    /// Property name for the standard deviation of random Gaussian noise to
    /// add to the data at finalise time (default off).
    pub const PROP_ADD_NOISE: &'static str = "NOISE_LEVEL_TO_ADD";
    /// Property name for the number of worker threads per compute call
    /// (default all available).
    pub const PROP_NUM_THREADS: &'static str = "NUM_THREADS";
    /// Value for [`PROP_NUM_THREADS`](Self::PROP_NUM_THREADS) meaning all
    /// available hardware parallelism.
    pub const USE_ALL_THREADS: &'static str = "USE_ALL";

    pub fn new(variant: KsgVariant) -> Self {
        let kernel: Box<dyn NeighbourCountingKernel> = match variant {
            KsgVariant::Algorithm1 => Box::new(KsgAlg1),
            KsgVariant::Algorithm2 => Box::new(KsgAlg2),
        };
        Self {
            common: CondMiCommon::new(),
            variant,
            kernel,
            k: 4,
            norm: NormType::default(),
            add_noise: false,
            noise_level: 0.0,
            num_threads: available_parallelism(),
        }
    }

    pub fn variant(&self) -> KsgVariant {
        self.variant
    }

    /// Permutation test: evaluate the estimator once on the given
    /// observations and once per random reordering of `variable`, producing
    /// an empirical null distribution. The stored observations are unchanged
    /// afterwards.
    pub fn compute_significance<R: Rng + ?Sized>(
        &mut self,
        variable: CmiVariable,
        num_permutations: usize,
        rng: &mut R,
    ) -> Result<SurrogateDistribution> {
        let n = self.common.num_observations();
        if n == 0 {
            return Err(EstimatorError::NoObservations);
        }
        let orderings = random_orderings(n, num_permutations, rng);
        self.compute_significance_with_orderings(variable, &orderings)
    }

    /// As [`compute_significance`](Self::compute_significance), with
    /// caller-supplied orderings (one surrogate per ordering).
    pub fn compute_significance_with_orderings(
        &mut self,
        variable: CmiVariable,
        orderings: &[Vec<usize>],
    ) -> Result<SurrogateDistribution> {
        let actual_value = self.compute_average_local_of_observations()?;
        let mut surrogates = Vec::with_capacity(orderings.len());
        for ordering in orderings {
            surrogates
                .push(self.compute_average_local_of_observations_reordered(variable, Some(ordering))?);
        }
        Ok(SurrogateDistribution {
            surrogates,
            actual_value,
        })
    }

    fn snapshot(&self) -> ComputeConfig {
        ComputeConfig {
            k: self.k,
            norm: self.norm,
            num_threads: self.num_threads,
        }
    }

    /// Average estimate of the finalised observations under `cfg`, without
    /// touching the last-average cache.
    fn average_value(&self, cfg: ComputeConfig) -> Result<f64> {
        let obs = self.common.observations()?;
        let sums = self.aggregate_sums(cfg)?;
        Ok(self.variant.combine(&sums, obs.len(), cfg.k))
    }

    /// Partition aggregator, averages path: split the sample range over the
    /// configured worker count and merge the per-block sufficient
    /// statistics.
    fn aggregate_sums(&self, cfg: ComputeConfig) -> Result<PartialSums> {
        let obs = self.common.observations()?;
        let n = obs.len();
        if n == 0 {
            return Err(EstimatorError::NoObservations);
        }
        let kernel = self.kernel.as_ref();
        if cfg.num_threads == 1 {
            return kernel.partial_sums(obs, cfg, 0, n);
        }

        let lengths = block_lengths(n, cfg.num_threads);
        log::debug!(
            "computing Kraskov conditional MI with {} threads ({} samples each, {} residual to the first)",
            cfg.num_threads,
            n / cfg.num_threads,
            n % cfg.num_threads
        );
        let results: Vec<Result<PartialSums>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(lengths.len());
            let mut start = 0usize;
            for &len in &lengths {
                handles.push(s.spawn(move || kernel.partial_sums(obs, cfg, start, len)));
                start += len;
            }
            // Full barrier: every worker is joined before any result is read.
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        // First failure in block order wins; a failed block contributes
        // nothing to the merge.
        let mut merged = PartialSums::default();
        for result in results {
            merged.merge(&result?);
        }
        Ok(merged)
    }

    /// Partition aggregator, locals path: each worker writes its own
    /// disjoint slice of the output sequence.
    fn local_values(&self, cfg: ComputeConfig) -> Result<Array1<f64>> {
        let obs = self.common.observations()?;
        let n = obs.len();
        if n == 0 {
            return Err(EstimatorError::NoObservations);
        }
        let kernel = self.kernel.as_ref();
        let mut locals = vec![0.0f64; n];
        if cfg.num_threads == 1 {
            kernel.partial_locals(obs, cfg, 0, &mut locals)?;
            return Ok(Array1::from_vec(locals));
        }

        let lengths = block_lengths(n, cfg.num_threads);
        let results: Vec<Result<()>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(lengths.len());
            let mut start = 0usize;
            let mut remaining: &mut [f64] = &mut locals;
            for &len in &lengths {
                let (block, rest) = std::mem::take(&mut remaining).split_at_mut(len);
                remaining = rest;
                handles.push(s.spawn(move || kernel.partial_locals(obs, cfg, start, block)));
                start += len;
            }
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });
        for result in results {
            result?;
        }
        Ok(Array1::from_vec(locals))
    }

    /// Add independent Gaussian jitter to every coordinate of every stored
    /// observation. Runs once, directly after finalisation, so everything
    /// downstream (including permutation surrogates) sees the noised data.
    fn add_observation_noise(&mut self) -> Result<()> {
        let noise = Normal::new(0.0, self.noise_level)
            .expect("noise level is validated at set_property time");
        let mut rng = rand::thread_rng();
        let obs = self.common.observations_mut()?;
        for array in [&mut obs.x, &mut obs.y, &mut obs.z] {
            for value in array.iter_mut() {
                *value += noise.sample(&mut rng);
            }
        }
        Ok(())
    }
}

impl ConditionalMutualInfoEstimator for CondMiKraskov {
    fn initialise(&mut self, dim_x: usize, dim_y: usize, dim_z: usize) {
        self.common.initialise(dim_x, dim_y, dim_z);
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(Self::PROP_K) {
            let k: usize = value
                .parse()
                .map_err(|e| EstimatorError::bad_property(name, value, e))?;
            if k == 0 {
                return Err(EstimatorError::bad_property(name, value, "k must be >= 1"));
            }
            self.k = k;
        } else if name.eq_ignore_ascii_case(Self::PROP_NORM_TYPE) {
            self.norm = NormType::parse(value)?;
        } else if name.eq_ignore_ascii_case(Self::PROP_ADD_NOISE) {
            let level: f64 = value
                .parse()
                .map_err(|e| EstimatorError::bad_property(name, value, e))?;
            if !(level >= 0.0) {
                return Err(EstimatorError::bad_property(
                    name,
                    value,
                    "noise level must be non-negative",
                ));
            }
            self.add_noise = true;
            self.noise_level = level;
        } else if name.eq_ignore_ascii_case(Self::PROP_NUM_THREADS) {
            if value.eq_ignore_ascii_case(Self::USE_ALL_THREADS) {
                self.num_threads = available_parallelism();
            } else {
                let threads: usize = value
                    .parse()
                    .map_err(|e| EstimatorError::bad_property(name, value, e))?;
                if threads == 0 {
                    return Err(EstimatorError::bad_property(
                        name,
                        value,
                        "thread count must be >= 1",
                    ));
                }
                self.num_threads = threads;
            }
        } else {
            self.common.set_property(name, value)?;
        }
        Ok(())
    }

    fn add_observations(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        z: ArrayView2<'_, f64>,
    ) -> Result<()> {
        self.common.add_observations(x, y, z)
    }

    fn finalise_add_observations(&mut self) -> Result<()> {
        self.common.finalise_add_observations()?;
        if self.add_noise && self.noise_level > 0.0 {
            self.add_observation_noise()?;
        }
        Ok(())
    }

    fn compute_average_local_of_observations(&mut self) -> Result<f64> {
        let cfg = self.snapshot();
        let average = self.average_value(cfg)?;
        self.common.set_last_average(average);
        Ok(average)
    }

    fn compute_average_local_of_observations_reordered(
        &mut self,
        variable: CmiVariable,
        reordering: Option<&[usize]>,
    ) -> Result<f64> {
        let Some(reordering) = reordering else {
            return self.compute_average_local_of_observations();
        };
        let cfg = self.snapshot();
        let n = self.common.num_observations();
        if reordering.len() != n {
            return Err(EstimatorError::BadReordering {
                len: reordering.len(),
                n,
            });
        }

        // Swap in the gathered copy, keeping the original by ownership.
        let original = {
            let obs = self.common.observations_mut()?;
            let target = match variable {
                CmiVariable::X => &mut obs.x,
                CmiVariable::Y => &mut obs.y,
            };
            let permuted = target.select(Axis(0), reordering);
            std::mem::replace(target, permuted)
        };

        let outcome = self.average_value(cfg);

        // Restore before the single propagation point below, so a failed
        // estimate never leaves the instance holding permuted data.
        let obs = self
            .common
            .observations_mut()
            .expect("observations cannot vanish during a reordered estimate");
        match variable {
            CmiVariable::X => obs.x = original,
            CmiVariable::Y => obs.y = original,
        }
        outcome
    }

    fn compute_local_of_previous_observations(&mut self) -> Result<Array1<f64>> {
        let cfg = self.snapshot();
        let locals = self.local_values(cfg)?;
        let mean = locals.mean().unwrap_or(0.0);
        self.common.set_last_average(mean);
        Ok(locals)
    }

    fn compute_local_using_previous_observations(
        &mut self,
        _x: ArrayView2<'_, f64>,
        _y: ArrayView2<'_, f64>,
        _z: ArrayView2<'_, f64>,
    ) -> Result<Array1<f64>> {
        // Would need to replay the stored normalisation on the new data.
        Err(EstimatorError::Unsupported(
            "local values for new observations are not implemented yet",
        ))
    }

    fn num_observations(&self) -> usize {
        self.common.num_observations()
    }

    fn last_average(&self) -> Option<f64> {
        self.common.last_average()
    }
}

fn available_parallelism() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Contiguous block lengths for `workers` blocks over `n` samples: every
/// block gets `n / workers` samples and the first additionally absorbs the
/// remainder.
fn block_lengths(n: usize, workers: usize) -> Vec<usize> {
    let base = n / workers;
    let residual = n % workers;
    (0..workers)
        .map(|t| if t == 0 { base + residual } else { base })
        .collect()
}
