// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, ArrayView2};

use crate::Result;

/// Which of the two compared variables an operation applies to.
///
/// The conditioning variable Z is deliberately not listed: permuting the
/// condition corresponds to a different null hypothesis, which callers should
/// realise with a separate estimator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmiVariable {
    X,
    Y,
}

/// Lifecycle and compute surface of a conditional mutual information
/// estimator, following the initialise / add / finalise / compute paradigm.
///
/// Property values set via [`set_property`](Self::set_property) are not
/// guaranteed to take effect until the next call to
/// [`initialise`](Self::initialise). All computed values are in nats.
pub trait ConditionalMutualInfoEstimator {
    /// Reset the estimator for variables of the given dimensionalities.
    /// Previously supplied observations are dropped; properties are kept.
    fn initialise(&mut self, dim_x: usize, dim_y: usize, dim_z: usize);

    /// Set a named property. Keys are case-insensitive; unknown keys are
    /// ignored. Malformed values fail here and leave the state unchanged.
    fn set_property(&mut self, name: &str, value: &str) -> Result<()>;

    /// Supply a block of joint observations (rows = samples). May be called
    /// repeatedly between `initialise` and `finalise_add_observations`.
    fn add_observations(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        z: ArrayView2<'_, f64>,
    ) -> Result<()>;

    /// Signal that all observations have been supplied. Normalisation and
    /// noise injection (when configured) happen here, once.
    fn finalise_add_observations(&mut self) -> Result<()>;

    /// Compute the average conditional MI of the finalised observations.
    fn compute_average_local_of_observations(&mut self) -> Result<f64>;

    /// Compute the average conditional MI with one variable's samples
    /// reordered by the given gather (`new[i] = old[reordering[i]]`).
    ///
    /// The stored observations are restored verbatim before this returns,
    /// whether the computation succeeds or fails. With `reordering == None`
    /// this is identical to
    /// [`compute_average_local_of_observations`](Self::compute_average_local_of_observations).
    fn compute_average_local_of_observations_reordered(
        &mut self,
        variable: CmiVariable,
        reordering: Option<&[usize]>,
    ) -> Result<f64>;

    /// Compute the local (per-sample) conditional MI values of the finalised
    /// observations. Their mean equals the average estimate and is cached as
    /// the last average.
    fn compute_local_of_previous_observations(&mut self) -> Result<Array1<f64>>;

    /// Compute local values for new observations against the previously
    /// finalised ones. Not yet supported; always fails.
    fn compute_local_using_previous_observations(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        z: ArrayView2<'_, f64>,
    ) -> Result<Array1<f64>>;

    /// Number of finalised observations (0 before finalise).
    fn num_observations(&self) -> usize;

    /// The most recently computed average, if any.
    fn last_average(&self) -> Option<f64>;
}
