// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base functionality shared by the conditional-MI estimators: observation
//! accumulation and finalisation, column normalisation and the last-average
//! cache. The KSG-specific configuration and computation live on top of this
//! in [`kraskov_cmi`](super::kraskov_cmi).

use ndarray::{Array2, ArrayView2, Axis, concatenate};

use crate::error::{EstimatorError, Result};
use crate::estimators::utils::norms::NormType;

/// The finalised joint observations: three parallel sample matrices
/// (rows = samples) of fixed per-variable dimensionality.
pub struct ObservationSet {
    pub(crate) x: Array2<f64>,
    pub(crate) y: Array2<f64>,
    pub(crate) z: Array2<f64>,
}

impl ObservationSet {
    /// Number of joint samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distances from sample `i` to every sample in each marginal subspace,
    /// under the given norm. The self entries are set to infinity so sample
    /// `i` never counts as its own neighbour.
    pub(crate) fn marginal_distances(
        &self,
        norm: NormType,
        i: usize,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let n = self.len();
        let (xi, yi, zi) = (self.x.row(i), self.y.row(i), self.z.row(i));
        let mut dx = Vec::with_capacity(n);
        let mut dy = Vec::with_capacity(n);
        let mut dz = Vec::with_capacity(n);
        for j in 0..n {
            dx.push(norm.norm(xi, self.x.row(j)));
            dy.push(norm.norm(yi, self.y.row(j)));
            dz.push(norm.norm(zi, self.z.row(j)));
        }
        dx[i] = f64::INFINITY;
        dy[i] = f64::INFINITY;
        dz[i] = f64::INFINITY;
        (dx, dy, dz)
    }
}

/// Observation lifecycle shared by the conditional-MI estimator family:
/// `initialise`, repeated `add_observations`, then
/// `finalise_add_observations`.
pub struct CondMiCommon {
    dim_x: usize,
    dim_y: usize,
    dim_z: usize,
    initialised: bool,
    normalise: bool,
    pending: Vec<(Array2<f64>, Array2<f64>, Array2<f64>)>,
    observations: Option<ObservationSet>,
    last_average: Option<f64>,
}

impl CondMiCommon {
    /// Property name for whether to normalise incoming observations to zero
    /// mean and unit variance per column (default true).
    pub const PROP_NORMALISE: &'static str = "NORMALISE";

    pub fn new() -> Self {
        Self {
            dim_x: 0,
            dim_y: 0,
            dim_z: 0,
            initialised: false,
            normalise: true,
            pending: Vec::new(),
            observations: None,
            last_average: None,
        }
    }

    /// Reset for variables of the given dimensionalities. Drops any
    /// accumulated or finalised observations; properties are kept.
    pub fn initialise(&mut self, dim_x: usize, dim_y: usize, dim_z: usize) {
        self.dim_x = dim_x;
        self.dim_y = dim_y;
        self.dim_z = dim_z;
        self.initialised = true;
        self.pending.clear();
        self.observations = None;
        self.last_average = None;
    }

    /// Properties owned by the base estimator. Unknown names are ignored.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(Self::PROP_NORMALISE) {
            self.normalise = value
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|e| EstimatorError::bad_property(name, value, e))?;
        }
        Ok(())
    }

    pub fn add_observations(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        z: ArrayView2<'_, f64>,
    ) -> Result<()> {
        if !self.initialised {
            return Err(EstimatorError::NotInitialised);
        }
        for (variable, ncols, expected) in [
            ("X", x.ncols(), self.dim_x),
            ("Y", y.ncols(), self.dim_y),
            ("Z", z.ncols(), self.dim_z),
        ] {
            if ncols != expected {
                return Err(EstimatorError::DimensionMismatch {
                    variable,
                    expected,
                    got: ncols,
                });
            }
        }
        for (variable, rows) in [("Y", y.nrows()), ("Z", z.nrows())] {
            if rows != x.nrows() {
                return Err(EstimatorError::DimensionMismatch {
                    variable,
                    expected: x.nrows(),
                    got: rows,
                });
            }
        }
        self.pending.push((x.to_owned(), y.to_owned(), z.to_owned()));
        Ok(())
    }

    /// Concatenate the accumulated blocks and normalise (when enabled).
    pub fn finalise_add_observations(&mut self) -> Result<()> {
        if !self.initialised {
            return Err(EstimatorError::NotInitialised);
        }
        if self.pending.is_empty() {
            return Err(EstimatorError::NoObservations);
        }
        let views_x: Vec<_> = self.pending.iter().map(|(x, _, _)| x.view()).collect();
        let views_y: Vec<_> = self.pending.iter().map(|(_, y, _)| y.view()).collect();
        let views_z: Vec<_> = self.pending.iter().map(|(_, _, z)| z.view()).collect();
        let mut x = concatenate(Axis(0), &views_x).expect("pending X blocks share one width");
        let mut y = concatenate(Axis(0), &views_y).expect("pending Y blocks share one width");
        let mut z = concatenate(Axis(0), &views_z).expect("pending Z blocks share one width");
        self.pending.clear();

        if self.normalise {
            normalise_columns(&mut x);
            normalise_columns(&mut y);
            normalise_columns(&mut z);
        }
        self.observations = Some(ObservationSet { x, y, z });
        self.last_average = None;
        Ok(())
    }

    pub fn observations(&self) -> Result<&ObservationSet> {
        self.observations
            .as_ref()
            .ok_or(EstimatorError::NoObservations)
    }

    pub(crate) fn observations_mut(&mut self) -> Result<&mut ObservationSet> {
        self.observations
            .as_mut()
            .ok_or(EstimatorError::NoObservations)
    }

    pub fn num_observations(&self) -> usize {
        self.observations.as_ref().map_or(0, ObservationSet::len)
    }

    pub fn last_average(&self) -> Option<f64> {
        self.last_average
    }

    pub(crate) fn set_last_average(&mut self, value: f64) {
        self.last_average = Some(value);
    }
}

impl Default for CondMiCommon {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift and scale each column to zero mean and unit sample standard
/// deviation. Constant columns are only centred.
fn normalise_columns(data: &mut Array2<f64>) {
    let n = data.nrows();
    if n < 2 {
        return;
    }
    for mut col in data.columns_mut() {
        let mean = col.mean().unwrap_or(0.0);
        let var = col.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n as f64 - 1.0);
        let std = var.sqrt();
        if std > 0.0 {
            col.mapv_inplace(|v| (v - mean) / std);
        } else {
            col.mapv_inplace(|v| v - mean);
        }
    }
}
