// SPDX-FileCopyrightText: 2026 condmeasure developers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Error type for estimator configuration and computation.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// A property value could not be parsed at `set_property` time.
    /// The estimator state is unchanged when this is raised.
    #[error("invalid value {value:?} for property {name:?}: {reason}")]
    BadProperty {
        name: String,
        value: String,
        reason: String,
    },

    /// The norm parser rejected a `NORM_TYPE` value.
    #[error("unknown norm type {0:?} (expected MAX_NORM, EUCLIDEAN or EUCLIDEAN_SQUARED)")]
    UnknownNorm(String),

    /// An observation or compute call arrived before `initialise`.
    #[error("estimator has not been initialised")]
    NotInitialised,

    /// An observation block does not match the initialised dimensionality,
    /// or the variables disagree on the number of samples.
    #[error("dimension mismatch for {variable}: expected {expected}, got {got}")]
    DimensionMismatch {
        variable: &'static str,
        expected: usize,
        got: usize,
    },

    /// Finalise or compute was called with no accumulated observations.
    #[error("no observations have been added")]
    NoObservations,

    /// The neighbour search is degenerate: fewer than k+1 samples.
    #[error("too few observations (N = {n}) for k = {k} nearest neighbours")]
    TooFewObservations { n: usize, k: usize },

    /// A reordering did not have one entry per observation.
    #[error("reordering has length {len}, expected {n}")]
    BadReordering { len: usize, n: usize },

    /// Entry points declared by the contract but not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl EstimatorError {
    pub(crate) fn bad_property(name: &str, value: &str, reason: impl ToString) -> Self {
        EstimatorError::BadProperty {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
