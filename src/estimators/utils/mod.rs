// Shared utilities for the continuous estimators: norm strategies and
// surrogate permutation machinery.

pub mod norms;
pub mod surrogates;
