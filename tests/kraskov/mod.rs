mod permutation;
mod properties;
mod significance;
