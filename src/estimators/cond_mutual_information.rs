use crate::estimators::approaches::kraskov::{CondMiKraskov, KsgVariant};

/// Factory for conditional mutual information estimators.
///
/// Currently only the KSG (Kraskov) family is provided; the two constructors
/// correspond to the two Kraskov algorithm variants, which differ in their
/// neighbour-counting convention and closing formula. The variant is fixed
/// for the lifetime of the returned estimator.
pub struct CondMutualInformation;

impl CondMutualInformation {
    /// KSG algorithm 1: strict counting within the k-th joint radius.
    pub fn new_kraskov_1() -> CondMiKraskov {
        CondMiKraskov::new(KsgVariant::Algorithm1)
    }

    /// KSG algorithm 2: inclusive counting within per-subspace radii.
    /// More robust for independence testing.
    pub fn new_kraskov_2() -> CondMiKraskov {
        CondMiKraskov::new(KsgVariant::Algorithm2)
    }
}
