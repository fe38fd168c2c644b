pub mod cond_mutual_information;
pub mod traits;
pub mod approaches;
pub mod utils;

pub use cond_mutual_information::CondMutualInformation;
pub use traits::{CmiVariable, ConditionalMutualInfoEstimator};

// Unified re-exports so users can import
// condmeasure::estimators::* ergonomically.
pub use approaches::kraskov::{CondMiKraskov, KsgVariant, PartialSums};
pub use utils::norms::NormType;
pub use utils::surrogates::SurrogateDistribution;
