#![deny(missing_docs)]
#![doc = "Transition planning between solver runs: bra/ket canonicalization, density-file keys, strength reports and double-beta closure sums."]

pub mod closure;
pub mod density;
pub mod evaluator;
pub mod expect;
pub mod orchestrate;
pub mod pair;
pub mod strength;

pub use closure::{
    allowed_intermediate_spins, closure_sum, intermediate_requests, load_closure_config,
    BlockSum, ChainRuns, ClosureConfig, ClosureInput, ClosureReport, ClosureRow, DecayChain,
    DecayDirection,
};
pub use density::{DensityFileKey, DensityKind};
pub use evaluator::{DensityEvaluator, OperatorSpec, TabulatedDensity, TabulatedEntry};
pub use expect::{expectation_values, matrix_element, MatrixElementRequest};
pub use orchestrate::{
    cross_product, enumerate_pairs, CampaignManifest, DensityJob, PairOptions, PairPlan,
    PairStatus, Resolved,
};
pub use pair::{is_heavier, order, Ordered};
pub use strength::{
    aggregate_espe, espe_neighbours, parse_strength_report, read_strength_report,
    strength_from_plan, EspeMode, OrbitLabel, OrbitStrength, StrengthReport, TABLE_HEADER,
};
