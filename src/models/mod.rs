pub mod catalog;
pub mod loaders;
pub mod outcome;
pub mod report;
pub mod unit;

pub use catalog::{DimensionCatalog, SecmCatalog, DEFAULT_DAMPING_K, SECM_VARIABLE_COUNT};
pub use loaders::{load_dimension_catalog, load_secm_catalog};
pub use outcome::{OrchestrationResult, UnitOutcome, UnitValue};
pub use report::{BiasReport, DimensionScoreSet, SecmScoreSet};
pub use unit::{UnitKind, UnitSpec};
