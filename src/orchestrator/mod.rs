pub mod unit_runner;

pub use unit_runner::{run_all, AggregationPolicy, OrchestratorOptions};
