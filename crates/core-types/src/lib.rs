//! # Simdeck Core Types
//!
//! The shared vocabulary of the workspace: what a scenario looks like before it
//! is sent to the simulation service, what a result looks like once it has been
//! validated, and the series/bucket shapes handed to chart renderers.
//!
//! This crate has no knowledge of HTTP, storage or the terminal. Every other
//! crate depends on it and it depends on none of them.

pub mod enums;
pub mod error;
pub mod results;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ScenarioMode, VALID_TIMEFRAMES};
pub use error::CoreError;
pub use results::{
    MonteCarloEstimate, MonteCarloRecord, PortfolioBacktest, PortfolioRecord, ProbabilityEstimate,
    ProbabilityRecord, ValidatedResult,
};
pub use series::{AlignedRow, HistogramBucket, NamedSeries};
pub use structs::{
    MonteCarloParams, PortfolioParams, ProbabilityParams, RawResult, ScenarioConfig, ScenarioParams,
};
