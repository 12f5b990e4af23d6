//! Hand-strength estimation.
//!
//! ## Modules
//!
//! - `table`: precomputed preflop win rates and percentile ranks
//! - `estimator`: weighted Monte Carlo strength on flop, turn and river
//! - `generator`: offline simulation that produces the preflop table

pub mod estimator;
pub mod generator;
pub mod table;

pub use estimator::{uniform_weight, HandStrengthEstimator, NEUTRAL_STRENGTH};
pub use generator::{write_table, TableGenerator};
pub use table::{PreflopEquityTable, TableError};
