//! Adaptive betting policy.
//!
//! ## Modules
//!
//! - `action`: actions, legal action sets and the per-decision game view
//! - `config`: tunable thresholds, presets and JSON loading
//! - `state`: the match-state aggregate learned round over round
//! - `engine`: the decision procedure

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

pub use action::{Action, DecisionView, LegalActions, RaiseBounds, RoundOutcome, RoundStart};
pub use config::{ConfigError, PolicyConfig};
pub use engine::{BettingPolicy, Candidates};
pub use state::{MatchState, RoundPhase};
