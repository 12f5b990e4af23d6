//! # Heads-up Bot
//!
//! Decision engine for two-player no-limit hold'em matches played over a
//! fixed number of rounds.
//!
//! ## Features
//!
//! - **Hand Strength**: preflop table lookup, weighted Monte Carlo after the flop
//! - **Range Tracking**: per-seat statistics of the opponent's preflop escalation
//! - **Adaptive Policy**: pot-odds multipliers and bluff rates tuned from results
//! - **Bankroll Protection**: passive play once the match is won, jams when it must be
//! - **Table Generation**: parallel offline simulation of the 169-class table
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use headsup_bot::{BettingPolicy, PolicyConfig, PreflopEquityTable};
//!
//! let table = Arc::new(PreflopEquityTable::bundled()?);
//! let mut bot = BettingPolicy::new(PolicyConfig::default(), table);
//!
//! bot.begin_round(round_start);
//! let action = bot.decide(&view);
//! bot.end_round(&outcome);
//! ```
//!
//! ## Modules
//!
//! - [`cards`]: card codec, hole cards, board, deck and hand evaluation
//! - [`equity`]: preflop table, strength estimator and table generator
//! - [`tracker`]: opponent preflop range statistics
//! - [`policy`]: configuration, match state and the betting engine
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────┐      ┌──────────────┐
//!   │ Preflop      │      │ Range        │
//!   │ Equity Table │      │ Tracker      │
//!   └──────┬───────┘      └──────┬───────┘
//!          │ percentile          │ opponent weights
//!          ▼                     ▼
//!   ┌─────────────────────────────────────┐
//!   │      Hand Strength Estimator        │
//!   └──────────────────┬──────────────────┘
//!                      │ strength
//!                      ▼
//!   ┌─────────────────────────────────────┐
//!   │   Betting Policy (MatchState)       │──► fold / check / call / raise
//!   └─────────────────────────────────────┘
//! ```

/// Cards, hands and hand evaluation.
pub mod cards;

/// Preflop equity table, hand-strength estimation and table generation.
pub mod equity;

/// Opponent preflop range tracking.
pub mod tracker;

/// Betting policy engine.
pub mod policy;

// Re-export commonly used types at crate root for convenience
pub use cards::{Board, Card, HoleCards, Street};
pub use equity::{HandStrengthEstimator, PreflopEquityTable};
pub use policy::{Action, BettingPolicy, DecisionView, PolicyConfig};
pub use tracker::RangeTracker;
