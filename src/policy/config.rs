//! Tunable parameters of the betting policy.
//!
//! Every constant the engine uses lives here so that a strategy profile can
//! be swapped without touching the decision code. Configurations serialize to
//! JSON; a file only needs to name the values it overrides.
//!
//! # Example
//! ```
//! use headsup_bot::policy::PolicyConfig;
//!
//! let config = PolicyConfig::from_json_str(r#"{ "simulation_iterations": 300 }"#).unwrap();
//! assert_eq!(config.simulation_iterations, 300);
//! assert_eq!(config.preflop.all_in, PolicyConfig::default().preflop.all_in);
//! ```

use crate::cards::card::Street;
use crate::tracker::{BucketBoundaries, WeightParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Stakes and match length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Stack each player starts every round with.
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    /// Rounds in a match.
    pub num_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_stack: 400,
            small_blind: 1,
            big_blind: 2,
            num_rounds: 1000,
        }
    }
}

/// Reverse-percentile thresholds for one blind seat.
///
/// A hand's reverse percentile is `100 - percentile`, so 0 is the best hand
/// and a threshold of 20 admits roughly the top 20% of hands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatThresholds {
    /// Raise when nobody has raised yet.
    pub open: f64,
    /// Call a single raise.
    pub defend: f64,
    /// Re-raise a single raise.
    pub reraise: f64,
    /// Call after multiple raises.
    pub redefend: f64,
    /// Largest opponent contribution still treated as a single raise.
    pub raise_limit: u32,
}

/// Preflop hand-selection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflopConfig {
    pub small_blind: SeatThresholds,
    pub big_blind: SeatThresholds,
    /// Jam over multiple raises from either seat.
    pub all_in: f64,
}

impl Default for PreflopConfig {
    fn default() -> Self {
        Self {
            small_blind: SeatThresholds {
                open: 80.0,
                defend: 50.0,
                reraise: 15.0,
                redefend: 12.0,
                raise_limit: 50,
            },
            big_blind: SeatThresholds {
                open: 65.0,
                defend: 65.0,
                reraise: 25.0,
                redefend: 18.0,
                raise_limit: 20,
            },
            all_in: 6.0,
        }
    }
}

impl PreflopConfig {
    pub fn seat(&self, big_blind: bool) -> &SeatThresholds {
        if big_blind {
            &self.big_blind
        } else {
            &self.small_blind
        }
    }
}

/// Preflop raise multiple applied to the opponent's contribution, for
/// contributions up to `up_to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingBracket {
    pub up_to: u32,
    pub multiple: f64,
}

/// Raise sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Preflop brackets in increasing `up_to` order; beyond the last bracket
    /// the engine raises the maximum.
    pub preflop_brackets: Vec<SizingBracket>,
    /// Postflop raise size as a fraction of the pot after calling.
    pub postflop_pot_fraction: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            preflop_brackets: vec![
                SizingBracket { up_to: 2, multiple: 4.0 },
                SizingBracket { up_to: 12, multiple: 4.0 },
                SizingBracket { up_to: 40, multiple: 2.5 },
            ],
            postflop_pot_fraction: 0.7,
        }
    }
}

/// Cutoffs for one postflop street.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetParams {
    /// Share of strength conceded per unit of raise pressure.
    pub out_of_range: f64,
    /// Scaled strength above which a continue becomes a raise.
    pub reraise: f64,
    /// Strength above which the big blind bets first.
    pub lead: f64,
    /// Strength above which the small blind bets when checked to.
    pub cbet: f64,
}

/// Per-street postflop cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetTable {
    pub flop: StreetParams,
    pub turn: StreetParams,
    pub river: StreetParams,
}

impl Default for StreetTable {
    fn default() -> Self {
        Self {
            flop: StreetParams { out_of_range: 0.15, reraise: 0.8, lead: 0.4, cbet: 0.25 },
            turn: StreetParams { out_of_range: 0.2, reraise: 0.825, lead: 0.45, cbet: 0.3 },
            river: StreetParams { out_of_range: 0.25, reraise: 0.85, lead: 0.5, cbet: 0.35 },
        }
    }
}

impl StreetTable {
    /// Parameters for a postflop street; preflop maps to the flop entry.
    pub fn get(&self, street: Street) -> &StreetParams {
        match street {
            Street::Preflop | Street::Flop => &self.flop,
            Street::Turn => &self.turn,
            Street::River => &self.river,
        }
    }

    fn all(&self) -> [(&'static str, &StreetParams); 3] {
        [("flop", &self.flop), ("turn", &self.turn), ("river", &self.river)]
    }
}

/// Raise pressure accumulated within a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// Cap on the pressure a single bet faced can add.
    pub max_per_bet: f64,
    /// Pressure added by each of our own raises.
    pub own_raise: f64,
    /// Floor of decayed strength.
    pub strength_floor: f64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            max_per_bet: 4.0,
            own_raise: 1.4,
            strength_floor: 0.1,
        }
    }
}

/// Bluff frequencies by bluff family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BluffRates {
    /// Betting first as the big blind.
    pub lead: f64,
    /// Betting when checked to as the small blind.
    pub cbet: f64,
    /// Raising a bet.
    pub raise: f64,
}

impl Default for BluffRates {
    fn default() -> Self {
        Self {
            lead: 0.1,
            cbet: 0.2,
            raise: 0.3,
        }
    }
}

/// Online adaptation of multipliers and bluff rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    pub multiplier_step: f64,
    pub multiplier_min: f64,
    pub multiplier_max: f64,
    pub bluff_step: f64,
    pub initial_bluff: BluffRates,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            multiplier_step: 0.05,
            multiplier_min: 0.33,
            multiplier_max: 2.0,
            bluff_step: 0.02,
            initial_bluff: BluffRates::default(),
        }
    }
}

/// Opponent range tracking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// First round in which tracker weighting is used.
    pub warmup_round: u32,
    pub weights: WeightParams,
    pub buckets: BucketBoundaries,
    /// Multiply tracker weights by the hand's raw preflop equity.
    pub equity_bias: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            warmup_round: 150,
            weights: WeightParams::default(),
            buckets: BucketBoundaries::default(),
            equity_bias: false,
        }
    }
}

/// When bluffing is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BluffingConfig {
    /// No bluffs before this round.
    pub start_round: u32,
    /// No bluffs for the rest of a round once the opponent has put in more.
    pub max_opponent_contribution: u32,
}

impl Default for BluffingConfig {
    fn default() -> Self {
        Self {
            start_round: 100,
            max_opponent_contribution: 100,
        }
    }
}

/// Complete policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub game: GameConfig,
    pub preflop: PreflopConfig,
    pub sizing: SizingConfig,
    pub streets: StreetTable,
    pub pressure: PressureConfig,
    pub adaptation: AdaptationConfig,
    pub tracker: TrackerConfig,
    pub bluffing: BluffingConfig,
    /// Play passively for the rest of the match once the lead cannot be lost.
    pub guaranteed_win_enabled: bool,
    /// Monte Carlo iterations per postflop decision.
    pub simulation_iterations: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            preflop: PreflopConfig::default(),
            sizing: SizingConfig::default(),
            streets: StreetTable::default(),
            pressure: PressureConfig::default(),
            adaptation: AdaptationConfig::default(),
            tracker: TrackerConfig::default(),
            bluffing: BluffingConfig::default(),
            guaranteed_win_enabled: true,
            simulation_iterations: 1000,
        }
    }
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker weights composed with raw preflop equity, a shorter warm-up
    /// and tighter preflop re-raising.
    pub fn equity_weighted() -> Self {
        let defaults = Self::default();
        Self {
            preflop: PreflopConfig {
                small_blind: SeatThresholds {
                    open: 81.0,
                    defend: 50.0,
                    reraise: 10.0,
                    redefend: 8.0,
                    ..defaults.preflop.small_blind
                },
                big_blind: SeatThresholds {
                    open: 65.0,
                    defend: 75.0,
                    reraise: 21.0,
                    redefend: 18.0,
                    ..defaults.preflop.big_blind
                },
                all_in: 5.0,
            },
            tracker: TrackerConfig {
                warmup_round: 100,
                weights: WeightParams {
                    high_spread: 10.0,
                    ..WeightParams::default()
                },
                equity_bias: true,
                ..defaults.tracker
            },
            simulation_iterations: 200,
            ..defaults
        }
    }

    /// Wide limp-raising and defending.
    pub fn aggressive() -> Self {
        let defaults = Self::default();
        Self {
            preflop: PreflopConfig {
                small_blind: SeatThresholds {
                    open: 80.0,
                    defend: 50.0,
                    reraise: 20.0,
                    redefend: 15.0,
                    ..defaults.preflop.small_blind
                },
                big_blind: SeatThresholds {
                    open: 90.0,
                    defend: 60.0,
                    reraise: 30.0,
                    redefend: 15.0,
                    ..defaults.preflop.big_blind
                },
                all_in: 10.0,
            },
            ..defaults
        }
    }

    /// Tight preflop selection; the tracker never warms up.
    pub fn nit() -> Self {
        let defaults = Self::default();
        let tight = |seat: SeatThresholds| SeatThresholds {
            open: 20.0,
            defend: 20.0,
            reraise: 7.0,
            redefend: 5.0,
            ..seat
        };
        Self {
            preflop: PreflopConfig {
                small_blind: tight(defaults.preflop.small_blind),
                big_blind: tight(defaults.preflop.big_blind),
                all_in: 5.0,
            },
            tracker: TrackerConfig {
                warmup_round: u32::MAX,
                ..defaults.tracker
            },
            ..defaults
        }
    }

    /// Builder method: set Monte Carlo iterations per decision.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.simulation_iterations = iterations;
        self
    }

    /// Builder method: set the first round that uses tracker weighting.
    pub fn with_tracker_warmup(mut self, round: u32) -> Self {
        self.tracker.warmup_round = round;
        self
    }

    /// Builder method: enable or disable the guaranteed-win latch.
    pub fn with_guaranteed_win(mut self, enable: bool) -> Self {
        self.guaranteed_win_enabled = enable;
        self
    }

    /// Builder method: set the first round in which bluffs are allowed.
    pub fn with_bluff_start(mut self, round: u32) -> Self {
        self.bluffing.start_round = round;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.game;
        if g.small_blind == 0 || g.small_blind > g.big_blind || g.big_blind > g.starting_stack {
            return Err(ConfigError::InvalidBlinds {
                small: g.small_blind,
                big: g.big_blind,
                stack: g.starting_stack,
            });
        }
        if g.num_rounds == 0 {
            return Err(ConfigError::OutOfRange {
                field: "game.num_rounds".into(),
                value: 0.0,
            });
        }

        for (seat, t) in [("small_blind", &self.preflop.small_blind), ("big_blind", &self.preflop.big_blind)] {
            for (name, value) in [
                ("open", t.open),
                ("defend", t.defend),
                ("reraise", t.reraise),
                ("redefend", t.redefend),
            ] {
                check_range(&format!("preflop.{seat}.{name}"), value, 0.0, 100.0)?;
            }
        }
        check_range("preflop.all_in", self.preflop.all_in, 0.0, 100.0)?;

        let mut last = 0;
        for bracket in &self.sizing.preflop_brackets {
            if bracket.up_to <= last && last != 0 {
                return Err(ConfigError::InvalidSizing("preflop brackets must increase".into()));
            }
            if bracket.multiple <= 0.0 {
                return Err(ConfigError::InvalidSizing(format!(
                    "bracket up to {} has multiple {}",
                    bracket.up_to, bracket.multiple
                )));
            }
            last = bracket.up_to;
        }
        if self.sizing.postflop_pot_fraction <= 0.0 {
            return Err(ConfigError::InvalidSizing(format!(
                "postflop pot fraction {}",
                self.sizing.postflop_pot_fraction
            )));
        }

        for (name, street) in self.streets.all() {
            check_range(&format!("streets.{name}.out_of_range"), street.out_of_range, 0.0, 0.99)?;
            check_range(&format!("streets.{name}.reraise"), street.reraise, 0.0, 2.0)?;
            check_range(&format!("streets.{name}.lead"), street.lead, 0.0, 1.0)?;
            check_range(&format!("streets.{name}.cbet"), street.cbet, 0.0, 1.0)?;
        }

        check_range("pressure.strength_floor", self.pressure.strength_floor, 0.0, 1.0)?;
        check_range("pressure.max_per_bet", self.pressure.max_per_bet, 0.0, f64::MAX)?;
        check_range("pressure.own_raise", self.pressure.own_raise, 0.0, f64::MAX)?;

        let a = &self.adaptation;
        if !(a.multiplier_min > 0.0 && a.multiplier_min <= 1.0 && a.multiplier_max >= 1.0) {
            return Err(ConfigError::InvalidMultiplierBounds {
                min: a.multiplier_min,
                max: a.multiplier_max,
            });
        }
        check_range("adaptation.multiplier_step", a.multiplier_step, 0.0, 1.0)?;
        check_range("adaptation.bluff_step", a.bluff_step, 0.0, 1.0)?;
        check_range("adaptation.initial_bluff.lead", a.initial_bluff.lead, 0.0, 1.0)?;
        check_range("adaptation.initial_bluff.cbet", a.initial_bluff.cbet, 0.0, 1.0)?;
        check_range("adaptation.initial_bluff.raise", a.initial_bluff.raise, 0.0, 1.0)?;

        let w = &self.tracker.weights;
        if w.low_spread <= 0.0 {
            return Err(ConfigError::ZeroSpread("tracker.weights.low_spread"));
        }
        if w.high_spread <= 0.0 {
            return Err(ConfigError::ZeroSpread("tracker.weights.high_spread"));
        }
        check_range("tracker.weights.low_min_weight", w.low_min_weight, 0.0, 1.0)?;
        check_range("tracker.weights.high_min_weight", w.high_min_weight, 0.0, 1.0)?;
        if !self.tracker.buckets.is_valid() {
            return Err(ConfigError::InvalidBuckets(self.tracker.buckets));
        }

        if self.simulation_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Errors that can occur when loading or validating a policy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid blinds {small}/{big} for stack {stack}")]
    InvalidBlinds { small: u32, big: u32, stack: u32 },
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: String, value: f64 },
    #[error("invalid sizing: {0}")]
    InvalidSizing(String),
    #[error("multiplier bounds [{min}, {max}] must contain 1")]
    InvalidMultiplierBounds { min: f64, max: f64 },
    #[error("{0} must be positive")]
    ZeroSpread(&'static str),
    #[error("bucket boundaries {0:?} must be strictly increasing")]
    InvalidBuckets(BucketBoundaries),
    #[error("simulation iterations must be positive")]
    ZeroIterations,
}
