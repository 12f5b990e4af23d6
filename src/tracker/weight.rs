//! Percentile-band weighting of opponent hands.

use serde::{Deserialize, Serialize};

/// Shape of the down-weighting applied outside an observed range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightParams {
    /// Percentile points below the low bound over which weight ramps down.
    pub low_spread: f64,
    /// Weight of hands far below the low bound.
    pub low_min_weight: f64,
    /// Percentile points above the high bound over which weight ramps down.
    pub high_spread: f64,
    /// Weight of hands far above the high bound.
    pub high_min_weight: f64,
}

impl Default for WeightParams {
    fn default() -> Self {
        Self {
            low_spread: 20.0,
            low_min_weight: 0.1,
            high_spread: 20.0,
            high_min_weight: 0.5,
        }
    }
}

/// How plausible a hand is given the opponent's observed preflop action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeWeight {
    /// No usable history: every hand weighs 1.
    Uniform,
    /// Hands with percentile in `[low, high]` weigh 1; hands outside ramp
    /// linearly down to the configured minimum weights.
    Banded {
        low: f64,
        high: f64,
        params: WeightParams,
    },
}

impl RangeWeight {
    /// Weight in (0, 1] for a hand at `percentile`.
    pub fn weight(&self, percentile: f64) -> f64 {
        let (low, high, p) = match *self {
            RangeWeight::Uniform => return 1.0,
            RangeWeight::Banded { low, high, params } => (low, high, params),
        };

        if percentile < low {
            let cutoff = low - p.low_spread;
            if percentile < cutoff || p.low_spread <= 0.0 {
                return p.low_min_weight;
            }
            return p.low_min_weight + (1.0 - p.low_min_weight) * (percentile - cutoff) / p.low_spread;
        }

        if percentile > high {
            let cutoff = high + p.high_spread;
            if percentile > cutoff || p.high_spread <= 0.0 {
                return p.high_min_weight;
            }
            return p.high_min_weight + (1.0 - p.high_min_weight) * (cutoff - percentile) / p.high_spread;
        }

        1.0
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, RangeWeight::Uniform)
    }
}
