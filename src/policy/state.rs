//! Mutable per-match state owned by the betting policy.

use super::action::{RoundOutcome, RoundStart};
use super::config::{AdaptationConfig, BluffRates};
use crate::cards::card::Street;
use crate::tracker::{BucketBoundaries, RangeTracker};
use serde::Serialize;
use std::cmp::Ordering;

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    Preflop,
    Flop,
    Turn,
    River,
    /// Resolved; waiting for the next round.
    Terminal,
}

impl From<Street> for RoundPhase {
    fn from(street: Street) -> Self {
        match street {
            Street::Preflop => RoundPhase::Preflop,
            Street::Flop => RoundPhase::Flop,
            Street::Turn => RoundPhase::Turn,
            Street::River => RoundPhase::River,
        }
    }
}

/// Flags and counters reset at the start of every round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundFlags {
    pub round_num: u32,
    pub big_blind: bool,
    /// We chose to continue against a bet on this street, by street index.
    pub called: [bool; 4],
    pub did_lead: bool,
    pub did_cbet: bool,
    pub did_raise: bool,
    /// Our last preflop action was a raise.
    pub we_last_raised: bool,
    /// Accumulated raise pressure.
    pub pressure: f64,
    /// Bluffs are allowed this round.
    pub will_bluff: bool,
    /// Preflop contribution once it is settled.
    pub settled_preflop: Option<u32>,
}

impl RoundFlags {
    pub fn new(start: &RoundStart, will_bluff: bool) -> Self {
        Self {
            round_num: start.round_num,
            big_blind: start.big_blind,
            will_bluff,
            ..Self::default()
        }
    }
}

/// Everything the policy learns and tracks over a match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    pub tracker: RangeTracker,
    /// Pot-odds multipliers by street index.
    pub multipliers: [f64; 4],
    pub bluff: BluffRates,
    /// Latched once the match cannot be lost.
    pub guaranteed_win: bool,
    /// Chips we may commit this round before bankroll protection jams.
    pub max_loss: i64,
    pub round: RoundFlags,
    pub phase: RoundPhase,
}

impl MatchState {
    pub fn new(buckets: BucketBoundaries, adaptation: &AdaptationConfig) -> Self {
        Self {
            tracker: RangeTracker::new(buckets),
            multipliers: [1.0; 4],
            bluff: adaptation.initial_bluff,
            guaranteed_win: false,
            max_loss: i64::MAX,
            round: RoundFlags::default(),
            phase: RoundPhase::Terminal,
        }
    }

    pub fn multiplier(&self, street: Street) -> f64 {
        self.multipliers[street.index()]
    }

    /// Adjust multipliers and bluff rates after a round resolves.
    ///
    /// A street's multiplier only moves if the round reached that street and
    /// we continued against a bet on it. A bluff family's rate rises if it
    /// fired and we won without a showdown, and falls if it fired otherwise.
    pub fn apply_outcome(&mut self, outcome: &RoundOutcome, adaptation: &AdaptationConfig) {
        let result = outcome.delta.cmp(&0);
        for street in Street::ALL {
            if outcome.street >= street && self.round.called[street.index()] {
                let m = &mut self.multipliers[street.index()];
                *m = nudge_multiplier(*m, result, adaptation);
            }
        }

        let bluff_won = outcome.delta > 0 && !outcome.opponent_revealed;
        let step = |rate: f64| {
            let next = if bluff_won { rate + adaptation.bluff_step } else { rate - adaptation.bluff_step };
            next.clamp(0.0, 1.0)
        };
        if self.round.did_lead {
            self.bluff.lead = step(self.bluff.lead);
        }
        if self.round.did_cbet {
            self.bluff.cbet = step(self.bluff.cbet);
        }
        if self.round.did_raise {
            self.bluff.raise = step(self.bluff.raise);
        }
    }
}

fn nudge_multiplier(m: f64, result: Ordering, adaptation: &AdaptationConfig) -> f64 {
    let next = match result {
        Ordering::Greater => m + adaptation.multiplier_step,
        Ordering::Less => m - adaptation.multiplier_step,
        Ordering::Equal => m,
    };
    next.clamp(adaptation.multiplier_min, adaptation.multiplier_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(delta: i64, street: Street, revealed: bool) -> RoundOutcome {
        RoundOutcome {
            delta,
            street,
            my_pip: 0,
            opp_pip: 0,
            my_contribution: 20,
            opp_contribution: 20,
            opponent_revealed: revealed,
        }
    }

    fn state() -> MatchState {
        MatchState::new(BucketBoundaries::default(), &AdaptationConfig::default())
    }

    #[test]
    fn test_multiplier_moves_only_for_called_streets() {
        let adaptation = AdaptationConfig::default();
        let mut s = state();
        s.round.called[Street::Flop.index()] = true;
        s.round.called[Street::River.index()] = true;
        // Round ended on the turn: river flag cannot have been earned
        s.apply_outcome(&outcome(50, Street::Turn, true), &adaptation);
        assert!((s.multiplier(Street::Flop) - 1.05).abs() < 1e-12);
        assert_eq!(s.multiplier(Street::Turn), 1.0);
        assert_eq!(s.multiplier(Street::River), 1.0);

        s.apply_outcome(&outcome(-50, Street::River, true), &adaptation);
        assert!((s.multiplier(Street::Flop) - 1.0).abs() < 1e-12);
        assert!((s.multiplier(Street::River) - 0.95).abs() < 1e-12);

        s.apply_outcome(&outcome(0, Street::River, true), &adaptation);
        assert!((s.multiplier(Street::River) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_clamps() {
        let adaptation = AdaptationConfig::default();
        let mut s = state();
        s.round.called = [true; 4];
        for _ in 0..100 {
            s.apply_outcome(&outcome(10, Street::River, true), &adaptation);
        }
        assert!(s.multipliers.iter().all(|&m| m == 2.0));
        for _ in 0..100 {
            s.apply_outcome(&outcome(-10, Street::River, true), &adaptation);
        }
        assert!(s.multipliers.iter().all(|&m| m == 0.33));
    }

    #[test]
    fn test_bluff_feedback() {
        let adaptation = AdaptationConfig::default();
        let mut s = state();
        s.round.did_cbet = true;
        s.apply_outcome(&outcome(30, Street::Flop, false), &adaptation);
        assert!((s.bluff.cbet - 0.22).abs() < 1e-12);
        assert_eq!(s.bluff.lead, 0.1);
        assert_eq!(s.bluff.raise, 0.3);

        // Winning at showdown does not reward the bluff
        s.apply_outcome(&outcome(30, Street::River, true), &adaptation);
        assert!((s.bluff.cbet - 0.2).abs() < 1e-12);

        s.round.did_lead = true;
        for _ in 0..20 {
            s.apply_outcome(&outcome(-5, Street::Flop, false), &adaptation);
        }
        assert_eq!(s.bluff.lead, 0.0);
        assert_eq!(s.bluff.cbet, 0.0);
    }

    #[test]
    fn test_phase_from_street() {
        assert_eq!(RoundPhase::from(Street::Preflop), RoundPhase::Preflop);
        assert_eq!(RoundPhase::from(Street::River), RoundPhase::River);
        assert_eq!(state().phase, RoundPhase::Terminal);
    }
}
