//! The betting policy.
//!
//! One [`BettingPolicy`] plays one match. Per round the session calls
//! [`BettingPolicy::begin_round`], then [`BettingPolicy::decide`] at every
//! decision point, then [`BettingPolicy::end_round`].
//!
//! A decision builds four candidate actions, each already legal:
//!
//! | Candidate | Preferred       | Fallbacks     |
//! |-----------|-----------------|---------------|
//! | jam       | raise to max    | call, check   |
//! | aggro     | raise to sized  | call, check   |
//! | flat      | call            | check         |
//! | passive   | check           | fold          |
//!
//! Bankroll protection may swap candidates for jam before the preflop or
//! postflop branch picks one of them.

use super::action::{Action, DecisionView, RoundOutcome, RoundStart};
use super::config::PolicyConfig;
use super::state::{MatchState, RoundFlags, RoundPhase};
use crate::cards::card::{HoleCards, Street};
use crate::equity::estimator::{uniform_weight, HandStrengthEstimator};
use crate::equity::table::PreflopEquityTable;
use crate::tracker::{Player, RangeWeight, Seat};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// The four candidate actions of one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    pub jam: Action,
    pub aggro: Action,
    pub flat: Action,
    pub passive: Action,
}

impl Candidates {
    /// Build legal candidates with `raise_to` as the aggro target.
    pub fn new(view: &DecisionView, raise_to: u32) -> Self {
        let legal = &view.legal;
        let flat = if legal.call { Action::Call } else { Action::Check };
        let (jam, aggro) = match legal.raise {
            Some(bounds) => (Action::Raise(bounds.max), Action::Raise(bounds.clamp(raise_to))),
            None => (flat, flat),
        };
        let passive = if legal.check { Action::Check } else { Action::Fold };
        Self { jam, aggro, flat, passive }
    }
}

/// Whether scaled strength justifies paying `cost` into `pot`.
///
/// Break-even counts as a continue.
pub fn clears_pot_odds(scaled_strength: f64, cost: u32, pot: u32) -> bool {
    let total = pot + cost;
    if total == 0 {
        return true;
    }
    scaled_strength >= cost as f64 / total as f64
}

/// Apply `floor(pressure)` rounds of range narrowing to `strength`.
pub fn decay_strength(strength: f64, pressure: f64, out_of_range: f64, floor: f64) -> f64 {
    let steps = pressure.max(0.0).floor() as usize;
    let mut s = strength;
    for _ in 0..steps {
        s = (s - out_of_range) / (1.0 - out_of_range);
    }
    s.max(floor)
}

/// Minimum chips each side is still certain to lose in blinds, as
/// `(ours, opponent's)`, over `remaining` rounds including this one.
fn blind_costs(remaining: i64, big_blind: bool, small: i64, big: i64) -> (i64, i64) {
    let paired = (small + big) * (remaining / 2);
    let (own, theirs) = if big_blind { (big, small) } else { (small, big) };
    if remaining % 2 == 1 {
        (paired + own, paired)
    } else {
        (paired, paired - theirs)
    }
}

/// Adaptive heads-up betting policy.
pub struct BettingPolicy<R: Rng = StdRng> {
    config: PolicyConfig,
    table: Arc<PreflopEquityTable>,
    state: MatchState,
    rng: R,
}

impl BettingPolicy<StdRng> {
    /// Create a policy with an entropy-seeded generator.
    pub fn new(config: PolicyConfig, table: Arc<PreflopEquityTable>) -> Self {
        Self::with_rng(config, table, StdRng::from_entropy())
    }

    /// Create a policy whose decisions are reproducible.
    pub fn from_seed(config: PolicyConfig, table: Arc<PreflopEquityTable>, seed: u64) -> Self {
        Self::with_rng(config, table, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BettingPolicy<R> {
    pub fn with_rng(config: PolicyConfig, table: Arc<PreflopEquityTable>, rng: R) -> Self {
        let state = MatchState::new(config.tracker.buckets, &config.adaptation);
        Self {
            config,
            table,
            state,
            rng,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Snapshot of everything learned so far.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Reset round flags, start the tracker round and update bankroll limits.
    pub fn begin_round(&mut self, start: RoundStart) {
        let will_bluff = start.round_num >= self.config.bluffing.start_round;
        self.state.round = RoundFlags::new(&start, will_bluff);
        self.state.phase = RoundPhase::Preflop;

        let small_blind = if start.big_blind { Player::Opponent } else { Player::Hero };
        self.state.tracker.new_round(small_blind);

        let game = &self.config.game;
        let remaining = i64::from(game.num_rounds) - i64::from(start.round_num) + 1;
        let (my_min, opp_min) = blind_costs(
            remaining.max(0),
            start.big_blind,
            i64::from(game.small_blind),
            i64::from(game.big_blind),
        );

        if self.config.guaranteed_win_enabled && !self.state.guaranteed_win && my_min < start.bankroll {
            info!(
                "round {}: bankroll {} exceeds remaining blinds {}, playing passively",
                start.round_num, start.bankroll, my_min
            );
            self.state.guaranteed_win = true;
        }
        self.state.max_loss = start.bankroll + opp_min;

        if start.round_num == self.config.tracker.warmup_round {
            info!("round {}: opponent range tracking enabled", start.round_num);
        }
    }

    /// Pick an action. The result is always legal for `view`.
    pub fn decide(&mut self, view: &DecisionView) -> Action {
        let street = view.street();
        self.state.phase = street.into();
        let stack = self.config.game.starting_stack;
        let my_contribution = view.my_contribution(stack);
        let opp_contribution = view.opp_contribution(stack);

        if street == Street::Flop && view.my_pip == 0 && !self.state.tracker.is_recorded() {
            let last = if self.state.round.we_last_raised { Player::Opponent } else { Player::Hero };
            self.record_preflop(my_contribution, my_contribution, last);
        }

        if opp_contribution > self.config.bluffing.max_opponent_contribution {
            self.state.round.will_bluff = false;
        }

        let raise_to = self.raise_size(view);
        let mut c = Candidates::new(view, raise_to);

        let action = if self.state.guaranteed_win {
            c.passive
        } else if let Some(action) = self.protect_bankroll(view, &mut c) {
            action
        } else if street == Street::Preflop {
            self.preflop_action(view, c)
        } else {
            self.postflop_action(view, c)
        };

        debug_assert!(view.legal.is_legal(&action), "illegal {action:?} for {:?}", view.legal);
        debug!(
            "round {} {street}: {} board [{}] pips {}/{} -> {action}",
            self.state.round.round_num, view.hole, view.board, view.my_pip, view.opp_pip
        );
        action
    }

    /// Learn from a resolved round.
    pub fn end_round(&mut self, outcome: &RoundOutcome) {
        if !self.state.tracker.is_recorded() {
            if outcome.street == Street::Preflop {
                let folder = if outcome.delta > 0 { Player::Opponent } else { Player::Hero };
                self.record_preflop(outcome.my_pip, outcome.opp_pip, folder);
            } else {
                // Board dealt without a flop decision from us, e.g. all-in preflop
                let last = if self.state.round.we_last_raised { Player::Opponent } else { Player::Hero };
                self.record_preflop(outcome.my_contribution, outcome.opp_contribution, last);
            }
        }

        self.state.apply_outcome(outcome, &self.config.adaptation);
        self.state.phase = RoundPhase::Terminal;
        trace!(
            "round {} delta {}: multipliers {:?} bluff {:?}\n{}",
            self.state.round.round_num,
            outcome.delta,
            self.state.multipliers,
            self.state.bluff,
            self.state.tracker
        );
    }

    /// Estimated strength of our hand, weighting opponent hands by their
    /// observed preflop range once the tracker has warmed up.
    pub fn strength(&mut self, view: &DecisionView) -> f64 {
        let estimator = HandStrengthEstimator::new(&self.table);
        let iterations = self.config.simulation_iterations;
        let range = self.opponent_range();
        let table = &self.table;
        let equity_bias = self.config.tracker.equity_bias;

        match range {
            RangeWeight::Uniform => estimator.estimate(&view.hole, &view.board, uniform_weight, iterations, &mut self.rng),
            range => {
                let weight = |hole: HoleCards| {
                    let w = range.weight(table.percentile(&hole));
                    if equity_bias {
                        w * table.win_rate(&hole) / 100.0
                    } else {
                        w
                    }
                };
                estimator.estimate(&view.hole, &view.board, weight, iterations, &mut self.rng)
            }
        }
    }

    fn opponent_range(&self) -> RangeWeight {
        let round = &self.state.round;
        let Some(reference) = round.settled_preflop else {
            return RangeWeight::Uniform;
        };
        if round.round_num < self.config.tracker.warmup_round {
            return RangeWeight::Uniform;
        }
        let seat = if round.big_blind { Seat::SmallBlind } else { Seat::BigBlind };
        let range = self
            .state
            .tracker
            .weight_for(Player::Opponent, seat, reference, self.config.tracker.weights);
        if range.is_uniform() {
            debug!("round {}: no tracker history for opponent {seat}, using uniform range", round.round_num);
        }
        range
    }

    fn record_preflop(&mut self, hero: u32, opp: u32, last: Player) {
        if let Err(err) = self.state.tracker.record_preflop_outcome(hero, opp, last) {
            warn!("tracker update dropped: {err}");
            return;
        }
        self.state.round.settled_preflop = Some(opp);
    }

    /// Raise target before clamping to legal bounds.
    fn raise_size(&self, view: &DecisionView) -> u32 {
        let stack = self.config.game.starting_stack;
        let opp_contribution = view.opp_contribution(stack);
        if view.street() == Street::Preflop {
            return self
                .config
                .sizing
                .preflop_brackets
                .iter()
                .find(|b| opp_contribution <= b.up_to)
                .map_or(u32::MAX, |b| (b.multiple * f64::from(opp_contribution)) as u32);
        }
        let cost = view.continue_cost();
        let after_call = f64::from(view.pot(stack) + cost);
        (self.config.sizing.postflop_pot_fraction * after_call) as u32 + view.my_pip + cost
    }

    /// Force jams when committed chips already exceed the loss bound.
    fn protect_bankroll(&self, view: &DecisionView, c: &mut Candidates) -> Option<Action> {
        let stack = self.config.game.starting_stack;
        let max_loss = self.state.max_loss;
        let mine = i64::from(view.my_contribution(stack));
        let theirs = i64::from(view.opp_contribution(stack));
        if -theirs > max_loss {
            return None;
        }
        if mine > max_loss {
            return Some(c.jam);
        }
        if let Action::Raise(amount) = c.aggro {
            if mine - i64::from(view.my_pip) + i64::from(amount) > max_loss {
                c.aggro = c.jam;
            }
        }
        if mine + i64::from(view.continue_cost()) > max_loss {
            c.flat = c.jam;
        }
        None
    }

    fn preflop_action(&mut self, view: &DecisionView, mut c: Candidates) -> Action {
        let game = self.config.game;
        let my_contribution = view.my_contribution(game.starting_stack);
        let opp_contribution = view.opp_contribution(game.starting_stack);
        let cost = view.continue_cost();
        let big_blind = self.state.round.big_blind;

        if my_contribution > game.big_blind && cost <= my_contribution {
            c.passive = c.flat;
        }

        let rev = (100.0 - self.table.percentile(&view.hole)).max(0.0);
        let t = *self.config.preflop.seat(big_blind);
        let call_scale = self.state.multiplier(Street::Preflop);

        let action = if opp_contribution <= game.big_blind {
            if rev < t.open {
                c.aggro
            } else if big_blind {
                c.flat
            } else {
                c.passive
            }
        } else if opp_contribution <= t.raise_limit {
            if rev < t.reraise {
                c.aggro
            } else if rev < t.defend * call_scale {
                c.flat
            } else {
                c.passive
            }
        } else if rev < self.config.preflop.all_in {
            c.jam
        } else if rev < t.redefend * call_scale {
            c.flat
        } else {
            c.passive
        };

        if action == Action::Call && opp_contribution > game.big_blind {
            self.state.round.called[Street::Preflop.index()] = true;
        }
        self.state.round.we_last_raised = action.is_raise();
        debug!("preflop {} reverse percentile {rev:.1}", view.hole);
        action
    }

    fn postflop_action(&mut self, view: &DecisionView, c: Candidates) -> Action {
        let street = view.street();
        let params = *self.config.streets.get(street);
        let pressure_cfg = self.config.pressure;
        let stack = self.config.game.starting_stack;
        let my_contribution = view.my_contribution(stack).max(1);
        let cost = view.continue_cost();

        let strength = self.strength(view);

        if cost > 0 {
            let faced = f64::from(cost) / f64::from(my_contribution);
            self.state.round.pressure += faced.min(pressure_cfg.max_per_bet);
        }
        let decayed = decay_strength(
            strength,
            self.state.round.pressure,
            params.out_of_range,
            pressure_cfg.strength_floor,
        );
        let scaled = decayed * self.state.multiplier(street);
        debug!("{street}: strength {strength:.3} decayed {decayed:.3} scaled {scaled:.3}");

        let round = &mut self.state.round;
        if cost > 0 {
            if clears_pot_odds(scaled, cost, view.pot(stack)) {
                round.called[street.index()] = true;
                if scaled > params.reraise {
                    round.did_raise = true;
                    round.pressure += pressure_cfg.own_raise;
                    return c.aggro;
                }
                return c.flat;
            }
            if round.will_bluff && view.my_pip == 0 && self.rng.gen::<f64>() < self.state.bluff.raise {
                round.did_raise = true;
                round.pressure += pressure_cfg.own_raise;
                return c.aggro;
            }
            return c.passive;
        }

        // First to act as the big blind, or checked to as the small blind
        let (cutoff, bluff_rate) = if round.big_blind {
            (params.lead, self.state.bluff.lead)
        } else {
            (params.cbet, self.state.bluff.cbet)
        };
        let value_bet = decayed > cutoff && self.rng.gen::<f64>() < decayed;
        let bluff = !value_bet && decayed < cutoff && round.will_bluff && self.rng.gen::<f64>() < bluff_rate;
        if value_bet || bluff {
            if round.big_blind {
                round.did_lead = true;
            } else {
                round.did_cbet = true;
            }
            round.pressure += pressure_cfg.own_raise;
            return c.aggro;
        }
        c.flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::action::{LegalActions, RaiseBounds};
    use crate::policy::config::PressureConfig;

    fn table() -> Arc<PreflopEquityTable> {
        Arc::new(PreflopEquityTable::bundled().unwrap())
    }

    fn policy(config: PolicyConfig) -> BettingPolicy {
        BettingPolicy::from_seed(config.with_iterations(200), table(), 42)
    }

    fn start(round_num: u32, bankroll: i64, big_blind: bool) -> RoundStart {
        RoundStart {
            round_num,
            bankroll,
            big_blind,
        }
    }

    fn view(hole: &str, board: &str, pips: (u32, u32), stacks: (u32, u32), legal: LegalActions) -> DecisionView {
        DecisionView {
            hole: hole.parse().unwrap(),
            board: board.parse().unwrap(),
            my_pip: pips.0,
            opp_pip: pips.1,
            my_stack: stacks.0,
            opp_stack: stacks.1,
            legal,
        }
    }

    /// Small blind's first decision: 1 in, facing the big blind's 2.
    fn sb_open(hole: &str) -> DecisionView {
        view(hole, "", (1, 2), (399, 398), LegalActions::facing_bet(Some(RaiseBounds::new(4, 400))))
    }

    /// Big blind after the small blind limps.
    fn bb_vs_limp(hole: &str) -> DecisionView {
        view(hole, "", (2, 2), (398, 398), LegalActions::unopened(Some(RaiseBounds::new(4, 400))))
    }

    /// Big blind facing an open to `to`.
    fn bb_vs_open(hole: &str, to: u32) -> DecisionView {
        view(hole, "", (2, to), (398, 400 - to), LegalActions::facing_bet(Some(RaiseBounds::new(2 * to - 2, 400))))
    }

    #[test]
    fn test_blind_costs() {
        // Odd number of rounds left: we also pay our blind this round
        assert_eq!(blind_costs(3, true, 1, 2), (5, 3));
        assert_eq!(blind_costs(3, false, 1, 2), (4, 3));
        // Even: the opponent's blind this round is already posted
        assert_eq!(blind_costs(4, true, 1, 2), (6, 5));
        assert_eq!(blind_costs(4, false, 1, 2), (6, 4));
        assert_eq!(blind_costs(0, false, 1, 2), (0, -2));
    }

    #[test]
    fn test_pot_odds_threshold_is_inclusive() {
        // Cost equals the pot: odds are exactly one half
        assert!(clears_pot_odds(0.5, 40, 40));
        assert!(!clears_pot_odds(0.4999, 40, 40));
        assert!(clears_pot_odds(0.0, 0, 0));
    }

    #[test]
    fn test_decay_strength() {
        assert_eq!(decay_strength(0.8, 0.9, 0.2, 0.1), 0.8);
        assert!((decay_strength(0.8, 1.0, 0.2, 0.1) - 0.75).abs() < 1e-12);
        assert!((decay_strength(0.8, 2.5, 0.2, 0.1) - 0.6875).abs() < 1e-12);
        assert_eq!(decay_strength(0.3, 10.0, 0.25, 0.1), 0.1);
    }

    #[test]
    fn test_candidates_degrade_without_raise() {
        let v = view("AsAh", "", (2, 6), (398, 394), LegalActions::facing_bet(None));
        let c = Candidates::new(&v, 24);
        assert_eq!(c.jam, Action::Call);
        assert_eq!(c.aggro, Action::Call);
        assert_eq!(c.flat, Action::Call);
        assert_eq!(c.passive, Action::Fold);

        let v = view("AsAh", "", (2, 2), (398, 398), LegalActions::unopened(Some(RaiseBounds::new(4, 398))));
        let c = Candidates::new(&v, 1000);
        assert_eq!(c.jam, Action::Raise(398));
        assert_eq!(c.aggro, Action::Raise(398));
        assert_eq!(c.passive, Action::Check);
        assert_eq!(Candidates::new(&v, 1).aggro, Action::Raise(4));
    }

    #[test]
    fn test_aces_always_aggressive_preflop() {
        let mut p = policy(PolicyConfig::default());
        let aggressive = |a: Action| a.is_raise();

        p.begin_round(start(1, 0, false));
        assert_eq!(p.decide(&sb_open("AsAh")), Action::Raise(8));

        p.begin_round(start(2, 0, true));
        assert_eq!(p.decide(&bb_vs_limp("AsAh")), Action::Raise(8));

        p.begin_round(start(3, 0, true));
        assert!(aggressive(p.decide(&bb_vs_open("AsAh", 6))));

        // Small blind facing a 3-bet to 20
        p.begin_round(start(4, 0, false));
        let v = view("AdAc", "", (6, 20), (394, 380), LegalActions::facing_bet(Some(RaiseBounds::new(34, 400))));
        assert_eq!(p.decide(&v), Action::Raise(50));

        // Multiply raised in both seats: jam
        p.begin_round(start(5, 0, false));
        let v = view("AdAc", "", (20, 60), (380, 340), LegalActions::facing_bet(Some(RaiseBounds::new(100, 400))));
        assert_eq!(p.decide(&v), Action::Raise(400));
        p.begin_round(start(6, 0, true));
        assert_eq!(p.decide(&bb_vs_open("AhAs", 30)), Action::Raise(400));
    }

    #[test]
    fn test_trash_folds_to_raise() {
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, true));
        assert_eq!(p.decide(&bb_vs_open("7c2d", 6)), Action::Fold);

        // Small blind folds the worst hands unopened
        p.begin_round(start(2, 0, false));
        assert_eq!(p.decide(&sb_open("3c2d")), Action::Fold);

        // Big blind checks the worst hands behind a limp
        p.begin_round(start(3, 0, true));
        assert_eq!(p.decide(&bb_vs_limp("3c2d")), Action::Check);
    }

    #[test]
    fn test_no_fold_to_small_reraise() {
        // Open to 6, opponent min-raises to 10: cost 4 <= our 6, never fold
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, false));
        let v = view("7c2d", "", (6, 10), (394, 390), LegalActions::facing_bet(Some(RaiseBounds::new(14, 400))));
        assert_eq!(p.decide(&v), Action::Call);
    }

    #[test]
    fn test_guaranteed_win_plays_passively() {
        let mut p = policy(PolicyConfig::default());
        // Round 999 of 1000: two rounds left, at most 3 chips in blinds
        p.begin_round(start(999, 50, false));
        assert!(p.state().guaranteed_win);
        assert_eq!(p.decide(&sb_open("AsAh")), Action::Fold);

        // The latch persists
        p.begin_round(start(1000, -500, true));
        assert!(p.state().guaranteed_win);
        assert_eq!(p.decide(&bb_vs_limp("AsAh")), Action::Check);

        let mut p = policy(PolicyConfig::default().with_guaranteed_win(false));
        p.begin_round(start(999, 50, false));
        assert!(!p.state().guaranteed_win);
    }

    #[test]
    fn test_bankroll_protection_jams() {
        let facing_three_bet =
            || view("7c2d", "", (6, 20), (394, 380), LegalActions::facing_bet(Some(RaiseBounds::new(34, 400))));

        // Last round, 5 ahead: 6 already committed exceeds the lead
        let mut p = policy(PolicyConfig::default().with_guaranteed_win(false));
        p.begin_round(start(1000, 5, false));
        assert_eq!(p.state().max_loss, 5);
        assert_eq!(p.decide(&facing_three_bet()), Action::Raise(400));

        // Last round, 10 behind: the opponent's 20 would put us ahead
        p.begin_round(start(1000, -10, false));
        assert_eq!(p.decide(&facing_three_bet()), Action::Raise(400));

        // 30 behind: winning this pot is not enough, play normally
        p.begin_round(start(1000, -30, false));
        assert_eq!(p.decide(&facing_three_bet()), Action::Fold);

        // Early in the match the bound is far away
        p.begin_round(start(10, 0, false));
        assert!(p.state().max_loss > 1000);
        assert_eq!(p.decide(&facing_three_bet()), Action::Fold);
    }

    #[test]
    fn test_tracker_recorded_at_flop_and_at_fold() {
        let mut p = policy(PolicyConfig::default());

        // Hero opens from the small blind and the opponent calls
        p.begin_round(start(1, 0, false));
        assert!(p.decide(&sb_open("AsKs")).is_raise());
        let flop = view("AsKs", "Qh7c2d", (0, 0), (392, 392), LegalActions::unopened(Some(RaiseBounds::new(2, 392))));
        p.decide(&flop);
        let t = &p.state().tracker;
        assert!(t.is_recorded());
        assert_eq!(p.state().round.settled_preflop, Some(8));
        assert_eq!(t.opportunity(Player::Opponent, Seat::BigBlind, crate::tracker::Escalation::Jam), 1);
        assert_eq!(t.opportunity(Player::Hero, Seat::SmallBlind, crate::tracker::Escalation::ThreeBet), 0);

        // A second flop decision does not record again
        p.decide(&view("AsKs", "Qh7c2d", (0, 0), (392, 392), LegalActions::unopened(None)));
        assert_eq!(p.state().tracker.rounds(), 1);

        p.end_round(&RoundOutcome {
            delta: 8,
            street: Street::Flop,
            my_pip: 0,
            opp_pip: 0,
            my_contribution: 8,
            opp_contribution: 8,
            opponent_revealed: false,
        });
        assert_eq!(p.state().phase, RoundPhase::Terminal);

        // Opponent folds the small blind
        p.begin_round(start(2, 8, true));
        p.end_round(&RoundOutcome {
            delta: 1,
            street: Street::Preflop,
            my_pip: 2,
            opp_pip: 1,
            my_contribution: 2,
            opp_contribution: 1,
            opponent_revealed: false,
        });
        let t = &p.state().tracker;
        assert_eq!(t.reached(Player::Opponent, Seat::SmallBlind, crate::tracker::Escalation::Limp), 0);
        assert_eq!(t.opportunity(Player::Opponent, Seat::SmallBlind, crate::tracker::Escalation::Jam), 1);
    }

    #[test]
    fn test_all_in_preflop_recorded_at_round_end() {
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, true));
        p.end_round(&RoundOutcome {
            delta: -400,
            street: Street::River,
            my_pip: 0,
            opp_pip: 0,
            my_contribution: 400,
            opp_contribution: 400,
            opponent_revealed: true,
        });
        let t = &p.state().tracker;
        assert!(t.is_recorded());
        assert_eq!(t.reached(Player::Opponent, Seat::SmallBlind, crate::tracker::Escalation::Jam), 1);
    }

    #[test]
    fn test_postflop_nuts_raises_and_air_folds() {
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, true));
        p.decide(&bb_vs_limp("9s8s"));
        // Turned nut straight facing a half-pot bet
        let v = view("9s8s", "Tc7h6d2c", (0, 4), (398, 394), LegalActions::facing_bet(Some(RaiseBounds::new(8, 394))));
        let action = p.decide(&v);
        assert!(action.is_raise(), "{action}");
        assert!(p.state().round.did_raise);
        assert!(p.state().round.called[Street::Turn.index()]);

        // Playing the board on a paired river facing a large bet
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, true));
        p.decide(&bb_vs_limp("3c2d"));
        let v = view("7c6d", "AhAsKd9c8s", (0, 4), (398, 394), LegalActions::facing_bet(Some(RaiseBounds::new(8, 394))));
        assert_eq!(p.decide(&v), Action::Fold);
    }

    #[test]
    fn test_postflop_sizing() {
        let mut p = policy(PolicyConfig::default());
        p.begin_round(start(1, 0, true));
        // Pot 12, facing 6: raise to 0.7 * 18 + 0 + 6 = 18
        let v = view("AsAh", "Ad7c2h", (0, 6), (394, 388), LegalActions::facing_bet(Some(RaiseBounds::new(12, 388))));
        assert_eq!(p.raise_size(&v), 18);
        // Preflop against a large 3-bet sizes to the maximum
        let v = bb_vs_open("AsAh", 60);
        assert_eq!(p.raise_size(&v), u32::MAX);
        assert_eq!(p.raise_size(&bb_vs_open("AsAh", 6)), 24);
        assert_eq!(p.raise_size(&bb_vs_open("AsAh", 20)), 50);
    }

    #[test]
    fn test_seeded_policies_agree() {
        let run = || {
            let mut p = policy(PolicyConfig::default().with_bluff_start(0));
            let mut actions = Vec::new();
            for round in 1..=20 {
                p.begin_round(start(round, 0, round % 2 == 0));
                let v = view("Jh9h", "Th8c2s", (0, 0), (394, 394), LegalActions::unopened(Some(RaiseBounds::new(2, 394))));
                actions.push(p.decide(&v));
                p.end_round(&RoundOutcome {
                    delta: if round % 3 == 0 { -6 } else { 6 },
                    street: Street::Flop,
                    my_pip: 0,
                    opp_pip: 0,
                    my_contribution: 6,
                    opp_contribution: 6,
                    opponent_revealed: false,
                });
            }
            (actions, p.state().bluff)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_bankroll_protection_swaps_candidates() {
        let facing_three_bet =
            |hole: &str| view(hole, "", (6, 20), (394, 380), LegalActions::facing_bet(Some(RaiseBounds::new(34, 400))));
        let mut p = policy(PolicyConfig::default().with_guaranteed_win(false));

        // Raising to 50 would commit more than the 30 we can lose
        p.begin_round(start(1000, 30, false));
        assert_eq!(p.state().max_loss, 30);
        assert_eq!(p.decide(&facing_three_bet("AsAh")), Action::Raise(400));
        p.begin_round(start(1000, 60, false));
        assert_eq!(p.decide(&facing_three_bet("AsAh")), Action::Raise(50));

        // Calling 14 more would commit 20 against a bound of 15
        p.begin_round(start(1000, 15, false));
        assert_eq!(p.decide(&facing_three_bet("QhTd")), Action::Raise(400));
        assert_eq!(p.decide(&facing_three_bet("AsKs")), Action::Raise(400));
        p.begin_round(start(1000, 30, false));
        assert_eq!(p.decide(&facing_three_bet("QhTd")), Action::Call);
    }

    /// Twenty rounds as big blind against an opponent who folds the small
    /// blind half the time and opens to 6 otherwise, then a new round at
    /// `round` with the preflop price settled at 6 when `settle` is set.
    fn seasoned(config: PolicyConfig, round: u32, settle: bool) -> BettingPolicy {
        let mut p = BettingPolicy::from_seed(config.with_iterations(3000), table(), 9);
        for r in 1..=20 {
            p.begin_round(start(r, 0, true));
            let outcome = if r % 2 == 0 {
                RoundOutcome {
                    delta: 1,
                    street: Street::Preflop,
                    my_pip: 2,
                    opp_pip: 1,
                    my_contribution: 2,
                    opp_contribution: 1,
                    opponent_revealed: false,
                }
            } else {
                RoundOutcome {
                    delta: -6,
                    street: Street::Flop,
                    my_pip: 0,
                    opp_pip: 0,
                    my_contribution: 6,
                    opp_contribution: 6,
                    opponent_revealed: true,
                }
            };
            p.end_round(&outcome);
        }
        p.begin_round(start(round, 0, true));
        if settle {
            p.record_preflop(6, 6, Player::Hero);
        }
        p
    }

    #[test]
    fn test_tracker_weighting_after_warmup() {
        let config = PolicyConfig::default().with_tracker_warmup(100);
        let flop = view("7c6c", "Kd8h2s", (0, 0), (394, 394), LegalActions::unopened(None));
        let table = table();
        let estimator = HandStrengthEstimator::new(&table);
        let uniform = estimator.estimate(&flop.hole, &flop.board, uniform_weight, 3000, &mut StdRng::seed_from_u64(9));

        // Before warm-up, or before the preflop price is known, every hand weighs 1
        assert_eq!(seasoned(config.clone(), 50, true).strength(&flop), uniform);
        assert_eq!(seasoned(config.clone(), 100, false).strength(&flop), uniform);

        // No history at all for the opponent's seat
        let mut fresh = BettingPolicy::from_seed(config.clone().with_iterations(3000), table.clone(), 9);
        fresh.begin_round(start(100, 0, true));
        fresh.record_preflop(6, 6, Player::Hero);
        assert_eq!(fresh.strength(&flop), uniform);

        // Opened half the time: hands below the 50th percentile lose weight
        let mut p = seasoned(config.clone(), 100, true);
        let range = p
            .state()
            .tracker
            .weight_for(Player::Opponent, Seat::SmallBlind, 6, config.tracker.weights);
        assert_eq!(
            range,
            RangeWeight::Banded {
                low: 50.0,
                high: 100.0,
                params: config.tracker.weights,
            }
        );
        let narrowed = p.strength(&flop);
        let expected = estimator.estimate(
            &flop.hole,
            &flop.board,
            |h: HoleCards| range.weight(table.percentile(&h)),
            3000,
            &mut StdRng::seed_from_u64(9),
        );
        assert_eq!(narrowed, expected);
        assert!(narrowed < uniform - 0.02, "{narrowed} vs {uniform}");

        let mut biased_config = config.clone();
        biased_config.tracker.equity_bias = true;
        let biased = seasoned(biased_config, 100, true).strength(&flop);
        let expected = estimator.estimate(
            &flop.hole,
            &flop.board,
            |h: HoleCards| range.weight(table.percentile(&h)) * table.win_rate(&h) / 100.0,
            3000,
            &mut StdRng::seed_from_u64(9),
        );
        assert_eq!(biased, expected);
        assert!(biased < narrowed, "{biased} vs {narrowed}");
    }

    /// Decide `v` as big blind in `round` under 200 seeds.
    fn decide_over_seeds(config: &PolicyConfig, round: u32, v: &DecisionView) -> Vec<(Action, RoundFlags)> {
        (0..200)
            .map(|seed| {
                let mut p = BettingPolicy::from_seed(config.clone().with_iterations(200), table(), seed);
                p.begin_round(start(round, 0, true));
                let action = p.decide(v);
                (action, p.state().round.clone())
            })
            .collect()
    }

    /// Nothing on an ace-high flop facing a bet: pot odds 0.2 are above the
    /// strength floor, so only a bluff raises.
    fn air_facing_bet() -> DecisionView {
        view("3c2d", "AhKsQd", (0, 4), (394, 390), LegalActions::facing_bet(Some(RaiseBounds::new(8, 394))))
    }

    #[test]
    fn test_bluff_raise_fires_when_eligible() {
        let results = decide_over_seeds(&PolicyConfig::default(), 120, &air_facing_bet());
        let raises = results.iter().filter(|(a, _)| a.is_raise()).count();
        // Raise rate starts at 0.3
        assert!((20..100).contains(&raises), "{raises} raises");

        for (action, flags) in &results {
            match action {
                Action::Raise(amount) => {
                    // 0.7 * (16 + 4) + 4
                    assert_eq!(*amount, 18);
                    assert!(flags.did_raise);
                    assert!(flags.pressure >= PressureConfig::default().own_raise);
                }
                other => {
                    assert_eq!(*other, Action::Fold);
                    assert!(!flags.did_raise);
                    assert!(!flags.called[Street::Flop.index()]);
                }
            }
        }
    }

    #[test]
    fn test_no_bluff_before_start_round() {
        let v = air_facing_bet();
        let early = decide_over_seeds(&PolicyConfig::default(), 50, &v);
        assert!(early.iter().all(|(a, f)| *a == Action::Fold && !f.will_bluff));

        let late_start = decide_over_seeds(&PolicyConfig::default().with_bluff_start(10_000), 120, &v);
        assert!(late_start.iter().all(|(a, _)| *a == Action::Fold));
    }

    #[test]
    fn test_no_bluff_against_large_commitment() {
        // Opponent has 160 in, above the 100 cut-off; pot odds 60 / 320
        let v = view("3c2d", "AhKsQd", (0, 60), (300, 240), LegalActions::facing_bet(Some(RaiseBounds::new(120, 300))));
        let results = decide_over_seeds(&PolicyConfig::default(), 120, &v);
        assert!(results.iter().all(|(a, f)| *a == Action::Fold && !f.will_bluff));
    }

    #[test]
    fn test_no_bluff_reraise_with_chips_in() {
        // We bet 4 and face a raise to 16: eligible to bluff, but not on this street
        let v = view("3c2d", "AhKsQd", (4, 16), (390, 378), LegalActions::facing_bet(Some(RaiseBounds::new(28, 390))));
        let results = decide_over_seeds(&PolicyConfig::default(), 120, &v);
        assert!(results.iter().all(|(a, f)| *a == Action::Fold && f.will_bluff));
    }
}
