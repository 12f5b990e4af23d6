//! Monte Carlo hand-strength estimation.
//!
//! On an empty board the estimate is the precomputed preflop win rate. With
//! board cards visible, the estimator samples opponent hands and run-outs from
//! the unseen deck, weighting each sample by how plausible the sampled
//! opponent hand is.
//!
//! A tie is credited to the hero as a full win rather than split. The preflop
//! table, by contrast, is generated with split ties.

use super::table::PreflopEquityTable;
use crate::cards::card::{Board, Card, Deck, HoleCards};
use crate::cards::hand_eval::HandEvaluator;
use rand::Rng;

/// Strength reported when every sampled opponent hand carries zero weight.
pub const NEUTRAL_STRENGTH: f64 = 0.5;

/// Weight of every opponent hand when no range information is available.
pub fn uniform_weight(_: HoleCards) -> f64 {
    1.0
}

/// Estimates the probability that the hero's hand prevails.
#[derive(Debug, Clone, Copy)]
pub struct HandStrengthEstimator<'a> {
    table: &'a PreflopEquityTable,
    evaluator: HandEvaluator,
}

impl<'a> HandStrengthEstimator<'a> {
    pub fn new(table: &'a PreflopEquityTable) -> Self {
        Self {
            table,
            evaluator: HandEvaluator::new(),
        }
    }

    /// Estimate win probability in [0, 1].
    ///
    /// # Arguments
    /// * `hole` - the hero's hole cards
    /// * `board` - visible board cards (0, 3, 4 or 5)
    /// * `opponent_weight` - relative likelihood of each opponent hole pair
    /// * `iterations` - number of sampled opponent hands and run-outs
    /// * `rng` - randomness source; a fixed seed gives a fixed result
    pub fn estimate<F, R>(
        &self,
        hole: &HoleCards,
        board: &Board,
        opponent_weight: F,
        iterations: usize,
        rng: &mut R,
    ) -> f64
    where
        F: Fn(HoleCards) -> f64,
        R: Rng + ?Sized,
    {
        if board.is_empty() {
            return self.table.win_rate(hole) / 100.0;
        }

        let mut deck = Deck::without_mask(hole.mask() | board.mask());
        let runout = 5 - board.len();

        let mut ours = [Card::from_id(0); 7];
        let mut theirs = [Card::from_id(0); 7];
        ours[..2].copy_from_slice(&hole.cards());
        ours[2..2 + board.len()].copy_from_slice(board.cards());
        theirs[2..2 + board.len()].copy_from_slice(board.cards());

        let mut score = 0.0;
        let mut total_weight = 0.0;

        for _ in 0..iterations {
            deck.shuffle(rng);
            let drawn = deck.cards();
            let opponent = HoleCards::new(drawn[0], drawn[1]);

            theirs[..2].copy_from_slice(&drawn[..2]);
            ours[2 + board.len()..].copy_from_slice(&drawn[2..2 + runout]);
            theirs[2 + board.len()..].copy_from_slice(&drawn[2..2 + runout]);

            let weight = opponent_weight(opponent);
            if self.evaluator.evaluate(&ours) >= self.evaluator.evaluate(&theirs) {
                score += weight;
            }
            total_weight += weight;
        }

        if total_weight > 0.0 {
            score / total_weight
        } else {
            NEUTRAL_STRENGTH
        }
    }
}
