//! Opponent preflop range tracking.
//!
//! The tracker keeps, for each player and blind seat, how often that player
//! reached each escalation level of preflop aggression and how often they
//! had the opportunity to. The ratio gives an empirical estimate of how wide
//! a player's range is when they put a given amount in preflop:
//!
//! ```text
//!   reach rate(open) = 0.40  =>  opens with the top 40% of hands
//!   low bound        = 100 * (1 - 0.40) = 60th percentile
//! ```
//!
//! Counters are updated once per round, when the round's preflop betting
//! is known to be over, and are never decremented.

mod weight;

pub use weight::{RangeWeight, WeightParams};

use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of escalation buckets.
pub const NUM_BUCKETS: usize = 5;

/// One of the two players, seen from the hero's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Hero = 0,
    Opponent = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Hero, Player::Opponent];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn other(self) -> Player {
        match self {
            Player::Hero => Player::Opponent,
            Player::Opponent => Player::Hero,
        }
    }
}

/// Blind position for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    SmallBlind = 0,
    BigBlind = 1,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::SmallBlind, Seat::BigBlind];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::SmallBlind => Seat::BigBlind,
            Seat::BigBlind => Seat::SmallBlind,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::SmallBlind => write!(f, "SB"),
            Seat::BigBlind => write!(f, "BB"),
        }
    }
}

/// Level of preflop aggression implied by a total preflop contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Escalation {
    Fold = 0,
    Limp = 1,
    Open = 2,
    ThreeBet = 3,
    Jam = 4,
}

impl Escalation {
    pub const ALL: [Escalation; NUM_BUCKETS] = [
        Escalation::Fold,
        Escalation::Limp,
        Escalation::Open,
        Escalation::ThreeBet,
        Escalation::Jam,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Escalation> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Escalation::Fold => "fold",
            Escalation::Limp => "limp",
            Escalation::Open => "open",
            Escalation::ThreeBet => "3-bet",
            Escalation::Jam => "jam",
        }
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contribution thresholds separating the escalation buckets.
///
/// Tied to a 400-chip stack with 1/2 blinds by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketBoundaries {
    /// Exactly this much is a limp; less is a fold.
    pub limp: u32,
    /// Up to this much is an open raise.
    pub open: u32,
    /// Up to this much is a 3-bet; more is a jam.
    pub three_bet: u32,
}

impl Default for BucketBoundaries {
    fn default() -> Self {
        Self {
            limp: 2,
            open: 12,
            three_bet: 60,
        }
    }
}

impl BucketBoundaries {
    /// Bucket of a total preflop contribution.
    pub fn classify(&self, contribution: u32) -> Escalation {
        if contribution < self.limp {
            Escalation::Fold
        } else if contribution == self.limp {
            Escalation::Limp
        } else if contribution <= self.open {
            Escalation::Open
        } else if contribution <= self.three_bet {
            Escalation::ThreeBet
        } else {
            Escalation::Jam
        }
    }

    /// Boundaries must be strictly increasing.
    pub fn is_valid(&self) -> bool {
        self.limp > 0 && self.limp < self.open && self.open < self.three_bet
    }
}

/// Tracker misuse. Both variants are programming errors in the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("preflop outcome recorded before any round started")]
    NoActiveRound,
    #[error("preflop outcome for round {round} already recorded")]
    OutcomeAlreadyRecorded { round: u64 },
}

type Counters = [[[u64; NUM_BUCKETS]; 2]; 2];

/// Per-match statistics of both players' preflop escalation.
#[derive(Debug, Clone, Serialize)]
pub struct RangeTracker {
    boundaries: BucketBoundaries,
    /// Times [player][seat][bucket] was reached.
    reached: Counters,
    /// Times [player][seat][bucket] could have been reached.
    opportunity: Counters,
    /// Rounds started so far.
    rounds: u64,
    /// Small blind of the current round, `None` before the first round.
    small_blind: Option<Player>,
    /// Whether the current round's outcome is already in the counters.
    recorded: bool,
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self::new(BucketBoundaries::default())
    }
}

impl RangeTracker {
    pub fn new(boundaries: BucketBoundaries) -> Self {
        Self {
            boundaries,
            reached: [[[0; NUM_BUCKETS]; 2]; 2],
            opportunity: [[[0; NUM_BUCKETS]; 2]; 2],
            rounds: 0,
            small_blind: None,
            recorded: false,
        }
    }

    pub fn boundaries(&self) -> &BucketBoundaries {
        &self.boundaries
    }

    /// Start a round; the tracker accepts exactly one outcome for it.
    pub fn new_round(&mut self, small_blind: Player) {
        self.rounds += 1;
        self.small_blind = Some(small_blind);
        self.recorded = false;
    }

    /// Rounds started so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Whether the current round's outcome has been recorded.
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Seat of `player` in the current round.
    pub fn seat_of(&self, player: Player) -> Option<Seat> {
        self.small_blind.map(|sb| if sb == player { Seat::SmallBlind } else { Seat::BigBlind })
    }

    /// Record how the current round's preflop betting ended.
    ///
    /// When the contributions differ, the smaller contributor folded and is
    /// the last to act regardless of `last_to_act`. The last actor gets
    /// opportunity credited for every bucket, since they could have escalated
    /// further; the other player gets opportunity only up to their own level.
    pub fn record_preflop_outcome(
        &mut self,
        hero_contribution: u32,
        opp_contribution: u32,
        last_to_act: Player,
    ) -> Result<(), TrackerError> {
        let hero_seat = self.seat_of(Player::Hero).ok_or(TrackerError::NoActiveRound)?;
        if self.recorded {
            return Err(TrackerError::OutcomeAlreadyRecorded { round: self.rounds });
        }

        let last = match hero_contribution.cmp(&opp_contribution) {
            std::cmp::Ordering::Equal => last_to_act,
            std::cmp::Ordering::Less => Player::Hero,
            std::cmp::Ordering::Greater => Player::Opponent,
        };

        for (player, seat, contribution) in [
            (Player::Hero, hero_seat, hero_contribution),
            (Player::Opponent, hero_seat.other(), opp_contribution),
        ] {
            let level = self.boundaries.classify(contribution).index();
            let (p, s) = (player.index(), seat.index());
            for bucket in 0..=level {
                self.reached[p][s][bucket] += 1;
            }
            let seen = if player == last { NUM_BUCKETS - 1 } else { level };
            for bucket in 0..=seen {
                self.opportunity[p][s][bucket] += 1;
            }
        }

        self.recorded = true;
        trace!(
            "round {} preflop {}/{} recorded\n{}",
            self.rounds,
            hero_contribution,
            opp_contribution,
            self
        );
        Ok(())
    }

    pub fn reached(&self, player: Player, seat: Seat, bucket: Escalation) -> u64 {
        self.reached[player.index()][seat.index()][bucket.index()]
    }

    pub fn opportunity(&self, player: Player, seat: Seat, bucket: Escalation) -> u64 {
        self.opportunity[player.index()][seat.index()][bucket.index()]
    }

    /// Fraction of opportunities in which the bucket was reached.
    pub fn reach_rate(&self, player: Player, seat: Seat, bucket: Escalation) -> Option<f64> {
        let opportunity = self.opportunity(player, seat, bucket);
        (opportunity > 0).then(|| self.reached(player, seat, bucket) as f64 / opportunity as f64)
    }

    /// Weighting of `player`'s possible hands from `seat`, given that they
    /// put `reference_contribution` in preflop.
    pub fn weight_for(
        &self,
        player: Player,
        seat: Seat,
        reference_contribution: u32,
        params: WeightParams,
    ) -> RangeWeight {
        let bucket = self.boundaries.classify(reference_contribution);
        let Some(rate) = self.reach_rate(player, seat, bucket) else {
            return RangeWeight::Uniform;
        };
        let low = 100.0 * (1.0 - rate);
        let high = bucket
            .next()
            .and_then(|next| self.reach_rate(player, seat, next))
            .map_or(100.0, |next_rate| 100.0 * (1.0 - next_rate));
        RangeWeight::Banded { low, high, params }
    }
}

impl fmt::Display for RangeTracker {
    /// One line per player and seat: `hero SB: fold: 1.00, limp: 0.62, ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for player in Player::ALL {
            for seat in Seat::ALL {
                let label = match player {
                    Player::Hero => "hero",
                    Player::Opponent => "opp",
                };
                write!(f, "{label} {seat}:")?;
                for (i, bucket) in Escalation::ALL.into_iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    match self.reach_rate(player, seat, bucket) {
                        Some(rate) => write!(f, "{sep}{bucket}: {rate:.2}")?,
                        None => write!(f, "{sep}{bucket}: None")?,
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
