//! Actions and the game-state views exchanged with the session layer.
//!
//! Chip amounts are absolute: a `Raise(n)` raises our pip for the current
//! street to `n`, and the raise bounds reported by the session are inclusive.

use crate::cards::card::{Board, HoleCards, Street};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A betting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Give up the round.
    Fold,
    /// Pass without adding chips.
    Check,
    /// Match the opponent's pip.
    Call,
    /// Raise our pip to this amount.
    Raise(u32),
}

impl Action {
    pub fn is_raise(&self) -> bool {
        matches!(self, Action::Raise(_))
    }

    /// Raise target, if any.
    pub fn amount(&self) -> Option<u32> {
        match self {
            Action::Raise(amount) => Some(*amount),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Raise(amount) => write!(f, "raise to {amount}"),
        }
    }
}

/// Inclusive bounds on a raise target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseBounds {
    pub min: u32,
    pub max: u32,
}

impl RaiseBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Clamp a target into `[min, max]`.
    pub fn clamp(&self, amount: u32) -> u32 {
        amount.max(self.min).min(self.max)
    }

    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// The actions the session accepts at this decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegalActions {
    pub fold: bool,
    pub check: bool,
    pub call: bool,
    /// Raise bounds when raising is allowed.
    pub raise: Option<RaiseBounds>,
}

impl LegalActions {
    /// Facing a bet: fold, call and optionally raise.
    pub fn facing_bet(raise: Option<RaiseBounds>) -> Self {
        Self {
            fold: true,
            check: false,
            call: true,
            raise,
        }
    }

    /// Nothing to call: check and optionally raise.
    pub fn unopened(raise: Option<RaiseBounds>) -> Self {
        Self {
            fold: false,
            check: true,
            call: false,
            raise,
        }
    }

    pub fn is_legal(&self, action: &Action) -> bool {
        match action {
            Action::Fold => self.fold,
            Action::Check => self.check,
            Action::Call => self.call,
            Action::Raise(amount) => self.raise.is_some_and(|b| b.contains(*amount)),
        }
    }
}

/// Everything the engine sees at one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionView {
    pub hole: HoleCards,
    pub board: Board,
    /// Chips we have put in on this street.
    pub my_pip: u32,
    /// Chips the opponent has put in on this street.
    pub opp_pip: u32,
    pub my_stack: u32,
    pub opp_stack: u32,
    pub legal: LegalActions,
}

impl DecisionView {
    pub fn street(&self) -> Street {
        self.board.street()
    }

    /// Chips needed to call.
    pub fn continue_cost(&self) -> u32 {
        self.opp_pip.saturating_sub(self.my_pip)
    }

    /// Chips we have committed this round.
    pub fn my_contribution(&self, starting_stack: u32) -> u32 {
        starting_stack.saturating_sub(self.my_stack)
    }

    /// Chips the opponent has committed this round.
    pub fn opp_contribution(&self, starting_stack: u32) -> u32 {
        starting_stack.saturating_sub(self.opp_stack)
    }

    /// Total chips in the middle.
    pub fn pot(&self, starting_stack: u32) -> u32 {
        self.my_contribution(starting_stack) + self.opp_contribution(starting_stack)
    }
}

/// Per-round information delivered before the first decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStart {
    /// 1-based round number within the match.
    pub round_num: u32,
    /// Our cumulative result so far.
    pub bankroll: i64,
    /// Whether we post the big blind this round.
    pub big_blind: bool,
}

/// Per-round information delivered after the round resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Chips won (positive) or lost (negative) this round.
    pub delta: i64,
    /// Street the round ended on.
    pub street: Street,
    /// Pips on that street.
    pub my_pip: u32,
    pub opp_pip: u32,
    /// Total chips committed this round.
    pub my_contribution: u32,
    pub opp_contribution: u32,
    /// Whether the opponent's hole cards were shown.
    pub opponent_revealed: bool,
}
