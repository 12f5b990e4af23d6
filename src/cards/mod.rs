//! Cards, hands and hand evaluation.
//!
//! ## Modules
//!
//! - `card`: card codec, hole cards, hand classes, board, deck and streets
//! - `hand_eval`: 5-7 card hand ranking

pub mod card;
pub mod hand_eval;

pub use card::{Board, Card, CardError, Deck, HandClass, HoleCards, Street};
pub use hand_eval::{HandCategory, HandEvaluator, HandRank};
