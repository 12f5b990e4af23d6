//! Poker hand evaluation.
//!
//! Ranks 5, 6 or 7 card hands directly from rank counts and per-suit rank
//! masks, without enumerating 5-card subsets. The result is a packed
//! [`HandRank`] whose integer order is the standard poker order.

use super::card::Card;
use std::cmp::Ordering;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    /// Get the category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

/// A hand rank that can be compared.
/// Higher values are better hands.
/// Format: category (4 bits) | kicker1 (4 bits) | kicker2 (4 bits) | ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandRank(u32);

impl HandRank {
    fn new(category: HandCategory, kickers: &[u8]) -> Self {
        let mut value = (category as u32) << 20;
        for (i, &k) in kickers.iter().take(5).enumerate() {
            value |= (k as u32) << (16 - i * 4);
        }
        Self(value)
    }

    /// Get the raw rank value for comparison.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Get the hand category.
    pub fn category(&self) -> HandCategory {
        match self.0 >> 20 {
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            _ => HandCategory::HighCard,
        }
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Ranks present in `mask`, highest first, up to `N` of them.
fn top_ranks<const N: usize>(mask: u16) -> ([u8; N], usize) {
    let mut out = [0u8; N];
    let mut n = 0;
    for rank in (0..13u8).rev() {
        if n == N {
            break;
        }
        if mask & (1 << rank) != 0 {
            out[n] = rank;
            n += 1;
        }
    }
    (out, n)
}

/// Hand evaluator for poker hands.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandEvaluator;

impl HandEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the best 5-card hand contained in 5 to 7 cards.
    pub fn evaluate(&self, cards: &[Card]) -> HandRank {
        debug_assert!((5..=7).contains(&cards.len()), "need 5-7 cards, got {}", cards.len());

        let mut rank_counts = [0u8; 13];
        let mut suit_masks = [0u16; 4];
        for card in cards {
            rank_counts[card.rank() as usize] += 1;
            suit_masks[card.suit() as usize] |= 1 << card.rank();
        }

        // At most one suit can hold five of seven cards
        let flush_mask = suit_masks.iter().copied().find(|m| m.count_ones() >= 5);
        if let Some(mask) = flush_mask {
            if let Some(high) = Self::find_straight(mask) {
                return HandRank::new(HandCategory::StraightFlush, &[high]);
            }
        }

        // Rank masks by multiplicity
        let mut quads = 0u16;
        let mut trips = 0u16;
        let mut pairs = 0u16;
        let mut singles = 0u16;
        for (rank, &count) in rank_counts.iter().enumerate() {
            let bit = 1u16 << rank;
            match count {
                4 => quads |= bit,
                3 => trips |= bit,
                2 => pairs |= bit,
                1 => singles |= bit,
                _ => {}
            }
        }

        if quads != 0 {
            let (q, _) = top_ranks::<1>(quads);
            let (kicker, _) = top_ranks::<1>((trips | pairs | singles) & !quads);
            return HandRank::new(HandCategory::FourOfAKind, &[q[0], kicker[0]]);
        }

        if trips != 0 {
            let (t, _) = top_ranks::<1>(trips);
            let (p, found) = top_ranks::<1>((trips & !(1 << t[0])) | pairs);
            if found == 1 {
                return HandRank::new(HandCategory::FullHouse, &[t[0], p[0]]);
            }
        }

        if let Some(mask) = flush_mask {
            let (ranks, _) = top_ranks::<5>(mask);
            return HandRank::new(HandCategory::Flush, &ranks);
        }

        let all_ranks = quads | trips | pairs | singles;
        if let Some(high) = Self::find_straight(all_ranks) {
            return HandRank::new(HandCategory::Straight, &[high]);
        }

        if trips != 0 {
            let (t, _) = top_ranks::<1>(trips);
            let (k, _) = top_ranks::<2>(singles);
            return HandRank::new(HandCategory::ThreeOfAKind, &[t[0], k[0], k[1]]);
        }

        let (p, num_pairs) = top_ranks::<2>(pairs);
        if num_pairs == 2 {
            let rest = (pairs & !(1 << p[0]) & !(1 << p[1])) | singles;
            let (k, _) = top_ranks::<1>(rest);
            return HandRank::new(HandCategory::TwoPair, &[p[0], p[1], k[0]]);
        }
        if num_pairs == 1 {
            let (k, _) = top_ranks::<3>(singles);
            return HandRank::new(HandCategory::OnePair, &[p[0], k[0], k[1], k[2]]);
        }

        let (k, _) = top_ranks::<5>(singles);
        HandRank::new(HandCategory::HighCard, &k)
    }

    /// Compare two hands sharing a board.
    pub fn compare(&self, ours: &[Card], theirs: &[Card]) -> Ordering {
        self.evaluate(ours).cmp(&self.evaluate(theirs))
    }

    /// Find the highest straight from a rank bitmask.
    /// Returns the rank of the straight's top card (3 for the wheel).
    fn find_straight(rank_bits: u16) -> Option<u8> {
        // Shift up one and copy the ace into bit 0 so A-2-3-4-5 is contiguous
        let bits = (rank_bits << 1) | ((rank_bits >> 12) & 1);
        (4..=13u8).rev().find_map(|top| {
            let window = 0b11111u16 << (top - 4);
            (bits & window == window).then(|| top - 1)
        })
    }
}
