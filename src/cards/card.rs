//! Card representation and the text codec.
//!
//! This module provides the fundamental card types used by every other part
//! of the engine:
//! - `Card`: a single playing card, densely encoded as `rank * 4 + suit`
//! - `HoleCards`: an unordered pair of private cards
//! - `HandClass`: one of the 169 strategically distinct starting hands
//! - `Board`: the shared community cards (0, 3, 4 or 5 cards)
//! - `Deck`: the unseen cards, used for random run-outs

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rank of a card (0-12: 2-A).
pub const RANK_2: u8 = 0;
pub const RANK_3: u8 = 1;
pub const RANK_4: u8 = 2;
pub const RANK_5: u8 = 3;
pub const RANK_6: u8 = 4;
pub const RANK_7: u8 = 5;
pub const RANK_8: u8 = 6;
pub const RANK_9: u8 = 7;
pub const RANK_T: u8 = 8;
pub const RANK_J: u8 = 9;
pub const RANK_Q: u8 = 10;
pub const RANK_K: u8 = 11;
pub const RANK_A: u8 = 12;

/// Suit of a card (0-3).
pub const SUIT_SPADES: u8 = 0;
pub const SUIT_HEARTS: u8 = 1;
pub const SUIT_CLUBS: u8 = 2;
pub const SUIT_DIAMONDS: u8 = 3;

/// Number of distinct cards.
pub const NUM_CARDS: usize = 52;

/// Number of concrete two-card starting hands.
pub const NUM_COMBOS: usize = 1326;

/// Number of canonical starting-hand classes.
pub const NUM_CLASSES: usize = 169;

const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];
const SUIT_CHARS: [char; 4] = ['s', 'h', 'c', 'd'];

/// Errors produced when decoding cards, hands and boards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// The token is not a rank character followed by a suit character.
    #[error("invalid card token {0:?}")]
    InvalidToken(String),
    /// The same card appears twice where distinct cards are required.
    #[error("duplicate card {0}")]
    Duplicate(Card),
    /// A board must hold 0, 3, 4 or 5 cards.
    #[error("a board cannot hold {0} cards")]
    InvalidBoardSize(usize),
    /// A hole pair must hold exactly two cards.
    #[error("hole cards need exactly 2 cards, got {0}")]
    InvalidHoleSize(usize),
}

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    /// Card index 0-51: rank * 4 + suit
    id: u8,
}

impl Card {
    /// Create a new card from rank (0-12) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { id: rank * 4 + suit }
    }

    /// Create a card from its ID (0-51).
    #[inline]
    pub fn from_id(id: u8) -> Self {
        debug_assert!(id < 52, "card id must be 0-51");
        Self { id }
    }

    /// Parse a whitespace-optional run of tokens like "AsKh 7d".
    pub fn parse_many(s: &str) -> Result<Vec<Card>, CardError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len() % 2 != 0 {
            return Err(CardError::InvalidToken(s.to_string()));
        }
        compact
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let token = std::str::from_utf8(pair)
                    .map_err(|_| CardError::InvalidToken(s.to_string()))?;
                token.parse()
            })
            .collect()
    }

    /// Get the card's ID (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Get the card's rank (0-12: 2-A).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    /// Get the card's suit (0-3).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }

    /// Bit for this card in a 52-bit card set.
    #[inline]
    pub fn mask(&self) -> u64 {
        1u64 << self.id
    }

    pub fn rank_char(&self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }

    /// All 52 cards in id order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..NUM_CARDS as u8).map(Card::from_id)
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parse a card from a token like "As", "Kh", "2c".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardError::InvalidToken(s.to_string()));
        };
        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == r.to_ascii_uppercase())
            .ok_or_else(|| CardError::InvalidToken(s.to_string()))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == u.to_ascii_lowercase())
            .ok_or_else(|| CardError::InvalidToken(s.to_string()))?;
        Ok(Self::new(rank as u8, suit as u8))
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A player's two hole cards.
///
/// The pair is unordered: construction normalises so that `card1` holds the
/// higher card id, which makes `(A, B)` and `(B, A)` the same value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoleCards {
    /// Higher card (by id).
    pub card1: Card,
    /// Lower card (by id).
    pub card2: Card,
}

impl HoleCards {
    /// Create hole cards from two distinct cards in either order.
    pub fn new(card1: Card, card2: Card) -> Self {
        debug_assert!(card1 != card2, "hole cards must be distinct");
        if card1.id() >= card2.id() {
            Self { card1, card2 }
        } else {
            Self {
                card1: card2,
                card2: card1,
            }
        }
    }

    /// Build hole cards from a slice, rejecting wrong sizes and duplicates.
    pub fn try_from_slice(cards: &[Card]) -> Result<Self, CardError> {
        match cards {
            [a, b] if a == b => Err(CardError::Duplicate(*a)),
            [a, b] => Ok(Self::new(*a, *b)),
            _ => Err(CardError::InvalidHoleSize(cards.len())),
        }
    }

    /// Check if hole cards are suited.
    pub fn is_suited(&self) -> bool {
        self.card1.suit() == self.card2.suit()
    }

    /// Check if hole cards are a pair.
    pub fn is_pair(&self) -> bool {
        self.card1.rank() == self.card2.rank()
    }

    /// The canonical starting-hand class of this pair.
    pub fn class(&self) -> HandClass {
        HandClass::new(self.card1.rank(), self.card2.rank(), self.is_suited() && !self.is_pair())
    }

    /// Get both cards as an array.
    pub fn cards(&self) -> [Card; 2] {
        [self.card1, self.card2]
    }

    /// Check if a card conflicts with these hole cards.
    pub fn contains(&self, card: Card) -> bool {
        self.card1 == card || self.card2 == card
    }

    /// 52-bit set of both cards.
    pub fn mask(&self) -> u64 {
        self.card1.mask() | self.card2.mask()
    }

    /// Enumerate all 1326 concrete hole pairs.
    pub fn all() -> impl Iterator<Item = HoleCards> {
        (1..NUM_CARDS as u8).flat_map(|hi| {
            (0..hi).map(move |lo| HoleCards::new(Card::from_id(hi), Card::from_id(lo)))
        })
    }
}

impl FromStr for HoleCards {
    type Err = CardError;

    /// Parse hole cards from a string like "AhKs" or "Ah Ks".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_slice(&Card::parse_many(s)?)
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card1, self.card2)
    }
}

impl fmt::Debug for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// One of the 169 strategically distinct starting hands:
/// 13 pairs, 78 suited and 78 offsuit rank combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandClass {
    /// Higher rank (0-12).
    pub high: u8,
    /// Lower or equal rank (0-12).
    pub low: u8,
    /// Whether both cards share a suit. Always false for pairs.
    pub suited: bool,
}

impl HandClass {
    /// Create a class from two ranks in either order.
    pub fn new(rank1: u8, rank2: u8, suited: bool) -> Self {
        let (high, low) = if rank1 >= rank2 { (rank1, rank2) } else { (rank2, rank1) };
        Self {
            high,
            low,
            suited: suited && high != low,
        }
    }

    /// Dense index (0-168).
    /// Pairs: 0-12 (22-AA)
    /// Suited: 13-90
    /// Offsuit: 91-168
    pub fn index(&self) -> usize {
        if self.high == self.low {
            self.high as usize
        } else {
            let tri = self.high as usize * (self.high as usize - 1) / 2 + self.low as usize;
            if self.suited {
                13 + tri
            } else {
                91 + tri
            }
        }
    }

    /// Inverse of [`HandClass::index`].
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < NUM_CLASSES);
        if index < 13 {
            return Self::new(index as u8, index as u8, false);
        }
        let (suited, mut tri) = if index < 91 { (true, index - 13) } else { (false, index - 91) };
        let mut high = 1u8;
        while tri >= high as usize {
            tri -= high as usize;
            high += 1;
        }
        Self::new(high, tri as u8, suited)
    }

    /// Every class in index order.
    pub fn all() -> impl Iterator<Item = HandClass> {
        (0..NUM_CLASSES).map(HandClass::from_index)
    }

    pub fn is_pair(&self) -> bool {
        self.high == self.low
    }

    /// Number of concrete combos in this class.
    pub fn num_combos(&self) -> usize {
        if self.is_pair() {
            6
        } else if self.suited {
            4
        } else {
            12
        }
    }

    /// A representative concrete hand for this class.
    pub fn representative(&self) -> HoleCards {
        let second_suit = if self.suited { SUIT_SPADES } else { SUIT_HEARTS };
        HoleCards::new(Card::new(self.high, SUIT_SPADES), Card::new(self.low, second_suit))
    }

    /// Enumerate all concrete combos of this class.
    pub fn combos(&self) -> Vec<HoleCards> {
        let mut combos = Vec::with_capacity(self.num_combos());
        for s1 in 0..4u8 {
            for s2 in 0..4u8 {
                let keep = if self.is_pair() {
                    s1 < s2
                } else if self.suited {
                    s1 == s2
                } else {
                    s1 != s2
                };
                if keep {
                    combos.push(HoleCards::new(Card::new(self.high, s1), Card::new(self.low, s2)));
                }
            }
        }
        combos
    }
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hi = RANK_CHARS[self.high as usize];
        let lo = RANK_CHARS[self.low as usize];
        match (self.is_pair(), self.suited) {
            (true, _) => write!(f, "{hi}{lo}"),
            (false, true) => write!(f, "{hi}{lo}s"),
            (false, false) => write!(f, "{hi}{lo}o"),
        }
    }
}

/// Street in a hand, named by how many board cards are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// All streets in dealing order.
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    /// Street for a given number of visible board cards.
    pub fn from_board_len(len: usize) -> Option<Street> {
        match len {
            0 => Some(Street::Preflop),
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    /// Get the next street.
    pub fn next(&self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Get street index (0-3).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Number of board cards for this street.
    pub fn num_board_cards(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Street::Preflop => write!(f, "Preflop"),
            Street::Flop => write!(f, "Flop"),
            Street::Turn => write!(f, "Turn"),
            Street::River => write!(f, "River"),
        }
    }
}

/// Community cards on the board.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self { cards: Vec::with_capacity(5) }
    }

    /// Create a board from cards, checking size and distinctness.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CardError> {
        if Street::from_board_len(cards.len()).is_none() {
            return Err(CardError::InvalidBoardSize(cards.len()));
        }
        let mut seen = 0u64;
        for card in &cards {
            if seen & card.mask() != 0 {
                return Err(CardError::Duplicate(*card));
            }
            seen |= card.mask();
        }
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// 52-bit set of the board cards.
    pub fn mask(&self) -> u64 {
        self.cards.iter().fold(0, |m, c| m | c.mask())
    }

    /// Current street implied by the number of visible cards.
    pub fn street(&self) -> Street {
        Street::from_board_len(self.cards.len()).unwrap_or(Street::River)
    }
}

impl FromStr for Board {
    type Err = CardError;

    /// Parse a board from a string like "AhKsQd" or "Ah Ks Qd".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cards(Card::parse_many(s)?)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

/// The cards not yet seen by the hero.
///
/// Built once per estimate with the dead cards removed, in ascending id
/// order, so the starting order depends only on which cards are dead.
#[derive(Clone)]
pub struct Deck {
    cards: [Card; NUM_CARDS],
    /// Number of usable cards in the deck (52 minus dead cards).
    size: usize,
}

impl Deck {
    /// Create a full deck in id order.
    pub fn new() -> Self {
        Self::without_mask(0)
    }

    /// Create a deck with specific cards removed.
    pub fn without(dead_cards: &[Card]) -> Self {
        Self::without_mask(dead_cards.iter().fold(0, |m, c| m | c.mask()))
    }

    /// Create a deck with every card in the 52-bit `dead` set removed.
    pub fn without_mask(dead: u64) -> Self {
        let mut cards = [Card::from_id(0); NUM_CARDS];
        let mut size = 0;
        for card in Card::all().filter(|c| dead & c.mask() == 0) {
            cards[size] = card;
            size += 1;
        }
        Self { cards, size }
    }

    /// Draw a fresh uniform permutation of the live cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards[..self.size].shuffle(rng);
    }

    /// Number of live cards.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Live cards in their current order.
    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.size]
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} live)", self.size)
    }
}
