//! Precomputed preflop win rates and percentile ranks.
//!
//! The table is read once from a 169-line text file, one line per canonical
//! starting hand:
//!
//! ```text
//! rank1 rank2 suited win_pct
//! 14 14 0 85.21
//! 14 13 1 67.04
//! ```
//!
//! Ranks are offset by two (2..=14), `suited` is 0 or 1, and `win_pct` is the
//! head-up win percentage against a uniformly random hand. Every concrete
//! hole pair inherits the value of its class, so lookups are symmetric under
//! suit relabelling and under swapping the two cards.

use crate::cards::card::{HandClass, HoleCards, NUM_CLASSES, NUM_COMBOS};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// The table shipped with the crate.
const BUNDLED_TABLE: &str = include_str!("../../data/preflop_equity.txt");

/// Errors raised while loading the preflop table. All of them are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read equity table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("equity table line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("equity table line {line}: hand class {class} already defined")]
    Duplicate { line: usize, class: HandClass },
    #[error("equity table defines {found} of {expected} hand classes")]
    Incomplete { found: usize, expected: usize },
}

/// Immutable preflop win-rate and percentile lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PreflopEquityTable {
    /// Win percentage per class index.
    win_rate: [f64; NUM_CLASSES],
    /// Percentile rank (0, 100] per class index.
    percentile: [f64; NUM_CLASSES],
}

impl PreflopEquityTable {
    /// Build a table from per-class win percentages.
    pub fn from_class_rates(win_rate: [f64; NUM_CLASSES]) -> Self {
        let percentile = Self::rank_percentiles(&win_rate);
        Self { win_rate, percentile }
    }

    /// Load the table from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        text.parse()
    }

    /// The table compiled into the crate from `data/preflop_equity.txt`.
    pub fn bundled() -> Result<Self, TableError> {
        BUNDLED_TABLE.parse()
    }

    /// Win percentage (0-100) of a hole pair against a random hand.
    #[inline]
    pub fn win_rate(&self, hole: &HoleCards) -> f64 {
        self.win_rate[hole.class().index()]
    }

    /// Win percentage of a hand class.
    #[inline]
    pub fn class_win_rate(&self, class: HandClass) -> f64 {
        self.win_rate[class.index()]
    }

    /// Percentile rank (0, 100] of a hole pair; 100 is the strongest.
    #[inline]
    pub fn percentile(&self, hole: &HoleCards) -> f64 {
        self.percentile[hole.class().index()]
    }

    /// Percentile rank of a hand class.
    #[inline]
    pub fn class_percentile(&self, class: HandClass) -> f64 {
        self.percentile[class.index()]
    }

    /// Classes sorted from strongest to weakest.
    pub fn classes_by_strength(&self) -> Vec<HandClass> {
        let mut classes: Vec<HandClass> = HandClass::all().collect();
        classes.sort_by(|a, b| self.class_win_rate(*b).total_cmp(&self.class_win_rate(*a)));
        classes
    }

    /// Sort all 1326 combos by win rate; each group of equal win rates takes
    /// the rank of its last member.
    fn rank_percentiles(win_rate: &[f64; NUM_CLASSES]) -> [f64; NUM_CLASSES] {
        let mut combos: Vec<(f64, usize)> = HoleCards::all()
            .map(|hole| {
                let class = hole.class().index();
                (win_rate[class], class)
            })
            .collect();
        combos.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut percentile = [0.0; NUM_CLASSES];
        let mut start = 0;
        while start < combos.len() {
            let mut end = start;
            while end + 1 < combos.len() && combos[end + 1].0 == combos[start].0 {
                end += 1;
            }
            let rank = 100.0 * (end + 1) as f64 / NUM_COMBOS as f64;
            for &(_, class) in &combos[start..=end] {
                percentile[class] = rank;
            }
            start = end + 1;
        }
        percentile
    }

    fn parse_line(line_no: usize, line: &str) -> Result<(HandClass, f64), TableError> {
        let malformed = |reason: String| TableError::Malformed { line: line_no, reason };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [r1, r2, suited, pct] = fields.as_slice() else {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        };

        let rank = |token: &str| -> Result<u8, TableError> {
            match token.parse::<u8>() {
                Ok(r) if (2..=14).contains(&r) => Ok(r - 2),
                _ => Err(malformed(format!("rank {token:?} is not in 2..=14"))),
            }
        };
        let (r1, r2) = (rank(r1)?, rank(r2)?);

        let suited = match *suited {
            "0" => false,
            "1" => true,
            other => return Err(malformed(format!("suited flag {other:?} is not 0 or 1"))),
        };
        if suited && r1 == r2 {
            return Err(malformed("a pair cannot be suited".to_string()));
        }

        let pct: f64 = pct
            .parse()
            .map_err(|_| malformed(format!("win percentage {pct:?} is not a number")))?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(malformed(format!("win percentage {pct} is outside 0..=100")));
        }

        Ok((HandClass::new(r1, r2, suited), pct))
    }
}

impl FromStr for PreflopEquityTable {
    type Err = TableError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut rates: FxHashMap<HandClass, f64> = FxHashMap::default();

        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (class, pct) = Self::parse_line(i + 1, line)?;
            if rates.insert(class, pct).is_some() {
                return Err(TableError::Duplicate { line: i + 1, class });
            }
        }

        if rates.len() != NUM_CLASSES {
            return Err(TableError::Incomplete {
                found: rates.len(),
                expected: NUM_CLASSES,
            });
        }

        let mut win_rate = [0.0; NUM_CLASSES];
        for (class, pct) in rates {
            win_rate[class.index()] = pct;
        }
        Ok(Self::from_class_rates(win_rate))
    }
}
