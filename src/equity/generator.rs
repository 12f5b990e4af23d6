//! Offline generation of the preflop equity table.
//!
//! Each of the 169 classes is played against a uniformly random opponent
//! hand and a random five-card board. Ties are split, so the reported value
//! is an equity percentage. Classes are simulated in parallel with rayon;
//! every class draws from its own generator seeded from the base seed and the
//! class index, so the output does not depend on thread scheduling.

use super::table::PreflopEquityTable;
use crate::cards::card::{Card, Deck, HandClass, NUM_CLASSES};
use crate::cards::hand_eval::HandEvaluator;
use indicatif::ProgressBar;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::io::{self, Write};

/// Monte Carlo generator for the preflop equity table.
#[derive(Debug, Clone)]
pub struct TableGenerator {
    /// Simulated deals per hand class.
    pub samples_per_class: usize,
    /// Base seed; class `i` uses `seed ^ i`.
    pub seed: u64,
}

impl Default for TableGenerator {
    fn default() -> Self {
        Self {
            samples_per_class: 100_000,
            seed: 0x5eed_0169,
        }
    }
}

impl TableGenerator {
    pub fn new(samples_per_class: usize, seed: u64) -> Self {
        Self {
            samples_per_class,
            seed,
        }
    }

    /// Builder: set samples per class.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples_per_class = samples;
        self
    }

    /// Builder: set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Simulate all classes, returning win percentages indexed by class.
    ///
    /// The progress bar, when given, advances once per finished class.
    pub fn generate(&self, progress: Option<&ProgressBar>) -> [f64; NUM_CLASSES] {
        let rates: Vec<f64> = (0..NUM_CLASSES)
            .into_par_iter()
            .map(|index| {
                let class = HandClass::from_index(index);
                let rate = self.simulate_class(class, index);
                debug!("{class}: {rate:.4}");
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                rate
            })
            .collect();

        let mut out = [0.0; NUM_CLASSES];
        out.copy_from_slice(&rates);
        out
    }

    /// Simulate and wrap the result as a lookup table.
    pub fn generate_table(&self, progress: Option<&ProgressBar>) -> PreflopEquityTable {
        PreflopEquityTable::from_class_rates(self.generate(progress))
    }

    fn simulate_class(&self, class: HandClass, index: usize) -> f64 {
        if self.samples_per_class == 0 {
            return 50.0;
        }
        let evaluator = HandEvaluator::new();
        let mut rng = StdRng::seed_from_u64(self.seed ^ index as u64);
        let hole = class.representative();
        let mut deck = Deck::without_mask(hole.mask());

        let mut ours = [Card::from_id(0); 7];
        let mut theirs = [Card::from_id(0); 7];
        ours[..2].copy_from_slice(&hole.cards());

        let mut score = 0.0;
        for _ in 0..self.samples_per_class {
            deck.shuffle(&mut rng);
            let drawn = deck.cards();
            theirs[..2].copy_from_slice(&drawn[..2]);
            ours[2..].copy_from_slice(&drawn[2..7]);
            theirs[2..].copy_from_slice(&drawn[2..7]);

            score += match evaluator.evaluate(&ours).cmp(&evaluator.evaluate(&theirs)) {
                Ordering::Greater => 1.0,
                Ordering::Equal => 0.5,
                Ordering::Less => 0.0,
            };
        }
        100.0 * score / self.samples_per_class as f64
    }
}

/// Write win percentages in the table file format: pairs from aces down,
/// then suited and offsuit hands, each ordered by high then low rank.
pub fn write_table<W: Write>(out: &mut W, rates: &[f64; NUM_CLASSES]) -> io::Result<()> {
    let mut classes: Vec<HandClass> = HandClass::all().collect();
    classes.sort_by_key(|c| (!c.is_pair(), !c.suited, std::cmp::Reverse((c.high, c.low))));
    for class in classes {
        writeln!(
            out,
            "{} {} {} {:.4}",
            class.high + 2,
            class.low + 2,
            u8::from(class.suited),
            rates[class.index()]
        )?;
    }
    Ok(())
}
