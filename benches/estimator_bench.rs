//! Benchmarks for hand evaluation, strength estimation and decisions.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use headsup_bot::cards::{Board, Card, HandEvaluator, HoleCards};
use headsup_bot::equity::{uniform_weight, HandStrengthEstimator, PreflopEquityTable};
use headsup_bot::policy::{BettingPolicy, DecisionView, LegalActions, PolicyConfig, RaiseBounds, RoundStart};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn evaluator_benchmark(c: &mut Criterion) {
    let evaluator = HandEvaluator::new();
    let cards = Card::parse_many("AsKdQh7c2s9d9h").unwrap();

    c.bench_function("evaluate_7_cards", |b| {
        b.iter(|| black_box(evaluator.evaluate(black_box(&cards))))
    });
}

fn estimator_benchmark(c: &mut Criterion) {
    let table = PreflopEquityTable::bundled().unwrap();
    let estimator = HandStrengthEstimator::new(&table);
    let hole: HoleCards = "AhJh".parse().unwrap();

    for (name, board) in [
        ("estimate_flop_1000", "Kh7h2c"),
        ("estimate_turn_1000", "Kh7h2c9s"),
        ("estimate_river_1000", "Kh7h2c9s3d"),
    ] {
        let board: Board = board.parse().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        c.bench_function(name, |b| {
            b.iter(|| black_box(estimator.estimate(&hole, &board, uniform_weight, 1000, &mut rng)))
        });
    }
}

fn decide_benchmark(c: &mut Criterion) {
    let table = Arc::new(PreflopEquityTable::bundled().unwrap());
    let mut policy = BettingPolicy::from_seed(PolicyConfig::default(), table, 42);
    let view = DecisionView {
        hole: "QsJs".parse().unwrap(),
        board: "Ts9d2c".parse().unwrap(),
        my_pip: 0,
        opp_pip: 8,
        my_stack: 394,
        opp_stack: 386,
        legal: LegalActions::facing_bet(Some(RaiseBounds::new(16, 394))),
    };

    c.bench_function("decide_flop_facing_bet", |b| {
        b.iter(|| {
            policy.begin_round(RoundStart {
                round_num: 1,
                bankroll: 0,
                big_blind: true,
            });
            black_box(policy.decide(black_box(&view)))
        })
    });
}

criterion_group!(benches, evaluator_benchmark, estimator_benchmark, decide_benchmark);
criterion_main!(benches);
