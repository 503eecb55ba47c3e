//! Outcome-tree throughput: symmetric infantry battles of growing size.
//!
//! Run with: `cargo bench --bench odds_bench`

use battle_odds::core::config::EngineConfig;
use battle_odds::dice::{hit_probabilities, RollData};
use battle_odds::resolution::{calculate, calculate_parallel, Battle};
use battle_odds::rules::stats::UnitStats;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn infantry_battle(per_side: usize) -> Battle {
    let infantry = UnitStats::new(1, 2);
    Battle::from_stats(vec![infantry.clone(); per_side], vec![infantry; per_side])
        .expect("infantry stats are valid")
}

fn bench_calculate(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("calculate");
    group.sample_size(20);
    for per_side in [5, 10, 20] {
        let battle = infantry_battle(per_side);
        group.bench_with_input(BenchmarkId::new("sequential", per_side), &battle, |b, battle| {
            b.iter(|| black_box(calculate(battle, &config)))
        });
        group.bench_with_input(BenchmarkId::new("parallel", per_side), &battle, |b, battle| {
            b.iter(|| black_box(calculate_parallel(battle, &config)))
        });
    }
    group.finish();
}

fn bench_hit_probabilities(c: &mut Criterion) {
    let roll = RollData::from_groups([(1, 10), (2, 8), (3, 4), (4, 2)], 6);
    c.bench_function("hit_probabilities_mixed_24_dice", |b| {
        b.iter(|| black_box(hit_probabilities(black_box(&roll))))
    });
}

criterion_group!(benches, bench_calculate, bench_hit_probabilities);
criterion_main!(benches);
