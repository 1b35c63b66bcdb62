#[macro_use]
extern crate criterion;
extern crate holdem_odds;

use criterion::Criterion;
use holdem_odds::core::{Deck, Rankable, evaluate_best_seven};

fn rank_one(c: &mut Criterion) {
    let hand: Vec<_> = Deck::new().iter().copied().step_by(7).take(5).collect();
    c.bench_function("Rank one 5 card hand", move |b| b.iter(|| hand.rank_five()));
}

fn rank_best_seven(c: &mut Criterion) {
    let hand: Vec<_> = Deck::new().iter().copied().step_by(5).take(7).collect();
    c.bench_function("Rank best 5card hand from 7", move |b| {
        b.iter(|| evaluate_best_seven(&hand))
    });
}

criterion_group!(benches, rank_one, rank_best_seven);
criterion_main!(benches);
