#[macro_use]
extern crate criterion;
extern crate holdem_odds;

use holdem_odds::core::Deck;
use holdem_odds::holdem::HandState;
use rand::rng;

fn riffle_shuffle(c: &mut criterion::Criterion) {
    let mut rng = rng();
    let mut deck = Deck::new();

    c.bench_function("riffle shuffle a Deck", |b| {
        b.iter(|| deck.riffle_shuffle(&mut rng))
    });
}

fn deal_full_table(c: &mut criterion::Criterion) {
    let mut rng = rng();

    c.bench_function("deal 10 players and a board", |b| {
        b.iter(|| HandState::deal(10, 0, &mut rng))
    });
}

criterion_group!(benches, riffle_shuffle, deal_full_table);
criterion_main!(benches);
