#![no_main]
use holdem_odds::core::{evaluate_best_seven, evaluate_five};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|cards: [holdem_odds::core::Card; 7]| {
    // Duplicate cards are rejected, not ranked.
    let Ok((best, combo)) = evaluate_best_seven(&cards) else {
        return;
    };
    assert_eq!(Ok(best), evaluate_five(&combo));

    let mut max_five = None;
    for a in 0..7 {
        for b in a + 1..7 {
            let five: Vec<_> = (0..7)
                .filter(|&i| i != a && i != b)
                .map(|i| cards[i])
                .collect();
            let score = evaluate_five(&five).unwrap();
            assert!(best >= score);
            max_five = max_five.max(Some(score));
        }
    }
    assert_eq!(Some(best), max_five);
});
