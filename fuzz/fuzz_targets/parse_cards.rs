#![no_main]
use std::str;

use holdem_odds::core::{Card, Hand, parse_cards};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = str::from_utf8(data) else {
        return;
    };
    if let Ok(cards) = parse_cards(s) {
        // Anything that parses prints back to something that parses the same.
        let printed: Vec<String> = cards.iter().map(Card::to_string).collect();
        assert_eq!(Ok(cards), parse_cards(&printed.join(" ")));
    }
    let _ = Hand::new_from_str(s);
});
