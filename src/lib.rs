//! holdem_odds is a Texas Hold'em rules and probability engine.
//!
//! It deals from a riffle shuffled deck, scores five card hands and the best
//! five out of seven, resolves split pots, and works out how likely unseen
//! hands are to beat or tie a hero, both exactly and by sampling.
//!
//! ```
//! use holdem_odds::core::{Board, Hand, parse_cards};
//! use holdem_odds::holdem::EquityReportBuilder;
//!
//! let report = EquityReportBuilder::default()
//!     .hero(Hand::new_from_str("A♣ A♦").unwrap())
//!     .board(Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap())
//!     .total_players(6)
//!     .build()
//!     .unwrap();
//! assert!(report.risk() < 0.5);
//! ```

/// Cards, the deck, and hand scoring. Nothing in core knows about
/// opponents or streets.
pub mod core;
/// Equity, showdown, and hand state for Hold'em.
pub mod holdem;
/// Small helpers shared by the other modules.
pub mod utils;
