//! This is the core module. It exports the cards, the deck, and the hand
//! evaluator. Nothing in here knows about betting streets or opponents.

/// card.rs has value and suit.
mod card;
/// Re-export Card, Value, and Suit
pub use self::card::{Card, Suit, Value, parse_cards};

/// Bitset of cards used for validation and unseen card sets.
mod card_bit_set;
pub use self::card_bit_set::{CardBitSet, CardBitSetIter};

/// Hole cards and the community board.
mod hand;
pub use self::hand::{Board, BoardStage, Hand};

/// Deck is the ordered 52 card deck with the riffle shuffle and dealing.
mod deck;
pub use self::deck::{DealtBoard, Deck, MAX_PLAYERS, MIN_PLAYERS};

/// 5 card hand scoring and the best 5 out of 7.
mod rank;
pub use self::rank::{
    Category, Rankable, STRAIGHTS, Score, evaluate_best, evaluate_best_seven, evaluate_five,
};
pub(crate) use self::rank::best_five;

/// The ten entry hand chart and its mapping onto categories.
mod hand_class;
pub use self::hand_class::HandClass;

/// Errors returned by everything in the crate.
mod error;
pub use self::error::PokerError;
