use thiserror::Error;

use super::{Card, Score};
use crate::holdem::Street;

/// This is the core error type for the
/// holdem_odds library. It uses `thiserror` to provide
/// readable error messages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PokerError {
    #[error("Unable to parse card token {0:?}")]
    InvalidCard(String),
    #[error("Expected {expected} cards but found {found}")]
    InvalidCardCount { expected: usize, found: usize },
    #[error("Expected {min} to {max} cards but found {found}")]
    InvalidCardRange { min: usize, max: usize, found: usize },
    #[error("A board holds 0, 3, 4, or 5 cards, not {0}")]
    InvalidBoardSize(usize),
    #[error("Card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("{0:?} can't be made from five distinct cards")]
    InvalidScore(Score),
    #[error("Needed {needed} cards but only {available} are available")]
    InsufficientCards { needed: usize, available: usize },
    #[error("Can't shuffle a deck of {0} cards")]
    EmptyDeck(usize),
    #[error("Player count {0} is outside 2..=10")]
    InvalidPlayerCount(usize),
    #[error("Seat {seat} is not valid for {num_players} players")]
    InvalidSeat { seat: usize, num_players: usize },
    #[error("Opponent count {0} is outside 0..=9")]
    InvalidOpponentCount(usize),
    #[error("Trial count must be positive, got {0}")]
    InvalidTrialCount(usize),
    #[error("Probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("An equity report needs the hero's hole cards")]
    MissingHeroHand,
    #[error("Can't advance after showdown")]
    CantAdvanceStreet,
    #[error("Equity report needs a full board, current street is {0:?}")]
    ReportUnavailable(Street),
    #[error("Hand state doesn't match its cards: {0}")]
    InconsistentHandState(&'static str),
}
