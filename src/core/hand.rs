use std::fmt;

use super::{Card, CardBitSet, PokerError, parse_cards};

/// The two private hole cards held by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "HandRepr")
)]
pub struct Hand {
    cards: [Card; 2],
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct HandRepr {
    cards: [Card; 2],
}

#[cfg(feature = "serde")]
impl TryFrom<HandRepr> for Hand {
    type Error = PokerError;

    fn try_from(repr: HandRepr) -> Result<Self, Self::Error> {
        Hand::new(repr.cards[0], repr.cards[1])
    }
}

impl Hand {
    /// Create a hand from two different cards.
    ///
    /// ```
    /// use holdem_odds::core::{Card, Hand, Suit, Value};
    ///
    /// let ace = Card::new(Value::Ace, Suit::Club);
    /// assert!(Hand::new(ace, Card::new(Value::Ace, Suit::Diamond)).is_ok());
    /// assert!(Hand::new(ace, ace).is_err());
    /// ```
    pub fn new(first: Card, second: Card) -> Result<Self, PokerError> {
        if first == second {
            return Err(PokerError::DuplicateCard(first));
        }
        Ok(Self::from_dealt(first, second))
    }

    /// Cards that came out of a deck are already known to be different.
    pub(crate) fn from_dealt(first: Card, second: Card) -> Self {
        Self {
            cards: [first, second],
        }
    }

    /// Parse a hand like `"A♣ A♦"` or `"AcAd"`.
    pub fn new_from_str(hand_string: &str) -> Result<Self, PokerError> {
        let cards = if hand_string.contains(|c: char| c.is_whitespace() || c == ',') {
            parse_cards(hand_string)?
        } else {
            split_compact(hand_string)?
        };
        match cards.as_slice() {
            [first, second] => Self::new(*first, *second),
            _ => Err(PokerError::InvalidCardCount {
                expected: 2,
                found: cards.len(),
            }),
        }
    }

    pub fn cards(&self) -> [Card; 2] {
        self.cards
    }

    pub fn contains(&self, c: &Card) -> bool {
        self.cards.contains(c)
    }
}

/// Split tokens written back to back such as `AcKd` or `10♠J♠`.
/// Every token ends in a suit so that's where the splits go.
fn split_compact(s: &str) -> Result<Vec<Card>, PokerError> {
    let mut cards = vec![];
    let mut start = 0;
    for (idx, ch) in s.char_indices() {
        // A suit letter can't be the first char of a token.
        if idx > start && super::Suit::from_char(ch).is_some() {
            let end = idx + ch.len_utf8();
            cards.push(s[start..end].parse()?);
            start = end;
        }
    }
    if start != s.len() {
        return Err(PokerError::InvalidCard(s[start..].to_string()));
    }
    Ok(cards)
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.cards[0], self.cards[1])
    }
}

/// Which community cards have been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardStage {
    Empty,
    Flop,
    Turn,
    River,
}

/// The shared community cards.
///
/// A board holds 0, 3, 4, or 5 distinct cards and only ever grows: the flop,
/// then the turn, then the river.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BoardRepr")
)]
pub struct Board {
    cards: Vec<Card>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BoardRepr {
    cards: Vec<Card>,
}

#[cfg(feature = "serde")]
impl TryFrom<BoardRepr> for Board {
    type Error = PokerError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Board::from_cards(&repr.cards)
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cards: Vec::with_capacity(5),
        }
    }

    /// Create a board from already revealed cards.
    ///
    /// ```
    /// use holdem_odds::core::{parse_cards, Board, BoardStage};
    ///
    /// let board = Board::from_cards(&parse_cards("A♦ K♦ Q♦ J♦").unwrap()).unwrap();
    /// assert_eq!(BoardStage::Turn, board.stage());
    /// assert!(Board::from_cards(&parse_cards("A♦ K♦").unwrap()).is_err());
    /// ```
    pub fn from_cards(cards: &[Card]) -> Result<Self, PokerError> {
        if !matches!(cards.len(), 0 | 3 | 4 | 5) {
            return Err(PokerError::InvalidBoardSize(cards.len()));
        }
        CardBitSet::from_distinct(cards)?;
        Ok(Self {
            cards: cards.to_vec(),
        })
    }

    /// Cards dealt from one deck are distinct already.
    pub(crate) fn from_dealt(cards: &[Card]) -> Self {
        Self {
            cards: cards.to_vec(),
        }
    }

    pub fn stage(&self) -> BoardStage {
        match self.cards.len() {
            0 => BoardStage::Empty,
            3 => BoardStage::Flop,
            4 => BoardStage::Turn,
            _ => BoardStage::River,
        }
    }

    /// Reveal the flop on an empty board.
    pub fn deal_flop(&mut self, flop: [Card; 3]) -> Result<(), PokerError> {
        self.reveal(BoardStage::Empty, &flop)
    }

    /// Reveal the turn after the flop.
    pub fn deal_turn(&mut self, turn: Card) -> Result<(), PokerError> {
        self.reveal(BoardStage::Flop, &[turn])
    }

    /// Reveal the river after the turn.
    pub fn deal_river(&mut self, river: Card) -> Result<(), PokerError> {
        self.reveal(BoardStage::Turn, &[river])
    }

    fn reveal(&mut self, expected: BoardStage, cards: &[Card]) -> Result<(), PokerError> {
        if self.stage() != expected {
            return Err(PokerError::InvalidBoardSize(self.cards.len() + cards.len()));
        }
        let mut seen = CardBitSet::from_distinct(&self.cards)?;
        seen.insert_distinct(cards)?;
        self.cards.extend_from_slice(cards);
        Ok(())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() == 5
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, card) in self.cards.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}
