use std::ops::RangeInclusive;

use rand::Rng;

use crate::core::{Card, CardBitSet, Hand, PokerError, Suit, Value};

/// Number of riffle passes done by [`Deck::riffle_shuffle`].
const RIFFLE_PASSES: usize = 5;

/// Cards taken from each half on every step of the interleave.
const RIFFLE_RUN: RangeInclusive<usize> = 1..=3;

/// The fewest and most players that can sit at a table.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// Cards consumed by [`Deck::deal_board`]: three burns plus five on the board.
const BOARD_DEAL_SIZE: usize = 8;

/// Scale a `lo..=hi` range given for a 52 card deck to a deck of `n` cards.
fn scaled_range(n: usize, lo: usize, hi: usize) -> (usize, usize) {
    let lo = n * lo / 52;
    let hi = (n * hi / 52).max(lo);
    (lo, hi)
}

/// The flop, turn, and river along with the cards burned before each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DealtBoard {
    pub flop: [Card; 3],
    pub turn: Card,
    pub river: Card,
    pub burned: [Card; 3],
}

impl DealtBoard {
    /// All five community cards in the order they were dealt.
    pub fn cards(&self) -> [Card; 5] {
        [
            self.flop[0],
            self.flop[1],
            self.flop[2],
            self.turn,
            self.river,
        ]
    }
}

/// An ordered deck. Cards are dealt from the front.
///
/// Every card in a deck is unique, and dealing moves cards out of the deck
/// so a card can never be in two places at once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "DeckRepr")
)]
pub struct Deck {
    /// Card storage, front of the deck first.
    cards: Vec<Card>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DeckRepr {
    cards: Vec<Card>,
}

#[cfg(feature = "serde")]
impl TryFrom<DeckRepr> for Deck {
    type Error = PokerError;

    fn try_from(repr: DeckRepr) -> Result<Self, Self::Error> {
        Deck::from_cards(repr.cards)
    }
}

impl Deck {
    /// Create the default 52 card deck in canonical order.
    ///
    /// ```
    /// use holdem_odds::core::Deck;
    ///
    /// assert_eq!(52, Deck::new().len());
    /// ```
    pub fn new() -> Self {
        let cards = Value::values()
            .into_iter()
            .flat_map(|v| Suit::suits().into_iter().map(move |s| Card::new(v, s)))
            .collect();
        Self { cards }
    }

    /// Create a deck from cards in a given order.
    ///
    /// Fails if any card is repeated.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, PokerError> {
        CardBitSet::from_distinct(&cards)?;
        Ok(Self { cards })
    }

    /// How many cards are there in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Have all of the cards been dealt from this deck?
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Given a card, is it in the current deck?
    pub fn contains(&self, c: &Card) -> bool {
        self.cards.contains(c)
    }

    /// Get an iterator from this deck, front first.
    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Deal a card from the front if there is one there to deal.
    pub fn deal(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Shuffle by simulating a dealer riffling the deck.
    ///
    /// Each of the five passes cuts the deck somewhere in the middle third
    /// (`18..=34` for a full deck), drops runs of one to three cards
    /// alternately from the left and right packets until both are empty,
    /// then moves a few cards (`5..=15` for a full deck) from the bottom to
    /// the top. The same rng state always produces the same order.
    ///
    /// ```
    /// use holdem_odds::core::Deck;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut one = Deck::new();
    /// let mut two = Deck::new();
    /// one.riffle_shuffle(&mut StdRng::seed_from_u64(7)).unwrap();
    /// two.riffle_shuffle(&mut StdRng::seed_from_u64(7)).unwrap();
    /// assert_eq!(one, two);
    /// ```
    pub fn riffle_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), PokerError> {
        let n = self.cards.len();
        if n < 2 {
            return Err(PokerError::EmptyDeck(n));
        }

        // Both packets always keep at least one card.
        let (cut_lo, cut_hi) = scaled_range(n, 18, 34);
        let (cut_lo, cut_hi) = (cut_lo.max(1), cut_hi.min(n - 1).max(cut_lo.max(1)));
        let (rot_lo, rot_hi) = scaled_range(n, 5, 15);

        let mut merged = Vec::with_capacity(n);
        for _ in 0..RIFFLE_PASSES {
            let cut = rng.random_range(cut_lo..=cut_hi);
            let (mut left, mut right) = self.cards.split_at(cut);

            merged.clear();
            while !left.is_empty() || !right.is_empty() {
                let take_left = rng.random_range(RIFFLE_RUN).min(left.len());
                let take_right = rng.random_range(RIFFLE_RUN).min(right.len());

                merged.extend_from_slice(&left[..take_left]);
                left = &left[take_left..];
                merged.extend_from_slice(&right[..take_right]);
                right = &right[take_right..];
            }
            std::mem::swap(&mut self.cards, &mut merged);

            let rotation = rng.random_range(rot_lo..=rot_hi);
            self.cards.rotate_right(rotation % n);
        }
        Ok(())
    }

    /// Deal two hole cards to each of `num_players` seats.
    ///
    /// Cards go out one at a time starting with the seat after the dealer and
    /// wrapping around the table, twice. The returned hands are indexed by
    /// seat, not by dealing order.
    pub fn deal_hole_cards(
        &mut self,
        num_players: usize,
        dealer: usize,
    ) -> Result<Vec<Hand>, PokerError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(PokerError::InvalidPlayerCount(num_players));
        }
        if dealer >= num_players {
            return Err(PokerError::InvalidSeat {
                seat: dealer,
                num_players,
            });
        }
        let needed = 2 * num_players;
        if self.cards.len() < needed {
            return Err(PokerError::InsufficientCards {
                needed,
                available: self.cards.len(),
            });
        }

        let dealt: Vec<Card> = self.cards.drain(..needed).collect();
        let hands = (0..num_players)
            .map(|seat| {
                // Position of this seat in the dealing order.
                let order = (seat + num_players - dealer - 1) % num_players;
                Hand::from_dealt(dealt[order], dealt[num_players + order])
            })
            .collect();
        Ok(hands)
    }

    /// Burn and deal the flop, the turn, and the river.
    pub fn deal_board(&mut self) -> Result<DealtBoard, PokerError> {
        if self.cards.len() < BOARD_DEAL_SIZE {
            return Err(PokerError::InsufficientCards {
                needed: BOARD_DEAL_SIZE,
                available: self.cards.len(),
            });
        }

        let c: Vec<Card> = self.cards.drain(..BOARD_DEAL_SIZE).collect();
        Ok(DealtBoard {
            flop: [c[1], c[2], c[3]],
            turn: c[5],
            river: c[7],
            burned: [c[0], c[4], c[6]],
        })
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a deck into an iterator
impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;
    /// Consume this deck and create a new iterator.
    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}
