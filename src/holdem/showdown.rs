use std::cmp::Ordering;

use tracing::{Level, event};

use crate::core::{
    Board, Card, CardBitSet, Hand, MAX_PLAYERS, MIN_PLAYERS, PokerError, Score, best_five,
};
use crate::utils::PlayerBitSet;

/// Who won at showdown and with what.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Showdown {
    /// Every player's best score and the five cards that make it, by seat.
    pub hands: Vec<(Score, [Card; 5])>,
    /// Seats holding the best score. More than one means a split pot.
    pub winners: PlayerBitSet,
}

impl Showdown {
    /// The winning score.
    pub fn best(&self) -> Option<Score> {
        self.winners.ones().next().and_then(|idx| self.score(idx))
    }

    pub fn is_split(&self) -> bool {
        self.winners.count() > 1
    }

    pub fn score(&self, idx: usize) -> Option<Score> {
        self.hands.get(idx).map(|(score, _)| *score)
    }

    /// Each winner's seat with the five cards to highlight.
    pub fn winning_combos(&self) -> impl Iterator<Item = (usize, [Card; 5])> + '_ {
        self.winners
            .ones()
            .filter_map(|idx| self.hands.get(idx).map(|(_, combo)| (idx, *combo)))
    }
}

/// Score every player's best five out of seven and find everyone holding
/// the top score.
///
/// The board must be complete and nobody may share a card with anyone else
/// or with the board.
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::resolve_winners;
///
/// let board = Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap();
/// let hands = vec![
///     Hand::new_from_str("A♣ A♦").unwrap(),
///     Hand::new_from_str("K♣ K♥").unwrap(),
/// ];
/// let showdown = resolve_winners(&hands, &board).unwrap();
/// assert!(showdown.winners.get(0));
/// assert!(!showdown.is_split());
/// ```
pub fn resolve_winners(hands: &[Hand], board: &Board) -> Result<Showdown, PokerError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&hands.len()) {
        return Err(PokerError::InvalidPlayerCount(hands.len()));
    }
    if !board.is_complete() {
        return Err(PokerError::InvalidBoardSize(board.len()));
    }
    let mut seen = CardBitSet::from_distinct(board.cards())?;
    for hand in hands {
        seen.insert_distinct(&hand.cards())?;
    }

    let mut cards = [board.cards()[0]; 7];
    cards[2..].copy_from_slice(board.cards());
    let scored: Vec<(Score, [Card; 5])> = hands
        .iter()
        .map(|hand| {
            let [first, second] = hand.cards();
            cards[0] = first;
            cards[1] = second;
            best_five(&cards)
        })
        .collect();

    let (winners, best) = scored.iter().enumerate().fold(
        (PlayerBitSet::default(), None::<Score>),
        |(mut found, best), (idx, (score, _))| match best.map(|b| score.cmp(&b)) {
            Some(Ordering::Equal) => {
                found.enable(idx);
                (found, best)
            }
            Some(Ordering::Less) => (found, best),
            // Either the first player or a new best.
            _ => (PlayerBitSet::single(idx), Some(*score)),
        },
    );

    event!(
        Level::DEBUG,
        players = hands.len(),
        winners = ?winners,
        best = ?best,
        "showdown resolved"
    );
    Ok(Showdown {
        hands: scored,
        winners,
    })
}
