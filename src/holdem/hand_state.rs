use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{Level, event};

use super::{EquityReport, RngEquityReportBuilder, Showdown, possible_classes, resolve_winners};
use crate::core::{Board, DealtBoard, Deck, Hand, HandClass, PokerError};
#[cfg(feature = "serde")]
use crate::core::{CardBitSet, MAX_PLAYERS, MIN_PLAYERS};

/// How much of the board has been turned over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Street {
    Flop,
    Turn,
    River,
    /// Hands are shown and the winners known.
    Showdown,
}

impl Street {
    /// The street after this one, if there is one.
    pub fn advance(self) -> Option<Street> {
        match self {
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => Some(Street::Showdown),
            Street::Showdown => None,
        }
    }

    /// Number of board cards visible on this street.
    pub fn board_size(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River | Street::Showdown => 5,
        }
    }
}

/// One dealt hand as it moves from the flop to showdown.
///
/// All cards are dealt up front; the street only controls how many board
/// cards are visible. The state is a plain value owned by the caller, each
/// transition consumes it and hands back the next one.
///
/// ```
/// use holdem_odds::holdem::{HandState, Street};
///
/// let state = HandState::deal_seeded(6, 0, 42).unwrap();
/// assert_eq!(Street::Flop, state.street());
/// assert_eq!(3, state.visible_board().len());
///
/// let state = state.advance().unwrap().advance().unwrap();
/// assert_eq!(Street::River, state.street());
/// assert!(state.possible_classes().is_some());
///
/// let state = state.advance().unwrap();
/// assert!(!state.showdown().unwrap().winners.is_empty());
/// assert!(state.advance().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "HandStateRepr")
)]
pub struct HandState {
    dealer: usize,
    hands: Vec<Hand>,
    board: DealtBoard,
    street: Street,
    possible_classes: Option<BTreeSet<HandClass>>,
    showdown: Option<Showdown>,
    report: Option<EquityReport>,
}

/// Wire shape of [`HandState`], checked before it becomes one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct HandStateRepr {
    dealer: usize,
    hands: Vec<Hand>,
    board: DealtBoard,
    street: Street,
    possible_classes: Option<BTreeSet<HandClass>>,
    showdown: Option<Showdown>,
    report: Option<EquityReport>,
}

#[cfg(feature = "serde")]
impl TryFrom<HandStateRepr> for HandState {
    type Error = PokerError;

    /// The cards must be a possible deal. The chart and showdown are
    /// worked out again from them and have to match what was stored.
    fn try_from(repr: HandStateRepr) -> Result<Self, Self::Error> {
        let num_players = repr.hands.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(PokerError::InvalidPlayerCount(num_players));
        }
        if repr.dealer >= num_players {
            return Err(PokerError::InvalidSeat {
                seat: repr.dealer,
                num_players,
            });
        }
        let mut seen = CardBitSet::new();
        for hand in &repr.hands {
            seen.insert_distinct(&hand.cards())?;
        }
        seen.insert_distinct(&repr.board.cards())?;
        seen.insert_distinct(&repr.board.burned)?;

        let mut state = HandState {
            dealer: repr.dealer,
            hands: repr.hands,
            board: repr.board,
            street: Street::Flop,
            possible_classes: None,
            showdown: None,
            report: None,
        };
        while state.street < repr.street {
            state = state.advance()?;
        }
        if state.possible_classes != repr.possible_classes {
            return Err(PokerError::InconsistentHandState("possible classes"));
        }
        if state.showdown != repr.showdown {
            return Err(PokerError::InconsistentHandState("showdown"));
        }

        if let Some(report) = repr.report {
            if state.street < Street::River {
                return Err(PokerError::ReportUnavailable(state.street));
            }
            if !state.hands.contains(&report.hero_hand) || report.board != state.visible_board() {
                return Err(PokerError::InconsistentHandState("report"));
            }
            state.report = Some(report);
        }
        Ok(state)
    }
}

impl HandState {
    /// Riffle shuffle a fresh deck, deal hole cards starting left of the
    /// dealer, then burn and deal the board.
    pub fn deal<R: Rng + ?Sized>(
        num_players: usize,
        dealer: usize,
        rng: &mut R,
    ) -> Result<Self, PokerError> {
        let mut deck = Deck::new();
        deck.riffle_shuffle(rng)?;
        let hands = deck.deal_hole_cards(num_players, dealer)?;
        let board = deck.deal_board()?;

        event!(Level::DEBUG, num_players, dealer, "hand dealt");
        Ok(Self {
            dealer,
            hands,
            board,
            street: Street::Flop,
            possible_classes: None,
            showdown: None,
            report: None,
        })
    }

    /// Deal with a seeded rng so the same seed always deals the same hand.
    pub fn deal_seeded(num_players: usize, dealer: usize, seed: u64) -> Result<Self, PokerError> {
        Self::deal(num_players, dealer, &mut StdRng::seed_from_u64(seed))
    }

    /// Move to the next street.
    ///
    /// Reaching the river works out which hand classes are possible on the
    /// final board. Reaching showdown resolves the winners.
    pub fn advance(mut self) -> Result<Self, PokerError> {
        let next = self.street.advance().ok_or(PokerError::CantAdvanceStreet)?;
        match next {
            Street::River => {
                self.possible_classes = Some(possible_classes(&self.full_board())?);
            }
            Street::Showdown => {
                self.showdown = Some(resolve_winners(&self.hands, &self.full_board())?);
            }
            Street::Flop | Street::Turn => {}
        }
        event!(Level::DEBUG, from = ?self.street, to = ?next, "street advanced");
        self.street = next;
        Ok(self)
    }

    /// Compute the equity of the hand at `hero_seat` against everyone else
    /// and keep it with the state. Only possible once the river is out.
    ///
    /// `trials` adds a Monte Carlo estimate sampled with `rng`, which is
    /// separate from the rng that dealt the hand.
    pub fn with_report<R: Rng>(
        mut self,
        hero_seat: usize,
        total_players: usize,
        trials: Option<usize>,
        rng: R,
    ) -> Result<Self, PokerError> {
        if self.street < Street::River {
            return Err(PokerError::ReportUnavailable(self.street));
        }
        let hero = *self.hands.get(hero_seat).ok_or(PokerError::InvalidSeat {
            seat: hero_seat,
            num_players: self.hands.len(),
        })?;

        let mut builder = RngEquityReportBuilder::default()
            .hero(hero)
            .board(self.visible_board())
            .total_players(total_players)
            .rng(rng);
        if let Some(trials) = trials {
            builder = builder.trials(trials);
        }
        self.report = Some(builder.build()?);
        Ok(self)
    }

    fn full_board(&self) -> Board {
        Board::from_dealt(&self.board.cards())
    }

    /// The board as far as it has been turned over.
    pub fn visible_board(&self) -> Board {
        Board::from_dealt(&self.board.cards()[..self.street.board_size()])
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn dealer(&self) -> usize {
        self.dealer
    }

    pub fn num_players(&self) -> usize {
        self.hands.len()
    }

    /// Hole cards indexed by seat.
    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, seat: usize) -> Option<&Hand> {
        self.hands.get(seat)
    }

    /// Flop, turn, river and burns, including cards not yet visible.
    pub fn dealt_board(&self) -> &DealtBoard {
        &self.board
    }

    /// Hand classes some holding could make on the final board. Set once
    /// the river is reached.
    pub fn possible_classes(&self) -> Option<&BTreeSet<HandClass>> {
        self.possible_classes.as_ref()
    }

    pub fn showdown(&self) -> Option<&Showdown> {
        self.showdown.as_ref()
    }

    pub fn report(&self) -> Option<&EquityReport> {
        self.report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardBitSet};

    #[test]
    fn test_street_order() {
        let mut street = Street::Flop;
        let mut seen = vec![street];
        while let Some(next) = street.advance() {
            assert!(next > street);
            assert!(next.board_size() >= street.board_size());
            seen.push(next);
            street = next;
        }
        assert_eq!(
            vec![Street::Flop, Street::Turn, Street::River, Street::Showdown],
            seen
        );
    }

    #[test_log::test]
    fn test_full_hand() {
        let state = HandState::deal_seeded(4, 2, 7).unwrap();
        assert_eq!(4, state.num_players());
        assert_eq!(2, state.dealer());
        assert!(state.possible_classes().is_none());

        let state = state.advance().unwrap();
        assert_eq!(Street::Turn, state.street());
        assert_eq!(4, state.visible_board().len());
        assert!(state.possible_classes().is_none());

        let state = state.advance().unwrap();
        let classes = state.possible_classes().unwrap().clone();
        assert!(!classes.is_empty());
        assert!(state.showdown().is_none());

        let state = state.advance().unwrap();
        let showdown = state.showdown().unwrap();
        let best = showdown.best().unwrap();
        // The winning hand is one of the shapes that was possible.
        assert!(classes.contains(&HandClass::from_score(&best)));

        assert_eq!(Err(PokerError::CantAdvanceStreet), state.advance());
    }

    #[test]
    fn test_visible_board_grows() {
        let mut state = HandState::deal_seeded(2, 0, 11).unwrap();
        let full = state.dealt_board().cards();
        for size in [3, 4, 5, 5] {
            let board = state.visible_board();
            assert_eq!(&full[..size], board.cards());
            if state.street() != Street::Showdown {
                state = state.advance().unwrap();
            }
        }
    }

    #[test]
    fn test_seed_replays() {
        let a = HandState::deal_seeded(9, 3, 1234).unwrap();
        let b = HandState::deal_seeded(9, 3, 1234).unwrap();
        let c = HandState::deal_seeded(9, 3, 1235).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.hands(), c.hands());
    }

    #[test]
    fn test_no_card_dealt_twice() {
        for seed in 0..50 {
            let state = HandState::deal_seeded(10, (seed % 10) as usize, seed).unwrap();
            let dealt = state.dealt_board();
            let mut cards: Vec<Card> = state.hands().iter().flat_map(|h| h.cards()).collect();
            cards.extend(dealt.cards());
            cards.extend(dealt.burned);
            assert!(CardBitSet::from_distinct(&cards).is_ok());
        }
    }

    #[test]
    fn test_report_needs_river() {
        let rng = StdRng::seed_from_u64(0);
        let state = HandState::deal_seeded(3, 0, 5).unwrap();
        assert_eq!(
            Err(PokerError::ReportUnavailable(Street::Flop)),
            state.clone().with_report(0, 3, None, rng.clone())
        );

        let state = state.advance().unwrap().advance().unwrap();
        assert_eq!(
            Err(PokerError::InvalidSeat {
                seat: 3,
                num_players: 3
            }),
            state.clone().with_report(3, 3, None, rng.clone())
        );

        let state = state.with_report(1, 3, Some(1_000), rng).unwrap();
        let report = state.report().unwrap();
        assert_eq!(*state.hand(1).unwrap(), report.hero_hand);
        assert_eq!(state.visible_board(), report.board);
        assert_eq!(1_000, report.sampled.as_ref().unwrap().trials);

        // The report survives showdown.
        let state = state.advance().unwrap();
        assert!(state.report().is_some());
    }

    #[test]
    fn test_bad_deal() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Err(PokerError::InvalidPlayerCount(11)),
            HandState::deal(11, 0, &mut rng)
        );
        assert_eq!(
            Err(PokerError::InvalidSeat {
                seat: 4,
                num_players: 4
            }),
            HandState::deal(4, 4, &mut rng)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let state = HandState::deal_seeded(5, 1, 99)
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: HandState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip_with_report() {
        let state = HandState::deal_seeded(3, 0, 21)
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap()
            .with_report(2, 3, None, StdRng::seed_from_u64(1))
            .unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: HandState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[cfg(feature = "serde")]
    fn edited(state: &HandState, edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value = serde_json::to_value(state).unwrap();
        edit(&mut value);
        value.to_string()
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rejects_impossible_state() {
        let state = HandState::deal_seeded(4, 1, 8)
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap();
        let seat_zero = state.hand(0).unwrap().cards()[0];

        // Seat 1 holds a card that seat 0 already has.
        let json = edited(&state, |v| {
            v["hands"][1]["cards"][0] = serde_json::json!(seat_zero.to_string());
        });
        assert!(serde_json::from_str::<HandState>(&json).is_err());

        // The river repeats a hole card.
        let json = edited(&state, |v| {
            v["board"]["river"] = serde_json::json!(seat_zero.to_string());
        });
        let err = serde_json::from_str::<HandState>(&json).unwrap_err();
        assert!(err.to_string().contains("more than once"));

        let json = edited(&state, |v| v["dealer"] = serde_json::json!(4));
        assert!(serde_json::from_str::<HandState>(&json).is_err());

        let json = edited(&state, |v| {
            v["hands"].as_array_mut().unwrap().truncate(1);
        });
        assert!(serde_json::from_str::<HandState>(&json).is_err());

        // Winners that don't follow from the cards.
        let json = edited(&state, |v| {
            v["showdown"]["winners"]["set"] = serde_json::json!(0);
        });
        let err = serde_json::from_str::<HandState>(&json).unwrap_err();
        assert!(err.to_string().contains("showdown"));

        // A finished hand with its results dropped.
        let json = edited(&state, |v| v["possible_classes"] = serde_json::Value::Null);
        assert!(serde_json::from_str::<HandState>(&json).is_err());
    }
}
