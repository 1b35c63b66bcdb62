use std::collections::{BTreeMap, BTreeSet};
use std::thread;

use tracing::{Level, event, trace_span};

use crate::core::{
    Board, Card, CardBitSet, Category, Hand, HandClass, MAX_PLAYERS, PokerError, Score, best_five,
};

/// The most opponents anyone can face at a full table.
pub const MAX_OPPONENTS: usize = MAX_PLAYERS - 1;

/// Every card that is neither in the hero's hand nor on the board, in deck
/// order.
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::unseen_cards;
///
/// let hero = Hand::new_from_str("A♣ A♦").unwrap();
/// let board = Board::from_cards(&parse_cards("A♥ 7♦ 2♠").unwrap()).unwrap();
/// assert_eq!(47, unseen_cards(&hero, &board).len());
/// ```
pub fn unseen_cards(hero: &Hand, board: &Board) -> Vec<Card> {
    let known: CardBitSet = hero
        .cards()
        .into_iter()
        .chain(board.cards().iter().copied())
        .collect();
    (!known).into_iter().collect()
}

/// Hero, board and unseen pool after validation, ready to score opponent
/// holdings against.
#[derive(Debug, Clone)]
pub(crate) struct Matchup {
    pub(crate) hero: Score,
    board: [Card; 5],
    board_len: usize,
    pub(crate) unseen: Vec<Card>,
}

impl Matchup {
    /// Check that the board has 3 to 5 cards, that no card shows up twice
    /// across hero, board and unseen, and that there are at least
    /// `min_unseen` unseen cards.
    pub(crate) fn new(
        hero: &Hand,
        board: &Board,
        unseen: &[Card],
        min_unseen: usize,
    ) -> Result<Self, PokerError> {
        if !(3..=5).contains(&board.len()) {
            return Err(PokerError::InvalidBoardSize(board.len()));
        }
        let mut known = CardBitSet::from_distinct(&hero.cards())?;
        known.insert_distinct(board.cards())?;
        known.insert_distinct(unseen)?;
        if unseen.len() < min_unseen {
            return Err(PokerError::InsufficientCards {
                needed: min_unseen,
                available: unseen.len(),
            });
        }

        let board_len = board.len();
        let [first, second] = hero.cards();
        let mut cards = [first; 7];
        cards[1] = second;
        cards[2..2 + board_len].copy_from_slice(board.cards());
        let (hero_score, _) = best_five(&cards[..2 + board_len]);

        let mut board_cards = [first; 5];
        board_cards[..board_len].copy_from_slice(board.cards());

        Ok(Self {
            hero: hero_score,
            board: board_cards,
            board_len,
            unseen: unseen.to_vec(),
        })
    }

    /// Best made hand an opponent holding these two cards has on the board.
    pub(crate) fn opponent_score(&self, first: Card, second: Card) -> Score {
        let mut cards = [first; 7];
        cards[1] = second;
        cards[2..2 + self.board_len].copy_from_slice(&self.board[..self.board_len]);
        best_five(&cards[..2 + self.board_len]).0
    }

    /// Tally every pair whose first card index is `start`, `start + step`,
    /// and so on.
    fn tally(&self, start: usize, step: usize) -> ExactEquity {
        let mut equity = ExactEquity::new(self.hero);
        let n = self.unseen.len();
        for i in (start..n).step_by(step) {
            for j in i + 1..n {
                let (first, second) = (self.unseen[i], self.unseen[j]);
                let score = self.opponent_score(first, second);
                equity.record(Hand::from_dealt(first, second), score);
            }
        }
        equity
    }
}

/// Exhaustive results of one opponent holding every possible pair of unseen
/// cards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactEquity {
    /// The hero's own score on this board.
    pub hero: Score,
    /// Opponent holdings looked at. `C(unseen, 2)` once complete.
    pub combinations: u64,
    /// Holdings that outrank the hero.
    pub beats: u64,
    /// Holdings with exactly the hero's score.
    pub ties: u64,
    /// Holdings the hero beats.
    pub loses: u64,
    /// The holdings that beat the hero, keyed by the category they make.
    pub beaten_by: BTreeMap<Category, Vec<Hand>>,
}

impl ExactEquity {
    fn new(hero: Score) -> Self {
        Self {
            hero,
            combinations: 0,
            beats: 0,
            ties: 0,
            loses: 0,
            beaten_by: BTreeMap::new(),
        }
    }

    fn record(&mut self, holding: Hand, score: Score) {
        self.combinations += 1;
        match score.cmp(&self.hero) {
            std::cmp::Ordering::Greater => {
                self.beats += 1;
                self.beaten_by
                    .entry(score.category())
                    .or_default()
                    .push(holding);
            }
            std::cmp::Ordering::Equal => self.ties += 1,
            std::cmp::Ordering::Less => self.loses += 1,
        }
    }

    fn merge(&mut self, other: ExactEquity) {
        self.combinations += other.combinations;
        self.beats += other.beats;
        self.ties += other.ties;
        self.loses += other.loses;
        for (category, mut holdings) in other.beaten_by {
            self.beaten_by
                .entry(category)
                .or_default()
                .append(&mut holdings);
        }
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.combinations == 0 {
            0.0
        } else {
            count as f64 / self.combinations as f64
        }
    }

    /// Chance a single random opponent beats the hero.
    pub fn beat_probability(&self) -> f64 {
        self.ratio(self.beats)
    }

    /// Chance a single random opponent ties the hero.
    pub fn tie_probability(&self) -> f64 {
        self.ratio(self.ties)
    }

    pub fn lose_probability(&self) -> f64 {
        self.ratio(self.loses)
    }

    /// How many holdings beat the hero with each category.
    pub fn beaten_by_counts(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.beaten_by
            .iter()
            .map(|(category, holdings)| (*category, holdings.len()))
    }

    /// Extend these single opponent odds to `opponents` opponents.
    pub fn against(&self, opponents: usize) -> Result<MultiOpponentOdds, PokerError> {
        approximate_multi_opponent(self.beat_probability(), self.tie_probability(), opponents)
    }
}

/// Enumerate every two card holding from `unseen` and compare it with the
/// hero's hand on `board`.
///
/// The board may have 3, 4 or 5 cards. Before the river hands are compared
/// as they stand; nothing about future cards is simulated. `unseen` must not
/// share cards with the hero or board and needs at least two cards.
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::{compute_exact_equity, unseen_cards};
///
/// let hero = Hand::new_from_str("A♣ A♦").unwrap();
/// let board = Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap();
/// let unseen = unseen_cards(&hero, &board);
/// let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
/// assert_eq!(990, equity.combinations);
/// assert_eq!(equity.combinations, equity.beats + equity.ties + equity.loses);
/// ```
pub fn compute_exact_equity(
    hero: &Hand,
    board: &Board,
    unseen: &[Card],
) -> Result<ExactEquity, PokerError> {
    let matchup = Matchup::new(hero, board, unseen, 2)?;
    let span = trace_span!("exact_equity", unseen = unseen.len());
    let _enter = span.enter();

    let equity = matchup.tally(0, 1);
    event!(
        Level::DEBUG,
        combinations = equity.combinations,
        beats = equity.beats,
        ties = equity.ties,
        "exact equity done"
    );
    Ok(equity)
}

/// Same as [`compute_exact_equity`] with the outer card index spread over
/// `num_tasks` scoped threads. Each thread keeps its own tally, and the
/// beaten-by holdings are sorted after merging so the result doesn't depend
/// on scheduling.
pub fn compute_exact_equity_parallel(
    hero: &Hand,
    board: &Board,
    unseen: &[Card],
    num_tasks: usize,
) -> Result<ExactEquity, PokerError> {
    let matchup = Matchup::new(hero, board, unseen, 2)?;
    let num_tasks = num_tasks.clamp(1, unseen.len());
    let span = trace_span!("exact_equity_parallel", unseen = unseen.len(), num_tasks);
    let _enter = span.enter();

    let mut equity = ExactEquity::new(matchup.hero);
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_tasks)
            .map(|task_id| {
                let matchup = &matchup;
                s.spawn(move || matchup.tally(task_id, num_tasks))
            })
            .collect();
        for handle in handles {
            let part = handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            equity.merge(part);
        }
    });
    for holdings in equity.beaten_by.values_mut() {
        holdings.sort_unstable();
    }

    event!(
        Level::DEBUG,
        combinations = equity.combinations,
        beats = equity.beats,
        ties = equity.ties,
        "parallel exact equity done"
    );
    Ok(equity)
}

/// Analytic odds against several opponents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiOpponentOdds {
    pub opponents: usize,
    /// At least one opponent beats the hero.
    pub beats: f64,
    /// Nobody beats the hero and at least one opponent ties.
    pub ties_only: f64,
}

impl MultiOpponentOdds {
    /// The hero wins outright.
    pub fn wins(&self) -> f64 {
        (1.0 - self.beats - self.ties_only).max(0.0)
    }
}

fn check_probability(p: f64) -> Result<f64, PokerError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(PokerError::InvalidProbability(p))
    }
}

/// Extend single opponent odds to `opponents` opponents.
///
/// `P(someone beats) = 1 - (1 - p1)^k` and
/// `P(nobody beats, someone ties) = (1 - p1)^k - (1 - p1 - t1)^k`.
///
/// This treats every opponent's hand as an independent draw from a full
/// unseen pool. Real opponents share one shrinking deck, so the numbers are
/// biased; [`simulate_equity`](crate::holdem::simulate_equity) has no such
/// bias and should be preferred when there is time to sample. With no
/// opponents both numbers are zero.
///
/// ```
/// use holdem_odds::holdem::approximate_multi_opponent;
///
/// let odds = approximate_multi_opponent(0.1, 0.0, 2).unwrap();
/// assert!((odds.beats - 0.19).abs() < 1e-12);
/// assert_eq!(0.0, odds.ties_only);
/// ```
pub fn approximate_multi_opponent(
    beat: f64,
    tie: f64,
    opponents: usize,
) -> Result<MultiOpponentOdds, PokerError> {
    let beat = check_probability(beat)?;
    let tie = check_probability(tie)?;
    // Allow for rounding in probabilities that came from division.
    if beat + tie > 1.0 + 1e-9 {
        return Err(PokerError::InvalidProbability(beat + tie));
    }
    if opponents > MAX_OPPONENTS {
        return Err(PokerError::InvalidOpponentCount(opponents));
    }

    let k = opponents as i32;
    let nobody_beats = (1.0 - beat).powi(k);
    let nobody_beats_or_ties = (1.0 - beat - tie).max(0.0).powi(k);
    Ok(MultiOpponentOdds {
        opponents,
        beats: 1.0 - nobody_beats,
        ties_only: (nobody_beats - nobody_beats_or_ties).max(0.0),
    })
}

/// Every hand class some holding could make on a complete board.
///
/// Looks at all `C(47, 2) = 1081` holdings of the cards not on the board,
/// each a best-of-seven evaluation, and stops as soon as all ten classes
/// have been seen.
pub fn possible_classes(board: &Board) -> Result<BTreeSet<HandClass>, PokerError> {
    if !board.is_complete() {
        return Err(PokerError::InvalidBoardSize(board.len()));
    }
    let known = CardBitSet::from_distinct(board.cards())?;
    let unseen: Vec<Card> = (!known).into_iter().collect();

    let mut cards = [unseen[0]; 7];
    cards[2..].copy_from_slice(board.cards());

    let mut found = BTreeSet::new();
    for (i, first) in unseen.iter().enumerate() {
        for second in &unseen[i + 1..] {
            cards[0] = *first;
            cards[1] = *second;
            let (score, _) = best_five(&cards);
            found.insert(HandClass::from_score(&score));
            if found.len() == HandClass::classes().len() {
                return Ok(found);
            }
        }
    }
    event!(Level::TRACE, classes = found.len(), "possible classes");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::{Value, parse_cards};

    fn setup(hero: &str, board: &str) -> (Hand, Board, Vec<Card>) {
        let hero = Hand::new_from_str(hero).unwrap();
        let board = Board::from_cards(&parse_cards(board).unwrap()).unwrap();
        let unseen = unseen_cards(&hero, &board);
        (hero, board, unseen)
    }

    #[test]
    fn test_unseen_excludes_known() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        assert_eq!(45, unseen.len());
        for c in hero.cards().iter().chain(board.cards()) {
            assert!(!unseen.contains(c));
        }
    }

    #[test_log::test]
    fn test_counts_add_up() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();

        assert_eq!(
            Score::ThreeOfAKind {
                trips: Value::Ace,
                kickers: [Value::King, Value::Nine]
            },
            equity.hero
        );
        assert_eq!(45 * 44 / 2, equity.combinations);
        assert_eq!(
            equity.combinations,
            equity.beats + equity.ties + equity.loses
        );
        let by_category: usize = equity.beaten_by_counts().map(|(_, n)| n).sum();
        assert_eq!(equity.beats as usize, by_category);
        for (category, holdings) in &equity.beaten_by {
            assert!(*category > Category::ThreeOfAKind);
            assert!(!holdings.is_empty());
        }
    }

    #[test]
    fn test_flop_and_turn_boards() {
        let (hero, board, unseen) = setup("K♠ K♥", "2♣ 7♦ 9♠");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
        assert_eq!(47 * 46 / 2, equity.combinations);
        // Aces, sets and two pair are all that beat kings on a dry flop.
        assert!(equity.beat_probability() < 0.05);

        let (hero, board, unseen) = setup("K♠ K♥", "2♣ 7♦ 9♠ J♥");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
        assert_eq!(46 * 45 / 2, equity.combinations);
    }

    #[test]
    fn test_nuts_are_never_beaten() {
        let (hero, board, unseen) = setup("A♦ K♦", "Q♦ J♦ 10♦ 2♣ 3♠");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
        assert_eq!(0, equity.beats);
        assert_eq!(0, equity.ties);
        assert_abs_diff_eq!(1.0, equity.lose_probability());
    }

    #[test]
    fn test_board_plays_for_everyone() {
        let (hero, board, unseen) = setup("2♣ 3♠", "A♦ K♦ Q♦ J♦ 10♦");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
        assert_eq!(equity.combinations, equity.ties);
    }

    #[test]
    fn test_bad_inputs() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");

        assert_eq!(
            Err(PokerError::InsufficientCards {
                needed: 2,
                available: 1
            }),
            compute_exact_equity(&hero, &board, &unseen[..1])
        );

        let mut overlapping = unseen.clone();
        overlapping.push(board.cards()[0]);
        assert_eq!(
            Err(PokerError::DuplicateCard(board.cards()[0])),
            compute_exact_equity(&hero, &board, &overlapping)
        );

        assert_eq!(
            Err(PokerError::InvalidBoardSize(0)),
            compute_exact_equity(&hero, &Board::new(), &unseen)
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (hero, board, unseen) = setup("J♣ 10♣", "9♣ 8♦ 2♣ K♥");
        let mut sequential = compute_exact_equity(&hero, &board, &unseen).unwrap();
        for holdings in sequential.beaten_by.values_mut() {
            holdings.sort_unstable();
        }
        for num_tasks in [1, 3, 8, 100] {
            let parallel =
                compute_exact_equity_parallel(&hero, &board, &unseen, num_tasks).unwrap();
            assert_eq!(sequential, parallel, "{num_tasks} tasks");
        }
    }

    #[test]
    fn test_approximation() {
        let none = approximate_multi_opponent(0.3, 0.1, 0).unwrap();
        assert_eq!(0.0, none.beats);
        assert_eq!(0.0, none.ties_only);
        assert_abs_diff_eq!(1.0, none.wins());

        let one = approximate_multi_opponent(0.3, 0.1, 1).unwrap();
        assert_abs_diff_eq!(0.3, one.beats, epsilon = 1e-12);
        assert_abs_diff_eq!(0.1, one.ties_only, epsilon = 1e-12);

        let three = approximate_multi_opponent(0.3, 0.1, 3).unwrap();
        assert_abs_diff_eq!(1.0 - 0.7f64.powi(3), three.beats, epsilon = 1e-12);
        assert_abs_diff_eq!(
            0.7f64.powi(3) - 0.6f64.powi(3),
            three.ties_only,
            epsilon = 1e-12
        );
        // More opponents can only make things worse.
        assert!(three.beats > one.beats);
    }

    #[test]
    fn test_approximation_errors() {
        assert_eq!(
            Err(PokerError::InvalidOpponentCount(10)),
            approximate_multi_opponent(0.1, 0.1, 10)
        );
        assert_eq!(
            Err(PokerError::InvalidProbability(-0.1)),
            approximate_multi_opponent(-0.1, 0.1, 1)
        );
        assert!(approximate_multi_opponent(0.7, 0.7, 1).is_err());
        assert!(approximate_multi_opponent(f64::NAN, 0.0, 1).is_err());
    }

    #[test]
    fn test_against_uses_exact_odds() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let equity = compute_exact_equity(&hero, &board, &unseen).unwrap();
        let odds = equity.against(1).unwrap();
        assert_abs_diff_eq!(equity.beat_probability(), odds.beats, epsilon = 1e-12);
        assert_abs_diff_eq!(equity.tie_probability(), odds.ties_only, epsilon = 1e-12);
    }

    #[test]
    fn test_possible_classes() {
        let board = Board::from_cards(&parse_cards("A♦ K♦ Q♦ J♦ 10♦").unwrap()).unwrap();
        let classes = possible_classes(&board).unwrap();
        // Nothing plays worse than the royal flush on the board.
        assert_eq!(vec![HandClass::RoyalFlush], classes.into_iter().collect::<Vec<_>>());

        let board = Board::from_cards(&parse_cards("2♣ 7♦ 9♠ J♥ 4♣").unwrap()).unwrap();
        let classes = possible_classes(&board).unwrap();
        assert!(classes.contains(&HandClass::HighCard));
        assert!(classes.contains(&HandClass::Straight));
        assert!(!classes.contains(&HandClass::FourOfAKind));
        assert!(!classes.contains(&HandClass::Flush));

        let board = Board::from_cards(&parse_cards("2♣ 7♦ 9♠").unwrap()).unwrap();
        assert_eq!(Err(PokerError::InvalidBoardSize(3)), possible_classes(&board));
    }
}
