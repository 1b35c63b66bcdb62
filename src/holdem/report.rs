use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rand::{Rng, rngs::ThreadRng};
use tracing::{Level, event};

use super::{
    ExactEquity, MonteCarloEquity, MultiOpponentOdds, SampledEquity, approximate_multi_opponent,
    compute_exact_equity, compute_exact_equity_parallel, par_simulate_equity, unseen_cards,
};
use crate::core::{Board, Card, Hand, MAX_PLAYERS, MIN_PLAYERS, PokerError, Score};

/// Everything known about the hero's chances on a board.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityReport {
    pub hero_hand: Hand,
    pub board: Board,
    pub total_players: usize,
    /// Every holding of a single opponent.
    pub exact: ExactEquity,
    /// The exact single opponent odds extended to everyone else at the
    /// table, assuming independent hands.
    pub approximation: MultiOpponentOdds,
    /// Sampled odds against everyone else, if trials were asked for.
    pub sampled: Option<SampledEquity>,
}

impl EquityReport {
    pub fn hero(&self) -> Score {
        self.exact.hero
    }

    /// Chance that someone at the table beats the hero. Sampled odds are
    /// used when there are any since they don't assume independence.
    pub fn risk(&self) -> f64 {
        match &self.sampled {
            Some(sampled) if sampled.trials > 0 => sampled.beat_probability(),
            _ => self.approximation.beats,
        }
    }

    /// Chance that nobody beats the hero but someone ties.
    pub fn tie_risk(&self) -> f64 {
        match &self.sampled {
            Some(sampled) if sampled.trials > 0 => sampled.tie_probability(),
            _ => self.approximation.ties_only,
        }
    }
}

/// # EquityReportBuilder
///
/// `RngEquityReportBuilder` configures how an [`EquityReport`] is computed.
/// The hero's hand and the board are required, everything else has a
/// default:
///
/// - two players at the table,
/// - no Monte Carlo sampling,
/// - a single task for both the enumeration and the sampling,
/// - no cancel flag.
///
/// `EquityReportBuilder` is a type alias for
/// `RngEquityReportBuilder<ThreadRng>`.
///
/// ## Examples
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::EquityReportBuilder;
///
/// let report = EquityReportBuilder::default()
///     .hero(Hand::new_from_str("A♣ A♦").unwrap())
///     .board(Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap())
///     .total_players(4)
///     .build()
///     .unwrap();
/// assert_eq!(3, report.approximation.opponents);
/// assert!(report.sampled.is_none());
/// ```
///
/// Sampling with a known rng makes the report repeatable:
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::RngEquityReportBuilder;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let report = RngEquityReportBuilder::default()
///     .hero(Hand::new_from_str("A♣ A♦").unwrap())
///     .board(Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap())
///     .total_players(4)
///     .trials(2_000)
///     .rng(StdRng::seed_from_u64(420))
///     .build()
///     .unwrap();
/// assert_eq!(2_000, report.sampled.unwrap().trials);
/// ```
pub struct RngEquityReportBuilder<R: Rng> {
    hero: Option<Hand>,
    board: Board,
    total_players: usize,
    trials: Option<usize>,
    num_tasks: usize,
    cancel: Option<Arc<AtomicBool>>,
    rng: Option<R>,
}

impl<R: Rng> RngEquityReportBuilder<R> {
    pub fn hero(mut self, hero: Hand) -> Self {
        self.hero = Some(hero);
        self
    }

    /// The board so far. Needs 3 to 5 cards.
    pub fn board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    /// Players at the table including the hero.
    pub fn total_players(mut self, total_players: usize) -> Self {
        self.total_players = total_players;
        self
    }

    /// Run a Monte Carlo estimate with this many trials.
    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Spread the work over this many threads. With more than one task the
    /// sampling uses per thread OS seeded rngs and ignores [`Self::rng`].
    pub fn num_tasks(mut self, num_tasks: usize) -> Self {
        self.num_tasks = num_tasks;
        self
    }

    /// Stop sampling early once this flag is set.
    pub fn cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The rng used for sampling. Defaults to the thread rng.
    pub fn rng(mut self, rng: R) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the configuration and compute the report.
    pub fn build(self) -> Result<EquityReport, PokerError> {
        let hero = self.hero.ok_or(PokerError::MissingHeroHand)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.total_players) {
            return Err(PokerError::InvalidPlayerCount(self.total_players));
        }
        if self.trials == Some(0) {
            return Err(PokerError::InvalidTrialCount(0));
        }
        let opponents = self.total_players - 1;
        let unseen = unseen_cards(&hero, &self.board);

        let exact = if self.num_tasks > 1 {
            compute_exact_equity_parallel(&hero, &self.board, &unseen, self.num_tasks)?
        } else {
            compute_exact_equity(&hero, &self.board, &unseen)?
        };
        let approximation = approximate_multi_opponent(
            exact.beat_probability(),
            exact.tie_probability(),
            opponents,
        )?;

        let cancel = self
            .cancel
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        let sampled = match self.trials {
            None => None,
            Some(trials) if self.num_tasks > 1 => Some(par_simulate_equity(
                &hero,
                &self.board,
                &unseen,
                opponents,
                trials,
                self.num_tasks,
                &cancel,
            )?),
            Some(trials) => {
                let sampled = if let Some(mut rng) = self.rng {
                    sample(&hero, &self.board, &unseen, opponents, trials, &cancel, &mut rng)
                } else {
                    let mut rng = rand::rng();
                    sample(&hero, &self.board, &unseen, opponents, trials, &cancel, &mut rng)
                };
                Some(sampled?)
            }
        };

        event!(
            Level::DEBUG,
            hero = %exact.hero,
            total_players = self.total_players,
            beats = approximation.beats,
            sampled = sampled.is_some(),
            "equity report built"
        );
        Ok(EquityReport {
            hero_hand: hero,
            board: self.board,
            total_players: self.total_players,
            exact,
            approximation,
            sampled,
        })
    }
}

fn sample<R: Rng + ?Sized>(
    hero: &Hand,
    board: &Board,
    unseen: &[Card],
    opponents: usize,
    trials: usize,
    cancel: &AtomicBool,
    rng: &mut R,
) -> Result<SampledEquity, PokerError> {
    MonteCarloEquity::new(hero, board, unseen, opponents, rng)?.estimate_until(trials, cancel)
}

impl<R: Rng> Default for RngEquityReportBuilder<R> {
    fn default() -> Self {
        Self {
            hero: None,
            board: Board::new(),
            total_players: MIN_PLAYERS,
            trials: None,
            num_tasks: 1,
            cancel: None,
            rng: None,
        }
    }
}

/// The rng is ThreadRng.
pub type EquityReportBuilder = RngEquityReportBuilder<ThreadRng>;
