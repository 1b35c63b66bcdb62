use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Level, event, trace_span};

use super::equity::{MAX_OPPONENTS, Matchup};
use crate::core::{Board, Card, Category, Hand, PokerError};

/// What happened to the hero in one sampled deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// At least one opponent had a better hand. Carries the category of the
    /// best opponent hand.
    Beaten(Category),
    /// Nobody was better but at least one opponent had the same score.
    Tied,
    Won,
}

/// Sampled frequencies from a Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampledEquity {
    pub opponents: usize,
    /// Trials asked for.
    pub requested: u64,
    /// Trials actually run. Smaller than `requested` after a cancel.
    pub trials: u64,
    pub beats: u64,
    /// Trials where nobody beat the hero and someone tied.
    pub ties_only: u64,
    /// How often the best opponent hand was each category when it beat the
    /// hero.
    pub beaten_by: BTreeMap<Category, u64>,
    pub cancelled: bool,
}

impl SampledEquity {
    fn new(opponents: usize, requested: u64) -> Self {
        Self {
            opponents,
            requested,
            trials: 0,
            beats: 0,
            ties_only: 0,
            beaten_by: BTreeMap::new(),
            cancelled: false,
        }
    }

    fn record(&mut self, outcome: TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Beaten(category) => {
                self.beats += 1;
                *self.beaten_by.entry(category).or_default() += 1;
            }
            TrialOutcome::Tied => self.ties_only += 1,
            TrialOutcome::Won => {}
        }
    }

    fn merge(&mut self, other: SampledEquity) {
        self.trials += other.trials;
        self.beats += other.beats;
        self.ties_only += other.ties_only;
        self.cancelled |= other.cancelled;
        for (category, count) in other.beaten_by {
            *self.beaten_by.entry(category).or_default() += count;
        }
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            count as f64 / self.trials as f64
        }
    }

    /// Sampled chance that at least one opponent beats the hero.
    pub fn beat_probability(&self) -> f64 {
        self.ratio(self.beats)
    }

    /// Sampled chance that nobody beats the hero and someone ties.
    pub fn tie_probability(&self) -> f64 {
        self.ratio(self.ties_only)
    }

    pub fn win_probability(&self) -> f64 {
        self.ratio(self.trials - self.beats - self.ties_only)
    }

    /// Standard error of a sampled probability `p`: `sqrt(p(1 - p) / T)`.
    pub fn standard_error(&self, p: f64) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        (p * (1.0 - p) / self.trials as f64).sqrt()
    }
}

/// Deals random opponent hands from the unseen cards and compares them with
/// the hero.
///
/// Opponents draw from one pool without replacement, so unlike
/// [`approximate_multi_opponent`](crate::holdem::approximate_multi_opponent)
/// there is no independence assumption. The rng here is only used for
/// sampling; it doesn't need to be the one that dealt the hand.
#[derive(Debug)]
pub struct MonteCarloEquity<R: Rng> {
    matchup: Matchup,
    /// Unseen cards, reordered in place every trial.
    pool: Vec<Card>,
    num_opponents: usize,
    rng: R,
}

impl<R: Rng> MonteCarloEquity<R> {
    pub fn new(
        hero: &Hand,
        board: &Board,
        unseen: &[Card],
        num_opponents: usize,
        rng: R,
    ) -> Result<Self, PokerError> {
        if num_opponents > MAX_OPPONENTS {
            return Err(PokerError::InvalidOpponentCount(num_opponents));
        }
        let mut matchup = Matchup::new(hero, board, unseen, (2 * num_opponents).max(2))?;
        let pool = std::mem::take(&mut matchup.unseen);
        Ok(Self {
            matchup,
            pool,
            num_opponents,
            rng,
        })
    }

    /// Deal two cards to every opponent and see how the hero does.
    pub fn simulate(&mut self) -> TrialOutcome {
        let dealt = 2 * self.num_opponents;
        let (holdings, _) = self.pool.partial_shuffle(&mut self.rng, dealt);

        let best = holdings
            .chunks_exact(2)
            .map(|pair| self.matchup.opponent_score(pair[0], pair[1]))
            .max();
        match best {
            Some(score) if score > self.matchup.hero => TrialOutcome::Beaten(score.category()),
            Some(score) if score == self.matchup.hero => TrialOutcome::Tied,
            _ => TrialOutcome::Won,
        }
    }

    /// Run `trials` trials.
    pub fn estimate(&mut self, trials: usize) -> Result<SampledEquity, PokerError> {
        self.estimate_until(trials, &AtomicBool::new(false))
    }

    /// Run up to `trials` trials, checking `cancel` before each one. A
    /// cancelled run still returns everything counted so far.
    pub fn estimate_until(
        &mut self,
        trials: usize,
        cancel: &AtomicBool,
    ) -> Result<SampledEquity, PokerError> {
        if trials == 0 {
            return Err(PokerError::InvalidTrialCount(trials));
        }
        let mut sampled = SampledEquity::new(self.num_opponents, trials as u64);
        for _ in 0..trials {
            if cancel.load(Ordering::Relaxed) {
                sampled.cancelled = true;
                event!(
                    Level::DEBUG,
                    trials = sampled.trials,
                    requested = trials,
                    "monte carlo cancelled"
                );
                break;
            }
            sampled.record(self.simulate());
        }
        Ok(sampled)
    }
}

/// Estimate how often `opponents` random hands beat or tie the hero.
///
/// ```
/// use holdem_odds::core::{Board, Hand, parse_cards};
/// use holdem_odds::holdem::{simulate_equity, unseen_cards};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let hero = Hand::new_from_str("A♣ A♦").unwrap();
/// let board = Board::from_cards(&parse_cards("A♥ 7♦ 2♠ 9♣ K♦").unwrap()).unwrap();
/// let unseen = unseen_cards(&hero, &board);
/// let mut rng = StdRng::seed_from_u64(3);
/// let sampled = simulate_equity(&hero, &board, &unseen, 3, 1_000, &mut rng).unwrap();
/// assert_eq!(1_000, sampled.trials);
/// ```
pub fn simulate_equity<R: Rng + ?Sized>(
    hero: &Hand,
    board: &Board,
    unseen: &[Card],
    opponents: usize,
    trials: usize,
    rng: &mut R,
) -> Result<SampledEquity, PokerError> {
    if trials == 0 {
        return Err(PokerError::InvalidTrialCount(trials));
    }
    let span = trace_span!("simulate_equity", opponents, trials);
    let _enter = span.enter();

    let mut sim = MonteCarloEquity::new(hero, board, unseen, opponents, rng)?;
    let sampled = sim.estimate(trials)?;
    event!(
        Level::DEBUG,
        beats = sampled.beats,
        ties_only = sampled.ties_only,
        "monte carlo done"
    );
    Ok(sampled)
}

/// [`simulate_equity`] split over `num_tasks` scoped threads.
///
/// Each task gets its own share of the trials, its own counters and a fresh
/// OS seeded [`SmallRng`]. Setting `cancel` stops every task before its next
/// trial and the partial counts are summed.
pub fn par_simulate_equity(
    hero: &Hand,
    board: &Board,
    unseen: &[Card],
    opponents: usize,
    trials: usize,
    num_tasks: usize,
    cancel: &AtomicBool,
) -> Result<SampledEquity, PokerError> {
    if trials == 0 {
        return Err(PokerError::InvalidTrialCount(trials));
    }
    let num_tasks = num_tasks.clamp(1, trials);
    let span = trace_span!("par_simulate_equity", opponents, trials, num_tasks);
    let _enter = span.enter();

    let sims = (0..num_tasks)
        .map(|task_id| {
            // Spread the remainder over the first few tasks.
            let share = trials / num_tasks + usize::from(task_id < trials % num_tasks);
            MonteCarloEquity::new(hero, board, unseen, opponents, SmallRng::from_os_rng())
                .map(|sim| (sim, share))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut sampled = SampledEquity::new(opponents, trials as u64);
    thread::scope(|s| -> Result<(), PokerError> {
        let handles: Vec<_> = sims
            .into_iter()
            .map(|(mut sim, share)| s.spawn(move || sim.estimate_until(share, cancel)))
            .collect();
        for handle in handles {
            let part = handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
            sampled.merge(part);
        }
        Ok(())
    })?;

    event!(
        Level::DEBUG,
        trials = sampled.trials,
        beats = sampled.beats,
        ties_only = sampled.ties_only,
        cancelled = sampled.cancelled,
        "parallel monte carlo done"
    );
    Ok(sampled)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;

    use super::*;
    use crate::core::parse_cards;
    use crate::holdem::{compute_exact_equity, unseen_cards};

    fn setup(hero: &str, board: &str) -> (Hand, Board, Vec<Card>) {
        let hero = Hand::new_from_str(hero).unwrap();
        let board = Board::from_cards(&parse_cards(board).unwrap()).unwrap();
        let unseen = unseen_cards(&hero, &board);
        (hero, board, unseen)
    }

    #[test_log::test]
    fn test_converges_to_exact() {
        let (hero, board, unseen) = setup("Q♣ J♦", "Q♥ 7♦ 2♠ 9♣ 4♦");
        let exact = compute_exact_equity(&hero, &board, &unseen).unwrap();

        let mut rng = StdRng::seed_from_u64(420);
        let sampled = simulate_equity(&hero, &board, &unseen, 1, 100_000, &mut rng).unwrap();

        assert_eq!(100_000, sampled.trials);
        assert!(!sampled.cancelled);
        assert_abs_diff_eq!(
            exact.beat_probability(),
            sampled.beat_probability(),
            epsilon = 0.01
        );
        assert_abs_diff_eq!(
            exact.tie_probability(),
            sampled.tie_probability(),
            epsilon = 0.01
        );
    }

    #[test]
    fn test_more_opponents_beat_more_often() {
        let (hero, board, unseen) = setup("Q♣ J♦", "Q♥ 7♦ 2♠ 9♣ 4♦");
        let mut rng = StdRng::seed_from_u64(7);
        let one = simulate_equity(&hero, &board, &unseen, 1, 20_000, &mut rng).unwrap();
        let six = simulate_equity(&hero, &board, &unseen, 6, 20_000, &mut rng).unwrap();
        assert!(six.beat_probability() > one.beat_probability());

        let beaten: u64 = six.beaten_by.values().sum();
        assert_eq!(six.beats, beaten);
        assert_abs_diff_eq!(
            1.0,
            six.beat_probability() + six.tie_probability() + six.win_probability(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_same_seed_same_counts() {
        let (hero, board, unseen) = setup("8♠ 8♥", "2♣ 7♦ 9♠ J♥");
        let a = simulate_equity(&hero, &board, &unseen, 3, 5_000, &mut StdRng::seed_from_u64(1));
        let b = simulate_equity(&hero, &board, &unseen, 3, 5_000, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_opponents_always_win() {
        let (hero, board, unseen) = setup("2♣ 3♠", "A♦ K♣ 9♥ 7♦ 5♠");
        let mut rng = StdRng::seed_from_u64(2);
        let sampled = simulate_equity(&hero, &board, &unseen, 0, 100, &mut rng).unwrap();
        assert_eq!(0, sampled.beats);
        assert_abs_diff_eq!(1.0, sampled.win_probability());
    }

    #[test]
    fn test_errors() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            Err(PokerError::InvalidTrialCount(0)),
            simulate_equity(&hero, &board, &unseen, 1, 0, &mut rng)
        );
        assert_eq!(
            Err(PokerError::InvalidOpponentCount(10)),
            simulate_equity(&hero, &board, &unseen, 10, 10, &mut rng)
        );
        assert_eq!(
            Err(PokerError::InsufficientCards {
                needed: 6,
                available: 5
            }),
            simulate_equity(&hero, &board, &unseen[..5], 3, 10, &mut rng)
        );
    }

    #[test]
    fn test_cancel_before_start_keeps_nothing() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let cancel = AtomicBool::new(true);
        let mut sim =
            MonteCarloEquity::new(&hero, &board, &unseen, 2, StdRng::seed_from_u64(0)).unwrap();
        let sampled = sim.estimate_until(1_000, &cancel).unwrap();
        assert!(sampled.cancelled);
        assert_eq!(0, sampled.trials);
        assert_eq!(1_000, sampled.requested);
        assert_eq!(0.0, sampled.beat_probability());
    }

    #[test]
    fn test_cancel_mid_run_returns_partial_counts() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let cancel = AtomicBool::new(false);
        let sampled = thread::scope(|s| {
            let run = s.spawn(|| {
                par_simulate_equity(&hero, &board, &unseen, 3, 50_000_000, 2, &cancel)
            });
            cancel.store(true, Ordering::Relaxed);
            run.join().unwrap()
        })
        .unwrap();
        assert!(sampled.cancelled);
        assert!(sampled.trials < sampled.requested);
        assert_eq!(
            sampled.beats,
            sampled.beaten_by.values().sum::<u64>()
        );
    }

    #[test_log::test]
    fn test_parallel_runs_every_trial() {
        let (hero, board, unseen) = setup("K♠ K♥", "2♣ 7♦ 9♠");
        let cancel = AtomicBool::new(false);
        let sampled = par_simulate_equity(&hero, &board, &unseen, 2, 10_001, 4, &cancel).unwrap();
        assert_eq!(10_001, sampled.trials);
        assert!(!sampled.cancelled);

        // More tasks than trials is fine.
        let sampled = par_simulate_equity(&hero, &board, &unseen, 2, 3, 8, &cancel).unwrap();
        assert_eq!(3, sampled.trials);
    }

    #[test]
    fn test_standard_error() {
        let (hero, board, unseen) = setup("A♣ A♦", "A♥ 7♦ 2♠ 9♣ K♦");
        let mut rng = StdRng::seed_from_u64(5);
        let sampled = simulate_equity(&hero, &board, &unseen, 1, 400, &mut rng).unwrap();
        assert_abs_diff_eq!(0.025, sampled.standard_error(0.5), epsilon = 1e-12);
    }
}
