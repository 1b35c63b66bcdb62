//! Hold'em specific engines built on top of the core cards and evaluator:
//! equity against unseen hands, showdown resolution, and a small state
//! machine for a single dealt hand.

/// Exact enumeration against one opponent, the analytic multi opponent
/// approximation and the river hand chart.
mod equity;
pub use self::equity::{
    ExactEquity, MAX_OPPONENTS, MultiOpponentOdds, approximate_multi_opponent,
    compute_exact_equity, compute_exact_equity_parallel, possible_classes, unseen_cards,
};

/// Module for `MonteCarloEquity` that samples opponent hands.
mod monte_carlo;
pub use self::monte_carlo::{
    MonteCarloEquity, SampledEquity, TrialOutcome, par_simulate_equity, simulate_equity,
};

/// Finding the winners of a hand.
mod showdown;
pub use self::showdown::{Showdown, resolve_winners};

/// Equity report and its builder.
mod report;
pub use self::report::{EquityReport, EquityReportBuilder, RngEquityReportBuilder};

/// Street by street state of one dealt hand.
mod hand_state;
pub use self::hand_state::{HandState, Street};
