use std::fmt;

use super::{Card, CardBitSet, PokerError, Value};

/// The nine hand categories from weakest to strongest.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// No matches
    HighCard,
    /// One Card matches another.
    OnePair,
    /// Two diffent pair of matching cards.
    TwoPair,
    /// Three of the same value.
    ThreeOfAKind,
    /// Five cards in a sequence
    Straight,
    /// Five cards of the same suit
    Flush,
    /// Three of one value and two of another value
    FullHouse,
    /// Four of the same value.
    FourOfAKind,
    /// Five cards in a sequence all fo the same suit.
    StraightFlush,
}

const CATEGORIES: [Category; 9] = [
    Category::HighCard,
    Category::OnePair,
    Category::TwoPair,
    Category::ThreeOfAKind,
    Category::Straight,
    Category::Flush,
    Category::FullHouse,
    Category::FourOfAKind,
    Category::StraightFlush,
];

impl Category {
    /// All categories, weakest first.
    pub fn categories() -> [Category; 9] {
        CATEGORIES
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The strength of a five card hand.
///
/// Variants are declared weakest first and every payload is declared in
/// tie break order, so the derived `Ord` is the poker order: category
/// first and then the tie break values left to right. Two scores are
/// equal exactly when the hands split a pot.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ScoreRepr")
)]
pub enum Score {
    /// All five values, highest first.
    HighCard([Value; 5]),
    OnePair { pair: Value, kickers: [Value; 3] },
    /// `high` is always the higher of the two pairs.
    TwoPair { high: Value, low: Value, kicker: Value },
    ThreeOfAKind { trips: Value, kickers: [Value; 2] },
    /// The top card of the straight. The wheel is five high.
    Straight(Value),
    /// All five values, highest first.
    Flush([Value; 5]),
    FullHouse { trips: Value, pair: Value },
    FourOfAKind { quads: Value, kicker: Value },
    /// The top card of the straight, an ace for a royal flush.
    StraightFlush(Value),
}

impl Score {
    pub fn category(&self) -> Category {
        match self {
            Score::HighCard(_) => Category::HighCard,
            Score::OnePair { .. } => Category::OnePair,
            Score::TwoPair { .. } => Category::TwoPair,
            Score::ThreeOfAKind { .. } => Category::ThreeOfAKind,
            Score::Straight(_) => Category::Straight,
            Score::Flush(_) => Category::Flush,
            Score::FullHouse { .. } => Category::FullHouse,
            Score::FourOfAKind { .. } => Category::FourOfAKind,
            Score::StraightFlush(_) => Category::StraightFlush,
        }
    }

    pub fn is_royal_flush(&self) -> bool {
        *self == Score::StraightFlush(Value::Ace)
    }

    /// Could some five distinct cards score this?
    ///
    /// ```
    /// use holdem_odds::core::{Score, Value};
    ///
    /// assert!(Score::Straight(Value::Six).is_valid());
    /// assert!(!Score::Straight(Value::Three).is_valid());
    /// assert!(!Score::FullHouse { trips: Value::Two, pair: Value::Two }.is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        match *self {
            Score::HighCard(values) | Score::Flush(values) => {
                descending(&values) && straight_top(value_bits(&values)).is_none()
            }
            Score::OnePair { pair, kickers } => descending(&kickers) && !kickers.contains(&pair),
            Score::TwoPair { high, low, kicker } => high > low && kicker != high && kicker != low,
            Score::ThreeOfAKind { trips, kickers } => {
                descending(&kickers) && !kickers.contains(&trips)
            }
            Score::Straight(top) | Score::StraightFlush(top) => top >= Value::Five,
            Score::FullHouse { trips, pair } => trips != pair,
            Score::FourOfAKind { quads, kicker } => quads != kicker,
        }
    }
}

/// Strictly highest first, so no value repeats.
fn descending(values: &[Value]) -> bool {
    values.windows(2).all(|w| w[0] > w[1])
}

fn value_bits(values: &[Value]) -> u16 {
    values.iter().fold(0, |set, v| set | 1 << *v as u16)
}

/// Wire shape of [`Score`]. Deserializing goes through here so that a
/// score no hand could make is rejected instead of reaching `Display`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
enum ScoreRepr {
    HighCard([Value; 5]),
    OnePair { pair: Value, kickers: [Value; 3] },
    TwoPair { high: Value, low: Value, kicker: Value },
    ThreeOfAKind { trips: Value, kickers: [Value; 2] },
    Straight(Value),
    Flush([Value; 5]),
    FullHouse { trips: Value, pair: Value },
    FourOfAKind { quads: Value, kicker: Value },
    StraightFlush(Value),
}

#[cfg(feature = "serde")]
impl TryFrom<ScoreRepr> for Score {
    type Error = PokerError;

    fn try_from(repr: ScoreRepr) -> Result<Self, Self::Error> {
        let score = match repr {
            ScoreRepr::HighCard(values) => Score::HighCard(values),
            ScoreRepr::OnePair { pair, kickers } => Score::OnePair { pair, kickers },
            ScoreRepr::TwoPair { high, low, kicker } => Score::TwoPair { high, low, kicker },
            ScoreRepr::ThreeOfAKind { trips, kickers } => Score::ThreeOfAKind { trips, kickers },
            ScoreRepr::Straight(top) => Score::Straight(top),
            ScoreRepr::Flush(values) => Score::Flush(values),
            ScoreRepr::FullHouse { trips, pair } => Score::FullHouse { trips, pair },
            ScoreRepr::FourOfAKind { quads, kicker } => Score::FourOfAKind { quads, kicker },
            ScoreRepr::StraightFlush(top) => Score::StraightFlush(top),
        };
        if score.is_valid() {
            Ok(score)
        } else {
            Err(PokerError::InvalidScore(score))
        }
    }
}

/// Writes the run of a straight from the top card down, the wheel as `5-A`.
fn write_straight(f: &mut fmt::Formatter<'_>, top: Value) -> fmt::Result {
    if top == Value::Five {
        return f.write_str("5-A");
    }
    // No straight tops out below five. Hand built scores can still say so.
    let Some(low) = (top as u8).checked_sub(4) else {
        return write!(f, "{top} high");
    };
    for (idx, v) in (low..=top as u8).rev().enumerate() {
        if idx > 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", Value::from_u8(v))?;
    }
    Ok(())
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (idx, v) in values.iter().enumerate() {
        if idx > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - ", self.category())?;
        match self {
            Score::StraightFlush(top) | Score::Straight(top) => write_straight(f, *top),
            Score::FourOfAKind { quads, kicker } => write!(f, "{quads}s with {kicker} kicker"),
            Score::FullHouse { trips, pair } => write!(f, "{trips}s over {pair}s"),
            Score::Flush(values) | Score::HighCard(values) => write_values(f, values),
            Score::ThreeOfAKind { trips, kickers } => {
                write!(f, "{trips}s with ")?;
                write_values(f, kickers)
            }
            Score::TwoPair { high, low, kicker } => {
                write!(f, "{high}s and {low}s with {kicker} kicker")
            }
            Score::OnePair { pair, kickers } => {
                write!(f, "{pair}s with ")?;
                write_values(f, kickers)
            }
        }
    }
}

/// Big ugly constant for all the straights, as value bitsets.
/// Index `i` is the straight topped by `Value::Five + i`.
pub const STRAIGHTS: [u16; 10] = [
    // Wheel.
    1 << (Value::Ace as u16)
        | 1 << (Value::Two as u16)
        | 1 << (Value::Three as u16)
        | 1 << (Value::Four as u16)
        | 1 << (Value::Five as u16),
    // "Normal" straights from two to six up to ten to ace.
    0b11111 << (Value::Two as u16),
    0b11111 << (Value::Three as u16),
    0b11111 << (Value::Four as u16),
    0b11111 << (Value::Five as u16),
    0b11111 << (Value::Six as u16),
    0b11111 << (Value::Seven as u16),
    0b11111 << (Value::Eight as u16),
    0b11111 << (Value::Nine as u16),
    // Royal straight
    0b11111 << (Value::Ten as u16),
];

/// The top card of the straight these five distinct values make, if any.
fn straight_top(value_set: u16) -> Option<Value> {
    STRAIGHTS
        .iter()
        .position(|s| *s == value_set)
        .map(|i| Value::from_u8(Value::Five as u8 + i as u8))
}

/// Values grouped by how often they appear, each group highest first.
struct Groups {
    quads: Option<Value>,
    trips: Option<Value>,
    pairs: [Value; 2],
    num_pairs: usize,
    singles: [Value; 5],
    num_singles: usize,
}

impl Groups {
    fn new(counts: &[u8; 13]) -> Self {
        let mut g = Groups {
            quads: None,
            trips: None,
            pairs: [Value::Two; 2],
            num_pairs: 0,
            singles: [Value::Two; 5],
            num_singles: 0,
        };
        for v in (0..13u8).rev() {
            let value = Value::from_u8(v);
            match counts[usize::from(v)] {
                4 => g.quads = Some(value),
                3 => g.trips = Some(value),
                2 => {
                    g.pairs[g.num_pairs] = value;
                    g.num_pairs += 1;
                }
                1 => {
                    g.singles[g.num_singles] = value;
                    g.num_singles += 1;
                }
                _ => {}
            }
        }
        g
    }
}

/// Score exactly five cards. The cards must be distinct; nothing is checked
/// here since this is the inner loop of every evaluation.
pub(crate) fn score_five(cards: &[Card; 5]) -> Score {
    let mut suit_set: u8 = 0;
    let mut value_set: u16 = 0;
    let mut counts = [0u8; 13];
    for c in cards {
        suit_set |= 1 << c.suit as u8;
        value_set |= 1 << c.value as u16;
        counts[c.value as usize] += 1;
    }

    let is_flush = suit_set.count_ones() == 1;
    let straight = straight_top(value_set);
    let g = Groups::new(&counts);
    let s = g.singles;

    if let (Some(top), true) = (straight, is_flush) {
        return Score::StraightFlush(top);
    }
    if let Some(quads) = g.quads {
        return Score::FourOfAKind {
            quads,
            kicker: s[0],
        };
    }
    if let (Some(trips), 1) = (g.trips, g.num_pairs) {
        return Score::FullHouse {
            trips,
            pair: g.pairs[0],
        };
    }
    if is_flush {
        return Score::Flush(s);
    }
    if let Some(top) = straight {
        return Score::Straight(top);
    }
    if let Some(trips) = g.trips {
        return Score::ThreeOfAKind {
            trips,
            kickers: [s[0], s[1]],
        };
    }
    match g.num_pairs {
        2 => Score::TwoPair {
            high: g.pairs[0],
            low: g.pairs[1],
            kicker: s[0],
        },
        1 => Score::OnePair {
            pair: g.pairs[0],
            kickers: [s[0], s[1], s[2]],
        },
        _ => Score::HighCard(s),
    }
}

/// Build the table of every way to pick 5 positions out of `n`.
const fn five_subsets<const N: usize, const K: usize>() -> [[usize; 5]; K] {
    let mut out = [[0usize; 5]; K];
    let mut idx = 0;
    let mut a = 0;
    while a < N {
        let mut b = a + 1;
        while b < N {
            let mut c = b + 1;
            while c < N {
                let mut d = c + 1;
                while d < N {
                    let mut e = d + 1;
                    while e < N {
                        out[idx] = [a, b, c, d, e];
                        idx += 1;
                        e += 1;
                    }
                    d += 1;
                }
                c += 1;
            }
            b += 1;
        }
        a += 1;
    }
    out
}

const FIVE_OF_FIVE: [[usize; 5]; 1] = five_subsets::<5, 1>();
const FIVE_OF_SIX: [[usize; 5]; 6] = five_subsets::<6, 6>();
const FIVE_OF_SEVEN: [[usize; 5]; 21] = five_subsets::<7, 21>();

/// Best five card hand out of 5, 6 or 7 distinct cards without allocating.
///
/// The first subset with the maximal score wins, so when several five card
/// combos tie any one of them can come back. That's fine: they all have
/// the same score.
pub(crate) fn best_five(cards: &[Card]) -> (Score, [Card; 5]) {
    let subsets: &[[usize; 5]] = match cards.len() {
        5 => &FIVE_OF_FIVE,
        6 => &FIVE_OF_SIX,
        _ => &FIVE_OF_SEVEN,
    };

    let mut best: Option<(Score, [Card; 5])> = None;
    for idx in subsets {
        let combo = idx.map(|i| cards[i]);
        let score = score_five(&combo);
        match best {
            Some((best_score, _)) if score <= best_score => {}
            _ => best = Some((score, combo)),
        }
    }
    // There's always at least one subset.
    best.unwrap_or_else(|| {
        let combo = FIVE_OF_FIVE[0].map(|i| cards[i]);
        (score_five(&combo), combo)
    })
}

fn check_distinct(cards: &[Card], expected: usize) -> Result<(), PokerError> {
    if cards.len() != expected {
        return Err(PokerError::InvalidCardCount {
            expected,
            found: cards.len(),
        });
    }
    CardBitSet::from_distinct(cards).map(|_| ())
}

/// Score a five card hand.
///
/// ```
/// use holdem_odds::core::{evaluate_five, parse_cards, Score, Value};
///
/// let cards = parse_cards("2♣ 2♦ 2♥ 5♠ 5♣").unwrap();
/// assert_eq!(
///     Score::FullHouse { trips: Value::Two, pair: Value::Five },
///     evaluate_five(&cards).unwrap()
/// );
/// ```
pub fn evaluate_five(cards: &[Card]) -> Result<Score, PokerError> {
    check_distinct(cards, 5)?;
    Ok(score_five(&[cards[0], cards[1], cards[2], cards[3], cards[4]]))
}

/// Find the best five card hand out of seven cards.
///
/// All 21 five card subsets are scored and the best one is returned with
/// the cards that make it. When more than one subset reaches the best
/// score which of them is returned is unspecified.
///
/// ```
/// use holdem_odds::core::{evaluate_best_seven, parse_cards, Score, Value};
///
/// let cards = parse_cards("A♣ A♦ A♥ 7♦ 2♠ 9♣ K♦").unwrap();
/// let (score, combo) = evaluate_best_seven(&cards).unwrap();
/// assert_eq!(
///     Score::ThreeOfAKind { trips: Value::Ace, kickers: [Value::King, Value::Nine] },
///     score
/// );
/// assert_eq!(5, combo.len());
/// ```
pub fn evaluate_best_seven(cards: &[Card]) -> Result<(Score, [Card; 5]), PokerError> {
    check_distinct(cards, 7)?;
    Ok(best_five(cards))
}

/// Find the best five card hand out of five to seven cards. This is what
/// hands are compared on before the river.
pub fn evaluate_best(cards: &[Card]) -> Result<(Score, [Card; 5]), PokerError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(PokerError::InvalidCardRange {
            min: 5,
            max: 7,
            found: cards.len(),
        });
    }
    CardBitSet::from_distinct(cards)?;
    Ok(best_five(cards))
}

/// Can this turn into a hand score?
pub trait Rankable {
    /// The cards that will be scored.
    fn cards(&self) -> &[Card];

    /// Score exactly five cards.
    fn rank_five(&self) -> Result<Score, PokerError> {
        evaluate_five(self.cards())
    }

    /// Score the best five cards out of five to seven.
    fn rank(&self) -> Result<Score, PokerError> {
        evaluate_best(self.cards()).map(|(score, _)| score)
    }
}

impl Rankable for [Card] {
    fn cards(&self) -> &[Card] {
        self
    }
}

impl Rankable for Vec<Card> {
    fn cards(&self) -> &[Card] {
        self
    }
}
