use std::fmt;

use super::{Category, Score};

/// The ten hand classes shown on a hand ranking chart, strongest first.
///
/// This is the same order as [`Category`] except that an ace high
/// straight flush gets its own Royal Flush entry.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HandClass {
    RoyalFlush,
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    OnePair,
    HighCard,
}

/// The one mapping between the two taxonomies: chart position, class,
/// the category it belongs to, and its name.
static CLASS_TABLE: [(u8, HandClass, Category, &str); 10] = [
    (1, HandClass::RoyalFlush, Category::StraightFlush, "Royal Flush"),
    (2, HandClass::StraightFlush, Category::StraightFlush, "Straight Flush"),
    (3, HandClass::FourOfAKind, Category::FourOfAKind, "Four of a Kind"),
    (4, HandClass::FullHouse, Category::FullHouse, "Full House"),
    (5, HandClass::Flush, Category::Flush, "Flush"),
    (6, HandClass::Straight, Category::Straight, "Straight"),
    (7, HandClass::ThreeOfAKind, Category::ThreeOfAKind, "Three of a Kind"),
    (8, HandClass::TwoPair, Category::TwoPair, "Two Pair"),
    (9, HandClass::OnePair, Category::OnePair, "One Pair"),
    (10, HandClass::HighCard, Category::HighCard, "High Card"),
];

impl HandClass {
    /// All classes in chart order.
    pub fn classes() -> [HandClass; 10] {
        CLASS_TABLE.map(|(_, class, _, _)| class)
    }

    fn entry(self) -> &'static (u8, HandClass, Category, &'static str) {
        // The table is in declaration order.
        &CLASS_TABLE[self as usize]
    }

    /// Position on the chart, 1 for a royal flush through 10 for high card.
    pub fn chart_id(self) -> u8 {
        self.entry().0
    }

    pub fn from_chart_id(id: u8) -> Option<HandClass> {
        CLASS_TABLE
            .iter()
            .find(|(chart_id, ..)| *chart_id == id)
            .map(|(_, class, ..)| *class)
    }

    pub fn category(self) -> Category {
        self.entry().2
    }

    pub fn name(self) -> &'static str {
        self.entry().3
    }

    /// The classes that make up a category. Only straight flushes have two.
    pub fn for_category(category: Category) -> impl Iterator<Item = HandClass> {
        CLASS_TABLE
            .into_iter()
            .filter(move |(_, _, c, _)| *c == category)
            .map(|(_, class, _, _)| class)
    }

    /// The chart class of a score.
    pub fn from_score(score: &Score) -> HandClass {
        if score.is_royal_flush() {
            return HandClass::RoyalFlush;
        }
        let category = score.category();
        CLASS_TABLE
            .iter()
            .rev()
            .find(|(_, _, c, _)| *c == category)
            .map(|(_, class, _, _)| *class)
            .unwrap_or(HandClass::HighCard)
    }
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}) {}", self.chart_id(), self.name())
    }
}
