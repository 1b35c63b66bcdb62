use std::fmt;
use std::str::FromStr;

use super::PokerError;

/// Card rank or value.
/// This is basically the face value - 2
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Value {
    /// 2
    Two = 0,
    /// 3
    Three = 1,
    /// 4
    Four = 2,
    /// 5
    Five = 3,
    /// 6
    Six = 4,
    /// 7
    Seven = 5,
    /// 8
    Eight = 6,
    /// 9
    Nine = 7,
    /// 10
    Ten = 8,
    /// J
    Jack = 9,
    /// Q
    Queen = 10,
    /// K
    King = 11,
    /// A
    Ace = 12,
}

/// Constant of all the values.
/// This is what `Value::values()` returns
const VALUES: [Value; 13] = [
    Value::Two,
    Value::Three,
    Value::Four,
    Value::Five,
    Value::Six,
    Value::Seven,
    Value::Eight,
    Value::Nine,
    Value::Ten,
    Value::Jack,
    Value::Queen,
    Value::King,
    Value::Ace,
];

impl Value {
    /// Take a u8 in `0..13` and convert it to a value.
    /// Anything larger saturates to `Ace`.
    pub fn from_u8(v: u8) -> Value {
        VALUES[usize::from(v.min(12))]
    }

    /// Get all of the `Value`'s that are possible.
    /// This is used to iterate through all possible
    /// values when creating a new deck.
    pub fn values() -> [Value; 13] {
        VALUES
    }

    /// The face value, 2 for a deuce up to 14 for an ace.
    ///
    /// ```
    /// use holdem_odds::core::Value;
    ///
    /// assert_eq!(2, Value::Two.face());
    /// assert_eq!(14, Value::Ace.face());
    /// ```
    pub fn face(self) -> u8 {
        self as u8 + 2
    }

    /// Inverse of [`Value::face`].
    pub fn from_face(face: u8) -> Option<Value> {
        match face {
            2..=14 => Some(VALUES[usize::from(face - 2)]),
            _ => None,
        }
    }

    /// The token used when printing a card. Ten prints as `10`.
    pub fn token(self) -> &'static str {
        match self {
            Value::Two => "2",
            Value::Three => "3",
            Value::Four => "4",
            Value::Five => "5",
            Value::Six => "6",
            Value::Seven => "7",
            Value::Eight => "8",
            Value::Nine => "9",
            Value::Ten => "10",
            Value::Jack => "J",
            Value::Queen => "Q",
            Value::King => "K",
            Value::Ace => "A",
        }
    }

    /// Parse a rank token. Accepts `2..10`, `T` and the
    /// face letters in either case.
    pub fn from_token(token: &str) -> Option<Value> {
        match token {
            "2" => Some(Value::Two),
            "3" => Some(Value::Three),
            "4" => Some(Value::Four),
            "5" => Some(Value::Five),
            "6" => Some(Value::Six),
            "7" => Some(Value::Seven),
            "8" => Some(Value::Eight),
            "9" => Some(Value::Nine),
            "10" | "T" | "t" => Some(Value::Ten),
            "J" | "j" => Some(Value::Jack),
            "Q" | "q" => Some(Value::Queen),
            "K" | "k" => Some(Value::King),
            "A" | "a" => Some(Value::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Enum for the four different suits.
/// While this has support for ordering it's not
/// sensical. The sorting is only there to allow sorting cards.
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Suit {
    /// Clubs ♣
    Club = 0,
    /// Diamonds ♦
    Diamond = 1,
    /// Hearts ♥
    Heart = 2,
    /// Spades ♠
    Spade = 3,
}

/// All of the `Suit`'s. This is what `Suit::suits()` returns.
const SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

impl Suit {
    /// Provide all the Suit's that there are, in deck order.
    pub fn suits() -> [Suit; 4] {
        SUITS
    }

    pub fn from_u8(s: u8) -> Suit {
        SUITS[usize::from(s.min(3))]
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Club => '♣',
            Suit::Diamond => '♦',
            Suit::Heart => '♥',
            Suit::Spade => '♠',
        }
    }

    /// Parse a suit from either its symbol or its ascii letter.
    pub fn from_char(s: char) -> Option<Suit> {
        match s {
            '♣' | 'c' | 'C' => Some(Suit::Club),
            '♦' | 'd' | 'D' => Some(Suit::Diamond),
            '♥' | 'h' | 'H' => Some(Suit::Heart),
            '♠' | 's' | 'S' => Some(Suit::Spade),
            _ => None,
        }
    }

    /// Hearts and diamonds.
    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamond | Suit::Heart)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The main struct of this library.
/// This is a carrier for Suit and Value combined.
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Card {
    /// The face value of this card.
    pub value: Value,
    /// The suit of this card.
    pub suit: Suit,
}

impl Card {
    pub fn new(value: Value, suit: Suit) -> Self {
        Self { value, suit }
    }
}

/// Cards are numbered `value * 4 + suit`, which is also the
/// canonical deck order.
impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.value as u8 * 4 + card.suit as u8
    }
}

impl From<u8> for Card {
    fn from(value: u8) -> Self {
        Self {
            value: Value::from_u8(value / 4),
            suit: Suit::from_u8(value % 4),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.suit)
    }
}

impl FromStr for Card {
    type Err = PokerError;

    /// Parse a single card token such as `10♠`, `Ah` or `td`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let invalid = || PokerError::InvalidCard(s.to_string());

        let suit_char = token.chars().next_back().ok_or_else(invalid)?;
        let suit = Suit::from_char(suit_char).ok_or_else(invalid)?;
        let rank = &token[..token.len() - suit_char.len_utf8()];
        let value = Value::from_token(rank).ok_or_else(invalid)?;

        Ok(Card { value, suit })
    }
}

/// Parse a list of card tokens separated by whitespace or commas.
///
/// ```
/// use holdem_odds::core::{parse_cards, Card, Suit, Value};
///
/// let cards = parse_cards("A♠ K♠, 10♠").unwrap();
/// assert_eq!(3, cards.len());
/// assert_eq!(Card::new(Value::Ten, Suit::Spade), cards[2]);
/// ```
pub fn parse_cards(s: &str) -> Result<Vec<Card>, PokerError> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(Card::from_str)
        .collect()
}

#[cfg(feature = "serde")]
impl serde::Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_constructor() {
        let c = Card::new(Value::Three, Suit::Spade);
        assert_eq!(Suit::Spade, c.suit);
        assert_eq!(Value::Three, c.value);
    }

    #[test]
    fn test_compare() {
        let c1 = Card::new(Value::Three, Suit::Spade);
        let c2 = Card::new(Value::Four, Suit::Club);
        let c3 = Card::new(Value::Four, Suit::Spade);

        assert!(c1 == c1);
        // Values are compared first
        assert!(c1 < c2);
        assert!(c2 > c1);
        // Then suit
        assert!(c3 > c2);
    }

    #[test]
    fn test_faces() {
        for (i, v) in Value::values().iter().enumerate() {
            assert_eq!(i as u8 + 2, v.face());
            assert_eq!(Some(*v), Value::from_face(v.face()));
        }
        assert_eq!(None, Value::from_face(1));
        assert_eq!(None, Value::from_face(15));
    }

    #[test]
    fn test_u8_round_trip_is_deck_order() {
        assert_eq!(Card::new(Value::Two, Suit::Club), Card::from(0));
        assert_eq!(Card::new(Value::Two, Suit::Spade), Card::from(3));
        assert_eq!(Card::new(Value::Six, Suit::Diamond), Card::from(17));
        assert_eq!(Card::new(Value::Ace, Suit::Spade), Card::from(51));
        for i in 0..52u8 {
            assert_eq!(i, u8::from(Card::from(i)));
        }
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(
            Card::new(Value::Ten, Suit::Spade),
            "10♠".parse::<Card>().unwrap()
        );
        assert_eq!(
            Card::new(Value::Ten, Suit::Heart),
            "Th".parse::<Card>().unwrap()
        );
        assert_eq!(
            Card::new(Value::Ace, Suit::Diamond),
            "a♦".parse::<Card>().unwrap()
        );
        assert_eq!(
            Card::new(Value::Two, Suit::Club),
            " 2c ".parse::<Card>().unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "♠", "1♠", "11♠", "A", "Ax", "AK♠", "10♠♠", "B♣"] {
            assert_eq!(
                Err(PokerError::InvalidCard(bad.to_string())),
                bad.parse::<Card>(),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for i in 0..52u8 {
            let card = Card::from(i);
            assert_eq!(card, card.to_string().parse().unwrap());
        }
        assert_eq!("10♥", Card::new(Value::Ten, Suit::Heart).to_string());
        assert_eq!("Q♣", Card::new(Value::Queen, Suit::Club).to_string());
    }

    #[test]
    fn test_parse_cards_list() {
        let cards = parse_cards("A♣,A♦  A♥\t7♦").unwrap();
        assert_eq!(4, cards.len());
        assert!(parse_cards("A♣ Z♦").is_err());
        assert!(parse_cards("").unwrap().is_empty());
    }

    #[test]
    fn test_red_suits() {
        assert!(Suit::Heart.is_red());
        assert!(Suit::Diamond.is_red());
        assert!(!Suit::Club.is_red());
        assert!(!Suit::Spade.is_red());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_token() {
        let card = Card::new(Value::King, Suit::Diamond);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!("\"K♦\"", json);
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
        assert!(serde_json::from_str::<Card>("\"X♦\"").is_err());
    }

    #[test]
    fn test_size() {
        // Card should be really small. Hopefully just two u8's
        assert!(mem::size_of::<Card>() <= 4);
    }
}
