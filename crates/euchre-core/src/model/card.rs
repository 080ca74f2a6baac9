use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single Euchre card. Serializes as its two-letter index (`"SJ"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a card index")]
pub struct CardParseError(pub String);

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn index(self) -> String {
        self.to_string()
    }

    /// Position of this card in the 24-card deck layout.
    pub const fn ordinal(self) -> usize {
        self.suit.index() * 6 + self.rank.deck_offset()
    }

    pub const fn from_ordinal(ordinal: usize) -> Option<Self> {
        if ordinal >= 24 {
            return None;
        }
        let rank = Rank::DECK_ORDER[ordinal % 6];
        match Suit::from_index(ordinal / 6) {
            Some(suit) => Some(Card::new(rank, suit)),
            None => None,
        }
    }

    pub fn is_right(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump
    }

    pub fn is_left(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump.same_color()
    }

    pub fn is_trump(self, trump: Suit) -> bool {
        self.suit == trump || self.is_left(trump)
    }

    /// The suit this card answers to once trump is known.
    pub fn effective_suit(self, trump: Suit) -> Suit {
        if self.is_left(trump) { trump } else { self.suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(suit), Some(rank), None) => Suit::from_letter(suit)
                .zip(Rank::from_letter(rank))
                .map(|(suit, rank)| Card::new(rank, suit)),
            _ => None,
        };
        parsed.ok_or_else(|| CardParseError(s.to_string()))
    }
}

impl From<Card> for String {
    fn from(card: Card) -> String {
        card.index()
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
