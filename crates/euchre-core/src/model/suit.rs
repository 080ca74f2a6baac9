use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
#[repr(u8)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Diamonds = 2,
    Clubs = 3,
}

impl Suit {
    /// Order in which a fresh deck is built.
    pub const DECK_ORDER: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Order in which second-round calls are offered.
    pub const CALL_ORDER: [Suit; 4] = [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Spades),
            1 => Some(Suit::Hearts),
            2 => Some(Suit::Diamonds),
            3 => Some(Suit::Clubs),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'S' => Some(Suit::Spades),
            'H' => Some(Suit::Hearts),
            'D' => Some(Suit::Diamonds),
            'C' => Some(Suit::Clubs),
            _ => None,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }

    pub const fn is_black(self) -> bool {
        matches!(self, Suit::Clubs | Suit::Spades)
    }

    /// The other suit of the same color; its Jack is the left bower.
    pub const fn same_color(self) -> Suit {
        match self {
            Suit::Spades => Suit::Clubs,
            Suit::Clubs => Suit::Spades,
            Suit::Hearts => Suit::Diamonds,
            Suit::Diamonds => Suit::Hearts,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl From<Suit> for char {
    fn from(suit: Suit) -> char {
        suit.letter()
    }
}

impl TryFrom<char> for Suit {
    type Error = String;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Suit::from_letter(letter).ok_or_else(|| format!("unknown suit letter '{letter}'"))
    }
}

impl FromStr for Suit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Suit::try_from(letter),
            _ => Err(format!("unknown suit '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Suit;

    #[test]
    fn display_returns_ascii_letters() {
        assert_eq!(Suit::Clubs.to_string(), "C");
        assert_eq!(Suit::Hearts.to_string(), "H");
    }

    #[test]
    fn same_color_pairs_are_symmetric() {
        for suit in Suit::DECK_ORDER {
            assert_ne!(suit.same_color(), suit);
            assert_eq!(suit.same_color().same_color(), suit);
            assert_eq!(suit.same_color().is_black(), suit.is_black());
        }
        assert_eq!(Suit::Spades.same_color(), Suit::Clubs);
        assert_eq!(Suit::Hearts.same_color(), Suit::Diamonds);
    }

    #[test]
    fn parses_single_letters_only() {
        assert_eq!("D".parse::<Suit>(), Ok(Suit::Diamonds));
        assert!("X".parse::<Suit>().is_err());
        assert!("SH".parse::<Suit>().is_err());
        assert!("".parse::<Suit>().is_err());
    }
}
