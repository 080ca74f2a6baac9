use crate::error::EuchreError;
use crate::model::card::Card;
use crate::model::deck::DECK_SIZE;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Size of the flat action space shared by every phase.
pub const ACTION_COUNT: usize = 54;

const DISCARD_BASE: usize = DECK_SIZE;
const CALL_BASE: usize = DISCARD_BASE + DECK_SIZE;
const PICK_ID: usize = CALL_BASE + 4;
const PASS_ID: usize = PICK_ID + 1;

/// Everything a seat can submit, decoded once at the boundary.
///
/// The textual form is the wire vocabulary: `pick`, `pass`, `call-H`,
/// `discard-SJ`, or a bare card index such as `DA` for a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Action {
    Pick,
    Pass,
    Call(Suit),
    Discard(Card),
    Play(Card),
}

impl Action {
    /// Stable position in the 54-entry action space.
    pub fn id(self) -> usize {
        match self {
            Action::Play(card) => card.ordinal(),
            Action::Discard(card) => DISCARD_BASE + card.ordinal(),
            Action::Call(suit) => CALL_BASE + suit.index(),
            Action::Pick => PICK_ID,
            Action::Pass => PASS_ID,
        }
    }

    pub fn from_id(id: usize) -> Option<Self> {
        match id {
            _ if id < DISCARD_BASE => Card::from_ordinal(id).map(Action::Play),
            _ if id < CALL_BASE => Card::from_ordinal(id - DISCARD_BASE).map(Action::Discard),
            _ if id < PICK_ID => Suit::from_index(id - CALL_BASE).map(Action::Call),
            PICK_ID => Some(Action::Pick),
            PASS_ID => Some(Action::Pass),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pick => f.write_str("pick"),
            Action::Pass => f.write_str("pass"),
            Action::Call(suit) => write!(f, "call-{suit}"),
            Action::Discard(card) => write!(f, "discard-{card}"),
            Action::Play(card) => write!(f, "{card}"),
        }
    }
}

impl FromStr for Action {
    type Err = EuchreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EuchreError::MalformedAction(s.to_string());
        match s {
            "pick" => return Ok(Action::Pick),
            "pass" => return Ok(Action::Pass),
            _ => {}
        }

        if let Some(suit) = s.strip_prefix("call-") {
            return suit.parse().map(Action::Call).map_err(|_| malformed());
        }
        if let Some(card) = s.strip_prefix("discard-") {
            return card.parse().map(Action::Discard).map_err(|_| malformed());
        }
        s.parse().map(Action::Play).map_err(|_| malformed())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> String {
        action.to_string()
    }
}

impl TryFrom<String> for Action {
    type Error = EuchreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
