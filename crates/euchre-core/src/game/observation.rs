use crate::game::state::HandState;
use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What one seat may see: its own hand plus everything public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub hand: Vec<Card>,
    pub trump_called: bool,
    pub trump: Option<Suit>,
    pub turned_down: Option<Suit>,
    pub lead_suit: Option<Suit>,
    pub card_history: Vec<Card>,
    pub flipped: Option<Card>,
    /// Seat id to the card it played this trick.
    pub center: BTreeMap<u8, Card>,
}

impl PlayerState {
    pub fn capture(state: &HandState, seat: PlayerPosition) -> Self {
        Self {
            hand: state.hand(seat).cards().to_vec(),
            trump_called: state.trump().is_some(),
            trump: state.trump(),
            turned_down: state.turned_down(),
            lead_suit: state.lead_suit(),
            card_history: state.card_history().to_vec(),
            flipped: state.flipped(),
            center: state
                .center()
                .plays()
                .iter()
                .map(|play| (u8::from(play.position), play.card))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
