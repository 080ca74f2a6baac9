//! Trick and hand adjudication under bower ranking.

use crate::model::card::Card;
use crate::model::player::{PlayerPosition, Team};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

/// Tricks a team needs out of five to take the hand.
pub const TRICKS_TO_WIN: u8 = 3;

/// Points awarded for taking the hand. Bonuses for marches and loners are not played.
pub const HAND_POINTS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub winners: Team,
    pub points: i32,
}

impl HandResult {
    pub fn winning_seats(&self) -> [PlayerPosition; 2] {
        self.winners.seats()
    }

    /// Signed payoff per seat: `+points` for the winners, `-points` for the rest.
    pub fn payoffs(&self) -> [i32; 4] {
        let mut payoffs = [-self.points; 4];
        for seat in self.winning_seats() {
            payoffs[seat.index()] = self.points;
        }
        payoffs
    }
}

/// Returns the seat that takes a complete trick, or `None` while cards are still to come.
pub fn judge_trick(trick: &Trick, trump: Suit) -> Option<PlayerPosition> {
    if !trick.is_complete() {
        return None;
    }

    if let Some(play) = trick.plays().iter().find(|play| play.card.is_right(trump)) {
        return Some(play.position);
    }

    let leader = trick.leader();
    let lead_suit = trick.lead_suit(trump)?;
    let mut best = trick.card_for(leader)?;
    let mut winner = leader;

    for seat in leader.rotation().into_iter().skip(1) {
        let candidate = trick.card_for(seat)?;
        if beats(candidate, best, trump, lead_suit) {
            best = candidate;
            winner = seat;
        }
    }

    Some(winner)
}

/// Whether `candidate` takes the trick away from the current `best` card.
pub fn beats(candidate: Card, best: Card, trump: Suit, lead_suit: Suit) -> bool {
    if candidate.is_right(trump) {
        return true;
    }
    if best.is_right(trump) {
        return false;
    }
    if candidate.is_left(trump) {
        return true;
    }
    if best.is_left(trump) {
        return false;
    }

    match (candidate.suit == trump, best.suit == trump) {
        (true, true) => candidate.rank > best.rank,
        (true, false) => true,
        (false, true) => false,
        (false, false) => {
            candidate.suit == lead_suit && best.suit == lead_suit && candidate.rank > best.rank
        }
    }
}

/// Awards the hand to whichever partnership took at least three tricks.
pub fn judge_hand(tricks_won: &[u8; 4]) -> HandResult {
    let team_total = |team: Team| -> u8 {
        team.seats()
            .iter()
            .map(|seat| tricks_won[seat.index()])
            .sum()
    };

    let winners = if team_total(Team::NorthSouth) >= TRICKS_TO_WIN {
        Team::NorthSouth
    } else {
        Team::EastWest
    };

    HandResult {
        winners,
        points: HAND_POINTS,
    }
}
