use crate::error::EuchreError;
use crate::game::action::Action;
use crate::model::card::Card;
use crate::model::deck::Dealer;
use crate::model::hand::Hand;
use crate::model::judge::{HandResult, judge_hand, judge_trick};
use crate::model::player::{Player, PlayerPosition};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};
use std::array;
use tracing::{debug, info};

pub const HAND_SIZE: usize = 5;

/// Where the hand stands. `Dealt` only exists between the deal and the
/// first actor being seated, so it never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// First round: order up the flipped card or pass.
    Bid1,
    /// The dealer picked up and holds six cards.
    DealerDiscard,
    /// Second round: name a suit other than the turned-down one, or pass.
    Bid2,
    Play,
    /// Four cards are in the center and await judging.
    TrickComplete,
    HandOver,
}

/// Everything that changes over one deal. Transitions take `&mut self` and
/// are only reached through [`HandState::apply`], which validates first.
#[derive(Debug, Clone)]
pub struct HandState {
    players: [Player; 4],
    dealer: PlayerPosition,
    current: PlayerPosition,
    phase: Phase,
    trump: Option<Suit>,
    maker: Option<PlayerPosition>,
    lead_suit: Option<Suit>,
    turned_down: Option<Suit>,
    flipped: Option<Card>,
    discarded: Option<Card>,
    undealt: Vec<Card>,
    center: Trick,
    card_history: Vec<Card>,
    tricks_won: [u8; 4],
    result: Option<HandResult>,
}

impl HandState {
    /// Deals five cards to each seat in seat order, flips the next card and
    /// seats the player left of the dealer.
    pub fn deal(dealer_seat: PlayerPosition, dealer: &mut Dealer) -> Result<Self, EuchreError> {
        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        for hand in hands.iter_mut() {
            dealer.deal_cards(hand, HAND_SIZE)?;
        }
        let flipped = dealer.flip_top_card()?;

        let mut state = Self::from_hands(hands, dealer_seat, flipped);
        state.undealt = dealer.deck().cards().to_vec();
        debug!(
            dealer = %dealer_seat,
            flipped = %flipped,
            first = %state.current,
            "hand dealt"
        );
        Ok(state)
    }

    /// Builds a hand in the first bidding round from known cards.
    pub fn from_hands(hands: [Hand; 4], dealer: PlayerPosition, flipped: Card) -> Self {
        let mut hands = hands.into_iter();
        let players = array::from_fn(|index| {
            let seat = PlayerPosition::LOOP[index];
            Player::with_hand(seat, hands.next().unwrap_or_default())
        });
        let first = dealer.next();

        Self {
            players,
            dealer,
            current: first,
            phase: Phase::Bid1,
            trump: None,
            maker: None,
            lead_suit: None,
            turned_down: None,
            flipped: Some(flipped),
            discarded: None,
            undealt: Vec::new(),
            center: Trick::new(first),
            card_history: Vec::new(),
            tricks_won: [0; 4],
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dealer(&self) -> PlayerPosition {
        self.dealer
    }

    pub fn current_player(&self) -> PlayerPosition {
        self.current
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    /// Seat that ordered up or called trump.
    pub fn maker(&self) -> Option<PlayerPosition> {
        self.maker
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.lead_suit
    }

    pub fn turned_down(&self) -> Option<Suit> {
        self.turned_down
    }

    pub fn flipped(&self) -> Option<Card> {
        self.flipped
    }

    pub fn discarded(&self) -> Option<Card> {
        self.discarded
    }

    pub fn undealt(&self) -> &[Card] {
        &self.undealt
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        self.players[seat.index()].hand()
    }

    pub fn center(&self) -> &Trick {
        &self.center
    }

    pub fn card_history(&self) -> &[Card] {
        &self.card_history
    }

    pub fn tricks_won(&self) -> &[u8; 4] {
        &self.tricks_won
    }

    pub fn result(&self) -> Option<HandResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::HandOver
    }

    /// Legal actions for the seat to act, in a stable order.
    pub fn legal_actions(&self) -> Vec<Action> {
        let hand = self.hand(self.current);
        match self.phase {
            Phase::DealerDiscard => hand.iter().copied().map(Action::Discard).collect(),
            Phase::Bid1 => vec![Action::Pick, Action::Pass],
            Phase::Bid2 => {
                let mut actions: Vec<Action> = Suit::CALL_ORDER
                    .iter()
                    .copied()
                    .filter(|suit| Some(*suit) != self.turned_down)
                    .map(Action::Call)
                    .collect();
                if self.current != self.dealer {
                    actions.push(Action::Pass);
                }
                actions
            }
            Phase::Play => {
                let all = || hand.iter().copied().map(Action::Play).collect::<Vec<_>>();
                let (Some(trump), Some(lead)) = (self.trump, self.lead_suit) else {
                    return all();
                };
                let follow: Vec<Action> = hand
                    .iter()
                    .copied()
                    .filter(|card| card.effective_suit(trump) == lead)
                    .map(Action::Play)
                    .collect();
                if follow.is_empty() { all() } else { follow }
            }
            Phase::TrickComplete | Phase::HandOver => Vec::new(),
        }
    }

    /// Validates `action` against the legal set, then runs the matching
    /// transition. A discard naming a card the dealer does not hold is
    /// malformed rather than illegal. On error nothing has been touched.
    pub fn apply(&mut self, action: Action) -> Result<(), EuchreError> {
        if self.is_over() {
            return Err(EuchreError::HandOver);
        }
        if let Action::Discard(card) = action {
            if self.phase == Phase::DealerDiscard && !self.hand(self.dealer).contains(card) {
                return Err(EuchreError::MalformedAction(action.to_string()));
            }
        }
        if !self.legal_actions().contains(&action) {
            return Err(EuchreError::InvalidAction {
                action: action.to_string(),
                seat: self.current,
            });
        }

        debug!(seat = %self.current, phase = ?self.phase, %action, "applying action");
        match action {
            Action::Pick => self.pick(),
            Action::Pass => {
                self.pass();
                Ok(())
            }
            Action::Call(suit) => {
                self.call(suit);
                Ok(())
            }
            Action::Discard(card) => self.discard(card),
            Action::Play(card) => {
                self.play(card)?;
                if self.phase == Phase::TrickComplete {
                    self.resolve_trick()?;
                }
                Ok(())
            }
        }
    }

    fn pick(&mut self) -> Result<(), EuchreError> {
        let card = self
            .flipped
            .take()
            .ok_or(EuchreError::Inconsistent("no card to pick up"))?;
        self.players[self.dealer.index()].hand_mut().add(card);
        self.card_history.push(card);
        self.trump = Some(card.suit);
        self.maker = Some(self.current);
        self.current = self.dealer;
        self.phase = Phase::DealerDiscard;
        Ok(())
    }

    fn pass(&mut self) {
        if self.phase == Phase::Bid1 && self.current == self.dealer {
            self.turned_down = self.flipped.take().map(|card| card.suit);
            self.phase = Phase::Bid2;
        }
        self.current = self.current.next();
    }

    fn call(&mut self, suit: Suit) {
        self.trump = Some(suit);
        self.maker = Some(self.current);
        self.start_play();
    }

    fn discard(&mut self, card: Card) -> Result<(), EuchreError> {
        if !self.players[self.dealer.index()].hand_mut().remove(card) {
            return Err(EuchreError::Inconsistent("discard not held by dealer"));
        }
        self.discarded = Some(card);
        self.start_play();
        Ok(())
    }

    fn start_play(&mut self) {
        self.current = self.dealer.next();
        self.center = Trick::new(self.current);
        self.phase = Phase::Play;
        debug!(trump = ?self.trump, maker = ?self.maker, leader = %self.current, "bidding closed");
    }

    fn play(&mut self, card: Card) -> Result<(), EuchreError> {
        self.center.play(self.current, card)?;
        self.players[self.current.index()].hand_mut().remove(card);
        if self.center.len() == 1 {
            self.lead_suit = self.trump.map(|trump| card.effective_suit(trump));
        }
        self.current = self.current.next();
        if self.center.is_complete() {
            self.phase = Phase::TrickComplete;
        }
        Ok(())
    }

    fn resolve_trick(&mut self) -> Result<(), EuchreError> {
        let winner = self
            .trump
            .and_then(|trump| judge_trick(&self.center, trump))
            .ok_or(EuchreError::Inconsistent("completed trick has no winner"))?;

        self.tricks_won[winner.index()] += 1;
        self.card_history
            .extend(self.center.plays().iter().map(|play| play.card));
        self.center = Trick::new(winner);
        self.lead_suit = None;
        self.current = winner;
        debug!(%winner, tricks = ?self.tricks_won, "trick judged");

        if self.hand(winner).is_empty() {
            let result = judge_hand(&self.tricks_won);
            info!(
                winners = ?result.winners,
                points = result.points,
                tricks = ?self.tricks_won,
                "hand over"
            );
            self.result = Some(result);
            self.phase = Phase::HandOver;
        } else {
            self.phase = Phase::Play;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HandState, Phase};
    use crate::error::EuchreError;
    use crate::game::action::Action;
    use crate::model::card::Card;
    use crate::model::hand::Hand;
    use crate::model::player::{PlayerPosition, Team};
    use crate::model::suit::Suit;

    fn cards(indices: &[&str]) -> Hand {
        Hand::with_cards(indices.iter().map(|i| i.parse().unwrap()).collect())
    }

    fn card(index: &str) -> Card {
        index.parse().unwrap()
    }

    /// North deals; East acts first. Flipped card is the nine of spades.
    fn fixture() -> HandState {
        HandState::from_hands(
            [
                cards(&["SA", "SK", "HA", "DA", "CA"]),
                cards(&["CJ", "ST", "H9", "D9", "C9"]),
                cards(&["SJ", "SQ", "HK", "DK", "CK"]),
                cards(&["HJ", "HT", "HQ", "DQ", "CQ"]),
            ],
            PlayerPosition::North,
            card("S9"),
        )
    }

    fn act(state: &mut HandState, action: &str) {
        state.apply(action.parse().unwrap()).unwrap();
    }

    #[test]
    fn first_actor_sits_left_of_dealer() {
        let state = fixture();
        assert_eq!(state.phase(), Phase::Bid1);
        assert_eq!(state.current_player(), PlayerPosition::East);
        assert_eq!(state.legal_actions(), vec![Action::Pick, Action::Pass]);
    }

    #[test]
    fn pick_moves_flip_to_dealer_and_sets_trump() {
        let mut state = fixture();
        act(&mut state, "pass");
        act(&mut state, "pick");
        assert_eq!(state.phase(), Phase::DealerDiscard);
        assert_eq!(state.trump(), Some(Suit::Spades));
        assert_eq!(state.maker(), Some(PlayerPosition::South));
        assert_eq!(state.flipped(), None);
        assert_eq!(state.current_player(), PlayerPosition::North);
        assert_eq!(state.hand(PlayerPosition::North).len(), 6);
        assert_eq!(state.card_history(), &[card("S9")]);

        let legal = state.legal_actions();
        assert_eq!(legal.len(), 6);
        assert!(legal.iter().all(|a| matches!(a, Action::Discard(_))));
    }

    #[test]
    fn discard_returns_dealer_to_five_and_starts_play() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        assert_eq!(state.hand(PlayerPosition::North).len(), 5);
        assert!(!state.hand(PlayerPosition::North).contains(card("CA")));
        assert_eq!(state.discarded(), Some(card("CA")));
        assert_eq!(state.phase(), Phase::Play);
        assert_eq!(state.current_player(), PlayerPosition::East);
        assert_eq!(state.legal_actions().len(), 5);
    }

    #[test]
    fn dealer_pass_turns_the_card_down() {
        let mut state = fixture();
        for _ in 0..3 {
            act(&mut state, "pass");
            assert_eq!(state.turned_down(), None);
        }
        assert_eq!(state.current_player(), PlayerPosition::North);
        act(&mut state, "pass");
        assert_eq!(state.turned_down(), Some(Suit::Spades));
        assert_eq!(state.flipped(), None);
        assert_eq!(state.phase(), Phase::Bid2);
        assert_eq!(state.current_player(), PlayerPosition::East);
        assert_eq!(
            state.legal_actions(),
            vec![
                Action::Call(Suit::Clubs),
                Action::Call(Suit::Diamonds),
                Action::Call(Suit::Hearts),
                Action::Pass
            ]
        );
    }

    #[test]
    fn stuck_dealer_cannot_pass() {
        let mut state = fixture();
        for _ in 0..7 {
            act(&mut state, "pass");
        }
        assert_eq!(state.current_player(), PlayerPosition::North);
        let legal = state.legal_actions();
        assert!(!legal.contains(&Action::Pass));
        assert_eq!(legal.len(), 3);
        assert!(matches!(
            state.apply(Action::Pass),
            Err(EuchreError::InvalidAction { .. })
        ));
        assert_eq!(state.turned_down(), Some(Suit::Spades));
    }

    #[test]
    fn call_jumps_to_left_of_dealer() {
        let mut state = fixture();
        for _ in 0..5 {
            act(&mut state, "pass");
        }
        assert_eq!(state.current_player(), PlayerPosition::South);
        act(&mut state, "call-H");
        assert_eq!(state.trump(), Some(Suit::Hearts));
        assert_eq!(state.maker(), Some(PlayerPosition::South));
        assert_eq!(state.current_player(), PlayerPosition::East);
        assert_eq!(state.phase(), Phase::Play);
    }

    #[test]
    fn turned_down_suit_cannot_be_called() {
        let mut state = fixture();
        for _ in 0..4 {
            act(&mut state, "pass");
        }
        let err = state.apply(Action::Call(Suit::Spades)).unwrap_err();
        assert!(matches!(err, EuchreError::InvalidAction { .. }));
    }

    #[test]
    fn left_bower_must_follow_a_trump_lead() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        // East leads the ten of spades; South holds SJ and SQ.
        act(&mut state, "ST");
        assert_eq!(state.lead_suit(), Some(Suit::Spades));
        assert_eq!(
            state.legal_actions(),
            vec![Action::Play(card("SJ")), Action::Play(card("SQ"))]
        );
    }

    #[test]
    fn left_bower_lead_is_a_trump_lead() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        act(&mut state, "CJ");
        assert_eq!(state.lead_suit(), Some(Suit::Spades));
    }

    #[test]
    fn dealer_follows_with_the_only_club() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-HA");
        act(&mut state, "C9");
        assert_eq!(state.lead_suit(), Some(Suit::Clubs));
        act(&mut state, "CK");
        act(&mut state, "CQ");
        // North discarded HA and still holds SA, SK, DA, CA, S9.
        assert_eq!(state.legal_actions(), vec![Action::Play(card("CA"))]);
    }

    /// Spades are trump once East picks up S9; East leads C9 into South.
    fn bower_fixture(south: [&str; 5]) -> HandState {
        let mut state = HandState::from_hands(
            [
                cards(&["SA", "SK", "HA", "DA", "DK"]),
                cards(&["C9", "ST", "H9", "D9", "DQ"]),
                cards(&south),
                cards(&["SJ", "HJ", "HT", "DT", "CQ"]),
            ],
            PlayerPosition::North,
            card("S9"),
        );
        act(&mut state, "pick");
        act(&mut state, "discard-DK");
        act(&mut state, "C9");
        state
    }

    #[test]
    fn left_bower_does_not_follow_its_printed_suit() {
        let state = bower_fixture(["CJ", "CK", "SQ", "HK", "HQ"]);
        assert_eq!(state.lead_suit(), Some(Suit::Clubs));
        assert_eq!(state.current_player(), PlayerPosition::South);
        assert_eq!(state.legal_actions(), vec![Action::Play(card("CK"))]);
    }

    #[test]
    fn left_bower_alone_leaves_the_seat_void_in_clubs() {
        let mut state = bower_fixture(["CJ", "DJ", "SQ", "HK", "HQ"]);
        assert_eq!(state.legal_actions().len(), 5);
        act(&mut state, "CJ");
        assert_eq!(state.center().len(), 2);
    }

    #[test]
    fn discarding_a_card_not_held_is_malformed() {
        let mut state = fixture();
        act(&mut state, "pick");
        let err = state.apply(Action::Discard(card("DJ"))).unwrap_err();
        assert_eq!(err, EuchreError::MalformedAction("discard-DJ".to_string()));
        assert_eq!(state.phase(), Phase::DealerDiscard);
        assert_eq!(state.hand(PlayerPosition::North).len(), 6);
        assert_eq!(state.discarded(), None);
    }

    #[test]
    fn discard_outside_the_discard_phase_is_invalid() {
        let mut state = fixture();
        let err = state.apply(Action::Discard(card("DJ"))).unwrap_err();
        assert!(matches!(err, EuchreError::InvalidAction { .. }));
    }

    #[test]
    fn broken_transitions_report_instead_of_skipping() {
        let mut state = fixture();
        for _ in 0..4 {
            act(&mut state, "pass");
        }
        assert_eq!(
            state.pick(),
            Err(EuchreError::Inconsistent("no card to pick up"))
        );
        assert_eq!(
            state.discard(card("DJ")),
            Err(EuchreError::Inconsistent("discard not held by dealer"))
        );

        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        act(&mut state, "ST");
        assert_eq!(
            state.resolve_trick(),
            Err(EuchreError::Inconsistent("completed trick has no winner"))
        );
        assert_eq!(state.tricks_won(), &[0, 0, 0, 0]);
    }

    #[test]
    fn void_player_may_play_anything() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        act(&mut state, "C9");
        act(&mut state, "CK");
        act(&mut state, "CQ");
        assert_eq!(state.legal_actions().len(), 5);
    }

    #[test]
    fn off_suit_play_is_rejected_without_mutation() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        act(&mut state, "ST");
        let before = state.hand(PlayerPosition::South).clone();
        let err = state.apply(Action::Play(card("HK"))).unwrap_err();
        assert_eq!(
            err,
            EuchreError::InvalidAction {
                action: "HK".to_string(),
                seat: PlayerPosition::South
            }
        );
        assert_eq!(state.hand(PlayerPosition::South), &before);
        assert_eq!(state.center().len(), 1);
    }

    #[test]
    fn trick_completion_scores_and_hands_lead_to_winner() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        for play in ["ST", "SJ", "HJ", "SA"] {
            act(&mut state, play);
        }
        assert_eq!(state.phase(), Phase::Play);
        assert_eq!(state.tricks_won(), &[0, 0, 1, 0]);
        assert_eq!(state.current_player(), PlayerPosition::South);
        assert_eq!(state.lead_suit(), None);
        assert!(state.center().is_empty());
        let history: Vec<_> = state.card_history().iter().map(|c| c.index()).collect();
        assert_eq!(history, vec!["S9", "ST", "SJ", "HJ", "SA"]);
    }

    #[test]
    fn full_hand_reaches_hand_over() {
        let mut state = fixture();
        act(&mut state, "pick");
        act(&mut state, "discard-CA");
        let tricks = [
            ["ST", "SJ", "HJ", "SA"],
            ["SQ", "HT", "SK", "CJ"],
            ["H9", "HK", "HQ", "HA"],
            ["S9", "D9", "DK", "DQ"],
            ["DA", "C9", "CK", "CQ"],
        ];
        for trick in tricks {
            for play in trick {
                act(&mut state, play);
            }
        }
        assert!(state.is_over());
        assert_eq!(state.tricks_won(), &[3, 1, 1, 0]);
        let result = state.result().unwrap();
        assert_eq!(result.winners, Team::NorthSouth);
        assert_eq!(result.points, 1);
        assert_eq!(state.card_history().len(), 21);
        assert!(state.legal_actions().is_empty());
        assert_eq!(state.apply(Action::Pass), Err(EuchreError::HandOver));
    }
}
