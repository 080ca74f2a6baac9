use crate::error::EuchreError;
use crate::game::action::{ACTION_COUNT, Action};
use crate::game::observation::PlayerState;
use crate::game::state::HandState;
use crate::model::deck::Dealer;
use crate::model::player::PlayerPosition;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub const PLAYER_COUNT: usize = 4;

/// One seat's turn: what it sees and who it is.
pub type Turn = (PlayerState, PlayerPosition);

/// Turn-based Euchre session. Each `init_game` deals a fresh hand from a
/// seed drawn off the session rng, so a session seed reproduces every hand.
#[derive(Debug, Clone)]
pub struct EuchreGame {
    rng: StdRng,
    seed: u64,
    fixed_dealer: Option<PlayerPosition>,
    hand_seed: u64,
    hand: Option<HandState>,
    actions: Vec<Action>,
}

impl EuchreGame {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            fixed_dealer: None,
            hand_seed: 0,
            hand: None,
            actions: Vec::new(),
        }
    }

    /// Like [`EuchreGame::with_seed`], but every hand is dealt by `dealer`.
    pub fn with_seed_and_dealer(seed: u64, dealer: PlayerPosition) -> Self {
        Self {
            fixed_dealer: Some(dealer),
            ..Self::with_seed(seed)
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed the current hand was shuffled from.
    pub fn hand_seed(&self) -> u64 {
        self.hand_seed
    }

    /// Deals a new hand and returns the first actor's view.
    pub fn init_game(&mut self) -> Result<Turn, EuchreError> {
        let hand_seed = self.rng.next_u64();
        let dealer = self
            .fixed_dealer
            .unwrap_or_else(|| PlayerPosition::LOOP[self.rng.gen_range(0..PLAYER_COUNT)]);
        self.deal_hand(hand_seed, dealer)
    }

    /// Deals the hand identified by `hand_seed` with `dealer` in the chair.
    pub fn deal_hand(
        &mut self,
        hand_seed: u64,
        dealer: PlayerPosition,
    ) -> Result<Turn, EuchreError> {
        let mut shuffler = Dealer::with_seed(hand_seed);
        let state = HandState::deal(dealer, &mut shuffler)?;
        let first = state.current_player();

        self.hand_seed = hand_seed;
        self.actions.clear();
        self.hand = Some(state);
        let view = self.view(first)?;
        Ok((view, first))
    }

    /// Parses and applies one action for the current seat.
    pub fn step(&mut self, action: &str) -> Result<Turn, EuchreError> {
        if self.hand.is_none() {
            return Err(EuchreError::NotStarted);
        }
        let action: Action = action.parse()?;
        self.step_action(action)
    }

    pub fn step_action(&mut self, action: Action) -> Result<Turn, EuchreError> {
        let hand = self.hand.as_mut().ok_or(EuchreError::NotStarted)?;
        hand.apply(action)?;
        let next = hand.current_player();
        self.actions.push(action);

        let view = self.view(next)?;
        Ok((view, next))
    }

    pub fn get_legal_actions(&self) -> Vec<Action> {
        self.hand
            .as_ref()
            .map(HandState::legal_actions)
            .unwrap_or_default()
    }

    pub fn get_state(&self, seat: PlayerPosition) -> Option<PlayerState> {
        self.hand
            .as_ref()
            .map(|hand| PlayerState::capture(hand, seat))
    }

    pub fn current_player(&self) -> Option<PlayerPosition> {
        self.hand.as_ref().map(HandState::current_player)
    }

    pub fn is_over(&self) -> bool {
        self.hand.as_ref().is_some_and(HandState::is_over)
    }

    /// Signed payoff per seat once the hand is over.
    pub fn get_payoffs(&self) -> Option<[i32; 4]> {
        self.hand
            .as_ref()
            .and_then(HandState::result)
            .map(|result| result.payoffs())
    }

    pub const fn get_player_num(&self) -> usize {
        PLAYER_COUNT
    }

    pub const fn get_action_num(&self) -> usize {
        ACTION_COUNT
    }

    pub fn hand_state(&self) -> Option<&HandState> {
        self.hand.as_ref()
    }

    /// Actions accepted since the current hand was dealt.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn view(&self, seat: PlayerPosition) -> Result<PlayerState, EuchreError> {
        self.get_state(seat).ok_or(EuchreError::NotStarted)
    }
}

impl Default for EuchreGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::EuchreGame;
    use crate::error::EuchreError;
    use crate::game::action::Action;
    use crate::game::state::Phase;
    use crate::model::player::PlayerPosition;
    use std::collections::HashSet;

    #[test]
    fn deal_partitions_the_deck() {
        let mut game = EuchreGame::with_seed(2024);
        game.init_game().unwrap();
        let hand = game.hand_state().unwrap();

        let mut seen = HashSet::new();
        for seat in PlayerPosition::LOOP {
            assert_eq!(hand.hand(seat).len(), 5);
            seen.extend(hand.hand(seat).iter().copied());
        }
        seen.insert(hand.flipped().unwrap());
        seen.extend(hand.undealt().iter().copied());
        assert_eq!(hand.undealt().len(), 3);
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn first_actor_is_left_of_dealer() {
        for seed in 0..16 {
            let mut game = EuchreGame::with_seed(seed);
            let (_, first) = game.init_game().unwrap();
            let dealer = game.hand_state().unwrap().dealer();
            assert_eq!(first, dealer.next());
            assert_eq!(game.current_player(), Some(first));
        }
    }

    #[test]
    fn fixed_dealer_is_honoured() {
        let mut game = EuchreGame::with_seed_and_dealer(9, PlayerPosition::West);
        let (_, first) = game.init_game().unwrap();
        assert_eq!(first, PlayerPosition::North);
    }

    #[test]
    fn same_seed_deals_same_hand() {
        let mut a = EuchreGame::with_seed(77);
        let mut b = EuchreGame::with_seed(77);
        assert_eq!(a.init_game().unwrap(), b.init_game().unwrap());
    }

    #[test]
    fn step_before_deal_is_rejected() {
        let mut game = EuchreGame::with_seed(1);
        assert_eq!(game.step("pass"), Err(EuchreError::NotStarted));
        assert!(game.get_legal_actions().is_empty());
        assert_eq!(game.get_state(PlayerPosition::North), None);
        assert!(!game.is_over());
    }

    #[test]
    fn pass_advances_one_seat() {
        let mut game = EuchreGame::with_seed(3);
        let (_, first) = game.init_game().unwrap();
        let (_, next) = game.step("pass").unwrap();
        assert_eq!(next, first.next());
        assert_eq!(game.actions(), &[Action::Pass]);
    }

    #[test]
    fn malformed_and_illegal_actions_leave_state_unchanged() {
        let mut game = EuchreGame::with_seed(5);
        let (before, seat) = game.init_game().unwrap();

        assert_eq!(
            game.step("call-"),
            Err(EuchreError::MalformedAction("call-".to_string()))
        );
        assert!(matches!(
            game.step("call-H"),
            Err(EuchreError::InvalidAction { .. })
        ));
        assert!(game.actions().is_empty());
        assert_eq!(game.get_state(seat), Some(before));
        assert_eq!(game.current_player(), Some(seat));
    }

    #[test]
    fn pick_gives_dealer_six_cards() {
        let mut game = EuchreGame::with_seed(8);
        game.init_game().unwrap();
        let dealer = game.hand_state().unwrap().dealer();
        let flipped = game.hand_state().unwrap().flipped().unwrap();

        let (view, next) = game.step("pick").unwrap();
        assert_eq!(next, dealer);
        assert_eq!(view.hand.len(), 6);
        assert_eq!(view.trump, Some(flipped.suit));
        assert_eq!(view.flipped, None);
        assert_eq!(game.hand_state().unwrap().phase(), Phase::DealerDiscard);
    }

    #[test]
    fn reports_fixed_sizes() {
        let game = EuchreGame::with_seed(0);
        assert_eq!(game.get_player_num(), 4);
        assert_eq!(game.get_action_num(), 54);
    }

    #[test]
    fn payoffs_only_after_the_hand() {
        let mut game = EuchreGame::with_seed(12);
        game.init_game().unwrap();
        assert_eq!(game.get_payoffs(), None);

        while !game.is_over() {
            let action = game.get_legal_actions()[0];
            game.step_action(action).unwrap();
        }

        let payoffs = game.get_payoffs().unwrap();
        assert_eq!(payoffs.iter().sum::<i32>(), 0);
        assert_eq!(payoffs[0], payoffs[2]);
        assert_eq!(payoffs[1], payoffs[3]);
        assert_eq!(payoffs[0], -payoffs[1]);
    }
}
