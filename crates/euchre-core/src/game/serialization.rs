use super::engine::EuchreGame;
use crate::error::EuchreError;
use crate::game::action::Action;
use crate::model::player::PlayerPosition;
use serde::{Deserialize, Serialize};

/// A hand reduced to what is needed to replay it: the shuffle seed, the
/// dealer's seat and every accepted action in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRecord {
    pub seed: u64,
    pub dealer: PlayerPosition,
    pub actions: Vec<Action>,
}

impl HandRecord {
    pub fn capture(game: &EuchreGame) -> Option<Self> {
        let hand = game.hand_state()?;
        Some(HandRecord {
            seed: game.hand_seed(),
            dealer: hand.dealer(),
            actions: game.actions().to_vec(),
        })
    }

    /// Redeals the hand and re-applies each action. An action that is no
    /// longer legal surfaces the engine's error.
    ///
    /// Only this hand is reproduced. The restored session is seeded with the
    /// hand seed, so its next `init_game` deals something other than what the
    /// recorded session would have dealt.
    pub fn restore(&self) -> Result<EuchreGame, EuchreError> {
        let mut game = EuchreGame::with_seed_and_dealer(self.seed, self.dealer);
        game.deal_hand(self.seed, self.dealer)?;
        for action in &self.actions {
            game.step_action(*action)?;
        }
        Ok(game)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::HandRecord;
    use crate::error::EuchreError;
    use crate::game::action::Action;
    use crate::game::engine::EuchreGame;
    use crate::model::player::PlayerPosition;

    fn played_game(seed: u64, steps: usize) -> EuchreGame {
        let mut game = EuchreGame::with_seed(seed);
        game.init_game().unwrap();
        for _ in 0..steps {
            if game.is_over() {
                break;
            }
            let legal = game.get_legal_actions();
            let action = legal[legal.len() - 1];
            game.step_action(action).unwrap();
        }
        game
    }

    #[test]
    fn record_serializes_actions_as_strings() {
        let game = played_game(99, 3);
        let record = HandRecord::capture(&game).unwrap();
        let json = record.to_json().unwrap();
        assert!(json.contains("\"actions\""));
        assert!(json.contains("\"pass\""));
        assert_eq!(HandRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn restore_replays_to_the_same_state() {
        let game = played_game(123, 12);
        let record = HandRecord::capture(&game).unwrap();
        let restored = record.restore().unwrap();

        for seat in PlayerPosition::LOOP {
            assert_eq!(restored.get_state(seat), game.get_state(seat));
        }
        assert_eq!(restored.current_player(), game.current_player());
        assert_eq!(restored.actions(), game.actions());
    }

    #[test]
    fn completed_hand_restores_payoffs() {
        let game = played_game(4, 64);
        assert!(game.is_over());
        let restored = HandRecord::capture(&game).unwrap().restore().unwrap();
        assert_eq!(restored.get_payoffs(), game.get_payoffs());
    }

    #[test]
    fn restored_session_is_seeded_by_the_hand() {
        let game = played_game(31, 4);
        let record = HandRecord::capture(&game).unwrap();
        let restored = record.restore().unwrap();
        assert_eq!(restored.hand_seed(), record.seed);
        assert_eq!(restored.seed(), record.seed);
        assert_ne!(restored.seed(), game.seed());
    }

    #[test]
    fn tampered_record_fails_to_restore() {
        let record = HandRecord {
            seed: 1,
            dealer: PlayerPosition::North,
            actions: vec![Action::Pass, Action::Pass, Action::Pass, Action::Pass, Action::Pick],
        };
        assert!(matches!(
            record.restore(),
            Err(EuchreError::InvalidAction { .. })
        ));
    }

    #[test]
    fn nothing_to_capture_before_the_deal() {
        assert_eq!(HandRecord::capture(&EuchreGame::with_seed(0)), None);
    }
}
