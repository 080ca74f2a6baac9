use crate::model::player::PlayerPosition;
use crate::model::trick::TrickError;
use thiserror::Error;

/// Failures surfaced to the caller of the engine. None of them leave a
/// partially applied transition behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EuchreError {
    #[error("action '{action}' is not legal for {seat}")]
    InvalidAction { action: String, seat: PlayerPosition },
    #[error("malformed action '{0}'")]
    MalformedAction(String),
    #[error("cannot deal {requested} cards, only {remaining} remain")]
    EmptyDeck { requested: usize, remaining: usize },
    #[error("the hand is already over")]
    HandOver,
    #[error("no hand has been dealt yet")]
    NotStarted,
    #[error("hand state is inconsistent: {0}")]
    Inconsistent(&'static str),
    #[error(transparent)]
    Trick(#[from] TrickError),
}
