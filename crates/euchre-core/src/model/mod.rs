pub mod card;
pub mod deck;
pub mod hand;
pub mod judge;
pub mod player;
pub mod rank;
pub mod suit;
pub mod trick;
