pub mod action;
pub mod engine;
pub mod observation;
pub mod serialization;
pub mod state;
