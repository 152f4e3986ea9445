pub mod error;
pub mod event;
pub mod game_state;
pub mod snapshot;
