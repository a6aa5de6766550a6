pub mod board_state;
pub mod boards;
pub mod sessions;
