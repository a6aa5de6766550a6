pub mod board_cards;
pub mod boards;
pub mod phrase_tags;
pub mod phrases;
pub mod selections;
pub mod session_tags;
pub mod sessions;
pub mod tags;
