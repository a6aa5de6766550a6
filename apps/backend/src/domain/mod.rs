//! Pure board logic: no database, no transport.

pub mod layout;
pub mod snapshot;

pub use crate::entities::board_cards::CardCategory;
pub use snapshot::{
    BoardChanges, BoardDelta, BoardSnapshot, CardState, CardView, CategoryTally, Perspective,
    RevealedCard, SelectionCount,
};
