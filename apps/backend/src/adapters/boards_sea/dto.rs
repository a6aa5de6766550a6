use crate::entities::board_cards::CardCategory;

/// Data for creating a new board
#[derive(Debug, Clone)]
pub struct BoardCreate {
    pub code: String,
    pub session_id: Option<i64>,
}

/// One card of a board being created
#[derive(Debug, Clone)]
pub struct CardSeed {
    pub card_index: i32,
    pub phrase: String,
    pub category: CardCategory,
}
