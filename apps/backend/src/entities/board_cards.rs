use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hidden classification of a card, fixed at generation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    #[sea_orm(string_value = "RED")]
    Red,
    #[sea_orm(string_value = "BLUE")]
    Blue,
    #[sea_orm(string_value = "NEUTRAL")]
    Neutral,
    #[sea_orm(string_value = "BLACK")]
    Black,
}

impl CardCategory {
    /// Presentation attribute per category; total so adding a category
    /// without a style fails to compile.
    pub fn display_class(&self) -> &'static str {
        match self {
            CardCategory::Red => "bg-danger-subtle",
            CardCategory::Blue => "bg-primary-subtle",
            CardCategory::Neutral => "bg-warning-subtle",
            CardCategory::Black => "text-light bg-black",
        }
    }

    /// True for the two guessable team categories.
    pub fn is_team(&self) -> bool {
        matches!(self, CardCategory::Red | CardCategory::Blue)
    }
}

/// One position on a board: a phrase, its fixed grid index, its hidden
/// category, and the one-way `revealed` flag.
///
/// `revealed_at_version` records the board cursor at which the card
/// flipped, so a delta query can answer "revealed since cursor X"
/// without per-client state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub board_code: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_index: i32,
    pub phrase: String,
    pub category: CardCategory,
    pub revealed: bool,
    #[sea_orm(column_name = "revealed_at_version")]
    pub revealed_at_version: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::boards::Entity",
        from = "Column::BoardCode",
        to = "super::boards::Column::Code"
    )]
    Board,
    #[sea_orm(
        belongs_to = "super::phrases::Entity",
        from = "Column::Phrase",
        to = "super::phrases::Column::Phrase"
    )]
    Phrase,
}

impl Related<super::boards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl Related<super::phrases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phrase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use sea_orm::Iterable;

    use super::*;

    #[test]
    fn every_category_has_a_display_class() {
        for category in CardCategory::iter() {
            assert!(!category.display_class().is_empty());
        }
    }

    #[test]
    fn only_team_categories_are_teams() {
        assert!(CardCategory::Red.is_team());
        assert!(CardCategory::Blue.is_team());
        assert!(!CardCategory::Neutral.is_team());
        assert!(!CardCategory::Black.is_team());
    }
}
