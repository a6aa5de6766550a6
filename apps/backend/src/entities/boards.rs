use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One playable card grid, identified by its shareable code.
///
/// The code and card set are fixed at generation time; only `version`
/// (and the reveal/selection state hanging off the cards) ever changes.
/// `version` is bumped by every accepted mutation, so clients can compare
/// cursors to detect "anything changed" without refetching the board.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    #[sea_orm(column_name = "session_id")]
    pub session_id: Option<i64>,
    pub version: i32,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
    #[sea_orm(has_many = "super::board_cards::Entity")]
    BoardCards,
    #[sea_orm(has_many = "super::selections::Entity")]
    Selections,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::board_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoardCards.def()
    }
}

impl Related<super::selections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
