use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "phrases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub phrase: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::phrase_tags::Entity")]
    PhraseTags,
    #[sea_orm(has_many = "super::board_cards::Entity")]
    BoardCards,
}

impl Related<super::phrase_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhraseTags.def()
    }
}

impl Related<super::board_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoardCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
