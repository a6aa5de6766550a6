use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// M:N link between tags and phrases.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "phrase_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub phrase: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tags::Entity",
        from = "Column::TagId",
        to = "super::tags::Column::Id"
    )]
    Tag,
    #[sea_orm(
        belongs_to = "super::phrases::Entity",
        from = "Column::Phrase",
        to = "super::phrases::Column::Phrase"
    )]
    Phrase,
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl Related<super::phrases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phrase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
