use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::phrase_tags::Entity")]
    PhraseTags,
    #[sea_orm(has_many = "super::session_tags::Entity")]
    SessionTags,
}

impl Related<super::phrase_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhraseTags.def()
    }
}

impl Related<super::session_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
