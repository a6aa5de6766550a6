//! SeaORM adapter for play sessions - generic over ConnectionTrait.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{board_cards, boards, session_tags, sessions};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: Option<String>,
) -> Result<sessions::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let session_active = sessions::ActiveModel {
        id: NotSet,
        name: Set(name),
        created_at: Set(now),
    };
    session_active.insert(conn).await
}

pub async fn link_tags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    tag_ids: &[i64],
) -> Result<(), sea_orm::DbErr> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<session_tags::ActiveModel> = tag_ids
        .iter()
        .map(|tag_id| session_tags::ActiveModel {
            session_id: Set(session_id),
            tag_id: Set(*tag_id),
        })
        .collect();
    session_tags::Entity::insert_many(links).exec(conn).await?;
    Ok(())
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<sessions::Model>, sea_orm::DbErr> {
    sessions::Entity::find_by_id(session_id).one(conn).await
}

/// Find session by ID or return RecordNotFound error.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<sessions::Model, sea_orm::DbErr> {
    find_by_id(conn, session_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Session not found".to_string()))
}

/// Tag filter fixed at session start.
pub async fn tag_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    session_tags::Entity::find()
        .select_only()
        .column(session_tags::Column::TagId)
        .filter(session_tags::Column::SessionId.eq(session_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
}

/// The session's most recently created board.
pub async fn latest_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<boards::Model>, sea_orm::DbErr> {
    boards::Entity::find()
        .filter(boards::Column::SessionId.eq(session_id))
        .order_by_desc(boards::Column::CreatedAt)
        .order_by_desc(boards::Column::Code)
        .one(conn)
        .await
}

/// Every phrase any board of this session has used.
pub async fn used_phrases<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<String>, sea_orm::DbErr> {
    board_cards::Entity::find()
        .select_only()
        .column(board_cards::Column::Phrase)
        .inner_join(boards::Entity)
        .filter(boards::Column::SessionId.eq(session_id))
        .into_tuple::<String>()
        .all(conn)
        .await
}
