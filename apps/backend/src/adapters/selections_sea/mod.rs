//! SeaORM adapter for participant selections - generic over ConnectionTrait.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::entities::selections;

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

pub async fn find_one<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    participant: &str,
) -> Result<Option<selections::Model>, sea_orm::DbErr> {
    selections::Entity::find()
        .filter(selections::Column::BoardCode.eq(code))
        .filter(selections::Column::Participant.eq(participant))
        .one(conn)
        .await
}

/// Point the participant's single selection at `card_index`, replacing
/// any previous one.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    participant: &str,
    card_index: i32,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let active = selections::ActiveModel {
        board_code: Set(code.to_string()),
        participant: Set(participant.to_string()),
        card_index: Set(card_index),
        updated_at: Set(now),
    };

    selections::Entity::insert(active)
        .on_conflict(
            OnConflict::columns([
                selections::Column::BoardCode,
                selections::Column::Participant,
            ])
            .update_columns([selections::Column::CardIndex, selections::Column::UpdatedAt])
            .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

/// Clear the participant's selection; returns how many rows went away.
pub async fn delete_one<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    participant: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = selections::Entity::delete_many()
        .filter(selections::Column::BoardCode.eq(code))
        .filter(selections::Column::Participant.eq(participant))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Drop every selection pointing at a card; used when the card reveals.
pub async fn delete_for_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    card_index: i32,
) -> Result<u64, sea_orm::DbErr> {
    let result = selections::Entity::delete_many()
        .filter(selections::Column::BoardCode.eq(code))
        .filter(selections::Column::CardIndex.eq(card_index))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Drop every selection on a board; used when a session supersedes it.
pub async fn delete_for_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = selections::Entity::delete_many()
        .filter(selections::Column::BoardCode.eq(code))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Distinct selection count per card for a board.
pub async fn counts_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Vec<(i32, i64)>, sea_orm::DbErr> {
    selections::Entity::find()
        .select_only()
        .column(selections::Column::CardIndex)
        .column_as(selections::Column::Participant.count(), "count")
        .filter(selections::Column::BoardCode.eq(code))
        .group_by(selections::Column::CardIndex)
        .into_tuple::<(i32, i64)>()
        .all(conn)
        .await
}
