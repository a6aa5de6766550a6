//! SeaORM adapter for boards and their cards - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{board_cards, boards};

pub mod dto;

pub use dto::{BoardCreate, CardSeed};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

/// Insert a board and its full card set.
pub async fn create_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: BoardCreate,
    cards: Vec<CardSeed>,
) -> Result<boards::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let board_active = boards::ActiveModel {
        code: Set(dto.code.clone()),
        session_id: Set(dto.session_id),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let board = board_active.insert(conn).await?;

    let card_actives: Vec<board_cards::ActiveModel> = cards
        .into_iter()
        .map(|card| board_cards::ActiveModel {
            board_code: Set(dto.code.clone()),
            card_index: Set(card.card_index),
            phrase: Set(card.phrase),
            category: Set(card.category),
            revealed: Set(false),
            revealed_at_version: Set(None),
        })
        .collect();
    board_cards::Entity::insert_many(card_actives).exec(conn).await?;

    Ok(board)
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<boards::Model>, sea_orm::DbErr> {
    boards::Entity::find()
        .filter(boards::Column::Code.eq(code))
        .one(conn)
        .await
}

/// Find board by code or return RecordNotFound error.
pub async fn require_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<boards::Model, sea_orm::DbErr> {
    find_by_code(conn, code)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Board not found".to_string()))
}

/// Atomically advance the board's version cursor and return the new value.
///
/// The increment happens in SQL against the stored value, so concurrent
/// mutations of the same board serialize on this row and each observes a
/// distinct cursor.
pub async fn bump_version<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<i32, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let result = boards::Entity::update_many()
        .col_expr(
            boards::Column::Version,
            Expr::col(boards::Column::Version).add(1),
        )
        .col_expr(boards::Column::UpdatedAt, Expr::val(now).into())
        .filter(boards::Column::Code.eq(code))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::RecordNotFound("Board not found".to_string()));
    }

    let board = require_board(conn, code).await?;
    Ok(board.version)
}

/// Compare-and-set reveal: flip `revealed` false→true, stamping the
/// cursor the flip happened at.
///
/// Returns the number of rows affected: 1 for the winner, 0 when the
/// card was already revealed (or does not exist - callers distinguish by
/// refetching).
pub async fn mark_revealed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    card_index: i32,
    at_version: i32,
) -> Result<u64, sea_orm::DbErr> {
    let result = board_cards::Entity::update_many()
        .col_expr(board_cards::Column::Revealed, Expr::val(true).into())
        .col_expr(
            board_cards::Column::RevealedAtVersion,
            Expr::val(at_version).into(),
        )
        .filter(board_cards::Column::BoardCode.eq(code))
        .filter(board_cards::Column::CardIndex.eq(card_index))
        .filter(board_cards::Column::Revealed.eq(false))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

pub async fn find_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    card_index: i32,
) -> Result<Option<board_cards::Model>, sea_orm::DbErr> {
    board_cards::Entity::find()
        .filter(board_cards::Column::BoardCode.eq(code))
        .filter(board_cards::Column::CardIndex.eq(card_index))
        .one(conn)
        .await
}

/// All cards of a board in grid order.
pub async fn cards_for_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Vec<board_cards::Model>, sea_orm::DbErr> {
    board_cards::Entity::find()
        .filter(board_cards::Column::BoardCode.eq(code))
        .order_by_asc(board_cards::Column::CardIndex)
        .all(conn)
        .await
}
