//! Board repository functions for domain layer.

use sea_orm::{ConnectionTrait, DatabaseTransaction};

use crate::adapters::boards_sea as boards_adapter;
use crate::domain::CardState;
use crate::entities::{board_cards, boards};
use crate::errors::domain::{DomainError, NotFoundKind};

/// Board domain model
///
/// The card set is loaded separately (see [`card_states`]); this carries
/// the identity, ownership, and the version cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub code: String,
    pub session_id: Option<i64>,
    pub version: i32,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl From<boards::Model> for Board {
    fn from(model: boards::Model) -> Self {
        Self {
            code: model.code,
            session_id: model.session_id,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<board_cards::Model> for CardState {
    fn from(model: board_cards::Model) -> Self {
        Self {
            card_index: model.card_index,
            phrase: model.phrase,
            category: model.category,
            revealed: model.revealed,
            revealed_at_version: model.revealed_at_version,
        }
    }
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<Board>, DomainError> {
    let board = boards_adapter::find_by_code(conn, code).await?;
    Ok(board.map(Board::from))
}

/// Find board by code or return a board-not-found error.
pub async fn require_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Board, DomainError> {
    boards_adapter::find_by_code(conn, code)
        .await?
        .map(Board::from)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Board, format!("Board {code} not found"))
        })
}

pub async fn create_board(
    txn: &DatabaseTransaction,
    dto: boards_adapter::BoardCreate,
    cards: Vec<boards_adapter::CardSeed>,
) -> Result<Board, DomainError> {
    let board = boards_adapter::create_board(txn, dto, cards).await?;
    Ok(Board::from(board))
}

/// Advance the board's version cursor, returning the new value.
pub async fn bump_version<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<i32, DomainError> {
    match boards_adapter::bump_version(conn, code).await {
        Ok(version) => Ok(version),
        Err(sea_orm::DbErr::RecordNotFound(_)) => Err(DomainError::not_found(
            NotFoundKind::Board,
            format!("Board {code} not found"),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Compare-and-set reveal; returns the number of rows that flipped.
pub async fn mark_revealed(
    txn: &DatabaseTransaction,
    code: &str,
    card_index: i32,
    at_version: i32,
) -> Result<u64, DomainError> {
    let rows = boards_adapter::mark_revealed(txn, code, card_index, at_version).await?;
    Ok(rows)
}

pub async fn find_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    card_index: i32,
) -> Result<Option<CardState>, DomainError> {
    let card = boards_adapter::find_card(conn, code, card_index).await?;
    Ok(card.map(CardState::from))
}

/// All cards of a board in grid order, as domain state.
pub async fn card_states<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Vec<CardState>, DomainError> {
    let cards = boards_adapter::cards_for_board(conn, code).await?;
    Ok(cards.into_iter().map(CardState::from).collect())
}
