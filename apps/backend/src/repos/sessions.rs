//! Session repository functions for domain layer.

use sea_orm::{ConnectionTrait, DatabaseTransaction};

use crate::adapters::sessions_sea as sessions_adapter;
use crate::entities::sessions;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::boards::Board;

/// Session domain model
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: i64,
    pub name: Option<String>,
    pub created_at: time::OffsetDateTime,
}

impl From<sessions::Model> for Session {
    fn from(model: sessions::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub async fn create_session(
    txn: &DatabaseTransaction,
    name: Option<String>,
    tag_ids: &[i64],
) -> Result<Session, DomainError> {
    let session = sessions_adapter::create_session(txn, name).await?;
    sessions_adapter::link_tags(txn, session.id, tag_ids).await?;
    Ok(Session::from(session))
}

/// Find session by ID or return a session-not-found error.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Session, DomainError> {
    sessions_adapter::find_by_id(conn, session_id)
        .await?
        .map(Session::from)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Session, format!("Session {session_id} not found"))
        })
}

/// Tag filter fixed at session start.
pub async fn tag_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let ids = sessions_adapter::tag_ids(conn, session_id).await?;
    Ok(ids)
}

/// The session's current board: the most recently created one.
pub async fn latest_board<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<Board>, DomainError> {
    let board = sessions_adapter::latest_board(conn, session_id).await?;
    Ok(board.map(Board::from))
}

/// Union of phrases used by every board of the session so far.
pub async fn used_phrases<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<String>, DomainError> {
    let phrases = sessions_adapter::used_phrases(conn, session_id).await?;
    Ok(phrases)
}
