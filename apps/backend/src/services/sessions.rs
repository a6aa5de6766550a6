//! Session lifecycle: a sequence of boards over a non-repeating phrase pool.

use sea_orm::{ConnectionTrait, DatabaseTransaction};
use tracing::info;

use crate::config::board::BoardConfig;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::{boards, phrases, selections, sessions};
use crate::services::boards::BoardService;

/// Outcome of an advance request.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// A fresh board was generated and is now current.
    Advanced(boards::Board),
    /// The caller's view was stale: another advance won. No board was
    /// generated; this is the actual current one.
    Redirected(boards::Board),
}

impl AdvanceOutcome {
    pub fn board(&self) -> &boards::Board {
        match self {
            AdvanceOutcome::Advanced(board) | AdvanceOutcome::Redirected(board) => board,
        }
    }
}

pub struct SessionService {
    boards: BoardService,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            boards: BoardService::new(),
        }
    }

    /// Create a session and its first board in one transaction.
    pub async fn start_session(
        &self,
        txn: &DatabaseTransaction,
        config: &BoardConfig,
        name: Option<String>,
        tag_names: &[String],
    ) -> Result<(sessions::Session, boards::Board), DomainError> {
        let tag_ids = phrases::resolve_tags(txn, tag_names).await?;
        let session = sessions::create_session(txn, name, &tag_ids).await?;
        let board = self
            .boards
            .generate(txn, config, &tag_ids, &[], Some(session.id))
            .await?;

        info!(session_id = session.id, board_code = %board.code, "session started");
        Ok((session, board))
    }

    /// Generate the session's next board, excluding every phrase the
    /// session has already used.
    ///
    /// `seen_code` is the board the caller believes is current. When it
    /// no longer is, the request raced another advance: return the real
    /// current board instead of generating a duplicate.
    pub async fn advance_session(
        &self,
        txn: &DatabaseTransaction,
        config: &BoardConfig,
        session_id: i64,
        seen_code: &str,
    ) -> Result<AdvanceOutcome, DomainError> {
        sessions::require_session(txn, session_id).await?;
        let current = sessions::latest_board(txn, session_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Board,
                format!("Session {session_id} has no boards"),
            )
        })?;

        if current.code != seen_code {
            info!(
                session_id,
                seen_code,
                current_code = %current.code,
                "stale advance redirected to current board"
            );
            return Ok(AdvanceOutcome::Redirected(current));
        }

        let tag_ids = sessions::tag_ids(txn, session_id).await?;
        let exclude = sessions::used_phrases(txn, session_id).await?;
        let board = self
            .boards
            .generate(txn, config, &tag_ids, &exclude, Some(session_id))
            .await?;

        // Selections don't outlive the board they point into; bump the
        // superseded board's cursor so stale pollers notice the change.
        let cleared = selections::clear_board(txn, &current.code).await?;
        if cleared > 0 {
            boards::bump_version(txn, &current.code).await?;
        }

        info!(session_id, board_code = %board.code, "session advanced");
        Ok(AdvanceOutcome::Advanced(board))
    }

    pub async fn find_session<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: i64,
    ) -> Result<sessions::Session, DomainError> {
        sessions::require_session(conn, session_id).await
    }

    /// The most recently created board of the session.
    pub async fn current_board<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: i64,
    ) -> Result<boards::Board, DomainError> {
        sessions::require_session(conn, session_id).await?;
        sessions::latest_board(conn, session_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Board,
                format!("Session {session_id} has no boards"),
            )
        })
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
