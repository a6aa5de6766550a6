//! Board generation and read-side queries.

use rand::thread_rng;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use tracing::info;

use crate::adapters::boards_sea::{BoardCreate, CardSeed};
use crate::config::board::BoardConfig;
use crate::domain::{layout, snapshot, BoardChanges, BoardSnapshot, CategoryTally, Perspective};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::{boards, phrases, selections};
use crate::utils::board_code::generate_board_code;

/// How many candidate codes to try before giving up on generation.
/// Collisions are vanishingly rare at the default code length; this
/// bound only guards against a degenerate configuration.
const CODE_ATTEMPTS: usize = 5;

pub struct BoardService;

impl BoardService {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fully-populated board from the catalog.
    ///
    /// Draws the phrases, deals the category layout, picks a free code,
    /// and persists the board with its cards. Runs inside the caller's
    /// transaction: any error rolls the whole thing back, so a failed
    /// generation leaves no partial board behind.
    pub async fn generate(
        &self,
        txn: &DatabaseTransaction,
        config: &BoardConfig,
        tag_ids: &[i64],
        exclude: &[String],
        session_id: Option<i64>,
    ) -> Result<boards::Board, DomainError> {
        let needed = config.cards_per_board as u64;
        let drawn = phrases::draw_random(txn, tag_ids, exclude, needed).await?;
        if (drawn.len() as u64) < needed {
            return Err(DomainError::NotEnoughPhrases {
                needed,
                available: drawn.len() as u64,
            });
        }

        let categories = {
            let mut rng = thread_rng();
            layout::deal_categories(config, &mut rng)
        };
        layout::verify_layout(&categories, config)?;

        let code = self.pick_code(txn, config).await?;

        // Grid index follows the category shuffle order; the draw itself
        // already randomized which phrase lands where.
        let cards: Vec<CardSeed> = drawn
            .into_iter()
            .zip(categories)
            .enumerate()
            .map(|(index, (phrase, category))| CardSeed {
                card_index: index as i32,
                phrase,
                category,
            })
            .collect();

        let board = boards::create_board(
            txn,
            BoardCreate {
                code: code.clone(),
                session_id,
            },
            cards,
        )
        .await?;

        info!(board_code = %board.code, session_id, "board generated");
        Ok(board)
    }

    async fn pick_code(
        &self,
        txn: &DatabaseTransaction,
        config: &BoardConfig,
    ) -> Result<String, DomainError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_board_code(config.code_length);
            if boards::find_by_code(txn, &code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(DomainError::conflict(
            ConflictKind::BoardCodeConflict,
            "Could not find a free board code",
        ))
    }

    pub async fn find_board<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<boards::Board, DomainError> {
        boards::require_board(conn, code).await
    }

    /// Full board state for a viewer, including the current cursor.
    pub async fn snapshot<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
        perspective: Perspective,
    ) -> Result<BoardSnapshot, DomainError> {
        let board = boards::require_board(conn, code).await?;
        let cards = boards::card_states(conn, code).await?;
        let counts = selections::counts_by_card(conn, code).await?;
        Ok(snapshot::snapshot(
            &board.code,
            board.version,
            &cards,
            &counts,
            perspective,
        ))
    }

    /// Per-category revealed/total counts.
    pub async fn tally<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Vec<CategoryTally>, DomainError> {
        boards::require_board(conn, code).await?;
        let cards = boards::card_states(conn, code).await?;
        Ok(snapshot::tally(&cards))
    }

    /// Pull-mode sync: `Unchanged` when the caller's cursor is current,
    /// otherwise the delta needed to catch up.
    pub async fn changes_since<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
        since: i32,
    ) -> Result<BoardChanges, DomainError> {
        let board = boards::require_board(conn, code).await?;
        if board.version == since {
            return Ok(BoardChanges::Unchanged {
                cursor: board.version,
            });
        }
        let cards = boards::card_states(conn, code).await?;
        let counts = selections::counts_by_card(conn, code).await?;
        Ok(snapshot::changes_since(board.version, &cards, &counts, since))
    }
}

impl Default for BoardService {
    fn default() -> Self {
        Self::new()
    }
}
