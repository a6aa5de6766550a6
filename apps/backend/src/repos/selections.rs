//! Selection repository functions for domain layer.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DatabaseTransaction};

use crate::adapters::selections_sea as selections_adapter;
use crate::errors::domain::DomainError;

/// The card the participant currently points at, if any.
pub async fn current_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
    participant: &str,
) -> Result<Option<i32>, DomainError> {
    let selection = selections_adapter::find_one(conn, code, participant).await?;
    Ok(selection.map(|s| s.card_index))
}

pub async fn point_at(
    txn: &DatabaseTransaction,
    code: &str,
    participant: &str,
    card_index: i32,
) -> Result<(), DomainError> {
    selections_adapter::upsert(txn, code, participant, card_index).await?;
    Ok(())
}

pub async fn clear(
    txn: &DatabaseTransaction,
    code: &str,
    participant: &str,
) -> Result<u64, DomainError> {
    let rows = selections_adapter::delete_one(txn, code, participant).await?;
    Ok(rows)
}

pub async fn clear_for_card(
    txn: &DatabaseTransaction,
    code: &str,
    card_index: i32,
) -> Result<u64, DomainError> {
    let rows = selections_adapter::delete_for_card(txn, code, card_index).await?;
    Ok(rows)
}

pub async fn clear_board(txn: &DatabaseTransaction, code: &str) -> Result<u64, DomainError> {
    let rows = selections_adapter::delete_for_board(txn, code).await?;
    Ok(rows)
}

/// Selection counts per card index.
pub async fn counts_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<HashMap<i32, i64>, DomainError> {
    let counts = selections_adapter::counts_by_card(conn, code).await?;
    Ok(counts.into_iter().collect())
}
