//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos convert into
//! `crate::errors::domain::DomainError` via the `From` impl below, and
//! higher layers map `DomainError` to `AppError`.

use tracing::warn;

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

fn is_unique_violation(msg: &str) -> bool {
    // Postgres reports SQLSTATE 23505, SQLite spells it out
    msg.contains("23505") || msg.contains("UNIQUE constraint failed")
}

fn map_unique_violation(msg: &str) -> DomainError {
    // Board codes are the only externally-generated key we insert blind
    if msg.contains("boards") && (msg.contains("code") || msg.contains("pkey")) {
        return DomainError::conflict(
            ConflictKind::BoardCodeConflict,
            "Board code already exists",
        );
    }
    DomainError::conflict(ConflictKind::Other("UniqueViolation".into()), "Duplicate record")
}

fn is_unavailable(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("connection refused")
        || msg.contains("connection reset")
        || msg.contains("connection aborted")
        || msg.contains("broken pipe")
        || msg.contains("pool timed out")
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let msg = e.to_string();

    if let sea_orm::DbErr::RecordNotFound(detail) = &e {
        return DomainError::not_found(NotFoundKind::Other("Record".into()), detail.clone());
    }

    if is_unique_violation(&msg) {
        return map_unique_violation(&msg);
    }

    if is_unavailable(&msg) {
        warn!(error = %msg, "database unavailable");
        return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
    }

    if msg.to_lowercase().contains("timed out") || msg.to_lowercase().contains("timeout") {
        return DomainError::infra(InfraErrorKind::Timeout, "Database operation timed out");
    }

    warn!(error = %msg, "unclassified database error");
    DomainError::infra(InfraErrorKind::Other("Db".into()), msg)
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = map_db_err(sea_orm::DbErr::RecordNotFound("Board not found".into()));
        assert!(matches!(err, DomainError::NotFound(_, _)));
    }

    #[test]
    fn sqlite_unique_violation_on_board_code_maps_to_conflict() {
        let err = map_db_err(sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: boards.code".into(),
        ));
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::BoardCodeConflict, _)
        ));
    }
}
