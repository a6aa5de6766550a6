//! Shared helpers for integration tests.
//!
//! Tests run against an in-memory SQLite database with the real
//! migrations applied. The pool is capped at one connection so every
//! query sees the same in-memory database.

#![allow(dead_code)] // each test binary uses a different subset

use backend::db::txn::with_txn;
use backend::error::AppError;
use backend::repos::boards::Board;
use backend::services::boards::BoardService;
use backend::AppState;
use migration::{migrate, MigrationCommand};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, NotSet, Set};

#[ctor::ctor]
fn init_test_logging() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .try_init()
        .ok();
}

pub async fn build_test_state() -> Result<AppState, AppError> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .map_err(|e| AppError::db(format!("Failed to connect to sqlite: {e}")))?;
    migrate(&db, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::db(format!("Migration failed: {e}")))?;

    Ok(AppState::for_tests(db))
}

/// Seed `count` phrases under a fresh tag named `tag_name`.
pub async fn seed_catalog(
    db: &DatabaseConnection,
    tag_name: &str,
    count: usize,
) -> Result<(), AppError> {
    use backend::entities::{phrase_tags, phrases, tags};

    let tag = tags::ActiveModel {
        id: NotSet,
        name: Set(tag_name.to_string()),
    }
    .insert(db)
    .await?;

    let phrase_actives: Vec<phrases::ActiveModel> = (0..count)
        .map(|i| phrases::ActiveModel {
            phrase: Set(format!("{tag_name}-phrase-{i:03}")),
        })
        .collect();
    phrases::Entity::insert_many(phrase_actives).exec(db).await?;

    let links: Vec<phrase_tags::ActiveModel> = (0..count)
        .map(|i| phrase_tags::ActiveModel {
            tag_id: Set(tag.id),
            phrase: Set(format!("{tag_name}-phrase-{i:03}")),
        })
        .collect();
    phrase_tags::Entity::insert_many(links).exec(db).await?;

    Ok(())
}

/// Generate a standalone board from the given tags, committing it.
pub async fn create_board(state: &AppState, tag_names: &[&str]) -> Result<Board, AppError> {
    let config = state.board_config().clone();
    let names: Vec<String> = tag_names.iter().map(|s| s.to_string()).collect();

    with_txn(None, state, |txn| {
        Box::pin(async move {
            let tag_ids = backend::repos::phrases::resolve_tags(txn, &names).await?;
            let service = BoardService::new();
            Ok(service.generate(txn, &config, &tag_ids, &[], None).await?)
        })
    })
    .await
}
