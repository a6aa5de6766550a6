use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::board::BoardConfig;
use crate::ws::hub::BoardWatchRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Database connection (optional for test scenarios)
    db: Option<DatabaseConnection>,
    /// Board generation tuning
    board: BoardConfig,
    /// Push-subscriber registry shared by mutations and ws sessions
    watchers: Arc<BoardWatchRegistry>,
}

impl AppState {
    /// Create a new AppState with the given database connection and board config
    pub fn new(db: DatabaseConnection, board: BoardConfig) -> Self {
        Self {
            db: Some(db),
            board,
            watchers: Arc::new(BoardWatchRegistry::new()),
        }
    }

    /// Create a new AppState without a database connection (for testing)
    pub fn new_without_db(board: BoardConfig) -> Self {
        Self {
            db: None,
            board,
            watchers: Arc::new(BoardWatchRegistry::new()),
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn board_config(&self) -> &BoardConfig {
        &self.board
    }

    pub fn watchers(&self) -> Arc<BoardWatchRegistry> {
        self.watchers.clone()
    }

    /// Create a test AppState with the given database connection and defaults
    pub fn for_tests(db: DatabaseConnection) -> Self {
        Self::new(db, BoardConfig::default())
    }
}
