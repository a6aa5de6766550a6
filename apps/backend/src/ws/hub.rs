//! Push-subscriber registry.
//!
//! Tracks which live connections are watching which board. Sessions
//! register on connect and unregister when their actor stops, so a
//! dropped connection can never leave a stale handle behind.

use actix::prelude::*;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::BoardDelta;

/// Broadcast sent to every watcher of a board after a mutation commits.
///
/// `since` is the cursor the delta was computed against; a session whose
/// own cursor does not match resyncs from the store instead of applying
/// the delta blindly.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct DeltaBroadcast {
    pub board_code: String,
    pub since: i32,
    pub delta: BoardDelta,
}

#[derive(Default)]
pub struct BoardWatchRegistry {
    watchers: DashMap<String, DashMap<Uuid, Recipient<DeltaBroadcast>>>,
}

impl BoardWatchRegistry {
    pub fn new() -> Self {
        Self {
            watchers: DashMap::new(),
        }
    }

    pub fn register(&self, board_code: &str, recipient: Recipient<DeltaBroadcast>) -> Uuid {
        let token = Uuid::new_v4();
        let entry = self
            .watchers
            .entry(board_code.to_string())
            .or_insert_with(DashMap::new);
        entry.insert(token, recipient);
        token
    }

    pub fn unregister(&self, board_code: &str, token: Uuid) {
        if let Some(entry) = self.watchers.get(board_code) {
            entry.remove(&token);
            if entry.is_empty() {
                drop(entry);
                self.watchers.remove(board_code);
            }
        }
    }

    /// Deliver to every watcher of the board. `do_send` never blocks the
    /// caller; a closed mailbox is simply skipped, and the owning session
    /// unregisters itself when it stops.
    pub fn broadcast(&self, board_code: &str, message: DeltaBroadcast) {
        if let Some(entry) = self.watchers.get(board_code) {
            for recipient in entry.iter() {
                recipient.value().do_send(message.clone());
            }
        }
    }

    pub fn watcher_count(&self, board_code: &str) -> usize {
        self.watchers
            .get(board_code)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn active_connections_count(&self) -> usize {
        self.watchers.iter().map(|entry| entry.len()).sum()
    }
}
