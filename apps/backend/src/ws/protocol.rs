use serde::Serialize;

use crate::domain::{BoardDelta, BoardSnapshot};

/// Messages pushed to a connected board watcher.
///
/// Watchers never send structured messages back; subscribing is the act
/// of connecting to a board's socket, and unsubscribing is disconnecting.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Ack {
        message: &'static str,
    },

    /// Full state, sent once on connect.
    Snapshot { board: BoardSnapshot },

    /// Incremental update after a mutation.
    Delta {
        board_code: String,
        delta: BoardDelta,
    },
}
