use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::to_string;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::txn::SharedTxn;
use crate::domain::{BoardChanges, Perspective};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::services::boards::BoardService;
use crate::state::app_state::AppState;
use crate::ws::hub::{BoardWatchRegistry, DeltaBroadcast};
use crate::ws::protocol::ServerMsg;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    /// Advisory capability flag: a spymaster view sees every category.
    #[serde(default)]
    pub spymaster: bool,
}

/// Upgrade `GET /ws/boards/{code}` into a watching session.
///
/// The initial snapshot is loaded before the upgrade so a bad code fails
/// as a plain HTTP error instead of a dropped socket.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    query: web::Query<WatchQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let board_code = path.into_inner();
    let perspective = Perspective::from_privileged(query.spymaster);

    // IMPORTANT: in tests this is injected through request extensions so
    // websocket handlers can see uncommitted rows. In production it is None.
    let shared_txn = SharedTxn::from_req(&req);

    let service = BoardService::new();
    let snapshot = match &shared_txn {
        Some(shared) => {
            service
                .snapshot(shared.transaction(), &board_code, perspective)
                .await
        }
        None => {
            let db = crate::db::require_db(&app_state)?;
            service.snapshot(db, &board_code, perspective).await
        }
    }
    .map_err(AppError::from)?;

    let initial_cursor = snapshot.cursor;
    let registry = app_state.watchers();
    let session = BoardWsSession::new(
        app_state.clone(),
        registry,
        board_code,
        shared_txn,
        vec![
            ServerMsg::Ack {
                message: "connected",
            },
            ServerMsg::Snapshot { board: snapshot },
        ],
        initial_cursor,
    );

    ws::start(session, &req, stream)
}

pub struct BoardWsSession {
    conn_id: Uuid,
    board_code: String,
    app_state: web::Data<AppState>,
    registry: Arc<BoardWatchRegistry>,
    registry_token: Option<Uuid>,

    // Transaction-per-test hook (None in production)
    shared_txn: Option<SharedTxn>,

    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,

    pending_messages: Vec<ServerMsg>,
    last_cursor: i32,
}

impl BoardWsSession {
    fn new(
        app_state: web::Data<AppState>,
        registry: Arc<BoardWatchRegistry>,
        board_code: String,
        shared_txn: Option<SharedTxn>,
        pending_messages: Vec<ServerMsg>,
        initial_cursor: i32,
    ) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            board_code,
            app_state,
            registry,
            registry_token: None,
            shared_txn,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
            pending_messages,
            last_cursor: initial_cursor,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn flush_pending(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        for message in std::mem::take(&mut self.pending_messages) {
            Self::send_json(ctx, &message);
        }
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    board_code = %actor.board_code,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    /// The session's cursor no longer matches the broadcast's baseline:
    /// an update was missed (or arrived out of order). Catch up from the
    /// store instead of applying the delta blindly.
    fn resync(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let app_state = self.app_state.clone();
        let shared_txn = self.shared_txn.clone();
        let board_code = self.board_code.clone();
        let since = self.last_cursor;

        let fut = async move {
            let service = BoardService::new();
            match &shared_txn {
                Some(shared) => {
                    service
                        .changes_since(shared.transaction(), &board_code, since)
                        .await
                }
                None => {
                    let db = app_state.db().ok_or_else(|| {
                        DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable")
                    })?;
                    service.changes_since(db, &board_code, since).await
                }
            }
        };

        ctx.spawn(fut.into_actor(self).map(|res, actor, ctx| match res {
            Ok(BoardChanges::Delta(delta)) => {
                if delta.cursor > actor.last_cursor {
                    actor.last_cursor = delta.cursor;
                    BoardWsSession::send_json(
                        ctx,
                        &ServerMsg::Delta {
                            board_code: actor.board_code.clone(),
                            delta,
                        },
                    );
                }
            }
            Ok(BoardChanges::Unchanged { .. }) => {}
            Err(err) => warn!(
                board_code = %actor.board_code,
                error = %err,
                "[WS SESSION] resync failed"
            ),
        }));
    }
}

impl Actor for BoardWsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            board_code = %self.board_code,
            "[WS SESSION] started"
        );

        let recipient = ctx.address().recipient::<DeltaBroadcast>();
        let token = self.registry.register(&self.board_code, recipient);
        self.registry_token = Some(token);

        self.start_heartbeat(ctx);
        self.flush_pending(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(token) = self.registry_token.take() {
            self.registry.unregister(&self.board_code, token);
        }
        info!(
            conn_id = %self.conn_id,
            board_code = %self.board_code,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for BoardWsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                // Watchers don't send commands; any traffic just proves liveness
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    board_code = %self.board_code,
                    error = %err,
                    "[WS SESSION] websocket protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<DeltaBroadcast> for BoardWsSession {
    type Result = ();

    fn handle(&mut self, msg: DeltaBroadcast, ctx: &mut Self::Context) -> Self::Result {
        if msg.delta.cursor <= self.last_cursor {
            return;
        }

        if msg.since == self.last_cursor {
            self.last_cursor = msg.delta.cursor;
            Self::send_json(
                ctx,
                &ServerMsg::Delta {
                    board_code: self.board_code.clone(),
                    delta: msg.delta,
                },
            );
        } else {
            self.resync(ctx);
        }
    }
}
