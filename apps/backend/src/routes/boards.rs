//! Board-related HTTP routes.

use actix_web::http::header::{ETAG, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::db::txn::with_txn;
use crate::domain::{CardCategory, CategoryTally, Perspective};
use crate::error::AppError;
use crate::http::etag::board_etag;
use crate::repos::boards::Board;
use crate::services::board_state::BoardStateService;
use crate::services::boards::BoardService;
use crate::state::app_state::AppState;
use crate::ws::hub::DeltaBroadcast;

#[derive(Serialize)]
pub struct BoardResponse {
    pub code: String,
    pub session_id: Option<i64>,
    pub cursor: i32,
    pub created_at: OffsetDateTime,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        Self {
            code: board.code,
            session_id: board.session_id,
            cursor: board.version,
            created_at: board.created_at,
        }
    }
}

#[derive(Deserialize)]
struct CreateBoardRequest {
    tags: Vec<String>,
}

/// POST /api/boards
///
/// Generate a standalone board (no session) from the given tag filter.
async fn create_board(
    http_req: HttpRequest,
    body: web::Json<CreateBoardRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tags = body.into_inner().tags;
    let config = app_state.board_config().clone();

    let board = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let tag_ids = crate::repos::phrases::resolve_tags(txn, &tags).await?;
            let service = BoardService::new();
            let board = service.generate(txn, &config, &tag_ids, &[], None).await?;
            Ok(board)
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(BoardResponse::from(board)))
}

/// GET /api/boards/{code}
///
/// Look a board up by its shareable code; 404 lets the caller redirect
/// to a safe default.
async fn find_board(
    http_req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<BoardResponse>, AppError> {
    let code = path.into_inner();

    let board = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = BoardService::new();
            Ok(service.find_board(txn, &code).await?)
        })
    })
    .await?;

    Ok(web::Json(BoardResponse::from(board)))
}

#[derive(Deserialize)]
struct SnapshotQuery {
    /// Advisory capability flag: a spymaster view sees every category.
    #[serde(default)]
    spymaster: bool,
}

/// GET /api/boards/{code}/snapshot
///
/// Returns the current board snapshot as JSON with an ETag derived from
/// the version cursor. Supports `If-None-Match`: when the client's ETag
/// matches the current cursor, returns `304 Not Modified` with no body.
async fn get_snapshot(
    http_req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<SnapshotQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let perspective = Perspective::from_privileged(query.spymaster);

    let snapshot = {
        let code = code.clone();
        with_txn(Some(&http_req), &app_state, |txn| {
            Box::pin(async move {
                let service = BoardService::new();
                Ok(service.snapshot(txn, &code, perspective).await?)
            })
        })
        .await?
    };

    let etag_value = board_etag(&code, snapshot.cursor);

    if let Some(if_none_match) = http_req.headers().get(IF_NONE_MATCH) {
        if let Ok(client_etag) = if_none_match.to_str() {
            // Wildcard "*" means "any representation exists" (RFC 9110)
            let matches = client_etag.trim() == "*"
                || client_etag
                    .split(',')
                    .map(str::trim)
                    .any(|etag| etag == etag_value);

            if matches {
                return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
                    .insert_header((ETAG, etag_value))
                    .finish());
            }
        }
    }

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(snapshot))
}

#[derive(Deserialize)]
struct ChangesQuery {
    cursor: i32,
}

/// GET /api/boards/{code}/changes?cursor=N
///
/// Pull-mode sync: answers `unchanged` when the caller's cursor is
/// current, otherwise the delta needed to catch up.
async fn get_changes(
    http_req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ChangesQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let since = query.cursor;

    let changes = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = BoardService::new();
            Ok(service.changes_since(txn, &code, since).await?)
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(changes))
}

/// GET /api/boards/{code}/tally
async fn get_tally(
    http_req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<CategoryTally>>, AppError> {
    let code = path.into_inner();

    let tally = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = BoardService::new();
            Ok(service.tally(txn, &code).await?)
        })
    })
    .await?;

    Ok(web::Json(tally))
}

#[derive(Deserialize)]
struct RevealRequest {
    /// Participant token, carried for the request log only; reveals are
    /// not attributed.
    #[serde(default)]
    participant: Option<String>,
}

#[derive(Serialize)]
struct RevealResponse {
    category: CardCategory,
    tally: Vec<CategoryTally>,
    cursor: i32,
}

/// POST /api/boards/{code}/cards/{index}/reveal
///
/// Exactly-once reveal. Losing a race returns 409 ALREADY_REVEALED; the
/// client should re-render current state rather than report an error.
async fn reveal_card(
    http_req: HttpRequest,
    path: web::Path<(String, i32)>,
    body: web::Json<RevealRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (code, card_index) = path.into_inner();

    let outcome = {
        let code = code.clone();
        with_txn(Some(&http_req), &app_state, |txn| {
            Box::pin(async move {
                let service = BoardStateService::new();
                Ok(service.reveal(txn, &code, card_index).await?)
            })
        })
        .await?
    };

    if let Some(participant) = &body.participant {
        info!(board_code = %code, card_index, participant = %participant, "reveal accepted");
    }

    // Delivery happens after the transaction, outside any critical section
    app_state.watchers().broadcast(
        &code,
        DeltaBroadcast {
            board_code: code.clone(),
            since: outcome.since,
            delta: outcome.delta.clone(),
        },
    );

    Ok(HttpResponse::Ok().json(RevealResponse {
        category: outcome.category,
        tally: outcome.delta.tally,
        cursor: outcome.delta.cursor,
    }))
}

#[derive(Deserialize)]
struct SelectionRequest {
    participant: String,
    /// `null` clears; the participant's current card toggles off.
    card_index: Option<i32>,
}

#[derive(Serialize)]
struct SelectionResponse {
    cursor: i32,
}

/// POST /api/boards/{code}/selection
async fn set_selection(
    http_req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SelectionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let request = body.into_inner();

    let outcome = {
        let code = code.clone();
        with_txn(Some(&http_req), &app_state, |txn| {
            Box::pin(async move {
                let service = BoardStateService::new();
                Ok(service
                    .set_selection(txn, &code, &request.participant, request.card_index)
                    .await?)
            })
        })
        .await?
    };

    app_state.watchers().broadcast(
        &code,
        DeltaBroadcast {
            board_code: code.clone(),
            since: outcome.since,
            delta: outcome.delta.clone(),
        },
    );

    Ok(HttpResponse::Ok().json(SelectionResponse {
        cursor: outcome.delta.cursor,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/boards").route(web::post().to(create_board)));
    cfg.service(web::resource("/api/boards/{code}").route(web::get().to(find_board)));
    cfg.service(web::resource("/api/boards/{code}/snapshot").route(web::get().to(get_snapshot)));
    cfg.service(web::resource("/api/boards/{code}/changes").route(web::get().to(get_changes)));
    cfg.service(web::resource("/api/boards/{code}/tally").route(web::get().to(get_tally)));
    cfg.service(
        web::resource("/api/boards/{code}/cards/{index}/reveal")
            .route(web::post().to(reveal_card)),
    );
    cfg.service(web::resource("/api/boards/{code}/selection").route(web::post().to(set_selection)));
}
