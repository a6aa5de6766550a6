//! Session lifecycle HTTP routes.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::routes::boards::BoardResponse;
use crate::services::sessions::{AdvanceOutcome, SessionService};
use crate::state::app_state::AppState;

#[derive(Deserialize)]
struct StartSessionRequest {
    #[serde(default)]
    name: Option<String>,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: i64,
    name: Option<String>,
    created_at: OffsetDateTime,
    board: BoardResponse,
}

/// POST /api/sessions
///
/// Create a session and generate its first board.
async fn start_session(
    http_req: HttpRequest,
    body: web::Json<StartSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let config = app_state.board_config().clone();

    let (session, board) = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service
                .start_session(txn, &config, request.name, &request.tags)
                .await?)
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(SessionResponse {
        session_id: session.id,
        name: session.name,
        created_at: session.created_at,
        board: BoardResponse::from(board),
    }))
}

#[derive(Deserialize)]
struct AdvanceRequest {
    /// The board the caller believes is current; a stale value makes the
    /// advance a redirect instead of a duplicate generation.
    seen_code: String,
}

#[derive(Serialize)]
struct AdvanceResponse {
    outcome: &'static str,
    board: BoardResponse,
}

/// POST /api/sessions/{session_id}/advance
async fn advance_session(
    http_req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AdvanceRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let request = body.into_inner();
    let config = app_state.board_config().clone();

    let outcome = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service
                .advance_session(txn, &config, session_id, &request.seen_code)
                .await?)
        })
    })
    .await?;

    let (label, board) = match outcome {
        AdvanceOutcome::Advanced(board) => ("advanced", board),
        AdvanceOutcome::Redirected(board) => ("redirected", board),
    };

    Ok(HttpResponse::Ok().json(AdvanceResponse {
        outcome: label,
        board: BoardResponse::from(board),
    }))
}

/// GET /api/sessions/{session_id}/current
///
/// The session's current board: the most recently created one.
async fn current_board(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<BoardResponse>, AppError> {
    let session_id = path.into_inner();

    let board = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service.current_board(txn, session_id).await?)
        })
    })
    .await?;

    Ok(web::Json(BoardResponse::from(board)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/sessions").route(web::post().to(start_session)));
    cfg.service(
        web::resource("/api/sessions/{session_id}/advance")
            .route(web::post().to(advance_session)),
    );
    cfg.service(
        web::resource("/api/sessions/{session_id}/current").route(web::get().to(current_board)),
    );
}
