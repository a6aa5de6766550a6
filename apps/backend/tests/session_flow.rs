// Session lifecycle: non-repeating phrase pools and stale-advance safety.

mod support;

use std::collections::HashSet;

use backend::db::require_db;
use backend::db::txn::with_txn;
use backend::errors::domain::DomainError;
use backend::repos::boards::card_states;
use backend::services::sessions::{AdvanceOutcome, SessionService};
use backend::AppState;

use crate::support::{build_test_state, seed_catalog};

async fn start(
    state: &AppState,
    tags: &[&str],
) -> Result<(i64, String), Box<dyn std::error::Error>> {
    let config = state.board_config().clone();
    let names: Vec<String> = tags.iter().map(|s| s.to_string()).collect();

    let (session, board) = with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service.start_session(txn, &config, None, &names).await?)
        })
    })
    .await?;
    Ok((session.id, board.code))
}

async fn advance(
    state: &AppState,
    session_id: i64,
    seen_code: &str,
) -> Result<AdvanceOutcome, backend::AppError> {
    let config = state.board_config().clone();
    let seen = seen_code.to_string();

    with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service.advance_session(txn, &config, session_id, &seen).await?)
        })
    })
    .await
}

#[tokio::test]
async fn consecutive_boards_share_no_phrases() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "movies", 50).await?;

    let (session_id, first_code) = start(&state, &["movies"]).await?;

    let outcome = advance(&state, session_id, &first_code).await?;
    let second = match outcome {
        AdvanceOutcome::Advanced(board) => board,
        other => panic!("expected a fresh board, got {other:?}"),
    };
    assert_ne!(second.code, first_code);

    let first_phrases: HashSet<String> = card_states(db, &first_code)
        .await?
        .into_iter()
        .map(|c| c.phrase)
        .collect();
    let second_phrases: HashSet<String> = card_states(db, &second.code)
        .await?
        .into_iter()
        .map(|c| c.phrase)
        .collect();

    assert_eq!(first_phrases.len(), 25);
    assert_eq!(second_phrases.len(), 25);
    assert!(first_phrases.is_disjoint(&second_phrases));

    Ok(())
}

#[tokio::test]
async fn advance_fails_when_pool_is_exhausted() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    // Exactly one board's worth of phrases
    seed_catalog(db, "scarce", 25).await?;

    let (session_id, first_code) = start(&state, &["scarce"]).await?;

    let err = advance(&state, session_id, &first_code)
        .await
        .expect_err("second board has no phrases left to draw");
    let detail = err.to_string();
    assert!(detail.contains("25"), "missing needed count in: {detail}");
    assert!(detail.contains("0"), "missing available count in: {detail}");

    Ok(())
}

#[tokio::test]
async fn stale_advance_redirects_without_generating() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "games", 100).await?;

    let (session_id, first_code) = start(&state, &["games"]).await?;

    let second = match advance(&state, session_id, &first_code).await? {
        AdvanceOutcome::Advanced(board) => board,
        other => panic!("expected a fresh board, got {other:?}"),
    };

    // A second caller still believing `first_code` is current must be
    // redirected to the real current board, not given a third one.
    let redirected = match advance(&state, session_id, &first_code).await? {
        AdvanceOutcome::Redirected(board) => board,
        other => panic!("expected a redirect, got {other:?}"),
    };
    assert_eq!(redirected.code, second.code);

    let current = with_txn(None, &state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            Ok(service.current_board(txn, session_id).await?)
        })
    })
    .await?;
    assert_eq!(current.code, second.code);

    Ok(())
}

#[tokio::test]
async fn advancing_clears_selections_on_the_superseded_board(
) -> Result<(), Box<dyn std::error::Error>> {
    use backend::domain::Perspective;
    use backend::services::board_state::BoardStateService;
    use backend::services::boards::BoardService;

    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "trivia", 60).await?;

    let (session_id, first_code) = start(&state, &["trivia"]).await?;

    {
        let code = first_code.clone();
        with_txn(None, &state, |txn| {
            Box::pin(async move {
                let service = BoardStateService::new();
                service.set_selection(txn, &code, "token-a", Some(3)).await?;
                Ok(())
            })
        })
        .await?;
    }

    advance(&state, session_id, &first_code).await?;

    let snap = {
        let code = first_code.clone();
        with_txn(None, &state, |txn| {
            Box::pin(async move {
                let service = BoardService::new();
                Ok(service.snapshot(txn, &code, Perspective::Operative).await?)
            })
        })
        .await?
    };
    assert!(snap.cards.iter().all(|c| c.selections == 0));

    Ok(())
}

#[tokio::test]
async fn current_board_requires_a_known_session() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;

    let result = with_txn(None, &state, |txn| {
        Box::pin(async move {
            let service = SessionService::new();
            match service.current_board(txn, 9999).await {
                Ok(_) => Ok(None),
                Err(e) => Ok(Some(e)),
            }
        })
    })
    .await?;

    assert!(matches!(result, Some(DomainError::NotFound(_, _))));

    Ok(())
}
