// Board state mutations: exactly-once reveals, selection laws, sync cursors.

mod support;

use backend::db::require_db;
use backend::db::txn::with_txn;
use backend::domain::{BoardChanges, BoardSnapshot, Perspective};
use backend::error::AppError;
use backend::errors::ErrorCode;
use backend::services::board_state::{BoardStateService, RevealOutcome, SelectionOutcome};
use backend::services::boards::BoardService;
use backend::AppState;

use crate::support::{build_test_state, create_board, seed_catalog};

async fn reveal(state: &AppState, code: &str, card_index: i32) -> Result<RevealOutcome, AppError> {
    let code = code.to_string();
    with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = BoardStateService::new();
            Ok(service.reveal(txn, &code, card_index).await?)
        })
    })
    .await
}

async fn select(
    state: &AppState,
    code: &str,
    participant: &str,
    target: Option<i32>,
) -> Result<SelectionOutcome, AppError> {
    let code = code.to_string();
    let participant = participant.to_string();
    with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = BoardStateService::new();
            Ok(service.set_selection(txn, &code, &participant, target).await?)
        })
    })
    .await
}

async fn snapshot(
    state: &AppState,
    code: &str,
    perspective: Perspective,
) -> Result<BoardSnapshot, AppError> {
    let code = code.to_string();
    with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = BoardService::new();
            Ok(service.snapshot(txn, &code, perspective).await?)
        })
    })
    .await
}

async fn changes(state: &AppState, code: &str, since: i32) -> Result<BoardChanges, AppError> {
    let code = code.to_string();
    with_txn(None, state, |txn| {
        Box::pin(async move {
            let service = BoardService::new();
            Ok(service.changes_since(txn, &code, since).await?)
        })
    })
    .await
}

fn selections_of(snapshot: &BoardSnapshot, card_index: i32) -> i64 {
    snapshot
        .cards
        .iter()
        .find(|c| c.card_index == card_index)
        .expect("card exists")
        .selections
}

#[tokio::test]
async fn reveal_succeeds_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    let outcome = reveal(&state, &board.code, 3).await?;
    assert_eq!(outcome.delta.cursor, 2);
    assert_eq!(outcome.delta.revealed.len(), 1);
    assert_eq!(outcome.delta.revealed[0].card_index, 3);
    assert_eq!(outcome.delta.revealed[0].category, outcome.category);

    // The loser of the race observes a typed conflict, not a crash
    let err = reveal(&state, &board.code, 3)
        .await
        .expect_err("second reveal of the same card must lose");
    assert!(matches!(
        err,
        AppError::Conflict {
            code: ErrorCode::AlreadyRevealed,
            ..
        }
    ));

    // Exactly one reveal made it into the tally, and the loser's cursor
    // bump rolled back with its transaction
    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(snap.cursor, 2);
    let revealed_total: i64 = snap.tally.iter().map(|t| t.revealed).sum();
    assert_eq!(revealed_total, 1);

    Ok(())
}

#[tokio::test]
async fn reveal_rejects_unknown_targets() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    let err = reveal(&state, &board.code, 99)
        .await
        .expect_err("card 99 does not exist");
    assert!(matches!(err, AppError::NotFound { .. }));

    let err = reveal(&state, "ZZZZZZ", 0)
        .await
        .expect_err("board ZZZZZZ does not exist");
    assert!(matches!(err, AppError::NotFound { .. }));

    Ok(())
}

#[tokio::test]
async fn selecting_the_same_card_twice_clears_it() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    select(&state, &board.code, "token-a", Some(3)).await?;
    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(selections_of(&snap, 3), 1);

    // Toggle off
    let outcome = select(&state, &board.code, "token-a", Some(3)).await?;
    assert!(outcome.delta.selections.is_empty());
    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(selections_of(&snap, 3), 0);

    Ok(())
}

#[tokio::test]
async fn selecting_a_different_card_moves_the_pointer() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    select(&state, &board.code, "token-a", Some(3)).await?;
    select(&state, &board.code, "token-b", Some(3)).await?;
    select(&state, &board.code, "token-a", Some(7)).await?;

    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(selections_of(&snap, 3), 1); // token-b stayed
    assert_eq!(selections_of(&snap, 7), 1); // token-a moved

    // Explicit clear
    select(&state, &board.code, "token-b", None).await?;
    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(selections_of(&snap, 3), 0);

    Ok(())
}

#[tokio::test]
async fn selecting_a_revealed_card_is_rejected_without_state_change(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    let outcome = reveal(&state, &board.code, 5).await?;
    let cursor_after_reveal = outcome.delta.cursor;

    let err = select(&state, &board.code, "token-a", Some(5))
        .await
        .expect_err("revealed cards cannot be selected");
    assert!(matches!(
        err,
        AppError::Conflict {
            code: ErrorCode::CardAlreadyRevealed,
            ..
        }
    ));

    // The rejected mutation left no trace, not even a cursor bump
    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(snap.cursor, cursor_after_reveal);
    assert_eq!(selections_of(&snap, 5), 0);

    Ok(())
}

#[tokio::test]
async fn revealing_a_card_drops_its_selections() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    select(&state, &board.code, "token-a", Some(4)).await?;
    select(&state, &board.code, "token-b", Some(4)).await?;

    let outcome = reveal(&state, &board.code, 4).await?;
    assert!(outcome.delta.selections.is_empty());

    let snap = snapshot(&state, &board.code, Perspective::Operative).await?;
    assert_eq!(selections_of(&snap, 4), 0);

    Ok(())
}

#[tokio::test]
async fn snapshot_is_idempotent_without_mutations() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    let first = snapshot(&state, &board.code, Perspective::Spymaster).await?;
    let second = snapshot(&state, &board.code, Perspective::Spymaster).await?;
    assert_eq!(first, second);
    assert_eq!(first.cursor, board.version);

    Ok(())
}

#[tokio::test]
async fn perspective_controls_category_visibility() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    reveal(&state, &board.code, 0).await?;

    let operative = snapshot(&state, &board.code, Perspective::Operative).await?;
    for card in &operative.cards {
        if card.revealed {
            assert!(card.category.is_some());
        } else {
            assert!(card.category.is_none());
        }
    }

    let spymaster = snapshot(&state, &board.code, Perspective::Spymaster).await?;
    assert!(spymaster.cards.iter().all(|c| c.category.is_some()));

    Ok(())
}

#[tokio::test]
async fn changes_since_round_trips_to_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    // Fresh board, matching cursor: nothing to report
    assert_eq!(
        changes(&state, &board.code, board.version).await?,
        BoardChanges::Unchanged {
            cursor: board.version
        }
    );

    reveal(&state, &board.code, 3).await?;
    select(&state, &board.code, "token-a", Some(7)).await?;

    let delta = match changes(&state, &board.code, board.version).await? {
        BoardChanges::Delta(delta) => delta,
        other => panic!("expected a delta, got {other:?}"),
    };
    assert_eq!(delta.cursor, board.version + 2);
    assert_eq!(delta.revealed.len(), 1);
    assert_eq!(delta.revealed[0].card_index, 3);
    assert_eq!(delta.selections.len(), 1);
    assert_eq!(delta.selections[0].card_index, 7);

    // Immediately re-polling with the returned cursor is a no-op
    assert_eq!(
        changes(&state, &board.code, delta.cursor).await?,
        BoardChanges::Unchanged {
            cursor: delta.cursor
        }
    );

    Ok(())
}

#[tokio::test]
async fn delta_skips_reveals_the_caller_already_saw() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;
    let board = create_board(&state, &["animals"]).await?;

    let first = reveal(&state, &board.code, 1).await?;
    reveal(&state, &board.code, 2).await?;

    // A client current up to the first reveal only receives the second
    let delta = match changes(&state, &board.code, first.delta.cursor).await? {
        BoardChanges::Delta(delta) => delta,
        other => panic!("expected a delta, got {other:?}"),
    };
    assert_eq!(delta.revealed.len(), 1);
    assert_eq!(delta.revealed[0].card_index, 2);

    Ok(())
}
