// Board generation: count invariants and shortfall handling.

mod support;

use std::collections::HashSet;

use backend::db::require_db;
use backend::db::txn::with_txn;
use backend::entities::board_cards::CardCategory;
use backend::errors::domain::DomainError;
use backend::repos::boards::card_states;
use backend::services::boards::BoardService;
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::support::{build_test_state, create_board, seed_catalog};

#[tokio::test]
async fn generated_board_satisfies_count_invariants() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;

    let board = create_board(&state, &["animals"]).await?;
    assert_eq!(board.version, 1);
    assert_eq!(board.code.len(), 6);

    let cards = card_states(db, &board.code).await?;
    assert_eq!(cards.len(), 25);

    let count = |category: CardCategory| cards.iter().filter(|c| c.category == category).count();
    let red = count(CardCategory::Red);
    let blue = count(CardCategory::Blue);
    assert_eq!(red + blue, 17);
    assert_eq!(red.abs_diff(blue), 1);
    assert_eq!(count(CardCategory::Black), 1);
    assert_eq!(count(CardCategory::Neutral), 7);

    // Grid indices are a permutation of 0..25, phrases are distinct
    let indices: HashSet<i32> = cards.iter().map(|c| c.card_index).collect();
    assert_eq!(indices, (0..25).collect::<HashSet<i32>>());
    let phrases: HashSet<&str> = cards.iter().map(|c| c.phrase.as_str()).collect();
    assert_eq!(phrases.len(), 25);

    // Nothing is revealed on a fresh board
    assert!(cards.iter().all(|c| !c.revealed && c.revealed_at_version.is_none()));

    Ok(())
}

#[tokio::test]
async fn shortfall_reports_both_counts_and_persists_nothing(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "tiny", 10).await?;

    let result = create_board(&state, &["tiny"]).await;
    let err = result.expect_err("10 phrases cannot fill a 25-card board");
    let detail = err.to_string();
    assert!(detail.contains("25"), "missing needed count in: {detail}");
    assert!(detail.contains("10"), "missing available count in: {detail}");

    // No board row survived the rollback
    let boards = backend::entities::boards::Entity::find().count(db).await?;
    assert_eq!(boards, 0);
    let cards = backend::entities::board_cards::Entity::find().count(db).await?;
    assert_eq!(cards, 0);

    Ok(())
}

#[tokio::test]
async fn unknown_tag_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "animals", 40).await?;

    let result = create_board(&state, &["plants"]).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn generate_reports_typed_shortfall() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    seed_catalog(db, "tiny", 10).await?;

    // Drive the service directly to observe the typed error
    let outcome = with_txn(None, &state, |txn| {
        Box::pin(async move {
            let tag_ids =
                backend::repos::phrases::resolve_tags(txn, &["tiny".to_string()]).await?;
            let service = BoardService::new();
            let config = backend::config::board::BoardConfig::default();
            match service.generate(txn, &config, &tag_ids, &[], None).await {
                Ok(_) => Ok(None),
                Err(e) => Ok(Some(e)),
            }
        })
    })
    .await?;

    match outcome {
        Some(DomainError::NotEnoughPhrases { needed, available }) => {
            assert_eq!(needed, 25);
            assert_eq!(available, 10);
        }
        other => panic!("expected NotEnoughPhrases, got {other:?}"),
    }

    Ok(())
}
