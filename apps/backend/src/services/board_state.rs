//! Reveal and selection mutations.
//!
//! Both mutations bump the board's version cursor *first*: concurrent
//! writers to the same board serialize on that single row update, so the
//! card-state checks that follow always run against the latest committed
//! state, and boards never contend with each other. The outgoing delta is
//! computed here, inside the transaction, from post-mutation state;
//! delivery to subscribers happens after commit, outside it.

use sea_orm::DatabaseTransaction;
use tracing::info;

use crate::domain::{snapshot, BoardDelta, CardCategory};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::{boards, selections};

/// Result of a successful reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOutcome {
    pub category: CardCategory,
    /// Cursor the delta was computed against (the pre-mutation version).
    pub since: i32,
    pub delta: BoardDelta,
}

/// Result of a successful selection change.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub since: i32,
    pub delta: BoardDelta,
}

pub struct BoardStateService;

impl BoardStateService {
    pub fn new() -> Self {
        Self
    }

    /// Reveal a card exactly once.
    ///
    /// The flip is a compare-and-set on the `revealed` flag: when two
    /// participants race, one transition succeeds and the other comes
    /// back `AlreadyRevealed`. The loser's cursor bump rolls back with
    /// its transaction.
    pub async fn reveal(
        &self,
        txn: &DatabaseTransaction,
        code: &str,
        card_index: i32,
    ) -> Result<RevealOutcome, DomainError> {
        let new_version = boards::bump_version(txn, code).await?;

        let rows = boards::mark_revealed(txn, code, card_index, new_version).await?;
        if rows == 0 {
            // Lost the race or bad index; refetch to tell which.
            return match boards::find_card(txn, code, card_index).await? {
                None => Err(DomainError::not_found(
                    NotFoundKind::Card,
                    format!("Board {code} has no card {card_index}"),
                )),
                Some(_) => Err(DomainError::conflict(
                    ConflictKind::AlreadyRevealed,
                    format!("Card {card_index} was already revealed"),
                )),
            };
        }

        // The revealed card can no longer be anyone's candidate
        selections::clear_for_card(txn, code, card_index).await?;

        let cards = boards::card_states(txn, code).await?;
        let counts = selections::counts_by_card(txn, code).await?;
        let category = cards
            .iter()
            .find(|c| c.card_index == card_index)
            .map(|c| c.category)
            .ok_or_else(|| {
                DomainError::infra(
                    crate::errors::domain::InfraErrorKind::DataCorruption,
                    format!("Card {card_index} vanished from board {code} mid-reveal"),
                )
            })?;

        let since = new_version - 1;
        let delta = snapshot::delta_since(new_version, &cards, &counts, since);

        info!(board_code = %code, card_index, category = ?category, "card revealed");
        Ok(RevealOutcome {
            category,
            since,
            delta,
        })
    }

    /// Point, replace, toggle off, or clear the participant's selection.
    ///
    /// `Some(i)` on a fresh card points at it; `Some(i)` on the card the
    /// participant already points at clears it; `None` always clears.
    /// Selecting a revealed card is rejected with no state change.
    pub async fn set_selection(
        &self,
        txn: &DatabaseTransaction,
        code: &str,
        participant: &str,
        target: Option<i32>,
    ) -> Result<SelectionOutcome, DomainError> {
        let new_version = boards::bump_version(txn, code).await?;

        match target {
            Some(card_index) => {
                let card = boards::find_card(txn, code, card_index).await?.ok_or_else(|| {
                    DomainError::not_found(
                        NotFoundKind::Card,
                        format!("Board {code} has no card {card_index}"),
                    )
                })?;
                if card.revealed {
                    return Err(DomainError::CardAlreadyRevealed { card_index });
                }

                let current = selections::current_for(txn, code, participant).await?;
                if current == Some(card_index) {
                    // Re-selecting the same card clears it
                    selections::clear(txn, code, participant).await?;
                } else {
                    selections::point_at(txn, code, participant, card_index).await?;
                }
            }
            None => {
                selections::clear(txn, code, participant).await?;
            }
        }

        let cards = boards::card_states(txn, code).await?;
        let counts = selections::counts_by_card(txn, code).await?;
        let since = new_version - 1;
        let delta = snapshot::delta_since(new_version, &cards, &counts, since);

        Ok(SelectionOutcome { since, delta })
    }
}

impl Default for BoardStateService {
    fn default() -> Self {
        Self::new()
    }
}
