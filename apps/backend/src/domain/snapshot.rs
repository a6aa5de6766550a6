//! Board views and change deltas.
//!
//! Builders here are pure: the repos layer loads card/selection state,
//! these functions shape it for a viewer. Category redaction happens
//! here and nowhere else.

use std::collections::HashMap;

use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

use crate::entities::board_cards::CardCategory;

/// Who is looking at the board.
///
/// This is an advisory capability flag passed in by the transport layer,
/// not an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    /// Sees categories of revealed cards only.
    Operative,
    /// Sees every category, revealed or not.
    Spymaster,
}

impl Perspective {
    pub fn from_privileged(privileged: bool) -> Self {
        if privileged {
            Perspective::Spymaster
        } else {
            Perspective::Operative
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, Perspective::Spymaster)
    }
}

/// State of one card as loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    pub card_index: i32,
    pub phrase: String,
    pub category: CardCategory,
    pub revealed: bool,
    pub revealed_at_version: Option<i32>,
}

/// One card as rendered for a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub card_index: i32,
    pub phrase: String,
    pub revealed: bool,
    /// Absent for unrevealed cards unless the viewer is a spymaster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CardCategory>,
    /// Distinct participants currently pointing at this card.
    pub selections: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub category: CardCategory,
    pub revealed: i64,
    pub total: i64,
}

/// Full board state plus the version cursor it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub code: String,
    pub cursor: i32,
    pub cards: Vec<CardView>,
    pub tally: Vec<CategoryTally>,
}

/// A card that flipped since the caller's cursor; carries everything
/// needed to render it revealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealedCard {
    pub card_index: i32,
    pub phrase: String,
    pub category: CardCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCount {
    pub card_index: i32,
    pub count: i64,
}

/// Minimal description of what changed since a cursor.
///
/// `selections` is the complete current overlay, not a diff: a card not
/// listed has zero active selections, so clients replace their overlay
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDelta {
    pub cursor: i32,
    pub revealed: Vec<RevealedCard>,
    pub tally: Vec<CategoryTally>,
    pub selections: Vec<SelectionCount>,
}

/// Pull-mode answer to "has anything changed since cursor X".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sync", rename_all = "snake_case")]
pub enum BoardChanges {
    Unchanged { cursor: i32 },
    Delta(BoardDelta),
}

/// Shape the full board for a viewer.
pub fn snapshot(
    code: &str,
    cursor: i32,
    cards: &[CardState],
    selections: &HashMap<i32, i64>,
    perspective: Perspective,
) -> BoardSnapshot {
    let views = cards
        .iter()
        .map(|card| CardView {
            card_index: card.card_index,
            phrase: card.phrase.clone(),
            revealed: card.revealed,
            category: if card.revealed || perspective.is_privileged() {
                Some(card.category)
            } else {
                None
            },
            // Selections on revealed cards are meaningless
            selections: if card.revealed {
                0
            } else {
                selections.get(&card.card_index).copied().unwrap_or(0)
            },
        })
        .collect();

    BoardSnapshot {
        code: code.to_string(),
        cursor,
        cards: views,
        tally: tally(cards),
    }
}

/// Per-category revealed/total counts.
pub fn tally(cards: &[CardState]) -> Vec<CategoryTally> {
    CardCategory::iter()
        .map(|category| CategoryTally {
            category,
            revealed: cards
                .iter()
                .filter(|c| c.category == category && c.revealed)
                .count() as i64,
            total: cards.iter().filter(|c| c.category == category).count() as i64,
        })
        .collect()
}

/// Build the delta between a caller's cursor and the current state.
///
/// Must be called with post-mutation state; the cards revealed after
/// `since` are reconstructed from their `revealed_at_version` stamps.
pub fn delta_since(
    cursor: i32,
    cards: &[CardState],
    selections: &HashMap<i32, i64>,
    since: i32,
) -> BoardDelta {
    let mut revealed: Vec<RevealedCard> = cards
        .iter()
        .filter(|c| c.revealed && c.revealed_at_version.is_some_and(|v| v > since))
        .map(|c| RevealedCard {
            card_index: c.card_index,
            phrase: c.phrase.clone(),
            category: c.category,
        })
        .collect();
    revealed.sort_by_key(|c| c.card_index);

    let mut selection_counts: Vec<SelectionCount> = cards
        .iter()
        .filter(|c| !c.revealed)
        .filter_map(|c| {
            selections.get(&c.card_index).map(|count| SelectionCount {
                card_index: c.card_index,
                count: *count,
            })
        })
        .filter(|s| s.count > 0)
        .collect();
    selection_counts.sort_by_key(|s| s.card_index);

    BoardDelta {
        cursor,
        revealed,
        tally: tally(cards),
        selections: selection_counts,
    }
}

/// `Unchanged` when the cursors match, otherwise the delta.
pub fn changes_since(
    cursor: i32,
    cards: &[CardState],
    selections: &HashMap<i32, i64>,
    since: i32,
) -> BoardChanges {
    if cursor == since {
        BoardChanges::Unchanged { cursor }
    } else {
        BoardChanges::Delta(delta_since(cursor, cards, selections, since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(index: i32, category: CardCategory, revealed_at: Option<i32>) -> CardState {
        CardState {
            card_index: index,
            phrase: format!("phrase-{index}"),
            category,
            revealed: revealed_at.is_some(),
            revealed_at_version: revealed_at,
        }
    }

    fn sample_cards() -> Vec<CardState> {
        vec![
            card(0, CardCategory::Red, Some(2)),
            card(1, CardCategory::Blue, None),
            card(2, CardCategory::Neutral, Some(4)),
            card(3, CardCategory::Black, None),
        ]
    }

    #[test]
    fn operative_view_hides_unrevealed_categories() {
        let cards = sample_cards();
        let snap = snapshot("ABCDEF", 4, &cards, &HashMap::new(), Perspective::Operative);

        assert_eq!(snap.cards[0].category, Some(CardCategory::Red));
        assert_eq!(snap.cards[1].category, None);
        assert_eq!(snap.cards[3].category, None);
    }

    #[test]
    fn spymaster_view_exposes_every_category() {
        let cards = sample_cards();
        let snap = snapshot("ABCDEF", 4, &cards, &HashMap::new(), Perspective::Spymaster);

        assert!(snap.cards.iter().all(|c| c.category.is_some()));
    }

    #[test]
    fn selections_on_revealed_cards_are_dropped() {
        let cards = sample_cards();
        let mut selections = HashMap::new();
        selections.insert(0, 3i64); // revealed card
        selections.insert(1, 2i64);

        let snap = snapshot("ABCDEF", 4, &cards, &selections, Perspective::Operative);
        assert_eq!(snap.cards[0].selections, 0);
        assert_eq!(snap.cards[1].selections, 2);

        let delta = delta_since(4, &cards, &selections, 0);
        assert_eq!(delta.selections, vec![SelectionCount { card_index: 1, count: 2 }]);
    }

    #[test]
    fn tally_counts_per_category() {
        let cards = sample_cards();
        let tally = tally(&cards);

        let red = tally
            .iter()
            .find(|t| t.category == CardCategory::Red)
            .unwrap();
        assert_eq!((red.revealed, red.total), (1, 1));

        let blue = tally
            .iter()
            .find(|t| t.category == CardCategory::Blue)
            .unwrap();
        assert_eq!((blue.revealed, blue.total), (0, 1));
    }

    #[test]
    fn delta_contains_only_reveals_after_cursor() {
        let cards = sample_cards();
        let delta = delta_since(4, &cards, &HashMap::new(), 2);

        assert_eq!(delta.cursor, 4);
        assert_eq!(delta.revealed.len(), 1);
        assert_eq!(delta.revealed[0].card_index, 2);
    }

    #[test]
    fn matching_cursor_reports_unchanged() {
        let cards = sample_cards();
        let changes = changes_since(4, &cards, &HashMap::new(), 4);
        assert_eq!(changes, BoardChanges::Unchanged { cursor: 4 });

        match changes_since(4, &cards, &HashMap::new(), 3) {
            BoardChanges::Delta(delta) => assert_eq!(delta.cursor, 4),
            other => panic!("expected delta, got {other:?}"),
        }
    }
}
