//! Category layout generation for new boards.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::board::BoardConfig;
use crate::entities::board_cards::CardCategory;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Build the category multiset for a fresh board and shuffle it into
/// grid order.
///
/// One team receives an extra card on a 50/50 coin flip; that team opens
/// the board. The split is baked into the returned counts, there is no
/// separate "who goes first" field: callers that need it count categories
/// (see [`starting_team`]).
///
/// The returned vector has exactly `config.cards_per_board` entries; the
/// entry at position `i` is the category of grid index `i`.
pub fn deal_categories<R: Rng + ?Sized>(config: &BoardConfig, rng: &mut R) -> Vec<CardCategory> {
    let (red, blue) = if rng.gen_bool(0.5) {
        (config.guesses_per_team + 1, config.guesses_per_team)
    } else {
        (config.guesses_per_team, config.guesses_per_team + 1)
    };

    let mut categories = Vec::with_capacity(config.cards_per_board);
    categories.extend(std::iter::repeat(CardCategory::Red).take(red));
    categories.extend(std::iter::repeat(CardCategory::Blue).take(blue));
    categories.extend(std::iter::repeat(CardCategory::Black).take(config.black_cards));
    categories.extend(std::iter::repeat(CardCategory::Neutral).take(config.neutral_cards()));

    // Shuffle independently of the phrase draw order.
    categories.shuffle(rng);
    categories
}

/// The team holding the extra card, i.e. the one that goes first.
pub fn starting_team(categories: &[CardCategory]) -> Option<CardCategory> {
    let red = categories
        .iter()
        .filter(|c| **c == CardCategory::Red)
        .count();
    let blue = categories
        .iter()
        .filter(|c| **c == CardCategory::Blue)
        .count();
    match red.cmp(&blue) {
        std::cmp::Ordering::Greater => Some(CardCategory::Red),
        std::cmp::Ordering::Less => Some(CardCategory::Blue),
        std::cmp::Ordering::Equal => None,
    }
}

/// Post-generation invariant check.
///
/// A failure here is an internal fault, not a user error: generation must
/// never hand out a board whose counts don't add up.
pub fn verify_layout(
    categories: &[CardCategory],
    config: &BoardConfig,
) -> Result<(), DomainError> {
    let count = |wanted: CardCategory| categories.iter().filter(|c| **c == wanted).count();

    let red = count(CardCategory::Red);
    let blue = count(CardCategory::Blue);
    let black = count(CardCategory::Black);
    let neutral = count(CardCategory::Neutral);

    if categories.len() != config.cards_per_board {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "layout has {} cards, expected {}",
                categories.len(),
                config.cards_per_board
            ),
        ));
    }
    if red + blue != config.guesses_per_team * 2 + 1 || red.abs_diff(blue) != 1 {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("team split {red}/{blue} is not a one-card advantage"),
        ));
    }
    if black != config.black_cards {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("layout has {black} black cards, expected {}", config.black_cards),
        ));
    }
    if neutral != config.neutral_cards() {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("layout has {neutral} neutral cards, expected {}", config.neutral_cards()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn layout_counts_match_default_config() {
        let config = BoardConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let categories = deal_categories(&config, &mut rng);

        assert_eq!(categories.len(), 25);
        verify_layout(&categories, &config).unwrap();
    }

    #[test]
    fn one_team_gets_exactly_one_extra_card() {
        let config = BoardConfig::default();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let categories = deal_categories(&config, &mut rng);
            let red = categories
                .iter()
                .filter(|c| **c == CardCategory::Red)
                .count();
            let blue = categories
                .iter()
                .filter(|c| **c == CardCategory::Blue)
                .count();
            assert_eq!(red + blue, 17);
            assert_eq!(red.abs_diff(blue), 1);
        }
    }

    #[test]
    fn both_teams_get_the_advantage_over_many_deals() {
        let config = BoardConfig::default();
        let mut saw_red = false;
        let mut saw_blue = false;
        for seed in 0..128 {
            let mut rng = StdRng::seed_from_u64(seed);
            match starting_team(&deal_categories(&config, &mut rng)) {
                Some(CardCategory::Red) => saw_red = true,
                Some(CardCategory::Blue) => saw_blue = true,
                other => panic!("unexpected starting team {other:?}"),
            }
        }
        assert!(saw_red && saw_blue);
    }

    #[test]
    fn verify_layout_rejects_tampered_counts() {
        let config = BoardConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut categories = deal_categories(&config, &mut rng);

        // Flip a neutral card to black
        let pos = categories
            .iter()
            .position(|c| *c == CardCategory::Neutral)
            .unwrap();
        categories[pos] = CardCategory::Black;

        assert!(verify_layout(&categories, &config).is_err());
    }
}
