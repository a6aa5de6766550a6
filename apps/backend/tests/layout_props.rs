// Property tests for category layout generation.

use backend::config::board::BoardConfig;
use backend::domain::layout::{deal_categories, starting_team, verify_layout};
use backend::entities::board_cards::CardCategory;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #[test]
    fn layout_always_verifies(seed in any::<u64>()) {
        let config = BoardConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let categories = deal_categories(&config, &mut rng);
        prop_assert!(verify_layout(&categories, &config).is_ok());
    }

    #[test]
    fn one_team_always_holds_the_advantage(seed in any::<u64>()) {
        let config = BoardConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let categories = deal_categories(&config, &mut rng);
        let starter = starting_team(&categories);
        prop_assert!(matches!(
            starter,
            Some(CardCategory::Red) | Some(CardCategory::Blue)
        ));
    }

    #[test]
    fn layout_verifies_for_alternate_configs(
        seed in any::<u64>(),
        cards in 20usize..40,
        guesses in 5usize..9,
    ) {
        let config = BoardConfig {
            cards_per_board: cards,
            guesses_per_team: guesses,
            black_cards: 1,
            code_length: 6,
        };
        prop_assume!(config.validate().is_ok());

        let mut rng = StdRng::seed_from_u64(seed);
        let categories = deal_categories(&config, &mut rng);
        prop_assert_eq!(categories.len(), cards);
        prop_assert!(verify_layout(&categories, &config).is_ok());
    }
}
