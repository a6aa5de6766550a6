use std::env;

use crate::error::AppError;

/// Default number of cards on a board.
pub const DEFAULT_CARDS_PER_BOARD: usize = 25;
/// Default guessable cards per team; the starting team gets one more.
pub const DEFAULT_GUESSES_PER_TEAM: usize = 8;
/// Default number of black cards per board.
pub const DEFAULT_BLACK_CARDS: usize = 1;
/// Default length of the shareable board code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Board generation tuning, resolved once at startup.
///
/// The counts must leave room for at least one neutral card; `validate`
/// enforces the same bound the category layout relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub cards_per_board: usize,
    pub guesses_per_team: usize,
    pub black_cards: usize,
    pub code_length: usize,
}

impl BoardConfig {
    /// Read overrides from the environment, falling back to the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self {
            cards_per_board: opt_var("BOARD_CARDS", DEFAULT_CARDS_PER_BOARD)?,
            guesses_per_team: opt_var("BOARD_GUESSES_PER_TEAM", DEFAULT_GUESSES_PER_TEAM)?,
            black_cards: opt_var("BOARD_BLACK_CARDS", DEFAULT_BLACK_CARDS)?,
            code_length: opt_var("BOARD_CODE_LENGTH", DEFAULT_CODE_LENGTH)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        // Both team counts (one of them +1), the black cards, and at least
        // one neutral card must fit on the board.
        if self.cards_per_board <= self.guesses_per_team * 2 + 1 + self.black_cards {
            return Err(AppError::config(format!(
                "BOARD_CARDS={} cannot hold two teams of {} (+1), {} black card(s) and a neutral remainder",
                self.cards_per_board, self.guesses_per_team, self.black_cards
            )));
        }
        if self.code_length == 0 {
            return Err(AppError::config(
                "BOARD_CODE_LENGTH must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of neutral cards: whatever the teams and black cards leave over.
    pub fn neutral_cards(&self) -> usize {
        self.cards_per_board - (self.guesses_per_team * 2 + 1) - self.black_cards
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            cards_per_board: DEFAULT_CARDS_PER_BOARD,
            guesses_per_team: DEFAULT_GUESSES_PER_TEAM,
            black_cards: DEFAULT_BLACK_CARDS,
            code_length: DEFAULT_CODE_LENGTH,
        }
    }
}

fn opt_var(name: &str, default: usize) -> Result<usize, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|_| AppError::config(format!("'{name}' must be a positive integer, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.neutral_cards(), 7);
    }

    #[test]
    fn rejects_board_too_small_for_teams() {
        let config = BoardConfig {
            cards_per_board: 18,
            ..BoardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_code_length() {
        let config = BoardConfig {
            code_length: 0,
            ..BoardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
