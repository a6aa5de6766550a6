//! Error codes for the board server API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the board server API.
///
/// This enum ensures type safety and prevents the use of ad-hoc error codes.
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Invalid board code provided
    InvalidBoardCode,
    /// Invalid card index provided
    InvalidCardIndex,
    /// Selection targets a card that is already revealed
    CardAlreadyRevealed,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Board not found
    BoardNotFound,
    /// Card not found on the board
    CardNotFound,
    /// Session not found
    SessionNotFound,
    /// Tag not found
    TagNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Reveal lost the race: the card was already revealed
    AlreadyRevealed,
    /// Board code collided with an existing board
    BoardCodeConflict,
    /// General conflict error
    Conflict,

    // Generation
    /// The catalog cannot supply enough phrases for a board
    NotEnoughPhrases,

    // Infrastructure
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Operation timed out
    Timeout,
    /// Internal error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Canonical SCREAMING_SNAKE_CASE string for HTTP responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidBoardCode => "INVALID_BOARD_CODE",
            ErrorCode::InvalidCardIndex => "INVALID_CARD_INDEX",
            ErrorCode::CardAlreadyRevealed => "CARD_ALREADY_REVEALED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::BoardNotFound => "BOARD_NOT_FOUND",
            ErrorCode::CardNotFound => "CARD_NOT_FOUND",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::TagNotFound => "TAG_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyRevealed => "ALREADY_REVEALED",
            ErrorCode::BoardCodeConflict => "BOARD_CODE_CONFLICT",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotEnoughPhrases => "NOT_ENOUGH_PHRASES",
            ErrorCode::DbError => "DB_ERROR",
            ErrorCode::DbUnavailable => "DB_UNAVAILABLE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InternalError => "INTERNAL",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_screaming_snake_case() {
        let codes = [
            ErrorCode::InvalidBoardCode,
            ErrorCode::CardAlreadyRevealed,
            ErrorCode::BoardNotFound,
            ErrorCode::AlreadyRevealed,
            ErrorCode::NotEnoughPhrases,
            ErrorCode::DbUnavailable,
        ];
        for code in codes {
            let s = code.as_str();
            assert!(!s.is_empty());
            assert!(s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }
    }
}
