//! Error types for rules engine operations.

use thiserror::Error;

use crate::types::Position;

/// Result type alias for rules engine operations.
pub type Result<T> = std::result::Result<T, ChessError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChessError {
    /// The move is not in the current legal set for its origin square.
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// The game already has a result.
    #[error("the game is over")]
    GameOver,

    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    /// A peer payload failed validation. The local state is left untouched.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Clocks can only be edited before the first move.
    #[error("clocks cannot be changed once the game has started")]
    ClockLocked,
}
