pub mod types;
pub mod error;
pub mod config;
pub mod board;
pub mod moves;
pub mod zobrist;
pub mod movegen;
pub mod rules;
pub mod events;
pub mod game;
pub mod notation;
pub mod sync;
pub mod perft;

pub use config::GameConfig;
pub use error::{ChessError, Result};
pub use events::GameEvent;
pub use game::{GameResult, GameState};
pub use moves::{Move, MoveRecord};
pub use sync::SyncPayload;
pub use types::{Color, Piece, PieceType, Position};
