use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::CastlingRights;
use crate::types::{Color, PieceType, Position};

/// Zobrist hashing keys for chess positions.
/// These are pseudo-random u64 values XORed together to create a unique hash for each position.
pub struct ZobristKeys {
    /// Keys for each (color, piece_type, square) combination: 2 * 6 * 64 = 768 keys
    /// Indexed as: pieces[color][piece_type][square]
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XORed in for a king or rook that has left its square at least once
    pub ever_moved: [[u64; 64]; 2],
    /// Key for side to move (XORed when it's black's turn)
    pub side_to_move: u64,
    pub castle_kingside: [u64; 2],
    pub castle_queenside: [u64; 2],
    /// Keys for en passant file (0-7 for files a-h). The rank follows from the side to move.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Initialize Zobrist keys with deterministic pseudo-random values.
    /// Uses a simple PRNG seeded with a fixed value for reproducibility.
    pub fn new() -> Self {
        let mut rng = XorShift64::new(0x1234567890ABCDEF);

        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in pieces.iter_mut() {
            for piece in color.iter_mut() {
                for square in piece.iter_mut() {
                    *square = rng.next();
                }
            }
        }

        let mut ever_moved = [[0u64; 64]; 2];
        for color in ever_moved.iter_mut() {
            for square in color.iter_mut() {
                *square = rng.next();
            }
        }

        let side_to_move = rng.next();
        let castle_kingside = [rng.next(), rng.next()];
        let castle_queenside = [rng.next(), rng.next()];

        let mut en_passant = [0u64; 8];
        for file in en_passant.iter_mut() {
            *file = rng.next();
        }

        ZobristKeys {
            pieces,
            ever_moved,
            side_to_move,
            castle_kingside,
            castle_queenside,
            en_passant,
        }
    }

    /// Get the key for a piece at a position
    #[inline]
    pub fn piece_key(&self, color: Color, piece_type: PieceType, pos: &Position) -> u64 {
        self.pieces[color.index()][piece_type.index()][square_index(pos)]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn square_index(pos: &Position) -> usize {
    (pos.rank * 8 + pos.file) as usize
}

/// Simple XorShift64 PRNG for deterministic key generation
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        XorShift64 { state: seed }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Global static Zobrist keys (initialized once)
pub static ZOBRIST_KEYS: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

/// Canonical fingerprint of a position for repetition counting. Two positions with
/// equal signatures are treated as the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionSignature(pub u64);

impl PositionSignature {
    /// Hash of every occupied square (kind, color and, for kings and rooks, whether
    /// they ever moved), castling rights, the en passant target and the side to move.
    pub fn compute(
        board: &Board,
        active_color: Color,
        castling: &[CastlingRights; 2],
        en_passant: Option<Position>,
    ) -> Self {
        let keys = &*ZOBRIST_KEYS;
        let mut hash = 0u64;
        for (pos, piece) in board.pieces() {
            hash ^= keys.piece_key(piece.color, piece.piece_type, &pos);
            if piece.tracks_ever_moved() && piece.ever_moved {
                hash ^= keys.ever_moved[piece.color.index()][square_index(&pos)];
            }
        }
        for color in [Color::White, Color::Black] {
            let rights = castling[color.index()];
            if rights.kingside {
                hash ^= keys.castle_kingside[color.index()];
            }
            if rights.queenside {
                hash ^= keys.castle_queenside[color.index()];
            }
        }
        if let Some(target) = en_passant {
            hash ^= keys.en_passant[target.file as usize];
        }
        if active_color == Color::Black {
            hash ^= keys.side_to_move;
        }
        PositionSignature(hash)
    }
}

impl fmt::Display for PositionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
