use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// Serialized by its wire name, `light` or `dark`
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Color {
    White,
    Black,
}

impl From<Color> for &'static str {
    fn from(color: Color) -> Self {
        color.to_wire()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|c| c.to_wire() == name)
            .ok_or_else(|| format!("unknown color `{}`", name))
    }
}

impl Color {
    pub fn other_color(&self) -> Color {
        if *self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Wire name used in serialized payloads
    pub fn to_wire(&self) -> &'static str {
        match self {
            Self::White => "light",
            Self::Black => "dark",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// Rank the pieces of this color start on (0 based)
    pub fn back_rank(&self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Rank delta of a single pawn step
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Rank pawns of this color double-step from
    pub fn pawn_starting_rank(&self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }

    /// Rank a pawn of this color promotes on
    pub fn promotion_rank(&self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Pawn => 0,
            Self::Knight => 1,
            Self::Bishop => 2,
            Self::Rook => 3,
            Self::Queen => 4,
            Self::King => 5,
        }
    }

    /// Display order of captured material: queen first, pawn last
    pub fn capture_order(&self) -> u8 {
        match self {
            Self::Queen => 0,
            Self::Rook => 1,
            Self::Bishop => 2,
            Self::Knight => 3,
            Self::Pawn => 4,
            Self::King => 5,
        }
    }
}

/// A square on the board. Both coordinates are 0 based, rank 0 is white's back rank
/// and file 0 is the a-file.
///
/// Deserializing goes through `Position::new`, so an off-board square is a parse error.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    pub rank: u8,
    pub file: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    rank: u8,
    file: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.rank, raw.file).ok_or_else(|| {
            format!("square (rank {}, file {}) is off the board", raw.rank, raw.file)
        })
    }
}

impl Position {
    pub fn new(rank: u8, file: u8) -> Option<Position> {
        if rank < 8 && file < 8 {
            Some(Position { rank, file })
        } else {
            None
        }
    }

    /// Fields are public, so a hand-built square may be anywhere
    pub fn is_on_board(&self) -> bool {
        self.rank < 8 && self.file < 8
    }

    /// The square `(rank_delta, file_delta)` away, if it is still on the board
    pub fn offset(&self, rank_delta: i8, file_delta: i8) -> Option<Position> {
        let rank = self.rank as i8 + rank_delta;
        let file = self.file as i8 + file_delta;
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Position {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    pub fn file_char(&self) -> char {
        b'a'.wrapping_add(self.file) as char
    }

    pub fn rank_char(&self) -> char {
        b'1'.wrapping_add(self.rank) as char
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    /// Light squares have an odd rank + file sum (a1 is dark)
    pub fn is_light_square(&self) -> bool {
        (self.rank + self.file) % 2 == 1
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Position { rank, file }))
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Position::new(rank, file).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    /// Set once the piece leaves its square for the first time. Only meaningful for
    /// kings and rooks, where it gates castling.
    pub ever_moved: bool,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType) -> Piece {
        Piece {
            color,
            piece_type,
            ever_moved: false,
        }
    }

    /// Parse a piece letter, uppercase for white and lowercase for black
    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, piece_type))
    }

    pub fn to_char(&self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn to_symbol(&self) -> &str {
        let is_white = self.color == Color::White;
        match (self.piece_type, is_white) {
            (PieceType::Pawn, true) => "♙",
            (PieceType::Pawn, false) => "♟︎",
            (PieceType::Knight, true) => "♘",
            (PieceType::Knight, false) => "♞",
            (PieceType::Bishop, true) => "♗",
            (PieceType::Bishop, false) => "♝",
            (PieceType::Rook, true) => "♖",
            (PieceType::Rook, false) => "♜",
            (PieceType::Queen, true) => "♕",
            (PieceType::Queen, false) => "♛",
            (PieceType::King, true) => "♔",
            (PieceType::King, false) => "♚",
        }
    }

    /// Kings and rooks carry their move history into the position signature
    pub fn tracks_ever_moved(&self) -> bool {
        matches!(self.piece_type, PieceType::King | PieceType::Rook)
    }
}
