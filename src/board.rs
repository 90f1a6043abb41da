use std::fmt;

use crate::types::*;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// The 8x8 grid, indexed `[rank][file]`.
///
/// Precondition for every rules query: each color has exactly one king on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting array
    pub fn new() -> Board {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            for (file, piece_type) in BACK_RANK.iter().enumerate() {
                board.squares[color.back_rank() as usize][file] =
                    Some(Piece::new(color, *piece_type));
                board.squares[color.pawn_starting_rank() as usize][file] =
                    Some(Piece::new(color, PieceType::Pawn));
            }
        }
        board
    }

    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.rank as usize][pos.file as usize]
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.piece_at(pos).is_none()
    }

    /// Replace the content of `pos`, returning what was there
    #[inline]
    pub(crate) fn set(&mut self, pos: Position, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.squares[pos.rank as usize][pos.file as usize], piece)
    }

    #[inline]
    pub(crate) fn take(&mut self, pos: Position) -> Option<Piece> {
        self.set(pos, None)
    }

    /// All occupied squares, rank by rank from a1
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.piece_at(pos).map(|p| (pos, p)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|(_, p)| p.piece_type == PieceType::King)
            .map(|(pos, _)| pos)
    }

    /// Parse the piece placement field of a FEN record. Kings and rooks are taken
    /// as unmoved when on their home squares and as moved otherwise.
    #[cfg(test)]
    pub(crate) fn from_placement(placement: &str) -> Board {
        let mut board = Board::empty();
        let mut rank = 7u8;
        let mut file = 0u8;
        for c in placement.chars() {
            if c == '/' {
                rank -= 1;
                file = 0;
            } else if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
            } else {
                let mut piece = Piece::from_char(c).expect("unexpected char in placement");
                let pos = Position { rank, file };
                let home = match piece.piece_type {
                    PieceType::King => pos.rank == piece.color.back_rank() && pos.file == 4,
                    PieceType::Rook => {
                        pos.rank == piece.color.back_rank() && (pos.file == 0 || pos.file == 7)
                    }
                    _ => true,
                };
                piece.ever_moved = !home;
                board.set(pos, Some(piece));
                file += 1;
            }
        }
        board
    }

    pub fn draw_board(&self) -> String {
        let mut res = String::new();
        for rank in (0..8).rev() {
            for file in 0..8 {
                match self.piece_at(Position { rank, file }) {
                    Some(p) => res.push_str(p.to_symbol()),
                    None => res.push('.'),
                }
                if file < 7 {
                    res.push(' ');
                }
            }
            res.push('\n');
        }
        res
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.draw_board())
    }
}
