use crate::board::Board;
use crate::game::GameState;
use crate::movegen::{DIAGONAL, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL};
use crate::types::*;

/// True if any piece of `by_color` attacks `square`.
///
/// Castling never attacks anything, so this looks outward from the square instead of
/// generating the attacker's moves, which also keeps castling generation from
/// recursing into itself. Pawns attack their forward diagonals whether or not
/// those squares are occupied.
pub fn is_square_attacked(board: &Board, square: Position, by_color: Color) -> bool {
    if !square.is_on_board() {
        return false;
    }
    let holds = |pos: Option<Position>, types: &[PieceType]| {
        pos.and_then(|p| board.piece_at(p))
            .is_some_and(|p| p.color == by_color && types.contains(&p.piece_type))
    };

    // a pawn attacking `square` stands one step behind it, from its own point of view
    let back = -by_color.pawn_direction();
    if holds(square.offset(back, -1), &[PieceType::Pawn])
        || holds(square.offset(back, 1), &[PieceType::Pawn])
    {
        return true;
    }

    if KNIGHT_OFFSETS
        .iter()
        .any(|(dr, df)| holds(square.offset(*dr, *df), &[PieceType::Knight]))
    {
        return true;
    }

    if KING_OFFSETS
        .iter()
        .any(|(dr, df)| holds(square.offset(*dr, *df), &[PieceType::King]))
    {
        return true;
    }

    let slider_hits = |directions: &[(i8, i8)], types: &[PieceType]| {
        directions.iter().any(|(dr, df)| {
            let mut current = square;
            while let Some(next) = current.offset(*dr, *df) {
                if let Some(piece) = board.piece_at(next) {
                    return piece.color == by_color && types.contains(&piece.piece_type);
                }
                current = next;
            }
            false
        })
    };

    slider_hits(&ORTHOGONAL, &[PieceType::Rook, PieceType::Queen])
        || slider_hits(&DIAGONAL, &[PieceType::Bishop, PieceType::Queen])
}

/// Is `color`'s king attacked. A board without that king is outside the engine's
/// preconditions and reports `false`.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_position(color) {
        Some(king) => is_square_attacked(board, king, color.other_color()),
        None => false,
    }
}

/// Neither side can force checkmate from this material, regardless of who is to move.
///
/// Drawn: K v K, K v K+N, K v K+B, K+B v K+B with same colored bishops, any number
/// of knights on either side and nothing else, K+N v K+B. Everything else,
/// including K+B+N v K and K+B+B v K with opposite colored bishops, is playable.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut minors: [Vec<(PieceType, Position)>; 2] = [Vec::new(), Vec::new()];
    for (pos, piece) in board.pieces() {
        match piece.piece_type {
            PieceType::King => {}
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            PieceType::Knight | PieceType::Bishop => {
                minors[piece.color.index()].push((piece.piece_type, pos))
            }
        }
    }
    let [white, black] = &minors;

    let only_knights =
        |side: &[(PieceType, Position)]| side.iter().all(|(t, _)| *t == PieceType::Knight);
    if only_knights(white) && only_knights(black) {
        // covers K v K, K v K+N and knights-only endings
        return true;
    }

    match (white.as_slice(), black.as_slice()) {
        ([], [_]) | ([_], []) => true,
        ([(PieceType::Bishop, a)], [(PieceType::Bishop, b)]) => {
            a.is_light_square() == b.is_light_square()
        }
        ([(PieceType::Knight, _)], [(PieceType::Bishop, _)])
        | ([(PieceType::Bishop, _)], [(PieceType::Knight, _)]) => true,
        _ => false,
    }
}

impl GameState {
    pub fn is_square_attacked(&self, square: Position, by_color: Color) -> bool {
        is_square_attacked(self.board(), square, by_color)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(self.board(), color)
    }

    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.move_generator().has_any_legal_move(color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// The current position has occurred three times, counting itself and the
    /// pre-game position
    pub fn is_threefold_repetition(&self) -> bool {
        self.occurrences(self.signature()) >= 3
    }

    pub fn is_insufficient_material(&self) -> bool {
        is_insufficient_material(self.board())
    }
}
