use crate::board::Board;
use crate::moves::*;
use crate::rules::{is_in_check, is_square_attacked};
use crate::types::*;

const MAX_MOVES_PER_PIECE: usize = 27;

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub(crate) const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
pub(crate) const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Outcome of probing a single target square
enum PotentialMove {
    Valid(Option<Piece>),
    Invalid,
}

impl PotentialMove {
    fn continue_search_in_direction(&self) -> bool {
        matches!(self, PotentialMove::Valid(None))
    }
}

/// Generates moves for one position. The castling rights and en passant target
/// come from the game state, everything else is read off the board.
pub struct MoveGenerator<'a> {
    board: &'a Board,
    castling: [CastlingRights; 2],
    en_passant: Option<Position>,
    moves: Vec<Move>,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(
        board: &'a Board,
        castling: [CastlingRights; 2],
        en_passant: Option<Position>,
    ) -> Self {
        Self {
            board,
            castling,
            en_passant,
            moves: Vec::with_capacity(MAX_MOVES_PER_PIECE),
        }
    }

    /// Moves obeying piece geometry and occupancy, not yet checked against leaving
    /// the mover's own king attacked. Empty if `from` holds no piece.
    pub fn pseudo_legal_moves(&mut self, from: Position) -> Vec<Move> {
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        match piece.piece_type {
            PieceType::Pawn => self.generate_pawn_moves(from, piece),
            PieceType::Knight => self.generate_step_moves(from, piece, &KNIGHT_OFFSETS),
            PieceType::Bishop => self.generate_slider_moves(from, piece, &DIAGONAL),
            PieceType::Rook => self.generate_slider_moves(from, piece, &ORTHOGONAL),
            PieceType::Queen => {
                self.generate_slider_moves(from, piece, &ORTHOGONAL);
                self.generate_slider_moves(from, piece, &DIAGONAL);
            }
            PieceType::King => {
                self.generate_step_moves(from, piece, &KING_OFFSETS);
                self.generate_castling_moves(from, piece);
            }
        }
        std::mem::take(&mut self.moves)
    }

    /// Pseudo-legal moves from `from` that do not leave the mover's king in check
    pub fn legal_moves(&mut self, from: Position) -> Vec<Move> {
        let candidates = self.pseudo_legal_moves(from);
        if candidates.is_empty() {
            return candidates;
        }
        let mut trial = *self.board;
        let legal: Vec<Move> = candidates
            .into_iter()
            .filter(|m| !leaves_king_in_check(&mut trial, m))
            .collect();
        debug_assert_eq!(&trial, self.board, "trial board was not fully restored");
        legal
    }

    pub fn all_legal_moves(&mut self, color: Color) -> Vec<Move> {
        let origins: Vec<Position> = self.board.pieces_of(color).map(|(pos, _)| pos).collect();
        origins
            .into_iter()
            .flat_map(|pos| self.legal_moves(pos))
            .collect()
    }

    /// Short-circuits on the first piece with a legal move
    pub fn has_any_legal_move(&mut self, color: Color) -> bool {
        let origins: Vec<Position> = self.board.pieces_of(color).map(|(pos, _)| pos).collect();
        origins.into_iter().any(|pos| !self.legal_moves(pos).is_empty())
    }

    fn probe(&self, piece: Piece, to: Position) -> PotentialMove {
        match self.board.piece_at(to) {
            None => PotentialMove::Valid(None),
            Some(other) if other.color != piece.color => PotentialMove::Valid(Some(other)),
            Some(_) => PotentialMove::Invalid,
        }
    }

    /// Knight and non-castling king moves
    fn generate_step_moves(&mut self, from: Position, piece: Piece, offsets: &[(i8, i8)]) {
        for (dr, df) in offsets {
            let Some(to) = from.offset(*dr, *df) else {
                continue;
            };
            if let PotentialMove::Valid(captured) = self.probe(piece, to) {
                self.moves.push(Move::new(piece, from, to, captured));
            }
        }
    }

    fn generate_slider_moves(&mut self, from: Position, piece: Piece, directions: &[(i8, i8)]) {
        for (dr, df) in directions {
            let mut current = from;
            while let Some(to) = current.offset(*dr, *df) {
                let potential = self.probe(piece, to);
                if let PotentialMove::Valid(captured) = potential {
                    self.moves.push(Move::new(piece, from, to, captured));
                }
                if !potential.continue_search_in_direction() {
                    break;
                }
                current = to;
            }
        }
    }

    fn push_pawn_move(&mut self, mv: Move) {
        if mv.to.rank == mv.piece.color.promotion_rank() {
            self.moves.push(Move {
                promotion: Some(PieceType::Queen),
                ..mv
            });
        } else {
            self.moves.push(mv);
        }
    }

    fn generate_pawn_moves(&mut self, from: Position, piece: Piece) {
        let dir = piece.color.pawn_direction();

        if let Some(one) = from.offset(dir, 0) {
            if self.board.is_empty(one) {
                self.push_pawn_move(Move::new(piece, from, one, None));

                if from.rank == piece.color.pawn_starting_rank() {
                    if let Some(two) = one.offset(dir, 0) {
                        if self.board.is_empty(two) {
                            self.moves.push(Move {
                                kind: MoveKind::DoublePawnPush,
                                ..Move::new(piece, from, two, None)
                            });
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(dir, df) else {
                continue;
            };
            match self.board.piece_at(to) {
                Some(target) if target.color != piece.color => {
                    self.push_pawn_move(Move::new(piece, from, to, Some(target)));
                }
                None if self.en_passant == Some(to) => {
                    let victim_square = Position {
                        rank: from.rank,
                        file: to.file,
                    };
                    if let Some(victim) = self.board.piece_at(victim_square) {
                        if victim.piece_type == PieceType::Pawn && victim.color != piece.color {
                            self.moves.push(Move {
                                kind: MoveKind::EnPassant,
                                ..Move::new(piece, from, to, Some(victim))
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn generate_castling_moves(&mut self, from: Position, king: Piece) {
        let back_rank = king.color.back_rank();
        if king.ever_moved || from != (Position { rank: back_rank, file: 4 }) {
            return;
        }
        let opponent = king.color.other_color();
        // Can't castle while in check
        if is_square_attacked(self.board, from, opponent) {
            return;
        }

        let rights = self.castling[king.color.index()];
        for side in CastleSide::BOTH {
            if !rights.get(side) {
                continue;
            }
            let rook_square = Position {
                rank: back_rank,
                file: side.rook_home_file(),
            };
            let rook_ready = self.board.piece_at(rook_square).is_some_and(|rook| {
                rook.piece_type == PieceType::Rook && rook.color == king.color && !rook.ever_moved
            });
            if !rook_ready {
                continue;
            }
            let path_clear = side.between_files().iter().all(|file| {
                self.board.is_empty(Position {
                    rank: back_rank,
                    file: *file,
                })
            });
            if !path_clear {
                continue;
            }
            let path_safe = side.king_path_files().iter().all(|file| {
                !is_square_attacked(
                    self.board,
                    Position {
                        rank: back_rank,
                        file: *file,
                    },
                    opponent,
                )
            });
            if path_safe {
                let to = Position {
                    rank: back_rank,
                    file: side.king_target_file(),
                };
                self.moves.push(Move {
                    kind: MoveKind::Castle(side),
                    ..Move::new(king, from, to, None)
                });
            }
        }
    }
}

/// Everything `unmake_trial` needs to put the board back exactly as it was
struct TrialUndo {
    captured: Option<(Position, Piece)>,
    rook: Option<(Position, Position, Piece)>,
}

/// Play `mv` on the trial board. The returned undo record restores every touched
/// square, including the mover's original `ever_moved` flag.
fn make_trial(board: &mut Board, mv: &Move) -> TrialUndo {
    board.take(mv.from);
    let captured = if mv.is_capture() {
        let square = mv.capture_square();
        board.take(square).map(|p| (square, p))
    } else {
        None
    };
    board.set(
        mv.to,
        Some(Piece {
            piece_type: mv.promotion.unwrap_or(mv.piece.piece_type),
            ever_moved: true,
            ..mv.piece
        }),
    );
    let rook = if let MoveKind::Castle(side) = mv.kind {
        let home = Position {
            rank: mv.from.rank,
            file: side.rook_home_file(),
        };
        let target = Position {
            rank: mv.from.rank,
            file: side.rook_target_file(),
        };
        board.take(home).map(|rook| {
            board.set(
                target,
                Some(Piece {
                    ever_moved: true,
                    ..rook
                }),
            );
            (home, target, rook)
        })
    } else {
        None
    };
    TrialUndo { captured, rook }
}

fn unmake_trial(board: &mut Board, mv: &Move, undo: TrialUndo) {
    if let Some((home, target, rook)) = undo.rook {
        board.take(target);
        board.set(home, Some(rook));
    }
    board.take(mv.to);
    board.set(mv.from, Some(mv.piece));
    if let Some((square, piece)) = undo.captured {
        board.set(square, Some(piece));
    }
}

/// Simulate, test and restore
fn leaves_king_in_check(trial: &mut Board, mv: &Move) -> bool {
    let undo = make_trial(trial, mv);
    let in_check = is_in_check(trial, mv.piece.color);
    unmake_trial(trial, mv, undo);
    in_check
}
