use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    pub fn rook_home_file(&self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    pub fn rook_target_file(&self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    pub fn king_target_file(&self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// Files strictly between the king and the rook
    pub fn between_files(&self) -> &'static [u8] {
        match self {
            CastleSide::Kingside => &[5, 6],
            CastleSide::Queenside => &[1, 2, 3],
        }
    }

    /// Files the king crosses and lands on. Must not be attacked.
    pub fn king_path_files(&self) -> &'static [u8] {
        match self {
            CastleSide::Kingside => &[5, 6],
            CastleSide::Queenside => &[3, 2],
        }
    }

    pub fn from_king_target_file(file: u8) -> Option<CastleSide> {
        match file {
            6 => Some(CastleSide::Kingside),
            2 => Some(CastleSide::Queenside),
            _ => None,
        }
    }

    /// Side whose rook starts on `pos`, for a rook of `color`
    pub fn from_rook_home(pos: Position, color: Color) -> Option<CastleSide> {
        if pos.rank != color.back_rank() {
            return None;
        }
        match pos.file {
            7 => Some(CastleSide::Kingside),
            0 => Some(CastleSide::Queenside),
            _ => None,
        }
    }
}

/// Castling rights of one color. Rights only ever go from `true` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub kingside: bool,
    pub queenside: bool,
}

impl CastlingRights {
    pub const FULL: CastlingRights = CastlingRights {
        kingside: true,
        queenside: true,
    };
    pub const NONE: CastlingRights = CastlingRights {
        kingside: false,
        queenside: false,
    };

    pub fn get(&self, side: CastleSide) -> bool {
        match side {
            CastleSide::Kingside => self.kingside,
            CastleSide::Queenside => self.queenside,
        }
    }

    pub fn revoke(&mut self, side: CastleSide) {
        match side {
            CastleSide::Kingside => self.kingside = false,
            CastleSide::Queenside => self.queenside = false,
        }
    }

    pub fn revoke_all(&mut self) {
        *self = CastlingRights::NONE;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    /// Pawn advancing two squares from its starting rank
    DoublePawnPush,
    Castle(CastleSide),
    EnPassant,
}

/// A candidate move as produced by the move generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// The moving piece as it stood before the move
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
    /// Pawns reaching the last rank always become queens
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(piece: Piece, from: Position, to: Position, captured: Option<Piece>) -> Self {
        Self {
            piece,
            from,
            to,
            captured,
            kind: MoveKind::Normal,
            promotion: None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Square the captured piece stands on. Differs from `to` only for en passant.
    pub fn capture_square(&self) -> Position {
        match self.kind {
            MoveKind::EnPassant => Position {
                rank: self.from.rank,
                file: self.to.file,
            },
            _ => self.to,
        }
    }

    pub fn to_human(&self) -> String {
        let color = self.piece.color.to_human();
        if let MoveKind::Castle(side) = self.kind {
            return match side {
                CastleSide::Kingside => format!("{} castles kingside", color),
                CastleSide::Queenside => format!("{} castles queenside", color),
            };
        }
        let maybe_capture_str = match self.captured {
            Some(p) => format!(
                " capturing {} {} at {}",
                p.color.to_human(),
                p.piece_type.to_human(),
                self.capture_square()
            ),
            None => "".to_string(),
        };
        let maybe_promotion_str = match self.promotion {
            Some(p) => format!(" promoting to {}", p.to_human()),
            None => "".to_string(),
        };
        format!(
            "{} moves {} from {} to {}{}{}",
            color,
            self.piece.piece_type.to_human(),
            self.from,
            self.to,
            maybe_capture_str,
            maybe_promotion_str,
        )
    }
}

/// One entry of the append-only move log. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: Position,
    pub to: Position,
    pub color: Color,
    /// Kind of the mover before any promotion
    pub piece_type: PieceType,
    pub is_capture: bool,
    pub is_castle: bool,
    pub is_en_passant: bool,
    #[serde(default)]
    pub promoted_to: Option<PieceType>,
    #[serde(default)]
    pub captured: Option<PieceType>,
    /// The opponent is in check after this move
    pub gives_check: bool,
    #[serde(default)]
    pub is_checkmate: bool,
    /// Other same-kind same-color pieces that could also have reached `to`
    #[serde(default)]
    pub disambiguation: Vec<Position>,
}

impl MoveRecord {
    pub fn is_double_step(&self) -> bool {
        self.piece_type == PieceType::Pawn && self.from.rank.abs_diff(self.to.rank) == 2
    }

    /// The square a pawn skipped over, capturable en passant on the very next ply
    pub fn en_passant_target(&self) -> Option<Position> {
        if self.is_double_step() {
            Some(Position {
                rank: (self.from.rank + self.to.rank) / 2,
                file: self.from.file,
            })
        } else {
            None
        }
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        if self.is_castle {
            CastleSide::from_king_target_file(self.to.file)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn pawn_record(from: &str, to: &str) -> MoveRecord {
        MoveRecord {
            from: sq(from),
            to: sq(to),
            color: Color::White,
            piece_type: PieceType::Pawn,
            is_capture: false,
            is_castle: false,
            is_en_passant: false,
            promoted_to: None,
            captured: None,
            gives_check: false,
            is_checkmate: false,
            disambiguation: vec![],
        }
    }

    #[test]
    fn double_step_exposes_en_passant_target() {
        assert_eq!(pawn_record("e2", "e4").en_passant_target(), Some(sq("e3")));
        assert_eq!(pawn_record("d7", "d5").en_passant_target(), Some(sq("d6")));
        assert_eq!(pawn_record("e2", "e3").en_passant_target(), None);
    }

    #[test]
    fn en_passant_capture_square_is_beside_the_mover() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let victim = Piece::new(Color::Black, PieceType::Pawn);
        let mv = Move {
            kind: MoveKind::EnPassant,
            ..Move::new(pawn, sq("e5"), sq("d6"), Some(victim))
        };
        assert_eq!(mv.capture_square(), sq("d5"));
        assert_eq!(
            mv.to_human(),
            "white moves pawn from e5 to d6 capturing black pawn at d5"
        );
    }

    #[test]
    fn record_keys_are_camel_case() {
        let json = serde_json::to_value(pawn_record("e2", "e4")).unwrap();
        assert!(json.get("pieceType").is_some());
        assert!(json.get("givesCheck").is_some());
        assert_eq!(json["color"], "light");
    }
}
