use chrono::prelude::*;
use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{ChessError, Result};
use crate::events::GameEvent;
use crate::movegen::MoveGenerator;
use crate::moves::*;
use crate::rules::{is_in_check, is_insufficient_material};
use crate::types::*;
use crate::zobrist::PositionSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Repetition,
    InsufficientMaterial,
    Timeout { winner: Color },
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        *self != GameResult::InProgress
    }

    /// `None` for draws and unfinished games
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameResult::Checkmate { winner } | GameResult::Timeout { winner } => Some(*winner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::InProgress => "in-progress",
            GameResult::Checkmate { .. } => "checkmate",
            GameResult::Stalemate => "stalemate",
            GameResult::Repetition => "repetition",
            GameResult::InsufficientMaterial => "insufficient-material",
            GameResult::Timeout { .. } => "timeout",
        }
    }

    /// PGN result token
    pub fn to_score(&self) -> &'static str {
        match (self.is_over(), self.winner()) {
            (false, _) => "*",
            (true, Some(Color::White)) => "1-0",
            (true, Some(Color::Black)) => "0-1",
            (true, None) => "1/2-1/2",
        }
    }
}

impl Serialize for GameResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The single mutable source of truth for one game. Every write goes through
/// `apply`/`play`, `flag_fell`, the clock setters or `reset`.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    active_color: Color,
    castling: [CastlingRights; 2],
    history: Vec<MoveRecord>,
    /// One entry per ply, starting with the pre-game position
    signatures: Vec<PositionSignature>,
    /// Pieces taken by each color, queen first
    captured: [Vec<PieceType>; 2],
    result: GameResult,
    clocks_ms: [u64; 2],
    started_at: DateTime<Local>,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let board = Board::new();
        let castling = [CastlingRights::FULL; 2];
        let signature = PositionSignature::compute(&board, Color::White, &castling, None);
        Self {
            config,
            board,
            active_color: Color::White,
            castling,
            history: Vec::new(),
            signatures: vec![signature],
            captured: [Vec::new(), Vec::new()],
            result: GameResult::InProgress,
            clocks_ms: [config.initial_clock_ms; 2],
            started_at: Local::now(),
            events: Vec::new(),
        }
    }

    /// Game from an arbitrary board. Castling rights are granted wherever the king
    /// and rook are still unmoved on their home squares.
    #[cfg(test)]
    pub(crate) fn from_board(board: Board, active_color: Color) -> Self {
        let mut castling = [CastlingRights::NONE; 2];
        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            let unmoved = |file: u8, piece_type: PieceType| {
                board.piece_at(Position { rank, file }).is_some_and(|p| {
                    p.color == color && p.piece_type == piece_type && !p.ever_moved
                })
            };
            if unmoved(4, PieceType::King) {
                castling[color.index()] = CastlingRights {
                    kingside: unmoved(7, PieceType::Rook),
                    queenside: unmoved(0, PieceType::Rook),
                };
            }
        }
        let signature = PositionSignature::compute(&board, active_color, &castling, None);
        Self {
            board,
            active_color,
            castling,
            signatures: vec![signature],
            ..Self::new()
        }
    }

    /// Discard everything and go back to the starting position with the configured clocks
    pub fn reset(&mut self) {
        let events = std::mem::take(&mut self.events);
        *self = Self::with_config(self.config);
        self.events = events;
        self.events.push(GameEvent::GameReset);
        info!("game reset");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn castling_rights(&self, color: Color) -> CastlingRights {
        self.castling[color.index()]
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn signatures(&self) -> &[PositionSignature] {
        &self.signatures
    }

    /// Pieces captured by `color`, ordered queen, rook, bishop, knight, pawn
    pub fn captured_by(&self, color: Color) -> &[PieceType] {
        &self.captured[color.index()]
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_game_over(&self) -> bool {
        self.result.is_over()
    }

    pub fn clock_ms(&self, color: Color) -> u64 {
        self.clocks_ms[color.index()]
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Only open on the ply right after a double step
    pub fn en_passant_target(&self) -> Option<Position> {
        self.last_move().and_then(MoveRecord::en_passant_target)
    }

    pub fn signature(&self) -> PositionSignature {
        PositionSignature::compute(
            &self.board,
            self.active_color,
            &self.castling,
            self.en_passant_target(),
        )
    }

    /// How many times `signature` appears in the signature history
    pub fn occurrences(&self, signature: PositionSignature) -> usize {
        self.signatures.iter().filter(|s| **s == signature).count()
    }

    pub(crate) fn move_generator(&self) -> MoveGenerator<'_> {
        MoveGenerator::new(&self.board, self.castling, self.en_passant_target())
    }

    /// Legal moves of the piece on `square`. Empty if the square is off the board,
    /// empty, holds a piece of the side not to move, or the game is over.
    pub fn legal_moves(&self, square: Position) -> Vec<Move> {
        if self.is_game_over() || !square.is_on_board() {
            return Vec::new();
        }
        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.active_color => {
                self.move_generator().legal_moves(square)
            }
            _ => Vec::new(),
        }
    }

    /// Every legal move of the side to move
    pub fn all_legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.move_generator().all_legal_moves(self.active_color)
    }

    /// Execute a move taken from `legal_moves`. Anything not in the current legal set
    /// is rejected with `IllegalMove` and leaves the state untouched.
    pub fn apply(&mut self, mv: &Move) -> Result<MoveRecord> {
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }
        if !self.legal_moves(mv.from).contains(mv) {
            return Err(ChessError::IllegalMove {
                from: mv.from,
                to: mv.to,
            });
        }
        Ok(self.execute(*mv))
    }

    /// Execute the legal move from `from` to `to`
    pub fn play(&mut self, from: Position, to: Position) -> Result<MoveRecord> {
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }
        let mv = self
            .legal_moves(from)
            .into_iter()
            .find(|m| m.to == to)
            .ok_or(ChessError::IllegalMove { from, to })?;
        Ok(self.execute(mv))
    }

    /// `play` with coordinate text such as `e2e4`
    pub fn play_coordinates(&mut self, coordinates: &str) -> Result<MoveRecord> {
        let (from, to) = match (coordinates.get(0..2), coordinates.get(2..)) {
            (Some(from), Some(to)) => (from.parse()?, to.parse()?),
            _ => return Err(ChessError::InvalidSquare(coordinates.to_string())),
        };
        self.play(from, to)
    }

    /// Other pieces of the mover's kind and color that could also reach `mv.to`
    fn disambiguation_for(&self, mv: &Move) -> Vec<Position> {
        let mut generator = self.move_generator();
        self.board
            .pieces_of(mv.piece.color)
            .filter(|(pos, p)| *pos != mv.from && p.piece_type == mv.piece.piece_type)
            .map(|(pos, _)| pos)
            .collect::<Vec<_>>()
            .into_iter()
            .filter(|pos| generator.legal_moves(*pos).iter().any(|m| m.to == mv.to))
            .collect()
    }

    fn update_castling_rights(&mut self, mv: &Move) {
        let color = mv.piece.color;
        match mv.piece.piece_type {
            PieceType::King => self.castling[color.index()].revoke_all(),
            PieceType::Rook => {
                if let Some(side) = CastleSide::from_rook_home(mv.from, color) {
                    self.castling[color.index()].revoke(side);
                }
            }
            _ => {}
        }
        if let Some(captured) = mv.captured {
            if captured.piece_type == PieceType::Rook {
                let home = CastleSide::from_rook_home(mv.capture_square(), captured.color);
                if let Some(side) = home {
                    self.castling[captured.color.index()].revoke(side);
                }
            }
        }
    }

    /// Apply a move known to be legal and settle the game result
    pub(crate) fn execute(&mut self, mv: Move) -> MoveRecord {
        let mover = mv.piece;
        let opponent = mover.color.other_color();
        let disambiguation = self.disambiguation_for(&mv);

        self.board.take(mv.from);
        let captured = if mv.is_capture() {
            self.board.take(mv.capture_square())
        } else {
            None
        };
        self.board.set(
            mv.to,
            Some(Piece {
                piece_type: mv.promotion.unwrap_or(mover.piece_type),
                ever_moved: true,
                ..mover
            }),
        );
        if let MoveKind::Castle(side) = mv.kind {
            let rank = mover.color.back_rank();
            let rook = self.board.take(Position {
                rank,
                file: side.rook_home_file(),
            });
            self.board.set(
                Position {
                    rank,
                    file: side.rook_target_file(),
                },
                rook.map(|r| Piece { ever_moved: true, ..r }),
            );
        }

        self.update_castling_rights(&mv);

        if let Some(piece) = captured {
            let list = &mut self.captured[mover.color.index()];
            list.push(piece.piece_type);
            list.sort_by_key(PieceType::capture_order);
        }

        let gives_check = is_in_check(&self.board, opponent);
        let mut record = MoveRecord {
            from: mv.from,
            to: mv.to,
            color: mover.color,
            piece_type: mover.piece_type,
            is_capture: captured.is_some(),
            is_castle: matches!(mv.kind, MoveKind::Castle(_)),
            is_en_passant: mv.kind == MoveKind::EnPassant,
            promoted_to: mv.promotion,
            captured: captured.map(|p| p.piece_type),
            gives_check,
            is_checkmate: false,
            disambiguation,
        };
        // the en passant window of the reply is read off the newest record
        self.history.push(record.clone());
        self.active_color = opponent;

        let signature = self.signature();
        self.result = if self.is_checkmate(opponent) {
            GameResult::Checkmate { winner: mover.color }
        } else if self.occurrences(signature) >= 2 {
            // this is the third time the position is on the board
            GameResult::Repetition
        } else if self.is_stalemate(opponent) {
            GameResult::Stalemate
        } else if is_insufficient_material(&self.board) {
            GameResult::InsufficientMaterial
        } else {
            GameResult::InProgress
        };
        self.signatures.push(signature);

        record.is_checkmate = matches!(self.result, GameResult::Checkmate { .. });
        if let Some(last) = self.history.last_mut() {
            last.is_checkmate = record.is_checkmate;
        }

        debug!(
            "ply {}: {} ({})",
            self.history.len(),
            mv.to_human(),
            record.to_san()
        );

        self.events.push(GameEvent::MoveApplied {
            record: record.clone(),
            active_color: self.active_color,
            is_check: gives_check,
        });
        self.events.push(GameEvent::TurnChanged {
            active_color: self.active_color,
        });
        if self.result.is_over() {
            self.announce_result();
        }
        record
    }

    fn announce_result(&mut self) {
        info!(
            "game over after {} plies: {} ({})",
            self.history.len(),
            self.result.as_str(),
            self.result.to_score()
        );
        self.events.push(GameEvent::GameEnded {
            result: self.result,
            winner: self.result.winner(),
        });
    }

    /// The external clock ran out for `color`. A loss for that side unless the
    /// material left on the board cannot mate, which draws.
    pub fn flag_fell(&mut self, color: Color) -> Result<GameResult> {
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }
        self.clocks_ms[color.index()] = 0;
        self.result = if is_insufficient_material(&self.board) {
            GameResult::InsufficientMaterial
        } else {
            GameResult::Timeout {
                winner: color.other_color(),
            }
        };
        self.announce_result();
        Ok(self.result)
    }

    /// Edit a clock before the first move
    pub fn set_clock(&mut self, color: Color, remaining_ms: u64) -> Result<()> {
        if !self.history.is_empty() || self.is_game_over() {
            return Err(ChessError::ClockLocked);
        }
        self.clocks_ms[color.index()] = remaining_ms;
        Ok(())
    }

    /// Record the remaining time reported by the external timer
    pub fn update_clock(&mut self, color: Color, remaining_ms: u64) {
        self.clocks_ms[color.index()] = remaining_ms;
    }

    pub(crate) fn restore_clocks(&mut self, light_ms: u64, dark_ms: u64) {
        self.clocks_ms = [light_ms, dark_ms];
    }

    /// Hand the queued notifications to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
