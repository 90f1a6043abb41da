use itertools::Itertools;

use crate::game::GameState;
use crate::moves::{CastleSide, MoveRecord};
use crate::types::{Color, PieceType};

impl MoveRecord {
    /// Minimal origin hint telling the mover apart from the other pieces in
    /// `disambiguation`: nothing, the file, the rank, or both.
    pub fn disambiguator(&self) -> String {
        let others = &self.disambiguation;
        if others.is_empty() {
            String::new()
        } else if others.iter().all(|p| p.file != self.from.file) {
            self.from.file_char().to_string()
        } else if others.iter().all(|p| p.rank != self.from.rank) {
            self.from.rank_char().to_string()
        } else {
            self.from.to_algebraic()
        }
    }

    /// Standard algebraic notation, e.g. `Nbd7`, `exd6`, `a8=Q+`, `O-O`, `Qh4#`
    pub fn to_san(&self) -> String {
        let mut san = match self.castle_side() {
            Some(CastleSide::Kingside) => "O-O".to_string(),
            Some(CastleSide::Queenside) => "O-O-O".to_string(),
            None => {
                let mut san = String::new();
                if self.piece_type == PieceType::Pawn {
                    if self.is_capture {
                        san.push(self.from.file_char());
                    }
                } else {
                    san.push(self.piece_type.to_char());
                    san.push_str(&self.disambiguator());
                }
                if self.is_capture {
                    san.push('x');
                }
                san.push_str(&self.to.to_algebraic());
                if let Some(promoted) = self.promoted_to {
                    san.push('=');
                    san.push(promoted.to_char());
                }
                san
            }
        };
        if self.is_checkmate {
            san.push('#');
        } else if self.gives_check {
            san.push('+');
        }
        san
    }
}

impl GameState {
    /// SAN of every ply played so far
    pub fn notation_history(&self) -> Vec<String> {
        self.history().iter().map(MoveRecord::to_san).collect()
    }

    /// Numbered move text: `1. f3 e5 2. g4 Qh4#`
    pub fn move_text(&self) -> String {
        self.history()
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| {
                format!(
                    "{}. {}",
                    i + 1,
                    pair.iter().map(MoveRecord::to_san).join(" ")
                )
            })
            .join(" ")
    }

    pub fn to_pgn(&self) -> String {
        let score = self.result().to_score();
        let mut pgn = String::new();
        pgn.push_str("[Event \"Casual game\"]\n");
        pgn.push_str(format!("[Date \"{}\"]\n", self.started_at().format("%Y.%m.%d")).as_str());
        pgn.push_str(format!("[White \"{}\"]\n", Color::White.to_wire()).as_str());
        pgn.push_str(format!("[Black \"{}\"]\n", Color::Black.to_wire()).as_str());
        pgn.push_str(format!("[Result \"{}\"]\n", score).as_str());
        if self.is_game_over() {
            pgn.push_str(format!("[Termination \"{}\"]\n", self.result().as_str()).as_str());
        }
        pgn.push('\n');
        let text = self.move_text();
        if !text.is_empty() {
            pgn.push_str(&text);
            pgn.push(' ');
        }
        pgn.push_str(score);
        pgn
    }
}
