//! Peer synchronization through a minimal move log.
//!
//! A peer never receives a board. It receives the move log plus clocks and rebuilds
//! everything else by replaying the log from the starting position, so a replayed
//! game is indistinguishable from the live one.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{ChessError, Result};
use crate::events::GameEvent;
use crate::game::{GameResult, GameState};
use crate::moves::MoveRecord;
use crate::types::Color;

const RESULT_NAMES: [&str; 6] = [
    "in-progress",
    "checkmate",
    "stalemate",
    "repetition",
    "insufficient-material",
    "timeout",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub move_history: Vec<MoveRecord>,
    pub active_color: Color,
    pub light_clock_ms: u64,
    pub dark_clock_ms: u64,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub result: Option<String>,
}

impl SyncPayload {
    /// Parse and validate a payload. Missing required fields, malformed JSON and
    /// unknown result names all fail with `InvalidState`.
    pub fn from_json(json: &str) -> Result<SyncPayload> {
        let payload: SyncPayload =
            serde_json::from_str(json).map_err(|e| ChessError::InvalidState(e.to_string()))?;
        if let Some(result) = &payload.result {
            if !RESULT_NAMES.contains(&result.as_str()) {
                return Err(ChessError::InvalidState(format!("unknown result `{}`", result)));
            }
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ChessError::InvalidState(e.to_string()))
    }

    fn says_timeout(&self) -> bool {
        self.result.as_deref() == Some("timeout")
    }

    /// The side whose clock ran out: the one at zero, else the side to move
    fn flagged_color(&self) -> Color {
        match (self.light_clock_ms, self.dark_clock_ms) {
            (0, dark) if dark > 0 => Color::White,
            (light, 0) if light > 0 => Color::Black,
            _ => self.active_color,
        }
    }
}

impl GameState {
    pub fn to_payload(&self) -> SyncPayload {
        let result = self.result();
        SyncPayload {
            move_history: self.history().to_vec(),
            active_color: self.active_color(),
            light_clock_ms: self.clock_ms(Color::White),
            dark_clock_ms: self.clock_ms(Color::Black),
            game_over: result.is_over(),
            result: result.is_over().then(|| result.as_str().to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        self.to_payload().to_json()
    }

    /// Rebuild a game from a payload by re-applying every logged move to a fresh
    /// starting position. Each step must be legal where it is replayed and the side
    /// to move at the end must match the payload.
    ///
    /// The returned game only carries a `TurnChanged` event and, if finished, a
    /// `GameEnded` event; the per-move events of the replay are dropped.
    pub fn replay(payload: &SyncPayload, config: GameConfig) -> Result<GameState> {
        let mut game = GameState::with_config(config);
        for (ply, record) in payload.move_history.iter().enumerate() {
            if record.color != game.active_color() {
                return Err(ChessError::InvalidState(format!(
                    "ply {} was logged for {} but {} is to move",
                    ply + 1,
                    record.color.to_human(),
                    game.active_color().to_human()
                )));
            }
            let mv = game
                .legal_moves(record.from)
                .into_iter()
                .find(|m| m.to == record.to && m.piece.piece_type == record.piece_type)
                .ok_or_else(|| {
                    ChessError::InvalidState(format!(
                        "ply {} ({}{}) does not replay",
                        ply + 1,
                        record.from,
                        record.to
                    ))
                })?;
            game.execute(mv);
        }

        if game.active_color() != payload.active_color {
            return Err(ChessError::InvalidState(format!(
                "log leaves {} to move but payload says {}",
                game.active_color().to_human(),
                payload.active_color.to_human()
            )));
        }

        if payload.says_timeout() && !game.is_game_over() {
            game.flag_fell(payload.flagged_color())?;
        }
        if payload.game_over != game.is_game_over() {
            warn!(
                "payload reports game over = {} but the replayed log says {}",
                payload.game_over,
                game.result().as_str()
            );
        }
        game.restore_clocks(payload.light_clock_ms, payload.dark_clock_ms);

        game.clear_events();
        game.push_event(GameEvent::TurnChanged {
            active_color: game.active_color(),
        });
        if game.is_game_over() {
            let result = game.result();
            game.push_event(GameEvent::GameEnded {
                result,
                winner: result.winner(),
            });
        }
        debug!(
            "replayed {} plies, signature {}",
            game.history().len(),
            game.signature()
        );
        Ok(game)
    }

    /// Replace this game with the one described by a peer's JSON payload. The most
    /// recently received payload wins; a rejected payload leaves the game as it was.
    pub fn apply_remote(&mut self, json: &str) -> Result<()> {
        let replayed =
            SyncPayload::from_json(json).and_then(|p| GameState::replay(&p, *self.config()));
        match replayed {
            Ok(game) => {
                info!(
                    "synchronized to remote state: {} plies, {} to move",
                    game.history().len(),
                    game.active_color().to_human()
                );
                *self = game;
                Ok(())
            }
            Err(e) => {
                warn!("rejected remote state: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn play_all(game: &mut GameState, moves: &[&str]) {
        for m in moves {
            game.play_coordinates(m).unwrap();
        }
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4"]);
        let json: serde_json::Value = serde_json::from_str(&game.to_json().unwrap()).unwrap();
        assert_eq!(json["activeColor"], "dark");
        assert_eq!(json["lightClockMs"], 600_000);
        assert_eq!(json["darkClockMs"], 600_000);
        assert_eq!(json["gameOver"], false);
        assert!(json["result"].is_null());
        assert_eq!(json["moveHistory"].as_array().unwrap().len(), 1);
        assert_eq!(json["moveHistory"][0]["from"]["file"], 4);
    }

    #[test]
    fn replay_matches_live_game() {
        let mut game = GameState::new();
        play_all(
            &mut game,
            &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "d2d4", "c7c6", "g1f3", "c8g4"],
        );
        game.update_clock(Color::White, 512_000);
        let replayed = GameState::replay(&game.to_payload(), GameConfig::default()).unwrap();
        assert_eq!(replayed.signature(), game.signature());
        assert_eq!(replayed.signatures(), game.signatures());
        assert_eq!(replayed.board(), game.board());
        assert_eq!(replayed.history(), game.history());
        assert_eq!(replayed.captured_by(Color::White), game.captured_by(Color::White));
        assert_eq!(replayed.captured_by(Color::Black), game.captured_by(Color::Black));
        assert_eq!(replayed.castling_rights(Color::White), game.castling_rights(Color::White));
        assert_eq!(replayed.clock_ms(Color::White), 512_000);
    }

    #[test]
    fn replay_emits_only_summary_events() {
        let mut game = GameState::new();
        play_all(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let mut replayed = GameState::replay(&game.to_payload(), GameConfig::default()).unwrap();
        assert_eq!(
            replayed.drain_events(),
            vec![
                GameEvent::TurnChanged {
                    active_color: Color::White
                },
                GameEvent::GameEnded {
                    result: GameResult::Checkmate { winner: Color::Black },
                    winner: Some(Color::Black),
                },
            ]
        );
    }

    #[test]
    fn missing_required_fields_are_invalid_state() {
        let json = r#"{"moveHistory": [], "activeColor": "light", "lightClockMs": 1000}"#;
        assert!(matches!(SyncPayload::from_json(json), Err(ChessError::InvalidState(_))));
        let json = r#"{"activeColor": "light", "lightClockMs": 1000, "darkClockMs": 1000}"#;
        assert!(matches!(SyncPayload::from_json(json), Err(ChessError::InvalidState(_))));
        assert!(matches!(SyncPayload::from_json("not json"), Err(ChessError::InvalidState(_))));
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{
            "moveHistory": [], "activeColor": "light", "lightClockMs": 1000, "darkClockMs": 2000
        }"#;
        let payload = SyncPayload::from_json(json).unwrap();
        assert!(!payload.game_over);
        assert_eq!(payload.result, None);
        let game = GameState::replay(&payload, GameConfig::default()).unwrap();
        assert_eq!(game.clock_ms(Color::Black), 2000);
    }

    #[test]
    fn unknown_result_name_is_rejected() {
        let json = r#"{
            "moveHistory": [], "activeColor": "light", "lightClockMs": 1, "darkClockMs": 1,
            "result": "resigned"
        }"#;
        assert!(matches!(SyncPayload::from_json(json), Err(ChessError::InvalidState(_))));
    }

    #[test]
    fn mismatched_active_color_is_rejected() {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4"]);
        let mut payload = game.to_payload();
        payload.active_color = Color::White;
        assert!(matches!(
            GameState::replay(&payload, GameConfig::default()),
            Err(ChessError::InvalidState(_))
        ));
    }

    #[test]
    fn illegal_log_entry_is_rejected() {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4", "e7e5"]);
        let mut payload = game.to_payload();
        payload.move_history[1].to = "e4".parse().unwrap();
        assert!(matches!(
            GameState::replay(&payload, GameConfig::default()),
            Err(ChessError::InvalidState(_))
        ));
    }

    #[test]
    fn rejected_remote_state_keeps_local_game() {
        let mut game = GameState::new();
        play_all(&mut game, &["d2d4", "d7d5"]);
        let before = game.signature();
        let err = game.apply_remote(r#"{"moveHistory": []}"#);
        assert!(matches!(err, Err(ChessError::InvalidState(_))));
        assert_eq!(game.signature(), before);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn remote_state_replaces_local_game() {
        let mut remote = GameState::new();
        play_all(&mut remote, &["c2c4", "e7e5", "b1c3"]);
        let json = remote.to_json().unwrap();

        let mut local = GameState::new();
        play_all(&mut local, &["e2e4"]);
        local.apply_remote(&json).unwrap();
        assert_eq!(local.signature(), remote.signature());
        assert_eq!(local.active_color(), Color::Black);
        assert_eq!(local.history().len(), 3);
    }

    #[test]
    fn timeout_result_is_restored() {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4", "e7e5"]);
        game.flag_fell(Color::White).unwrap();
        let payload = game.to_payload();
        assert_eq!(payload.result.as_deref(), Some("timeout"));
        let replayed = GameState::replay(&payload, GameConfig::default()).unwrap();
        assert_eq!(replayed.result(), GameResult::Timeout { winner: Color::Black });
        assert_eq!(replayed.clock_ms(Color::White), 0);
    }

    #[test]
    fn timeout_of_side_not_to_move_is_restored() {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4", "e7e5"]);
        // white is to move but black's flag falls
        game.flag_fell(Color::Black).unwrap();
        assert_eq!(game.result(), GameResult::Timeout { winner: Color::White });
        let replayed = GameState::replay(&game.to_payload(), GameConfig::default()).unwrap();
        assert_eq!(replayed.result(), game.result());
        assert_eq!(replayed.clock_ms(Color::Black), 0);
        assert_eq!(replayed.clock_ms(Color::White), 600_000);
    }

    /// JSON of a short game with one field overwritten by `edit`
    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut game = GameState::new();
        play_all(&mut game, &["e2e4", "e7e5"]);
        let mut json: serde_json::Value = serde_json::to_value(game.to_payload()).unwrap();
        edit(&mut json);
        json.to_string()
    }

    fn assert_rejected(json: &str) {
        let mut local = GameState::new();
        play_all(&mut local, &["d2d4"]);
        let before = local.signature();
        assert!(matches!(local.apply_remote(json), Err(ChessError::InvalidState(_))), "{json}");
        assert_eq!(local.signature(), before);
        assert_eq!(local.history().len(), 1);
        assert_eq!(local.active_color(), Color::Black);
    }

    #[test]
    fn off_board_square_is_invalid_state() {
        assert_rejected(&tampered(|j| j["moveHistory"][0]["from"]["rank"] = 9.into()));
        assert_rejected(&tampered(|j| j["moveHistory"][1]["to"]["file"] = 8.into()));
        assert_rejected(&tampered(|j| j["moveHistory"][0]["from"]["file"] = (-1).into()));
    }

    #[test]
    fn unknown_names_are_invalid_state() {
        assert_rejected(&tampered(|j| j["moveHistory"][0]["pieceType"] = "wizard".into()));
        assert_rejected(&tampered(|j| j["moveHistory"][0]["color"] = "white".into()));
        assert_rejected(&tampered(|j| j["activeColor"] = "blue".into()));
    }

    #[test]
    fn badly_typed_clocks_are_invalid_state() {
        assert_rejected(&tampered(|j| j["lightClockMs"] = (-5).into()));
        assert_rejected(&tampered(|j| j["darkClockMs"] = 1.5.into()));
        assert_rejected(&tampered(|j| j["darkClockMs"] = "600000".into()));
    }

    #[test]
    fn untampered_payload_is_accepted() {
        let mut local = GameState::new();
        local.apply_remote(&tampered(|_| {})).unwrap();
        assert_eq!(local.history().len(), 2);
    }
}
