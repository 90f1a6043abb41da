//! End to end tests through the public API
//!
//! Run with: cargo test --test game_tests

use chess_rules::{ChessError, Color, GameConfig, GameEvent, GameResult, GameState, SyncPayload};
use pretty_assertions::assert_eq;
use rand::prelude::*;

fn play_all(game: &mut GameState, moves: &[&str]) {
    for m in moves {
        game.play_coordinates(m)
            .unwrap_or_else(|e| panic!("{m} should be legal: {e}"));
    }
}

fn random_game(seed: u64, max_plies: usize) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = GameState::new();
    while !game.is_game_over() && game.history().len() < max_plies {
        let moves = game.all_legal_moves();
        let mv = *moves.choose(&mut rng).unwrap();
        game.apply(&mv).unwrap();
    }
    game
}

#[test]
fn fools_mate_through_public_api() {
    let mut game = GameState::new();
    play_all(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(game.result(), GameResult::Checkmate { winner: Color::Black });
    assert_eq!(game.move_text(), "1. f3 e5 2. g4 Qh4#");
    assert!(game.to_pgn().contains("0-1"));

    let events = game.drain_events();
    let moves_applied = events
        .iter()
        .filter(|e| matches!(e, GameEvent::MoveApplied { .. }))
        .count();
    assert_eq!(moves_applied, 4);
    assert!(matches!(events.last(), Some(GameEvent::GameEnded { winner: Some(Color::Black), .. })));
}

#[test]
fn repetition_only_at_third_occurrence() {
    let mut game = GameState::new();
    let cycle = ["b1c3", "b8c6", "c3b1", "c6b8"];
    play_all(&mut game, &cycle);
    assert!(!game.is_game_over());
    play_all(&mut game, &cycle[..3]);
    assert!(!game.is_game_over());
    play_all(&mut game, &cycle[3..]);
    assert_eq!(game.result(), GameResult::Repetition);
    assert_eq!(game.result().to_score(), "1/2-1/2");
    assert_eq!(game.play_coordinates("b1c3"), Err(ChessError::GameOver));
}

#[test]
fn sync_round_trip_over_json() {
    let mut game = GameState::with_config(GameConfig::with_clock_ms(180_000));
    play_all(
        &mut game,
        &["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6"],
    );
    let json = game.to_json().unwrap();

    let payload = SyncPayload::from_json(&json).unwrap();
    let replayed = GameState::replay(&payload, GameConfig::with_clock_ms(180_000)).unwrap();
    assert_eq!(replayed.signature(), game.signature());
    assert_eq!(replayed.history(), game.history());
    assert_eq!(replayed.notation_history(), game.notation_history());
    assert_eq!(replayed.clock_ms(Color::Black), 180_000);
}

#[test]
fn payload_without_clocks_is_rejected() {
    let mut game = GameState::new();
    play_all(&mut game, &["e2e4"]);
    let mut json: serde_json::Value = serde_json::from_str(&game.to_json().unwrap()).unwrap();
    json.as_object_mut().unwrap().remove("darkClockMs");

    let mut local = GameState::new();
    let result = local.apply_remote(&json.to_string());
    assert!(matches!(result, Err(ChessError::InvalidState(_))));
    assert!(local.history().is_empty());
}

#[test]
fn legal_moves_never_leave_own_king_in_check() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new();
        while !game.is_game_over() && game.history().len() < 150 {
            let mover = game.active_color();
            let moves = game.all_legal_moves();
            for mv in &moves {
                let mut child = game.clone();
                child.apply(mv).unwrap();
                assert!(
                    !child.is_in_check(mover),
                    "seed {seed}: {} leaves the king in check",
                    mv.to_human()
                );
            }
            let mv = *moves.choose(&mut rng).unwrap();
            game.apply(&mv).unwrap();
        }
    }
}

#[test]
fn replay_of_random_games_matches_live_signature() {
    for seed in 100..120 {
        let game = random_game(seed, 300);
        let replayed = GameState::replay(&game.to_payload(), GameConfig::default()).unwrap();
        assert_eq!(replayed.signature(), game.signature(), "seed {seed}");
        assert_eq!(replayed.signatures(), game.signatures(), "seed {seed}");
        assert_eq!(replayed.result(), game.result(), "seed {seed}");
        assert_eq!(replayed.captured_by(Color::White), game.captured_by(Color::White));
        assert_eq!(replayed.captured_by(Color::Black), game.captured_by(Color::Black));
    }
}

#[test]
fn castling_rights_never_come_back() {
    for seed in 200..210 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new();
        let mut previous = [game.castling_rights(Color::White), game.castling_rights(Color::Black)];
        while !game.is_game_over() && game.history().len() < 200 {
            let mv = *game.all_legal_moves().choose(&mut rng).unwrap();
            game.apply(&mv).unwrap();
            for (i, color) in [Color::White, Color::Black].into_iter().enumerate() {
                let now = game.castling_rights(color);
                assert!(previous[i].kingside || !now.kingside, "seed {seed}");
                assert!(previous[i].queenside || !now.queenside, "seed {seed}");
                previous[i] = now;
            }
        }
    }
}

#[test]
fn reset_discards_the_game() {
    let mut game = random_game(7, 40);
    game.reset();
    assert_eq!(game.signature(), GameState::new().signature());
    assert!(game.history().is_empty());
    assert_eq!(game.result(), GameResult::InProgress);
    assert_eq!(game.drain_events().last(), Some(&GameEvent::GameReset));
}
