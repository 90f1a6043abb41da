//! Command line front end for the rules engine.
//!
//! Usage: chess_rules play e2e4 e7e5 g1f3
//!        chess_rules replay game.json
//!        chess_rules random --plies 200 --seed 7
//!        chess_rules perft --depth 4

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use log::info;
use rand::prelude::*;

use chess_rules::perft::perft_divide;
use chess_rules::sync::SyncPayload;
use chess_rules::{GameConfig, GameState};

#[derive(Parser, Debug)]
#[command(name = "chess_rules")]
#[command(about = "Play, replay and self-play games with the chess rules engine")]
struct Args {
    /// Starting time per side in milliseconds
    #[arg(long, default_value_t = chess_rules::config::DEFAULT_CLOCK_MS)]
    clock_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play coordinate moves such as `e2e4` from the starting position
    Play {
        moves: Vec<String>,

        /// Print the sync payload after the last move
        #[arg(long)]
        json: bool,
    },
    /// Rebuild a game from a sync payload file
    Replay { file: PathBuf },
    /// Let both sides play random legal moves
    Random {
        #[arg(long, default_value_t = 200)]
        plies: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Print the game as PGN instead of move text
        #[arg(long)]
        pgn: bool,
    },
    /// Count move paths from the starting position, split by first move
    Perft {
        #[arg(short, long, default_value_t = 3)]
        depth: u8,
    },
}

fn print_summary(game: &GameState) {
    println!("{}", game.board());
    println!("{}", game.move_text());
    if game.is_game_over() {
        let winner = match game.result().winner() {
            Some(color) => format!(", {} wins", color.to_human()),
            None => "".to_string(),
        };
        println!("result: {} ({}){}", game.result().as_str(), game.result().to_score(), winner);
    } else {
        println!("{} to move", game.active_color().to_human());
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();
    let config = GameConfig::with_clock_ms(args.clock_ms);

    match args.command {
        Command::Play { moves, json } => {
            let mut game = GameState::with_config(config);
            for coordinates in &moves {
                let record = game
                    .play_coordinates(coordinates)
                    .wrap_err_with(|| format!("cannot play {}", coordinates))?;
                println!("{}", record.to_san());
            }
            print_summary(&game);
            if json {
                println!("{}", game.to_json()?);
            }
        }
        Command::Replay { file } => {
            let text = fs::read_to_string(&file)
                .wrap_err_with(|| format!("cannot read {}", file.display()))?;
            let payload = SyncPayload::from_json(&text)?;
            let game = GameState::replay(&payload, config)?;
            print_summary(&game);
            println!("signature: {}", game.signature());
        }
        Command::Random { plies, seed, pgn } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = GameState::with_config(config);
            while !game.is_game_over() && game.history().len() < plies {
                let moves = game.all_legal_moves();
                let mv = moves
                    .choose(&mut rng)
                    .ok_or_else(|| eyre!("no legal move in an unfinished game"))?;
                game.apply(mv)?;
            }
            info!("random game finished after {} plies", game.history().len());
            if pgn {
                println!("{}", game.to_pgn());
            } else {
                print_summary(&game);
            }
        }
        Command::Perft { depth } => {
            let game = GameState::with_config(config);
            let start = Instant::now();
            let divide = perft_divide(&game, depth);
            for (mv, nodes) in &divide {
                println!("{}: {}", mv, nodes);
            }
            let total: u64 = divide.iter().map(|(_, n)| n).sum();
            let elapsed = start.elapsed();
            println!();
            println!("Nodes searched: {}", total);
            println!(
                "Time: {:.3}s ({:.0} nodes/s)",
                elapsed.as_secs_f64(),
                total as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    }
    Ok(())
}
