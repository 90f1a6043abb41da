use crate::game::GameState;

/// Count the leaf nodes of the legal move tree below `state`, `depth` plies deep.
///
/// Pawns only ever promote to queens, so the reference counts published at
/// https://www.chessprogramming.org/Perft_Results hold up to the first depth with
/// a promotion. Draws by repetition or material do not cut the tree short.
///
/// | Depth | Nodes   | Captures | E.p. | Castles | Promotions | Checks | Checkmates |
/// | ----- | ------- | -------- | ---- | ------- | ---------- | ------ | ---------- |
/// | 1     | 20      | 0        | 0    | 0       | 0          | 0      | 0          |
/// | 2     | 400     | 0        | 0    | 0       | 0          | 0      | 0          |
/// | 3     | 8,902   | 34       | 0    | 0       | 0          | 12     | 0          |
/// | 4     | 197,281 | 1576     | 0    | 0       | 0          | 469    | 8          |
pub fn perft(state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = state.move_generator().all_legal_moves(state.active_color());
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .map(|m| {
            let mut child = state.clone();
            child.execute(m);
            perft(&child, depth - 1)
        })
        .sum()
}

/// Node count below each root move, keyed by coordinate text such as `e2e4`
pub fn perft_divide(state: &GameState, depth: u8) -> Vec<(String, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut divide: Vec<(String, u64)> = state
        .move_generator()
        .all_legal_moves(state.active_color())
        .into_iter()
        .map(|m| {
            let mut child = state.clone();
            child.execute(m);
            (format!("{}{}", m.from, m.to), perft(&child, depth - 1))
        })
        .collect();
    divide.sort();
    divide
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Color;

    const MAX_DEPTH: u8 = 3;

    #[test]
    fn perft_start() {
        let game = GameState::new();
        let expected = [1, 20, 400, 8902];
        for depth in 0..=MAX_DEPTH {
            println!("Depth {}", depth);
            assert_eq!(expected[depth as usize], perft(&game, depth));
        }
    }

    /// "Kiwipete", position 2 of the perft results page
    ///
    /// Depth | Nodes
    /// ----- | -----
    /// 1     | 48
    /// 2     | 2,039
    /// 3     | 97,862
    #[test]
    fn perft_kiwipete() {
        let board =
            Board::from_placement("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R");
        let game = GameState::from_board(board, Color::White);
        assert_eq!(perft(&game, 1), 48);
        assert_eq!(perft(&game, 2), 2039);
    }

    /// Position 3: en passant discovered checks along the fourth and fifth ranks
    ///
    /// Depth | Nodes
    /// ----- | -----
    /// 1     | 14
    /// 2     | 191
    /// 3     | 2,812
    #[test]
    fn perft_pos_3() {
        let board = Board::from_placement("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8");
        let game = GameState::from_board(board, Color::White);
        let expected = [1, 14, 191, 2812];
        for depth in 1..=MAX_DEPTH {
            assert_eq!(expected[depth as usize], perft(&game, depth));
        }
    }

    #[test]
    fn divide_sums_to_perft() {
        let game = GameState::new();
        let divide = perft_divide(&game, 2);
        assert_eq!(divide.len(), 20);
        assert!(divide.iter().all(|(_, nodes)| *nodes == 20));
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), perft(&game, 2));
        assert_eq!(divide[0].0, "a2a3");
    }
}
