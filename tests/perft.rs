/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use newt::{perft_generic, Game};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let mut position = Game::from_fen(fen).unwrap();
    let before = position.clone();

    let res = perft_generic::<true>(&mut position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
    assert_eq!(position, before, "PERFT({depth}) did not restore {fen}");
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod simple_perfts {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    #[test]
    fn test_startpos_perft() {
        test_perft_fen_nodes(1, STARTPOS, 20);
        test_perft_fen_nodes(2, STARTPOS, 400);
        test_perft_fen_nodes(3, STARTPOS, 8902);
        test_perft_fen_nodes(4, STARTPOS, 197281);
    }

    #[test]
    fn test_kiwipete_perft() {
        test_perft_fen_nodes(1, KIWIPETE, 48);
        test_perft_fen_nodes(2, KIWIPETE, 2039);
        test_perft_fen_nodes(3, KIWIPETE, 97862);
    }

    #[test]
    fn test_position_3_perft() {
        test_perft_fen_nodes(1, POSITION_3, 14);
        test_perft_fen_nodes(2, POSITION_3, 191);
        test_perft_fen_nodes(3, POSITION_3, 2812);
        test_perft_fen_nodes(4, POSITION_3, 43238);
    }

    #[test]
    fn test_position_4_perft() {
        test_perft_fen_nodes(1, POSITION_4, 6);
        test_perft_fen_nodes(2, POSITION_4, 264);
        test_perft_fen_nodes(3, POSITION_4, 9467);
    }

    #[test]
    fn test_position_5_perft() {
        test_perft_fen_nodes(1, POSITION_5, 44);
        test_perft_fen_nodes(2, POSITION_5, 1486);
        test_perft_fen_nodes(3, POSITION_5, 62379);
    }
}

/// https://www.chessprogramming.net/perfect-perft/
#[cfg(test)]
mod promotion_perft {
    use super::*;

    const PROMOTIONS: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, PROMOTIONS, 24);
    }

    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, PROMOTIONS, 496);
    }

    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, PROMOTIONS, 9483);
    }
}
